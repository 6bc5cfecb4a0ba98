use super::{directional_corrections, explicit_update, SchemeState};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::{FdmLinearOpComposite, FdmOperatorWindow};
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::trace;

/// Douglas operator splitting.
///
/// ```text
/// Y₀ = a + dt·L(a)
/// Yᵢ = Yᵢ₋₁ + θ·dt·(Lᵢ(Yᵢ) − Lᵢ(a)),   i = 1..d
/// ```
#[derive(Debug)]
pub struct DouglasScheme {
    pub(super) state: SchemeState,
    theta: Real,
}

impl DouglasScheme {
    /// Scheme with weight `theta` on `op`.
    pub fn new(theta: Real, op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            state: SchemeState::new(op, bc_set),
            theta,
        }
    }

    /// Set the step size.
    pub fn set_step(&mut self, dt: Time) {
        self.state.set_step(dt);
    }

    /// Advance `a` from `t` to `t − dt`.
    pub fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let (mut window, dt) = self.state.begin_step(t)?;
        trace!(t, dt, "Douglas step");
        let bc_set = &self.state.bc_set;
        let (_, mut y) = douglas_stage(&mut window, bc_set, a, self.theta, dt)?;
        bc_set.apply_before_solving(&mut window, a)?;
        bc_set.apply_after_solving(&mut y)?;
        *a = y;
        Ok(())
    }
}

/// Explicit predictor followed by one implicit correction per direction.
/// Returns the predictor `Y₀` and the corrected `Y_d`.
pub(super) fn douglas_stage(
    window: &mut FdmOperatorWindow,
    bc_set: &FdmBoundaryConditionSet,
    a: &Array,
    theta: Real,
    dt: Time,
) -> Result<(Array, Array)> {
    bc_set.apply_before_applying(window)?;
    let y0 = explicit_update(bc_set, a, dt, &window.apply(a)?)?;
    let y = directional_corrections(window, y0.clone(), a, theta * dt)?;
    Ok((y0, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::test_support::black_scholes_1d;
    use crate::finite_differences::schemes::CrankNicolsonScheme;
    use approx::assert_relative_eq;

    #[test]
    fn one_dimensional_douglas_is_crank_nicolson() {
        let (op, x) = black_scholes_1d(61);
        let payoff = x.map(|xi| (xi.exp() - 100.0).max(0.0));
        let mut douglas = DouglasScheme::new(0.5, op.clone(), FdmBoundaryConditionSet::default());
        let mut cn = CrankNicolsonScheme::new(0.5, op, FdmBoundaryConditionSet::default());
        douglas.set_step(0.05);
        cn.set_step(0.05);
        let (mut a, mut b) = (payoff.clone(), payoff);
        for k in 0..10 {
            let t = 1.0 - 0.05 * k as Real;
            douglas.step(&mut a, t).unwrap();
            cn.step(&mut b, t).unwrap();
        }
        for (u, v) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*u, *v, epsilon = 1e-9, max_relative = 1e-9);
        }
    }
}
