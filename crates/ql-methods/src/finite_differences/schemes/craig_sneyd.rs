use super::douglas::douglas_stage;
use super::{directional_corrections, explicit_update, SchemeState};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::trace;

/// Craig-Sneyd splitting: a Douglas stage, then a corrector re-evaluating
/// only the mixed part on the stage increment.
///
/// ```text
/// Ỹ₀ = Y₀ + μ·dt·L_mixed(Y_d − a)
/// Ỹᵢ = Ỹᵢ₋₁ + θ·dt·(Lᵢ(Ỹᵢ) − Lᵢ(a))
/// ```
#[derive(Debug)]
pub struct CraigSneydScheme {
    pub(super) state: SchemeState,
    theta: Real,
    mu: Real,
}

impl CraigSneydScheme {
    /// Scheme with weights `theta` and `mu` on `op`.
    pub fn new(
        theta: Real,
        mu: Real,
        op: Arc<dyn FdmLinearOpComposite>,
        bc_set: FdmBoundaryConditionSet,
    ) -> Self {
        Self {
            state: SchemeState::new(op, bc_set),
            theta,
            mu,
        }
    }

    /// Set the step size.
    pub fn set_step(&mut self, dt: Time) {
        self.state.set_step(dt);
    }

    /// Advance `a` from `t` to `t − dt`.
    pub fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let (mut window, dt) = self.state.begin_step(t)?;
        trace!(t, dt, "Craig-Sneyd step");
        let bc_set = &self.state.bc_set;
        let (y0, y) = douglas_stage(&mut window, bc_set, a, self.theta, dt)?;

        bc_set.apply_before_applying(&mut window)?;
        let increment = &y - &*a;
        let yt = explicit_update(bc_set, &y0, self.mu * dt, &window.apply_mixed(&increment)?)?;
        let mut yt = directional_corrections(&window, yt, a, self.theta * dt)?;
        bc_set.apply_after_solving(&mut yt)?;
        *a = yt;
        Ok(())
    }
}
