use super::SchemeState;
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::{FdmLinearOpComposite, FdmOperatorWindow};
use ql_core::{errors::Result, Real, Time};
use ql_math::{Array, BiCGStab};
use std::sync::Arc;
use tracing::trace;

/// Relative residual targeted by the iterative multi-dimensional solve.
pub const DEFAULT_RELATIVE_TOLERANCE: Real = 1e-8;

/// Implicit Euler: solve `(I − dt·L)·a_new = a`.
///
/// One-dimensional operators are inverted directly; otherwise BiCGStab
/// preconditioned with the implicit solve along one direction.
#[derive(Debug)]
pub struct ImplicitEulerScheme {
    pub(super) state: SchemeState,
    relative_tolerance: Real,
}

impl ImplicitEulerScheme {
    /// Scheme on `op` with the given boundary conditions.
    pub fn new(op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            state: SchemeState::new(op, bc_set),
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }

    /// Use `tolerance` as the BiCGStab target.
    pub fn with_relative_tolerance(mut self, tolerance: Real) -> Self {
        self.relative_tolerance = tolerance;
        self
    }

    /// Set the step size.
    pub fn set_step(&mut self, dt: Time) {
        self.state.set_step(dt);
    }

    /// Advance `a` from `t` to `t − dt`.
    pub fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let (mut window, dt) = self.state.begin_step(t)?;
        trace!(t, dt, "implicit Euler step");
        implicit_substep(&mut window, &self.state.bc_set, a, dt, self.relative_tolerance)
    }
}

/// Solve `(I − theta_dt·L)·x = a` with the solving hooks around it.
pub(super) fn implicit_substep(
    window: &mut FdmOperatorWindow,
    bc_set: &FdmBoundaryConditionSet,
    a: &mut Array,
    theta_dt: Real,
    relative_tolerance: Real,
) -> Result<()> {
    bc_set.apply_before_solving(window, a)?;
    let x = if window.dimensions() == 1 {
        window.solve_splitting(0, a, theta_dt)?
    } else {
        let w: &FdmOperatorWindow = window;
        let solver = BiCGStab::new(a.size().max(10), relative_tolerance);
        let result = solver.solve(
            |x| Ok(x - &(w.apply(x)? * theta_dt)),
            |r| w.preconditioner(r, theta_dt),
            a,
            a,
        )?;
        trace!(iterations = result.iterations, error = result.error, "BiCGStab solve");
        result.x
    };
    *a = x;
    bc_set.apply_after_solving(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::schemes::test_support::black_scholes_1d;
    use approx::assert_relative_eq;

    #[test]
    fn one_step_inverts_the_operator() {
        let (op, x) = black_scholes_1d(41);
        let mut scheme = ImplicitEulerScheme::new(op.clone(), FdmBoundaryConditionSet::default());
        scheme.set_step(0.1);
        let start = x.map(|xi| (xi.exp() - 100.0).max(0.0));
        let mut a = start.clone();
        scheme.step(&mut a, 1.0).unwrap();
        // (I − dt·L)·a must give back the starting values
        let w = op.freeze(0.9, 1.0).unwrap();
        let back = &a - &(w.apply(&a).unwrap() * 0.1);
        for (u, v) in back.iter().zip(start.iter()) {
            assert_relative_eq!(*u, *v, epsilon = 1e-9, max_relative = 1e-9);
        }
    }
}
