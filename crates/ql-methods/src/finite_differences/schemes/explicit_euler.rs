use super::{explicit_update, SchemeState};
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::{FdmLinearOpComposite, FdmOperatorWindow};
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::trace;

/// Explicit Euler: `a ← a + dt·L(a)`.
///
/// Only conditionally stable; mostly useful as the explicit half of
/// Crank-Nicolson.
#[derive(Debug)]
pub struct ExplicitEulerScheme {
    pub(super) state: SchemeState,
}

impl ExplicitEulerScheme {
    /// Scheme on `op` with the given boundary conditions.
    pub fn new(op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            state: SchemeState::new(op, bc_set),
        }
    }

    /// Set the step size.
    pub fn set_step(&mut self, dt: Time) {
        self.state.set_step(dt);
    }

    /// Advance `a` from `t` to `t − dt`.
    pub fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        let (mut window, dt) = self.state.begin_step(t)?;
        trace!(t, dt, "explicit Euler step");
        explicit_substep(&mut window, &self.state.bc_set, a, dt)
    }
}

/// `a ← a + theta_dt·L(a)` with the applying hooks around it.
pub(super) fn explicit_substep(
    window: &mut FdmOperatorWindow,
    bc_set: &FdmBoundaryConditionSet,
    a: &mut Array,
    theta_dt: Real,
) -> Result<()> {
    bc_set.apply_before_applying(window)?;
    let la = window.apply(a)?;
    *a = explicit_update(bc_set, a, theta_dt, &la)?;
    Ok(())
}
