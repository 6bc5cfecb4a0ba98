use super::explicit_euler::explicit_substep;
use super::implicit_euler::{implicit_substep, DEFAULT_RELATIVE_TOLERANCE};
use super::SchemeState;
use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;
use tracing::trace;

/// θ-scheme: an explicit step of weight `1 − θ` followed by an implicit
/// step of weight `θ`.  θ = 1/2 is Crank-Nicolson proper.
#[derive(Debug)]
pub struct CrankNicolsonScheme {
    pub(super) state: SchemeState,
    theta: Real,
    relative_tolerance: Real,
}

impl CrankNicolsonScheme {
    /// Scheme with implicitness `theta` on `op`.
    pub fn new(theta: Real, op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        Self {
            state: SchemeState::new(op, bc_set),
            theta,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }

    /// Use `tolerance` as the BiCGStab target of the implicit half.
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
        let (window, dt) = self.state.begin_step(t)?;
        trace!(t, dt, theta = self.theta, "Crank-Nicolson step");
        if self.theta != 1.0 {
            let mut w = window.clone();
            explicit_substep(&mut w, &self.state.bc_set, a, (1.0 - self.theta) * dt)?;
        }
        if self.theta != 0.0 {
            let mut w = window;
            implicit_substep(&mut w, &self.state.bc_set, a, self.theta * dt, self.relative_tolerance)?;
        }
        Ok(())
    }
}
