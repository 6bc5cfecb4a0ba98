use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::step_conditions::FdmStepConditionComposite;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::Time;
use std::sync::Arc;

/// Everything a dimension solver needs apart from the operator and the
/// scheme.
#[derive(Debug)]
pub struct FdmSolverDesc {
    /// The grid.
    pub mesher: Arc<dyn FdmMesher>,
    /// Boundary conditions.
    pub bc_set: FdmBoundaryConditionSet,
    /// Step conditions and their stopping times.
    pub condition: FdmStepConditionComposite,
    /// Terminal condition.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Time to maturity.
    pub maturity: Time,
    /// Number of time steps.
    pub time_steps: usize,
    /// Number of implicit Euler damping steps.
    pub damping_steps: usize,
}
