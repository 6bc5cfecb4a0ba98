//! # ql-methods
//!
//! Finite-difference methods for option pricing PDEs: tensor-product
//! meshes, banded spatial operators, operator-splitting time schemes,
//! boundary and step conditions, and the backward solvers that tie them
//! together.
//!
//! # Modules
//!
//! * [`finite_differences`]: meshers, operators, schemes, conditions, solvers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::boundary_conditions::{
    BoundaryCondition, FdmBoundaryConditionSet, FdmDirichletBoundary, FdmDiscountDirichletBoundary,
    FdmTimeDepDirichletBoundary, Side,
};
pub use finite_differences::meshers::{
    Fdm1dMesher, FdmBlackScholesMesher, FdmMesher, FdmMesherComposite, UniformGridMesher,
};
pub use finite_differences::operators::{FdmLinearOpComposite, FdmOperatorWindow, TripleBandLinearOp};
pub use finite_differences::schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType};
pub use finite_differences::solvers::{
    Fdm1DimSolver, Fdm2DimSolver, Fdm3DimSolver, FdmBackwardSolver, FdmSolverDesc,
};
pub use finite_differences::step_conditions::{FdmStepConditionComposite, StepCondition};
pub use finite_differences::utilities::{
    FdmInnerValueCalculator, FdmLinearOpIterator, FdmLinearOpLayout,
};
