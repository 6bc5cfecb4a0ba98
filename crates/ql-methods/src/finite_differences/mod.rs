//! Finite-difference framework for pricing PDEs.
//!
//! A pricing problem is assembled from independent pieces:
//!
//! * [`meshers`]: where the grid points sit, one direction at a time,
//! * [`operators`]: the spatial operator of the model, frozen per time
//!   window,
//! * [`boundary_conditions`]: values imposed on the faces of the grid,
//! * [`schemes`]: one backward time step,
//! * [`step_conditions`]: exercise, dividends, barriers and snapshots
//!   applied between steps,
//! * [`solvers`]: the backward loop and interpolation of the result.
//!
//! [`utilities`] holds the flat index layout and the terminal payoff
//! calculators shared by all of them.

pub mod boundary_conditions;
pub mod meshers;
pub mod operators;
pub mod schemes;
pub mod solvers;
pub mod step_conditions;
pub mod utilities;
