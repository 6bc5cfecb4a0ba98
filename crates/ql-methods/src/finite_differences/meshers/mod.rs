//! Meshers: where the grid points of each direction sit.
//!
//! An N-dimensional mesh is the tensor product of N one-dimensional
//! meshes over a shared [`FdmLinearOpLayout`].

use crate::finite_differences::utilities::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::Real;
use ql_math::Array;
use std::sync::Arc;

mod black_scholes_mesher;
mod exponential_jump_1d_mesher;
mod fdm_1d_mesher;
mod heston_variance_mesher;
mod mesher_composite;
mod simple_process_1d_mesher;

pub use black_scholes_mesher::{FdmBlackScholesMesher, FdmBlackScholesMesherParams};
pub use exponential_jump_1d_mesher::ExponentialJump1dMesher;
pub use fdm_1d_mesher::{ConcentratingPoint, Fdm1dMesher};
pub use heston_variance_mesher::FdmHestonVarianceMesher;
pub use mesher_composite::{FdmMesherComposite, UniformGridMesher};
pub use simple_process_1d_mesher::FdmSimpleProcess1dMesher;

/// Geometry of an N-dimensional grid.
pub trait FdmMesher: std::fmt::Debug + Send + Sync {
    /// The index layout shared by every array on this mesh.
    fn layout(&self) -> &Arc<FdmLinearOpLayout>;

    /// Forward spacing at `iter` along `direction`; `None` on the upper edge.
    fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real>;

    /// Backward spacing at `iter` along `direction`; `None` on the lower edge.
    fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real>;

    /// Location of `iter` along `direction`.
    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real;

    /// Location along `direction` of every grid point, in flat-index order.
    fn locations(&self, direction: usize) -> Array {
        let layout = self.layout();
        let mut out = Array::zeros(layout.size());
        for iter in layout.iter() {
            out[iter.index()] = self.location(&iter, direction);
        }
        out
    }
}
