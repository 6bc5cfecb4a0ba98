//! Tensor-product meshes.

use super::{Fdm1dMesher, FdmMesher};
use crate::finite_differences::utilities::{FdmLinearOpIterator, FdmLinearOpLayout};
use ql_core::{ensure, errors::Result, Real};
use std::sync::Arc;

/// Tensor product of one-dimensional meshes; direction `i` uses
/// `meshers[i]`.
#[derive(Debug, Clone)]
pub struct FdmMesherComposite {
    layout: Arc<FdmLinearOpLayout>,
    meshers: Vec<Arc<Fdm1dMesher>>,
}

impl FdmMesherComposite {
    /// Combine one-dimensional meshes into a grid.
    pub fn new(meshers: Vec<Arc<Fdm1dMesher>>) -> Result<Self> {
        ensure!(!meshers.is_empty(), "a composite mesh needs at least one direction");
        let layout = FdmLinearOpLayout::new(meshers.iter().map(|m| m.size()).collect())?;
        Ok(Self {
            layout: Arc::new(layout),
            meshers,
        })
    }

    /// Combine meshes over an existing layout whose extents must match.
    pub fn with_layout(layout: Arc<FdmLinearOpLayout>, meshers: Vec<Arc<Fdm1dMesher>>) -> Result<Self> {
        ensure!(
            layout.dimensions() == meshers.len(),
            "layout has {} directions but {} meshers were given",
            layout.dimensions(),
            meshers.len()
        );
        for (i, (m, &d)) in meshers.iter().zip(layout.dim()).enumerate() {
            ensure!(
                m.size() == d,
                "mesher {i} has {} points but the layout expects {d}",
                m.size()
            );
        }
        Ok(Self { layout, meshers })
    }

    /// The one-dimensional meshes, one per direction.
    pub fn fdm_1d_meshers(&self) -> &[Arc<Fdm1dMesher>] {
        &self.meshers
    }
}

impl FdmMesher for FdmMesherComposite {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        &self.layout
    }

    fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real> {
        self.meshers[direction].dplus(iter.coordinates()[direction])
    }

    fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real> {
        self.meshers[direction].dminus(iter.coordinates()[direction])
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].location(iter.coordinates()[direction])
    }
}

/// Equidistant grid on a box.
#[derive(Debug, Clone)]
pub struct UniformGridMesher {
    inner: FdmMesherComposite,
}

impl UniformGridMesher {
    /// Uniform mesh with `layout.dim()[i]` points on `boundaries[i]`.
    pub fn new(layout: Arc<FdmLinearOpLayout>, boundaries: &[(Real, Real)]) -> Result<Self> {
        ensure!(
            boundaries.len() == layout.dimensions(),
            "need one boundary pair per direction, got {} for {}",
            boundaries.len(),
            layout.dimensions()
        );
        let meshers = boundaries
            .iter()
            .zip(layout.dim())
            .map(|(&(lo, hi), &n)| Fdm1dMesher::uniform(lo, hi, n).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            inner: FdmMesherComposite::with_layout(layout, meshers)?,
        })
    }
}

impl FdmMesher for UniformGridMesher {
    fn layout(&self) -> &Arc<FdmLinearOpLayout> {
        self.inner.layout()
    }

    fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real> {
        self.inner.dplus(iter, direction)
    }

    fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Option<Real> {
        self.inner.dminus(iter, direction)
    }

    fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.inner.location(iter, direction)
    }
}
