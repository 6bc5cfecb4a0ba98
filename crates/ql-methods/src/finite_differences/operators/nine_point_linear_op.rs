//! Nine-point stencil over a pair of directions.

use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real};
use ql_math::Array;
use std::sync::Arc;

/// Stencil position `3·(o₀+1) + (o₁+1)` for offsets `o₀` along the first
/// direction and `o₁` along the second.
pub(crate) const fn slot(o0: isize, o1: isize) -> usize {
    (3 * (o0 + 1) + (o1 + 1)) as usize
}

#[derive(Debug)]
struct NinePointStencil {
    index: [Vec<usize>; 9],
}

/// Operator coupling each grid point with its 3×3 neighbourhood in the
/// plane of two directions.
#[derive(Debug, Clone)]
pub struct NinePointLinearOp {
    d0: usize,
    d1: usize,
    stencil: Arc<NinePointStencil>,
    weights: Arc<[Vec<Real>; 9]>,
}

impl NinePointLinearOp {
    /// Zero operator over directions `d0` and `d1`.
    pub fn new(d0: usize, d1: usize, mesher: &dyn FdmMesher) -> Result<Self> {
        let layout = mesher.layout();
        let dims = layout.dimensions();
        ensure!(
            d0 < dims && d1 < dims && d0 != d1,
            "invalid direction pair ({d0}, {d1}) for a {dims}-dimensional mesh"
        );
        let size = layout.size();
        let mut index: [Vec<usize>; 9] = Default::default();
        for v in index.iter_mut() {
            *v = vec![0; size];
        }
        for iter in layout.iter() {
            let i = iter.index();
            for o0 in -1..=1 {
                for o1 in -1..=1 {
                    index[slot(o0, o1)][i] = layout.neighbourhood2(&iter, d0, o0, d1, o1);
                }
            }
        }
        let mut weights: [Vec<Real>; 9] = Default::default();
        for w in weights.iter_mut() {
            *w = vec![0.0; size];
        }
        Ok(Self {
            d0,
            d1,
            stencil: Arc::new(NinePointStencil { index }),
            weights: Arc::new(weights),
        })
    }

    /// Replace the weights, keeping the stencil.
    pub(crate) fn with_weights(&self, weights: [Vec<Real>; 9]) -> Self {
        Self {
            d0: self.d0,
            d1: self.d1,
            stencil: Arc::clone(&self.stencil),
            weights: Arc::new(weights),
        }
    }

    /// The two directions.
    pub fn directions(&self) -> (usize, usize) {
        (self.d0, self.d1)
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.weights[slot(0, 0)].len()
    }

    /// Weight of the neighbour at offsets `(o0, o1)` for row `i`.
    pub fn weight(&self, i: usize, o0: isize, o1: isize) -> Real {
        self.weights[slot(o0, o1)][i]
    }

    /// Apply to `r`.
    pub fn apply(&self, r: &Array) -> Result<Array> {
        ensure!(
            r.size() == self.size(),
            "array of size {} applied to an operator of size {}",
            r.size(),
            self.size()
        );
        let idx = &self.stencil.index;
        let w = &*self.weights;
        Ok(Array::from_fn(self.size(), |i| {
            (0..9).map(|k| w[k][i] * r[idx[k][i]]).sum()
        }))
    }

    /// Row-wise scaling `diag(u)·M`.
    pub fn mult(&self, u: &Array) -> Result<Self> {
        ensure!(
            u.size() == self.size(),
            "scaling array of size {} for an operator of size {}",
            u.size(),
            self.size()
        );
        let mut weights = (*self.weights).clone();
        for band in weights.iter_mut() {
            for (i, v) in band.iter_mut().enumerate() {
                *v *= u[i];
            }
        }
        Ok(self.with_weights(weights))
    }
}
