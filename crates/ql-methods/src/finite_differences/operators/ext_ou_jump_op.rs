//! Kluge model operator: an extended Ornstein-Uhlenbeck diffusion in `x`
//! plus a mean-reverting jump factor `y` with exponentially distributed
//! jump sizes.
//!
//! ```text
//! L = μ(t, x)·∂x + σ²/2·∂xx − r
//!   − β·y·∂y + λ·∫₀^∞ (V(y + z) − V(y))·η e^{−ηz} dz
//! ```
//!
//! The jump integral is discretised once with Gauss-Laguerre nodes and
//! linear interpolation along `y`, giving a sparse matrix.

use super::{
    FdmIntegroTerm, FdmLinearOpComposite, FdmOperatorWindow, FdmOrnsteinUhlenbeckOp,
    FirstDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::integrals::GaussLaguerreIntegration;
use ql_math::Array;
use ql_processes::{ExtOUWithJumpsProcess, StochasticProcess1D};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Default Gauss-Laguerre order of the jump integral.
pub const DEFAULT_JUMP_INTEGRATION_ORDER: usize = 32;

/// Row-compressed jump matrix including the `−λ` diagonal.
#[derive(Debug)]
struct SparseJumpIntegral {
    rows: Vec<Vec<(usize, Real)>>,
}

impl FdmIntegroTerm for SparseJumpIntegral {
    fn apply(&self, r: &Array) -> Result<Array> {
        ensure!(
            r.size() == self.rows.len(),
            "array of size {} for a jump matrix of size {}",
            r.size(),
            self.rows.len()
        );
        Ok(Array::from_fn(self.rows.len(), |i| {
            self.rows[i].iter().map(|&(j, w)| w * r[j]).sum()
        }))
    }
}

/// Kluge (extended OU with jumps) operator.
#[derive(Debug)]
pub struct FdmExtOUJumpOp {
    ou: FdmOrnsteinUhlenbeckOp,
    dy: TripleBandLinearOp,
    jumps: Arc<SparseJumpIntegral>,
}

impl FdmExtOUJumpOp {
    /// Build the operator with the default jump integration order.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: &ExtOUWithJumpsProcess,
        r_ts: Arc<dyn YieldTermStructure>,
    ) -> Result<Self> {
        Self::with_integration_order(mesher, process, r_ts, DEFAULT_JUMP_INTEGRATION_ORDER)
    }

    /// Build the operator; direction 0 is the diffusion factor, 1 the jump
    /// factor.
    pub fn with_integration_order(
        mesher: &dyn FdmMesher,
        process: &ExtOUWithJumpsProcess,
        r_ts: Arc<dyn YieldTermStructure>,
        integration_order: usize,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ensure!(
            layout.dimensions() == 2,
            "the Kluge operator needs a two-dimensional mesh, got {} directions",
            layout.dimensions()
        );
        let ny = layout.dim()[1];
        ensure!(ny >= 2, "the jump direction needs at least two points");

        let y_locations = mesher.locations(1);
        let ys: Vec<Real> = (0..ny).map(|j| y_locations[j * layout.spacing()[1]]).collect();

        let (lambda, eta) = (process.jump_intensity(), process.eta());
        let laguerre = GaussLaguerreIntegration::new(integration_order)?;
        let mut rows = Vec::with_capacity(layout.size());
        for iter in layout.iter() {
            let y_index = iter.coordinates()[1];
            let y = ys[y_index];
            let mut row = vec![(iter.index(), -lambda)];
            for (&node, &weight) in laguerre.x().iter().zip(laguerre.w()) {
                let target = y + node / eta;
                let l = if target > ys[ny - 1] {
                    ny - 2
                } else {
                    ys.partition_point(|&v| v <= target) - 1
                }
                .min(ny - 2);
                let s = (target - ys[l]) / (ys[l + 1] - ys[l]);
                let offset = l as isize - y_index as isize;
                row.push((layout.neighbourhood(&iter, 1, offset), lambda * weight * (1.0 - s)));
                row.push((layout.neighbourhood(&iter, 1, offset + 1), lambda * weight * s));
            }
            rows.push(row);
        }

        let dy = FirstDerivativeOp::new(1, mesher)?.mult(&(-process.beta() * &y_locations))?;
        let diffusion: Arc<dyn StochasticProcess1D> = process.ou_process().clone();

        Ok(Self {
            ou: FdmOrnsteinUhlenbeckOp::new(mesher, diffusion, r_ts, 0)?,
            dy,
            jumps: Arc::new(SparseJumpIntegral { rows }),
        })
    }

    /// The jump integral alone.
    pub fn integro(&self, r: &Array) -> Result<Array> {
        self.jumps.apply(r)
    }
}

impl FdmLinearOpComposite for FdmExtOUJumpOp {
    fn size(&self) -> usize {
        self.dy.size()
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        let jumps: Arc<dyn FdmIntegroTerm> = self.jumps.clone();
        FdmOperatorWindow::new(
            vec![self.ou.frozen_part(t1, t2)?, self.dy.clone()],
            Vec::new(),
            Some(jumps),
        )
    }
}
