//! Heston operator on a (log-spot, variance) grid.
//!
//! ```text
//! L = (r − q − v/2)·∂x + v/2·∂xx
//!   + κ(θ − v)·∂v + σ²v/2·∂vv
//!   + ρσv·∂x∂v − r
//! ```
//!
//! The discount term is split evenly between the two directions.

use super::{
    Coefficient, FdmLinearOpComposite, FdmOperatorWindow, FirstDerivativeOp, NinePointLinearOp,
    SecondDerivativeOp, SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::HestonProcess;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Heston operator.
#[derive(Debug)]
pub struct FdmHestonOp {
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    yield_spread: Real,
    dx: TripleBandLinearOp,
    dxx_half_v: TripleBandLinearOp,
    drift_v: Array,
    dy: TripleBandLinearOp,
    correlation: NinePointLinearOp,
}

impl FdmHestonOp {
    /// Build the operator; log-spot is direction 0, variance direction 1.
    pub fn new(mesher: &dyn FdmMesher, process: &HestonProcess) -> Result<Self> {
        Self::with_yield_spread(mesher, process, 0.0)
    }

    /// Build with `spread` added to the dividend yield (the jump
    /// compensator of a jump-diffusion extension).
    pub fn with_yield_spread(mesher: &dyn FdmMesher, process: &HestonProcess, spread: Real) -> Result<Self> {
        ensure!(
            mesher.layout().dimensions() == 2,
            "the Heston operator needs a two-dimensional mesh, got {} directions",
            mesher.layout().dimensions()
        );
        let v = mesher.locations(1);
        let (kappa, theta, sigma, rho) = (process.kappa(), process.theta(), process.sigma(), process.rho());

        let dy = SecondDerivativeOp::new(1, mesher)?
            .mult(&(0.5 * sigma * sigma * &v))?
            .add(&FirstDerivativeOp::new(1, mesher)?.mult(&v.map(|vi| kappa * (theta - vi)))?)?;
        let correlation = SecondOrderMixedDerivativeOp::new(0, 1, mesher)?.mult(&(rho * sigma * &v))?;

        Ok(Self {
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            yield_spread: spread,
            dx: FirstDerivativeOp::new(0, mesher)?,
            dxx_half_v: SecondDerivativeOp::new(0, mesher)?.mult(&(0.5 * &v))?,
            drift_v: 0.5 * &v,
            dy,
            correlation,
        })
    }

    /// The mixed-derivative part `ρσv·∂x∂v`.
    pub fn correlation(&self) -> &NinePointLinearOp {
        &self.correlation
    }

    /// Directional parts frozen on `[t1, t2]`.
    pub(crate) fn frozen_directions(&self, t1: Time, t2: Time) -> Result<Vec<TripleBandLinearOp>> {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2) + self.yield_spread;
        let drift = self.drift_v.map(|hv| r - q - hv);
        let x_part = self.dx.axpyb(
            Coefficient::PerPoint(&drift),
            &self.dx,
            &self.dxx_half_v,
            Coefficient::Constant(-0.5 * r),
        )?;
        let v_part = self.dy.add_constant_diag(-0.5 * r);
        Ok(vec![x_part, v_part])
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> usize {
        self.dx.size()
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        FdmOperatorWindow::new(
            self.frozen_directions(t1, t2)?,
            vec![self.correlation.clone()],
            None,
        )
    }
}
