//! Heston-Hull-White operator on a (log-spot, variance, rate state) grid.
//!
//! ```text
//! L = (x_r + φ − q − v/2)·∂x + v/2·∂xx
//!   + κ(θ − v)·∂v + σ²v/2·∂vv
//!   − a·x_r·∂r + σ_r²/2·∂rr − (x_r + φ)
//!   + ρσv·∂x∂v + ρ_{S,r}·σ_r·√v·∂x∂r
//! ```
//!
//! The whole discount term sits in the rate direction.

use super::{
    Coefficient, FdmHullWhiteOp, FdmLinearOpComposite, FdmOperatorWindow, FirstDerivativeOp,
    NinePointLinearOp, SecondDerivativeOp, SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use ql_processes::{HestonProcess, HullWhiteProcess};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Three-factor Heston-Hull-White operator.
#[derive(Debug)]
pub struct FdmHestonHullWhiteOp {
    hw_process: Arc<HullWhiteProcess>,
    q_ts: Arc<dyn YieldTermStructure>,
    rates: Array,
    half_v: Array,
    dx: TripleBandLinearOp,
    dxx_half_v: TripleBandLinearOp,
    dy: TripleBandLinearOp,
    hull_white: FdmHullWhiteOp,
    correlation: NinePointLinearOp,
    rate_correlation: NinePointLinearOp,
}

impl FdmHestonHullWhiteOp {
    /// Build the operator; direction 0 is log-spot, 1 variance and 2 the
    /// Hull-White state.
    pub fn new(
        mesher: &dyn FdmMesher,
        heston: &HestonProcess,
        hull_white: Arc<HullWhiteProcess>,
        equity_rate_correlation: Real,
    ) -> Result<Self> {
        ensure!(
            mesher.layout().dimensions() == 3,
            "the Heston-Hull-White operator needs a three-dimensional mesh, got {} directions",
            mesher.layout().dimensions()
        );
        ensure!(
            equity_rate_correlation.abs() <= 1.0,
            "equity/rate correlation {equity_rate_correlation} outside [-1, 1]"
        );
        let v = mesher.locations(1);
        let (kappa, theta, sigma, rho) = (heston.kappa(), heston.theta(), heston.sigma(), heston.rho());

        let dy = SecondDerivativeOp::new(1, mesher)?
            .mult(&(0.5 * sigma * sigma * &v))?
            .add(&FirstDerivativeOp::new(1, mesher)?.mult(&v.map(|vi| kappa * (theta - vi)))?)?;
        let correlation = SecondOrderMixedDerivativeOp::new(0, 1, mesher)?.mult(&(rho * sigma * &v))?;
        let rate_correlation = SecondOrderMixedDerivativeOp::new(0, 2, mesher)?.mult(
            &v.map(|vi| equity_rate_correlation * hull_white.sigma() * vi.max(0.0).sqrt()),
        )?;

        Ok(Self {
            q_ts: Arc::clone(heston.dividend_yield()),
            rates: mesher.locations(2),
            half_v: 0.5 * &v,
            dx: FirstDerivativeOp::new(0, mesher)?,
            dxx_half_v: SecondDerivativeOp::new(0, mesher)?.mult(&(0.5 * &v))?,
            dy,
            hull_white: FdmHullWhiteOp::new(mesher, Arc::clone(&hull_white), 2)?,
            hw_process: hull_white,
            correlation,
            rate_correlation,
        })
    }
}

impl FdmLinearOpComposite for FdmHestonHullWhiteOp {
    fn size(&self) -> usize {
        self.dx.size()
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        let phi = 0.5 * (self.hw_process.phi(t1) + self.hw_process.phi(t2));
        let q = self.q_ts.forward_rate(t1, t2);
        let drift = Array::from_fn(self.rates.size(), |i| self.rates[i] + phi - q - self.half_v[i]);
        let x_part = self.dx.axpyb(
            Coefficient::PerPoint(&drift),
            &self.dx,
            &self.dxx_half_v,
            Coefficient::Zero,
        )?;
        FdmOperatorWindow::new(
            vec![x_part, self.dy.clone(), self.hull_white.frozen_part(t1, t2)?],
            vec![self.correlation.clone(), self.rate_correlation.clone()],
            None,
        )
    }
}
