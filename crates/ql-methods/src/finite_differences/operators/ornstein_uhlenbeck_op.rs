//! Generic one-factor diffusion operator.
//!
//! `L = μ(t, x)·∂x + σ(t, x)²/2·∂xx − r`, with drift and diffusion taken
//! from the process at the window midpoint.  Used for the (extended)
//! Ornstein-Uhlenbeck factor of commodity models.

use super::{
    fill_directions, Coefficient, FdmLinearOpComposite, FdmOperatorWindow, FirstDerivativeOp,
    SecondDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use ql_processes::StochasticProcess1D;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Diffusion operator of a one-dimensional process along one direction.
#[derive(Debug)]
pub struct FdmOrnsteinUhlenbeckOp {
    process: Arc<dyn StochasticProcess1D>,
    r_ts: Arc<dyn YieldTermStructure>,
    x: Array,
    direction: usize,
    dx: TripleBandLinearOp,
    dxx: TripleBandLinearOp,
    template: Vec<TripleBandLinearOp>,
}

impl FdmOrnsteinUhlenbeckOp {
    /// Build the operator along `direction`, discounting with `r_ts`.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: Arc<dyn StochasticProcess1D>,
        r_ts: Arc<dyn YieldTermStructure>,
        direction: usize,
    ) -> Result<Self> {
        Ok(Self {
            process,
            r_ts,
            x: mesher.locations(direction),
            direction,
            dx: FirstDerivativeOp::new(direction, mesher)?,
            dxx: SecondDerivativeOp::new(direction, mesher)?,
            template: fill_directions(mesher, Vec::new())?,
        })
    }

    /// The frozen directional part alone.
    pub(crate) fn frozen_part(&self, t1: Time, t2: Time) -> Result<TripleBandLinearOp> {
        let r = self.r_ts.forward_rate(t1, t2);
        let tm = 0.5 * (t1 + t2);
        let drift = self.x.map(|x| self.process.drift(tm, x));
        let half_var = self.x.map(|x| {
            let s = self.process.diffusion(tm, x);
            0.5 * s * s
        });
        self.dx.axpyb(
            Coefficient::PerPoint(&drift),
            &self.dx,
            &self.dxx.mult(&half_var)?,
            Coefficient::Constant(-r),
        )
    }

    /// Direction the operator acts along.
    pub fn direction(&self) -> usize {
        self.direction
    }
}

impl FdmLinearOpComposite for FdmOrnsteinUhlenbeckOp {
    fn size(&self) -> usize {
        self.x.size()
    }

    fn dimensions(&self) -> usize {
        self.template.len()
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        let mut directions = self.template.clone();
        directions[self.direction] = self.frozen_part(t1, t2)?;
        FdmOperatorWindow::new(directions, Vec::new(), None)
            .map(|w| w.with_preconditioner_direction(self.direction))
    }
}
