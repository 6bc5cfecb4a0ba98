//! Hull-White operator on the Ornstein-Uhlenbeck state `x`, with short
//! rate `r = x + φ(t)`:
//! `L = −a·x·∂x + σ²/2·∂xx − (x + φ)`.

use super::{
    fill_directions, FdmLinearOpComposite, FdmOperatorWindow, FirstDerivativeOp,
    SecondDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{errors::Result, Time};
use ql_math::Array;
use ql_processes::HullWhiteProcess;
use std::sync::Arc;

/// Hull-White operator along one direction.
#[derive(Debug)]
pub struct FdmHullWhiteOp {
    process: Arc<HullWhiteProcess>,
    x: Array,
    direction: usize,
    dz: TripleBandLinearOp,
    template: Vec<TripleBandLinearOp>,
}

impl FdmHullWhiteOp {
    /// Build the operator along `direction`.
    pub fn new(mesher: &dyn FdmMesher, process: Arc<HullWhiteProcess>, direction: usize) -> Result<Self> {
        let x = mesher.locations(direction);
        let (a, sigma) = (process.a(), process.sigma());
        let dz = FirstDerivativeOp::new(direction, mesher)?
            .mult(&(-a * &x))?
            .add(&SecondDerivativeOp::new(direction, mesher)?.scale(0.5 * sigma * sigma))?;
        Ok(Self {
            process,
            x,
            direction,
            dz,
            template: fill_directions(mesher, Vec::new())?,
        })
    }

    /// The frozen directional part alone.
    pub(crate) fn frozen_part(&self, t1: Time, t2: Time) -> Result<TripleBandLinearOp> {
        let phi = 0.5 * (self.process.phi(t1) + self.process.phi(t2));
        self.dz.add_diag(&self.x.map(|x| -(x + phi)))
    }
}

impl FdmLinearOpComposite for FdmHullWhiteOp {
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
