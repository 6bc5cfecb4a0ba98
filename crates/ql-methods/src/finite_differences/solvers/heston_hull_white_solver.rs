use super::{log_spot, Fdm3DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonHullWhiteOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, Real};
use ql_processes::{HestonProcess, HullWhiteProcess};
use std::sync::Arc;

/// Heston equity with Hull-White rates on a (log-spot, variance,
/// short-rate factor) mesh.  The short rate is `r = x + φ(t)`; quotes
/// take the factor `x`.
#[derive(Debug)]
pub struct FdmHestonHullWhiteSolver {
    solver: Fdm3DimSolver,
}

impl FdmHestonHullWhiteSolver {
    /// Price on `desc.mesher`.
    pub fn new(
        heston: &HestonProcess,
        hull_white: Arc<HullWhiteProcess>,
        equity_rate_correlation: Real,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = Arc::new(FdmHestonHullWhiteOp::new(
            desc.mesher.as_ref(),
            heston,
            hull_white,
            equity_rate_correlation,
        )?);
        Ok(Self {
            solver: Fdm3DimSolver::new(desc, scheme_desc, op)?,
        })
    }

    /// Value at spot `s`, variance `v` and rate factor `r`.
    pub fn value_at(&self, s: Real, v: Real, r: Real) -> Result<Real> {
        self.solver.interpolate_at(log_spot(s)?, v, r)
    }

    /// Central-difference delta with spot bump `eps`.
    pub fn delta_at(&self, s: Real, v: Real, r: Real, eps: Real) -> Result<Real> {
        ensure!(eps > 0.0 && eps < s, "delta bump {eps} must lie in (0, {s})");
        Ok((self.value_at(s + eps, v, r)? - self.value_at(s - eps, v, r)?) / (2.0 * eps))
    }

    /// Central-difference gamma with spot bump `eps`.
    pub fn gamma_at(&self, s: Real, v: Real, r: Real, eps: Real) -> Result<Real> {
        ensure!(eps > 0.0 && eps < s, "gamma bump {eps} must lie in (0, {s})");
        let up = self.value_at(s + eps, v, r)?;
        let mid = self.value_at(s, v, r)?;
        let down = self.value_at(s - eps, v, r)?;
        Ok((up - 2.0 * mid + down) / (eps * eps))
    }

    /// Time decay at `(s, v, r)`.
    pub fn theta_at(&self, s: Real, v: Real, r: Real) -> Result<Option<Real>> {
        self.solver.theta_at(log_spot(s)?, v, r)
    }
}
