use super::{log_spot, Fdm2DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmHestonOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, Real};
use ql_processes::HestonProcess;
use std::sync::Arc;

/// Heston solver on a (log-spot, variance) mesh, quoting in spot.
#[derive(Debug)]
pub struct FdmHestonSolver {
    solver: Fdm2DimSolver,
}

impl FdmHestonSolver {
    /// Price on `desc.mesher` with the Heston operator of `process`.
    pub fn new(process: &HestonProcess, desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc) -> Result<Self> {
        let op = Arc::new(FdmHestonOp::new(desc.mesher.as_ref(), process)?);
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme_desc, op)?,
        })
    }

    pub(super) fn from_solver(solver: Fdm2DimSolver) -> Self {
        Self { solver }
    }

    /// Value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.interpolate_at(log_spot(s)?, v)
    }

    /// Central-difference delta with spot bump `eps`.
    pub fn delta_at(&self, s: Real, v: Real, eps: Real) -> Result<Real> {
        ensure!(eps > 0.0 && eps < s, "delta bump {eps} must lie in (0, {s})");
        Ok((self.value_at(s + eps, v)? - self.value_at(s - eps, v)?) / (2.0 * eps))
    }

    /// Central-difference gamma with spot bump `eps`.
    pub fn gamma_at(&self, s: Real, v: Real, eps: Real) -> Result<Real> {
        ensure!(eps > 0.0 && eps < s, "gamma bump {eps} must lie in (0, {s})");
        let up = self.value_at(s + eps, v)?;
        let mid = self.value_at(s, v)?;
        let down = self.value_at(s - eps, v)?;
        Ok((up - 2.0 * mid + down) / (eps * eps))
    }

    /// Time decay at `(s, v)`.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Option<Real>> {
        self.solver.theta_at(log_spot(s)?, v)
    }

    /// `∂V/∂v` at `(s, v)`.
    pub fn mean_variance_sensitivity_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.derivative_y(log_spot(s)?, v)
    }
}
