use super::{log_spot, Fdm1DimSolver, FdmSolverDesc};
use crate::finite_differences::operators::{FdmBlackScholesOp, FdmBlackScholesOpConfig};
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

/// Black-Scholes solver on a log-spot mesh, quoting in spot.
#[derive(Debug)]
pub struct FdmBlackScholesSolver {
    solver: Fdm1DimSolver,
}

impl FdmBlackScholesSolver {
    /// Price on `desc.mesher` with the Black-Scholes operator of
    /// `process`; `strike` selects the implied volatility.
    pub fn new(
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        config: FdmBlackScholesOpConfig,
    ) -> Result<Self> {
        let op = Arc::new(FdmBlackScholesOp::new(desc.mesher.as_ref(), process, strike, config, 0)?);
        Ok(Self {
            solver: Fdm1DimSolver::new(desc, scheme_desc, op)?,
        })
    }

    /// Value at spot `s`.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver.interpolate_at(log_spot(s)?))
    }

    /// `∂V/∂S` at `s`, from the first derivative of the log-spot spline
    /// rather than a spot bump.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(log_spot(s)?) / s)
    }

    /// `∂²V/∂S²` at `s`, from the spline derivatives like
    /// [`delta_at`](Self::delta_at).
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        let x = log_spot(s)?;
        Ok((self.solver.derivative_xx(x) - self.solver.derivative_x(x)) / (s * s))
    }

    /// Time decay at `s`.
    pub fn theta_at(&self, s: Real) -> Result<Option<Real>> {
        Ok(self.solver.theta_at(log_spot(s)?))
    }
}
