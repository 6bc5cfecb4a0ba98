use super::{Fdm2DimSolver, FdmHestonSolver, FdmSolverDesc};
use crate::finite_differences::operators::FdmBatesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{errors::Result, Real};
use ql_processes::BatesProcess;
use std::sync::Arc;

/// Bates solver: the Heston solver with the jump integral added to the
/// operator.
#[derive(Debug)]
pub struct FdmBatesSolver {
    inner: FdmHestonSolver,
}

impl FdmBatesSolver {
    /// Price on `desc.mesher`; the jump integral uses a Gauss-Hermite
    /// rule of `integration_order` nodes and respects the Dirichlet
    /// boundaries of `desc`.
    pub fn new(
        process: &BatesProcess,
        desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        integration_order: usize,
    ) -> Result<Self> {
        let op = Arc::new(FdmBatesOp::new(
            desc.mesher.as_ref(),
            process,
            &desc.bc_set,
            integration_order,
        )?);
        let solver = Fdm2DimSolver::new(desc, scheme_desc, op)?;
        Ok(Self {
            inner: FdmHestonSolver::from_solver(solver),
        })
    }

    /// Value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.inner.value_at(s, v)
    }

    /// Central-difference delta with spot bump `eps`.
    pub fn delta_at(&self, s: Real, v: Real, eps: Real) -> Result<Real> {
        self.inner.delta_at(s, v, eps)
    }

    /// Central-difference gamma with spot bump `eps`.
    pub fn gamma_at(&self, s: Real, v: Real, eps: Real) -> Result<Real> {
        self.inner.gamma_at(s, v, eps)
    }

    /// Time decay at `(s, v)`.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Option<Real>> {
        self.inner.theta_at(s, v)
    }
}
