//! Finite-difference engine for vanilla options under Bates (Heston plus
//! lognormal jumps in the spot).

use crate::fd_heston_vanilla_engine::{heston_solver_desc, FdHestonGrid, SPOT_BUMP};
use ql_core::errors::Result;
use ql_instruments::{DividendSchedule, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::solvers::FdmBatesSolver;
use ql_processes::BatesProcess;
use std::sync::Arc;

/// Finite-difference Bates engine for vanilla options.
#[derive(Debug, Clone)]
pub struct FdBatesVanillaEngine {
    process: Arc<BatesProcess>,
    dividends: DividendSchedule,
    grid: FdHestonGrid,
    integration_order: usize,
}

impl FdBatesVanillaEngine {
    /// Engine on the default Heston grid with a 12-point Gauss-Hermite
    /// jump integral.
    pub fn new(process: Arc<BatesProcess>) -> Self {
        Self {
            process,
            dividends: DividendSchedule::empty(),
            grid: FdHestonGrid::default(),
            integration_order: 12,
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdHestonGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Pay the given cash dividends.
    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.dividends = dividends;
        self
    }

    /// Number of Gauss-Hermite nodes of the jump integral.
    pub fn with_integration_order(mut self, order: usize) -> Self {
        self.integration_order = order;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBatesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let heston = self.process.heston();
        let desc = heston_solver_desc(
            heston,
            &self.dividends,
            &self.grid,
            Arc::clone(&args.payoff),
            &args.exercise,
        )?;
        let solver = FdmBatesSolver::new(&self.process, desc, self.grid.scheme, self.integration_order)?;

        let (s0, v0) = (heston.s0(), heston.v0());
        let bump = SPOT_BUMP * s0;
        Ok(PricingResults {
            value: solver.value_at(s0, v0)?,
            delta: Some(solver.delta_at(s0, v0, bump)?),
            gamma: Some(solver.gamma_at(s0, v0, bump)?),
            theta: solver.theta_at(s0, v0)?,
        })
    }
}
