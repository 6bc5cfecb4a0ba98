//! Finite-difference engine for vanilla options under Heston.
//!
//! Log-spot times variance mesh: the variance direction follows the
//! averaged CIR quantiles and the spot direction is sized by a
//! Black-Scholes helper process with the variance mesher's volatility
//! estimate.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{
    DividendSchedule, Exercise, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    FdmBlackScholesMesher, FdmBlackScholesMesherParams, FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite,
};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmHestonSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::vanilla_composite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::HestonProcess;
use std::sync::Arc;
use tracing::debug;

/// Grid and scheme of the Heston and Bates engines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdHestonGrid {
    /// Number of time steps.
    pub t_grid: usize,
    /// Number of log-spot points.
    pub x_grid: usize,
    /// Number of variance points.
    pub v_grid: usize,
    /// Implicit Euler steps taken first to smooth the payoff.
    pub damping_steps: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
    /// Fall back to the point payoff where the cell average of the payoff
    /// does not converge, instead of failing.
    pub quadrature_fallback: bool,
}

impl Default for FdHestonGrid {
    fn default() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            v_grid: 50,
            damping_steps: 0,
            scheme: FdmSchemeDesc::hundsdorfer(),
            quadrature_fallback: false,
        }
    }
}

/// Relative spot bump of the Heston family's delta and gamma.
pub(crate) const SPOT_BUMP: Real = 0.01;

/// Mesh, terminal condition and step conditions for a vanilla option on a
/// Heston-type process.
pub(crate) fn heston_solver_desc(
    process: &HestonProcess,
    dividends: &DividendSchedule,
    grid: &FdHestonGrid,
    payoff: Arc<dyn StrikedPayoff>,
    exercise: &Exercise,
) -> Result<FdmSolverDesc> {
    let maturity: Time = exercise.last_time();
    ensure!(maturity > 0.0, "option expired: maturity {maturity}");
    let strike = payoff.strike();

    let variance = FdmHestonVarianceMesher::with_params(
        grid.v_grid,
        process,
        maturity,
        (grid.t_grid / 50).max(5),
        1e-4,
        1.0,
    )?;
    let helper = FdmBlackScholesMesher::process_helper(
        process.s0(),
        Arc::clone(process.risk_free_rate()),
        Arc::clone(process.dividend_yield()),
        variance.vola_estimate(),
    )?;
    let params = FdmBlackScholesMesherParams {
        scale_factor: 2.0,
        concentration: Some((strike, 0.1)),
        ..FdmBlackScholesMesherParams::default()
    };
    let equity = FdmBlackScholesMesher::build(grid.x_grid, &helper, maturity, strike, dividends, &params)?;
    let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![
        Arc::new(equity),
        Arc::new(variance.into_mesher()),
    ])?);

    let calculator = FdmLogInnerValue::log(payoff, Arc::clone(&mesher), 0);
    let calculator: Arc<dyn FdmInnerValueCalculator> = if grid.quadrature_fallback {
        Arc::new(calculator.with_quadrature_fallback())
    } else {
        Arc::new(calculator)
    };
    let condition = vanilla_composite(
        dividends,
        exercise,
        Arc::clone(&mesher),
        Arc::clone(&calculator),
        maturity,
        0,
    )?;

    debug!(
        t_grid = grid.t_grid,
        x_grid = grid.x_grid,
        v_grid = grid.v_grid,
        scheme = ?grid.scheme.scheme_type,
        maturity,
        "assembling Heston solver"
    );
    Ok(FdmSolverDesc {
        mesher,
        bc_set: FdmBoundaryConditionSet::new(),
        condition,
        calculator,
        maturity,
        time_steps: grid.t_grid,
        damping_steps: grid.damping_steps,
    })
}

/// Finite-difference Heston engine for vanilla options.
#[derive(Debug, Clone)]
pub struct FdHestonVanillaEngine {
    process: Arc<HestonProcess>,
    dividends: DividendSchedule,
    grid: FdHestonGrid,
}

impl FdHestonVanillaEngine {
    /// Engine with the default grid and no dividends.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            dividends: DividendSchedule::empty(),
            grid: FdHestonGrid::default(),
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
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let desc = heston_solver_desc(
            &self.process,
            &self.dividends,
            &self.grid,
            Arc::clone(&args.payoff),
            &args.exercise,
        )?;
        let solver = FdmHestonSolver::new(&self.process, desc, self.grid.scheme)?;

        let (s0, v0) = (self.process.s0(), self.process.v0());
        let bump = SPOT_BUMP * s0;
        Ok(PricingResults {
            value: solver.value_at(s0, v0)?,
            delta: Some(solver.delta_at(s0, v0, bump)?),
            gamma: Some(solver.gamma_at(s0, v0, bump)?),
            theta: solver.theta_at(s0, v0)?,
        })
    }
}
