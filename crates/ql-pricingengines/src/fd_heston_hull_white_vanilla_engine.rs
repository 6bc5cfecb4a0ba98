//! Finite-difference engine for vanilla options under Heston equity
//! dynamics with Hull-White short rates.
//!
//! Three directions: log-spot, variance and the Hull-White factor `x`
//! (`r = x + φ(t)`).  The factor direction is meshed from the quantiles of
//! the zero-mean Ornstein-Uhlenbeck process with the Hull-White speed and
//! volatility.

use crate::fd_heston_vanilla_engine::SPOT_BUMP;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{DividendSchedule, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    FdmBlackScholesMesher, FdmBlackScholesMesherParams, FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite,
    FdmSimpleProcess1dMesher,
};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmHestonHullWhiteSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::vanilla_composite;
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::{HestonProcess, HullWhiteProcess};
use std::sync::Arc;
use tracing::debug;

/// Grid and scheme of [`FdHestonHullWhiteVanillaEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdHestonHullWhiteGrid {
    /// Number of time steps.
    pub t_grid: usize,
    /// Number of log-spot points.
    pub x_grid: usize,
    /// Number of variance points.
    pub v_grid: usize,
    /// Number of short-rate factor points.
    pub r_grid: usize,
    /// Implicit Euler steps taken first to smooth the payoff.
    pub damping_steps: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
    /// Fall back to the point payoff where the cell average of the payoff
    /// does not converge, instead of failing.
    pub quadrature_fallback: bool,
}

impl Default for FdHestonHullWhiteGrid {
    fn default() -> Self {
        Self {
            t_grid: 50,
            x_grid: 100,
            v_grid: 40,
            r_grid: 20,
            damping_steps: 0,
            scheme: FdmSchemeDesc::hundsdorfer(),
            quadrature_fallback: false,
        }
    }
}

/// Finite-difference Heston-Hull-White engine for vanilla options.
#[derive(Debug, Clone)]
pub struct FdHestonHullWhiteVanillaEngine {
    heston: Arc<HestonProcess>,
    hull_white: Arc<HullWhiteProcess>,
    equity_rate_correlation: Real,
    dividends: DividendSchedule,
    grid: FdHestonHullWhiteGrid,
}

impl FdHestonHullWhiteVanillaEngine {
    /// Engine on the default grid; `equity_rate_correlation` links the
    /// spot and short-rate Brownian motions.
    pub fn new(heston: Arc<HestonProcess>, hull_white: Arc<HullWhiteProcess>, equity_rate_correlation: Real) -> Self {
        Self {
            heston,
            hull_white,
            equity_rate_correlation,
            dividends: DividendSchedule::empty(),
            grid: FdHestonHullWhiteGrid::default(),
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdHestonHullWhiteGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Pay the given cash dividends.
    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.dividends = dividends;
        self
    }

    fn mesher(&self, strike: Real, maturity: Time) -> Result<Arc<dyn FdmMesher>> {
        let variance = FdmHestonVarianceMesher::with_params(
            self.grid.v_grid,
            &self.heston,
            maturity,
            (self.grid.t_grid / 50).max(5),
            1e-4,
            1.0,
        )?;
        let helper = FdmBlackScholesMesher::process_helper(
            self.heston.s0(),
            Arc::clone(self.heston.risk_free_rate()),
            Arc::clone(self.heston.dividend_yield()),
            variance.vola_estimate(),
        )?;
        let params = FdmBlackScholesMesherParams {
            concentration: Some((strike, 0.1)),
            ..FdmBlackScholesMesherParams::default()
        };
        let equity = FdmBlackScholesMesher::build(
            self.grid.x_grid,
            &helper,
            maturity,
            strike,
            &self.dividends,
            &params,
        )?;

        let short_rate = FdmSimpleProcess1dMesher::build(self.grid.r_grid, &self.hull_white.ou_process()?, maturity)?;

        Ok(Arc::new(FdmMesherComposite::new(vec![
            Arc::new(equity),
            Arc::new(variance.into_mesher()),
            Arc::new(short_rate),
        ])?))
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonHullWhiteVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.last_time();
        ensure!(maturity > 0.0, "option expired: maturity {maturity}");

        let mesher = self.mesher(args.payoff.strike(), maturity)?;
        let calculator = FdmLogInnerValue::log(Arc::clone(&args.payoff), Arc::clone(&mesher), 0);
        let calculator: Arc<dyn FdmInnerValueCalculator> = if self.grid.quadrature_fallback {
            Arc::new(calculator.with_quadrature_fallback())
        } else {
            Arc::new(calculator)
        };
        let condition = vanilla_composite(
            &self.dividends,
            &args.exercise,
            Arc::clone(&mesher),
            Arc::clone(&calculator),
            maturity,
            0,
        )?;

        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            v_grid = self.grid.v_grid,
            r_grid = self.grid.r_grid,
            scheme = ?self.grid.scheme.scheme_type,
            "assembling Heston-Hull-White solver"
        );
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            calculator,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmHestonHullWhiteSolver::new(
            &self.heston,
            Arc::clone(&self.hull_white),
            self.equity_rate_correlation,
            desc,
            self.grid.scheme,
        )?;

        let (s0, v0) = (self.heston.s0(), self.heston.v0());
        let bump = SPOT_BUMP * s0;
        Ok(PricingResults {
            value: solver.value_at(s0, v0, 0.0)?,
            delta: Some(solver.delta_at(s0, v0, 0.0, bump)?),
            gamma: Some(solver.gamma_at(s0, v0, 0.0, bump)?),
            theta: solver.theta_at(s0, v0, 0.0)?,
        })
    }
}
