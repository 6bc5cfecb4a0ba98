//! Finite-difference engine for vanilla options under Black-Scholes.
//!
//! European, Bermudan and American exercise, discrete cash dividends and
//! (optionally) a local volatility surface.  The PDE is solved in log-spot
//! on a mesh concentrated at the strike.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{
    DividendSchedule, Exercise, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    FdmBlackScholesMesher, FdmBlackScholesMesherParams, FdmMesher, FdmMesherComposite,
};
use ql_methods::finite_differences::operators::FdmBlackScholesOpConfig;
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmBlackScholesSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::{
    join_conditions, vanilla_composite, FdmStepConditionComposite,
};
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmLogInnerValue};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// Grid and scheme of the one-dimensional Black-Scholes engines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdBlackScholesGrid {
    /// Number of time steps.
    pub t_grid: usize,
    /// Number of log-spot points.
    pub x_grid: usize,
    /// Implicit Euler steps taken first to smooth the payoff.
    pub damping_steps: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
    /// Fall back to the point payoff where the cell average of the payoff
    /// does not converge, instead of failing.
    pub quadrature_fallback: bool,
}

impl Default for FdBlackScholesGrid {
    fn default() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            damping_steps: 0,
            scheme: FdmSchemeDesc::douglas(),
            quadrature_fallback: false,
        }
    }
}

/// Finite-difference Black-Scholes engine for vanilla options.
#[derive(Debug, Clone)]
pub struct FdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    dividends: DividendSchedule,
    grid: FdBlackScholesGrid,
    local_vol: FdmBlackScholesOpConfig,
}

impl FdBlackScholesVanillaEngine {
    /// Engine with the default grid, no dividends and Black volatilities.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            dividends: DividendSchedule::empty(),
            grid: FdBlackScholesGrid::default(),
            local_vol: FdmBlackScholesOpConfig::default(),
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdBlackScholesGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Pay the given cash dividends.
    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.dividends = dividends;
        self
    }

    /// Price with the process' local volatility surface.
    pub fn with_local_vol(mut self, config: FdmBlackScholesOpConfig) -> Self {
        self.local_vol = config;
        self
    }

    pub(crate) fn process(&self) -> &Arc<GeneralizedBlackScholesProcess> {
        &self.process
    }

    /// Log-spot mesh for `strike` and `maturity`, optionally cut at hard
    /// bounds.
    pub(crate) fn mesher(
        &self,
        strike: Real,
        maturity: Time,
        x_min: Option<Real>,
        x_max: Option<Real>,
    ) -> Result<Arc<dyn FdmMesher>> {
        let params = FdmBlackScholesMesherParams {
            x_min_constraint: x_min,
            x_max_constraint: x_max,
            concentration: Some((strike, 0.1)),
            ..FdmBlackScholesMesherParams::default()
        };
        let x = FdmBlackScholesMesher::build(
            self.grid.x_grid,
            &self.process,
            maturity,
            strike,
            &self.dividends,
            &params,
        )?;
        Ok(Arc::new(FdmMesherComposite::new(vec![Arc::new(x)])?))
    }

    /// Solve for `payoff` on `mesher` with the given boundaries; step
    /// conditions come from the dividends and `exercise`, `extra` is run
    /// after them.  `strike` selects the Black volatility.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn solve(
        &self,
        payoff: Arc<dyn StrikedPayoff>,
        strike: Real,
        exercise: &Exercise,
        mesher: Arc<dyn FdmMesher>,
        bc_set: FdmBoundaryConditionSet,
        extra: Option<FdmStepConditionComposite>,
    ) -> Result<PricingResults> {
        let maturity = exercise.last_time();
        ensure!(maturity > 0.0, "option expired: maturity {maturity}");

        let calculator = FdmLogInnerValue::log(payoff, Arc::clone(&mesher), 0);
        let calculator: Arc<dyn FdmInnerValueCalculator> = if self.grid.quadrature_fallback {
            Arc::new(calculator.with_quadrature_fallback())
        } else {
            Arc::new(calculator)
        };
        let mut condition = vanilla_composite(
            &self.dividends,
            exercise,
            Arc::clone(&mesher),
            Arc::clone(&calculator),
            maturity,
            0,
        )?;
        if let Some(extra) = extra {
            condition = join_conditions(&condition, &extra);
        }

        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            scheme = ?self.grid.scheme.scheme_type,
            maturity,
            "assembling Black-Scholes solver"
        );
        let desc = FdmSolverDesc {
            mesher,
            bc_set,
            condition,
            calculator,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        let solver = FdmBlackScholesSolver::new(&self.process, strike, desc, self.grid.scheme, self.local_vol)?;

        let spot = self.process.spot();
        Ok(PricingResults {
            value: solver.value_at(spot)?,
            delta: Some(solver.delta_at(spot)?),
            gamma: Some(solver.gamma_at(spot)?),
            theta: solver.theta_at(spot)?,
        })
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let strike = args.payoff.strike();
        let mesher = self.mesher(strike, args.exercise.last_time(), None, None)?;
        self.solve(
            Arc::clone(&args.payoff),
            strike,
            &args.exercise,
            mesher,
            FdmBoundaryConditionSet::new(),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{OptionType, VanillaOption};
    use ql_termstructures::{BlackConstantVol, FlatForward};

    fn process(spot: Real) -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(
            GeneralizedBlackScholesProcess::new(
                spot,
                Arc::new(FlatForward::new(0.05)),
                Arc::new(FlatForward::new(0.0)),
                Arc::new(BlackConstantVol::new(0.2)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn atm_call_matches_closed_form() {
        let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let engine = FdBlackScholesVanillaEngine::new(process(100.0)).with_grid(FdBlackScholesGrid {
            t_grid: 100,
            x_grid: 200,
            ..FdBlackScholesGrid::default()
        });
        let results = option.price(&engine).unwrap();
        assert_abs_diff_eq!(results.value, 10.4506, epsilon = 2e-2);
        assert_abs_diff_eq!(results.delta.unwrap(), 0.6368, epsilon = 5e-3);
        assert!(results.theta.is_some());
    }

    #[test]
    fn expired_option_is_rejected() {
        let option = VanillaOption::new(
            Arc::new(ql_instruments::PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            Exercise::bermudan(vec![0.0]).unwrap(),
        );
        assert!(option.price(&FdBlackScholesVanillaEngine::new(process(100.0))).is_err());
    }
}
