//! Finite-difference engine for single-barrier options under Black-Scholes.
//!
//! Knock-out options are solved on a log-spot mesh cut at the barrier,
//! which carries a Dirichlet condition equal to the rebate (paid on touch).
//! Knock-in options are priced by in-out parity: the vanilla value minus
//! the knock-out value without rebate, plus the value of the rebate paid at
//! expiry if the barrier was never touched.
//!
//! With discrete monitoring the mesh is not cut; the barrier is enforced by
//! a knock-out step condition at the monitoring times instead.

use crate::fd_black_scholes_vanilla_engine::{FdBlackScholesGrid, FdBlackScholesVanillaEngine};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, CashOrNothingPayoff, DividendSchedule, Exercise, ExerciseType,
    OptionType, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments,
};
use ql_methods::finite_differences::boundary_conditions::{
    FdmBoundaryConditionSet, FdmDirichletBoundary, FdmDiscountDirichletBoundary, Side,
};
use ql_methods::finite_differences::operators::FdmBlackScholesOpConfig;
use ql_methods::finite_differences::step_conditions::{FdmKnockOutCondition, FdmStepConditionComposite, StepCondition};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;
use tracing::debug;

/// Finite-difference Black-Scholes engine for barrier options.
#[derive(Debug, Clone)]
pub struct FdBlackScholesBarrierEngine {
    vanilla: FdBlackScholesVanillaEngine,
    monitoring_times: Option<Vec<Time>>,
}

impl FdBlackScholesBarrierEngine {
    /// Continuously monitored barrier on the default grid.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            vanilla: FdBlackScholesVanillaEngine::new(process),
            monitoring_times: None,
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdBlackScholesGrid) -> Self {
        self.vanilla = self.vanilla.with_grid(grid);
        self
    }

    /// Pay the given cash dividends.
    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.vanilla = self.vanilla.with_dividends(dividends);
        self
    }

    /// Price with the process' local volatility surface.
    pub fn with_local_vol(mut self, config: FdmBlackScholesOpConfig) -> Self {
        self.vanilla = self.vanilla.with_local_vol(config);
        self
    }

    /// Monitor the barrier only at the given times.
    pub fn with_discrete_monitoring(mut self, times: Vec<Time>) -> Self {
        self.monitoring_times = Some(times);
        self
    }

    /// Knock-out value of `payoff` with `rebate` paid on touch.
    ///
    /// `expiry_rebate` is the amount `payoff` pays everywhere at expiry;
    /// the boundary opposite the barrier then carries its discounted value.
    #[allow(clippy::too_many_arguments)]
    fn knock_out(
        &self,
        payoff: Arc<dyn StrikedPayoff>,
        mesh_strike: Real,
        exercise: &Exercise,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
        expiry_rebate: Option<Real>,
    ) -> Result<PricingResults> {
        let maturity = exercise.last_time();
        let log_barrier = barrier.ln();
        let (lower, upper) = match barrier_type.knock_out_counterpart() {
            BarrierType::DownOut => (Some(log_barrier), None),
            _ => (None, Some(log_barrier)),
        };
        let (barrier_side, far_side) = if lower.is_some() {
            (Side::Lower, Side::Upper)
        } else {
            (Side::Upper, Side::Lower)
        };

        match &self.monitoring_times {
            None => {
                let mesher = self.vanilla.mesher(mesh_strike, maturity, lower, upper)?;
                let mut bc_set = FdmBoundaryConditionSet::new()
                    .with(FdmDirichletBoundary::new(mesher.as_ref(), rebate, 0, barrier_side)?);
                if let Some(cash) = expiry_rebate {
                    bc_set.push(FdmDiscountDirichletBoundary::new(
                        mesher.as_ref(),
                        Arc::clone(self.vanilla.process().risk_free_rate()),
                        maturity,
                        cash,
                        0,
                        far_side,
                    )?);
                }
                self.vanilla.solve(payoff, mesh_strike, exercise, mesher, bc_set, None)
            }
            Some(times) => {
                ensure!(
                    times.iter().all(|&t| t <= maturity),
                    "barrier monitoring times must not exceed the maturity {maturity}"
                );
                let mesher = self.vanilla.mesher(mesh_strike, maturity, None, None)?;
                let knock_out: Arc<dyn StepCondition> = Arc::new(FdmKnockOutCondition::new(
                    Arc::clone(&mesher),
                    0,
                    times.clone(),
                    lower,
                    upper,
                    rebate,
                )?);
                let extra = FdmStepConditionComposite::from_conditions(vec![knock_out]);
                self.vanilla.solve(
                    payoff,
                    mesh_strike,
                    exercise,
                    mesher,
                    FdmBoundaryConditionSet::new(),
                    Some(extra),
                )
            }
        }
    }
}

fn combine(a: &PricingResults, b: &PricingResults, sign: Real) -> PricingResults {
    let add = |x: Option<Real>, y: Option<Real>| x.zip(y).map(|(x, y)| x + sign * y);
    PricingResults {
        value: a.value + sign * b.value,
        delta: add(a.delta, b.delta),
        gamma: add(a.gamma, b.gamma),
        theta: add(a.theta, b.theta),
    }
}

impl PricingEngine<BarrierOptionArguments> for FdBlackScholesBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            "only European barrier options are supported"
        );
        ensure!(args.barrier > 0.0, "barrier must be positive, got {}", args.barrier);
        ensure!(args.rebate >= 0.0, "rebate must be non-negative, got {}", args.rebate);
        let spot = self.vanilla.process().spot();
        ensure!(
            !args.barrier_type.triggered(spot, args.barrier),
            "barrier {} already touched by spot {spot}",
            args.barrier
        );

        let strike = args.payoff.strike();
        debug!(
            barrier_type = ?args.barrier_type,
            barrier = args.barrier,
            discrete = self.monitoring_times.is_some(),
            "pricing barrier option"
        );

        if !args.barrier_type.is_knock_in() {
            return self.knock_out(
                Arc::clone(&args.payoff),
                strike,
                &args.exercise,
                args.barrier_type,
                args.barrier,
                args.rebate,
                None,
            );
        }

        let vanilla = self.vanilla.calculate(&VanillaOptionArguments {
            payoff: Arc::clone(&args.payoff),
            exercise: args.exercise.clone(),
        })?;
        let out = self.knock_out(
            Arc::clone(&args.payoff),
            strike,
            &args.exercise,
            args.barrier_type,
            args.barrier,
            0.0,
            None,
        )?;
        let mut results = combine(&vanilla, &out, -1.0);

        if args.rebate > 0.0 {
            let cash: Arc<dyn StrikedPayoff> = Arc::new(CashOrNothingPayoff::new(OptionType::Call, 0.0, args.rebate));
            let untouched = self.knock_out(
                cash,
                strike,
                &args.exercise,
                args.barrier_type,
                args.barrier,
                0.0,
                Some(args.rebate),
            )?;
            results = combine(&results, &untouched, 1.0);
        }
        Ok(results)
    }
}
