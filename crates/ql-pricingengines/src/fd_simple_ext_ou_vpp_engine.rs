//! Finite-difference engine for a virtual power plant on an extended
//! Ornstein-Uhlenbeck log power price with a deterministic fuel curve.
//!
//! The grid is the log power price times the plant state; the dispatch
//! decision of every hour is taken by the start-limit step condition and
//! the diffusion acts on the price direction only.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{PricingEngine, PricingResults, VppOptionArguments};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    Fdm1dMesher, FdmMesher, FdmMesherComposite, FdmSimpleProcess1dMesher,
};
use ql_methods::finite_differences::operators::{FdmLinearOpComposite, FdmOrnsteinUhlenbeckOp};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{Fdm2DimSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::{
    vpp_state_count, FdmStepConditionComposite, FdmVppStartLimitStepCondition, StepCondition,
};
use ql_methods::finite_differences::utilities::{
    FdmInnerValueCalculator, FdmLinearOpIterator, FdmZeroInnerValue,
};
use ql_processes::{ExtendedOrnsteinUhlenbeckProcess, StochasticProcess1D};
use ql_termstructures::YieldTermStructure;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Deterministic fuel price curve.
pub type FuelCurve = Arc<dyn Fn(Time) -> Real + Send + Sync>;

/// Grid and scheme of [`FdSimpleExtOUVppEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdVppGrid {
    /// Number of time steps.
    pub t_grid: usize,
    /// Number of log power price points.
    pub x_grid: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
}

impl Default for FdVppGrid {
    fn default() -> Self {
        Self {
            t_grid: 50,
            x_grid: 100,
            scheme: FdmSchemeDesc::douglas(),
        }
    }
}

/// Piecewise-constant shape lookup: the first entry at or after `t`, or
/// the last one.
fn shape_at(shape: Option<&[(Time, Real)]>, t: Time) -> Real {
    let Some(shape) = shape else {
        return 0.0;
    };
    let cutoff = t - f64::EPSILON.sqrt();
    shape
        .iter()
        .find(|(ts, _)| *ts >= cutoff)
        .or(shape.last())
        .map_or(0.0, |&(_, f)| f)
}

struct FuelPrice {
    fuel: FuelCurve,
}

impl fmt::Debug for FuelPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuelPrice").finish_non_exhaustive()
    }
}

impl FdmInnerValueCalculator for FuelPrice {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, t: Time) -> Real {
        (self.fuel)(t)
    }
}

/// Power price `exp(f(t) + x)` minus heat rate times fuel price.
struct SparkSpreadPrice {
    mesher: Arc<dyn FdmMesher>,
    shape: Option<Vec<(Time, Real)>>,
    fuel: FuelCurve,
    heat_rate: Real,
}

impl fmt::Debug for SparkSpreadPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparkSpreadPrice")
            .field("heat_rate", &self.heat_rate)
            .finish_non_exhaustive()
    }
}

impl FdmInnerValueCalculator for SparkSpreadPrice {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let x = self.mesher.location(iter, 0);
        let power = (shape_at(self.shape.as_deref(), t) + x).exp();
        power - self.heat_rate * (self.fuel)(t)
    }
}

/// Finite-difference engine for [`VppOptionArguments`] with a one-factor
/// power price.
#[derive(Clone)]
pub struct FdSimpleExtOUVppEngine {
    process: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    r_ts: Arc<dyn YieldTermStructure>,
    fuel: FuelCurve,
    shape: Option<Vec<(Time, Real)>>,
    grid: FdVppGrid,
}

impl fmt::Debug for FdSimpleExtOUVppEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdSimpleExtOUVppEngine")
            .field("process", &self.process)
            .field("shape", &self.shape)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl FdSimpleExtOUVppEngine {
    /// Engine on the default grid; `process` drives the log power price.
    pub fn new(process: Arc<ExtendedOrnsteinUhlenbeckProcess>, r_ts: Arc<dyn YieldTermStructure>, fuel: FuelCurve) -> Self {
        Self {
            process,
            r_ts,
            fuel,
            shape: None,
            grid: FdVppGrid::default(),
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdVppGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Add a deterministic log power price shape, as `(time, value)` pairs
    /// sorted by time.
    pub fn with_shape(mut self, shape: Vec<(Time, Real)>) -> Self {
        self.shape = Some(shape);
        self
    }
}

impl PricingEngine<VppOptionArguments> for FdSimpleExtOUVppEngine {
    fn calculate(&self, args: &VppOptionArguments) -> Result<PricingResults> {
        let params = args.params;
        params.validate()?;
        let maturity = args.exercise.last_time();
        ensure!(maturity > 0.0, "contract expired: last exercise {maturity}");

        let n_states = vpp_state_count(params.t_min_up, params.t_min_down, args.n_starts);
        let x = FdmSimpleProcess1dMesher::build(self.grid.x_grid, self.process.as_ref(), maturity)?;
        let states = Fdm1dMesher::uniform(0.0, (n_states - 1) as Real, n_states)?;
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::new(vec![Arc::new(x), Arc::new(states)])?);

        let fuel_price: Arc<dyn FdmInnerValueCalculator> = Arc::new(FuelPrice {
            fuel: Arc::clone(&self.fuel),
        });
        let spark_spread: Arc<dyn FdmInnerValueCalculator> = Arc::new(SparkSpreadPrice {
            mesher: Arc::clone(&mesher),
            shape: self.shape.clone(),
            fuel: Arc::clone(&self.fuel),
            heat_rate: params.heat_rate,
        });
        let dispatch: Arc<dyn StepCondition> = Arc::new(FdmVppStartLimitStepCondition::new(
            params,
            args.n_starts,
            args.exercise.times().to_vec(),
            Arc::clone(&mesher),
            fuel_price,
            spark_spread,
        )?);
        let condition = FdmStepConditionComposite::from_conditions(vec![dispatch]);

        let diffusion: Arc<dyn StochasticProcess1D> = self.process.clone();
        let op: Arc<dyn FdmLinearOpComposite> = Arc::new(FdmOrnsteinUhlenbeckOp::new(
            mesher.as_ref(),
            diffusion,
            Arc::clone(&self.r_ts),
            0,
        )?);

        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            n_states,
            hours = args.exercise.times().len(),
            "assembling power plant solver"
        );
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            calculator: Arc::new(FdmZeroInnerValue),
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: 0,
        };
        let solver = Fdm2DimSolver::new(desc, self.grid.scheme, op)?;

        // the plant starts switched off and free to start
        let value = solver.interpolate_at(self.process.x0(), (n_states - 1) as Real)?;
        Ok(PricingResults::from_value(value))
    }
}
