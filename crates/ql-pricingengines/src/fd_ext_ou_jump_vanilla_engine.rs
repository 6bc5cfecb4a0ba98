//! Finite-difference engine for vanilla options on a Kluge spot price
//! `S = exp(f(t) + X + Y)`.
//!
//! `X` is meshed from the quantiles of the extended Ornstein-Uhlenbeck
//! diffusion, `Y` from the approximate stationary law of the jump level.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::{DividendSchedule, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    ExponentialJump1dMesher, FdmMesher, FdmMesherComposite, FdmSimpleProcess1dMesher,
};
use ql_methods::finite_differences::operators::{FdmExtOUJumpOp, FdmLinearOpComposite};
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{Fdm2DimSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::vanilla_composite;
use ql_methods::finite_differences::utilities::{FdmExpExtOUInnerValue, FdmInnerValueCalculator};
use ql_processes::{ExtOUWithJumpsProcess, StochasticProcess1D};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;
use tracing::debug;

/// Grid and scheme of [`FdExtOUJumpVanillaEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdExtOUJumpGrid {
    /// Number of time steps.
    pub t_grid: usize,
    /// Number of points of the diffusion factor.
    pub x_grid: usize,
    /// Number of points of the jump factor.
    pub y_grid: usize,
    /// Implicit Euler steps taken first to smooth the payoff.
    pub damping_steps: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
}

impl Default for FdExtOUJumpGrid {
    fn default() -> Self {
        Self {
            t_grid: 50,
            x_grid: 200,
            y_grid: 50,
            damping_steps: 0,
            scheme: FdmSchemeDesc::hundsdorfer(),
        }
    }
}

/// Finite-difference Kluge engine for vanilla options.
#[derive(Debug, Clone)]
pub struct FdExtOUJumpVanillaEngine {
    process: Arc<ExtOUWithJumpsProcess>,
    r_ts: Arc<dyn YieldTermStructure>,
    shape: Option<Vec<(Time, Real)>>,
    grid: FdExtOUJumpGrid,
}

impl FdExtOUJumpVanillaEngine {
    /// Engine on the default grid, discounting with `r_ts`.
    pub fn new(process: Arc<ExtOUWithJumpsProcess>, r_ts: Arc<dyn YieldTermStructure>) -> Self {
        Self {
            process,
            r_ts,
            shape: None,
            grid: FdExtOUJumpGrid::default(),
        }
    }

    /// Use the given grid and scheme.
    pub fn with_grid(mut self, grid: FdExtOUJumpGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Add the deterministic log-price shape `f`, as `(time, value)` pairs
    /// sorted by time.
    pub fn with_shape(mut self, shape: Vec<(Time, Real)>) -> Self {
        self.shape = Some(shape);
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdExtOUJumpVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.last_time();
        ensure!(maturity > 0.0, "option expired: maturity {maturity}");
        if let Some(shape) = &self.shape {
            ensure!(
                shape.windows(2).all(|w| w[0].0 <= w[1].0),
                "shape must be sorted by time"
            );
        }

        let ou = self.process.ou_process();
        let x = FdmSimpleProcess1dMesher::build(self.grid.x_grid, ou.as_ref(), maturity)?;
        let y = ExponentialJump1dMesher::build(
            self.grid.y_grid,
            self.process.beta(),
            self.process.jump_intensity(),
            self.process.eta(),
        )?;
        let mesher: Arc<dyn FdmMesher> = Arc::new(FdmMesherComposite::new(vec![Arc::new(x), Arc::new(y)])?);

        let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmExpExtOUInnerValue::new(
            Arc::clone(&args.payoff),
            Arc::clone(&mesher),
            self.shape.clone(),
        ));
        let condition = vanilla_composite(
            &DividendSchedule::empty(),
            &args.exercise,
            Arc::clone(&mesher),
            Arc::clone(&calculator),
            maturity,
            0,
        )?;
        let op: Arc<dyn FdmLinearOpComposite> =
            Arc::new(FdmExtOUJumpOp::new(mesher.as_ref(), &self.process, Arc::clone(&self.r_ts))?);

        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            y_grid = self.grid.y_grid,
            scheme = ?self.grid.scheme.scheme_type,
            maturity,
            "assembling Kluge solver"
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
        let solver = Fdm2DimSolver::new(desc, self.grid.scheme, op)?;

        let (x0, y0) = (ou.x0(), self.process.y0());
        Ok(PricingResults {
            value: solver.interpolate_at(x0, y0)?,
            delta: None,
            gamma: None,
            theta: solver.theta_at(x0, y0)?,
        })
    }
}
