//! Solvers: terminal condition, backward rollback and interpolation of
//! the result.
//!
//! The dimension solvers ([`Fdm1DimSolver`], [`Fdm2DimSolver`],
//! [`Fdm3DimSolver`]) run the rollback on construction and interpolate
//! the values at time zero.  A snapshot taken shortly after the valuation
//! time gives theta.  The model solvers wrap them in the natural
//! coordinates of a model (spot instead of log-spot).

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{
    join_conditions, FdmSnapshotCondition, FdmStepConditionComposite, StepCondition,
};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;

mod backward_solver;
mod bates_solver;
mod black_scholes_solver;
mod fdm_1dim_solver;
mod fdm_2dim_solver;
mod fdm_3dim_solver;
mod heston_hull_white_solver;
mod heston_solver;
mod solver_desc;

pub use backward_solver::FdmBackwardSolver;
pub use bates_solver::FdmBatesSolver;
pub use black_scholes_solver::FdmBlackScholesSolver;
pub use fdm_1dim_solver::Fdm1DimSolver;
pub use fdm_2dim_solver::Fdm2DimSolver;
pub use fdm_3dim_solver::Fdm3DimSolver;
pub use heston_hull_white_solver::FdmHestonHullWhiteSolver;
pub use heston_solver::FdmHestonSolver;
pub use solver_desc::FdmSolverDesc;

/// Values at time zero and, if available, at the theta snapshot time.
#[derive(Debug)]
struct Rollback {
    values: Array,
    theta: Option<(Time, Array)>,
}

/// Terminal values, rollback to zero and theta snapshot.
fn roll_back(desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc, op: Arc<dyn FdmLinearOpComposite>) -> Result<Rollback> {
    let FdmSolverDesc {
        mesher,
        bc_set,
        condition,
        calculator,
        maturity,
        time_steps,
        damping_steps,
    } = desc;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    ensure!(
        op.size() == mesher.layout().size(),
        "operator of size {} on a mesh of size {}",
        op.size(),
        mesher.layout().size()
    );

    let first_stop = condition.stopping_times().first().copied();
    let theta_time = 0.99 * (1.0 / 365.0_f64).min(first_stop.unwrap_or(maturity));
    let snapshot = Arc::new(FdmSnapshotCondition::new(theta_time));
    let snapshot_condition: Arc<dyn StepCondition> = snapshot.clone();
    let conditions = join_conditions(
        &FdmStepConditionComposite::from_conditions(vec![snapshot_condition]),
        &condition,
    );

    let layout = mesher.layout();
    let mut values = Array::zeros(layout.size());
    for iter in layout.iter() {
        values[iter.index()] = calculator.avg_inner_value(&iter, maturity)?;
    }

    FdmBackwardSolver::new(op, bc_set, conditions, scheme_desc).rollback(
        &mut values,
        maturity,
        0.0,
        time_steps,
        damping_steps,
    )?;

    let theta = match first_stop {
        Some(t) if t == 0.0 => None,
        _ => snapshot.values().map(|v| (theta_time, v)),
    };
    Ok(Rollback { values, theta })
}

/// Log of a quoted spot; the model solvers only quote strictly positive
/// spots.
fn log_spot(s: Real) -> Result<Real> {
    ensure!(s > 0.0 && s.is_finite(), "spot must be positive and finite, got {s}");
    Ok(s.ln())
}

/// Locations of the grid lines along `direction`.
fn axis_locations(mesher: &dyn FdmMesher, direction: usize) -> Vec<Real> {
    let layout = mesher.layout();
    layout
        .iter()
        .step_by(layout.spacing()[direction])
        .take(layout.dim()[direction])
        .map(|it| mesher.location(&it, direction))
        .collect()
}
