//! Dispatch of a gas-fired power plant.
//!
//! The plant state lives on the last mesh direction.  With `up` minimum
//! up hours and `down` minimum down hours a block of `2·up + down` states
//! encodes:
//!
//! * `0 .. up`: running at minimum load, `k` hours after the start,
//! * `up .. 2·up`: the same at maximum load,
//! * `2·up .. 2·up + down`: switched off, the last state being free to
//!   start again.
//!
//! With a start limit there is one block per remaining number of starts;
//! a start moves from block `b` to block `b - 1`.

use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_instruments::VppParams;
use ql_math::{close_enough, Array};
use std::sync::Arc;

/// Number of plant states for the given minimum up/down times and start
/// limit (`None` for unlimited starts).
pub fn vpp_state_count(t_min_up: usize, t_min_down: usize, n_starts: Option<usize>) -> usize {
    let block = 2 * t_min_up + t_min_down;
    match n_starts {
        None => block,
        Some(n) => block * (n + 1),
    }
}

/// Hourly dispatch decision of a power plant with minimum up/down times
/// and an optional limit on the number of starts.
#[derive(Debug, Clone)]
pub struct FdmVppStartLimitStepCondition {
    params: VppParams,
    n_starts: Option<usize>,
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    state_direction: usize,
    fuel_price: Arc<dyn FdmInnerValueCalculator>,
    spark_spread_price: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmVppStartLimitStepCondition {
    /// Condition over `mesher`, whose last direction must hold exactly
    /// [`vpp_state_count`] states.
    ///
    /// `fuel_price` gives the fuel price and `spark_spread_price` the
    /// power price minus heat rate times fuel price at a grid point.
    pub fn new(
        params: VppParams,
        n_starts: Option<usize>,
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        fuel_price: Arc<dyn FdmInnerValueCalculator>,
        spark_spread_price: Arc<dyn FdmInnerValueCalculator>,
    ) -> Result<Self> {
        params.validate()?;
        let layout = mesher.layout();
        let state_direction = layout.dimensions() - 1;
        let expected = vpp_state_count(params.t_min_up, params.t_min_down, n_starts);
        ensure!(
            layout.dim()[state_direction] == expected,
            "state direction has {} points, the plant needs {expected}",
            layout.dim()[state_direction]
        );
        Ok(Self {
            params,
            n_starts,
            exercise_times,
            mesher,
            state_direction,
            fuel_price,
            spark_spread_price,
        })
    }

    fn block_size(&self) -> usize {
        2 * self.params.t_min_up + self.params.t_min_down
    }

    fn hourly_flow(&self, state: usize, spark_spread: Real) -> Real {
        let up = self.params.t_min_up;
        match state % self.block_size() {
            k if k < up => self.params.hourly_margin(self.params.p_min, spark_spread),
            k if k < 2 * up => self.params.hourly_margin(self.params.p_max, spark_spread),
            _ => 0.0,
        }
    }

    /// Best transition from every state, given the values `x` of the next
    /// hour.
    fn change_state(&self, x: &[Real], start_up_cost: Real) -> Vec<Real> {
        let up = self.params.t_min_up;
        let down = self.params.t_min_down;
        let sss = self.block_size();
        let mut r = vec![0.0; x.len()];

        for o in (0..x.len()).step_by(sss) {
            for j in 0..up - 1 {
                let v = x[o + j + 1].max(x[o + up + j + 1]);
                r[o + j] = v;
                r[o + up + j] = v;
            }
            let keep_running = x[o + up - 1].max(x[o + 2 * up - 1]).max(x[o + 2 * up]);
            r[o + up - 1] = keep_running;
            r[o + 2 * up - 1] = keep_running;

            for j in 0..down - 1 {
                r[o + 2 * up + j] = x[o + 2 * up + j + 1];
            }

            let idle = x[o + sss - 1];
            r[o + sss - 1] = match self.n_starts {
                None => idle.max(x[o].max(x[o + up]) - start_up_cost),
                Some(_) if o >= sss => idle.max(x[o - sss].max(x[o - sss + up]) - start_up_cost),
                Some(_) => idle,
            };
        }
        r
    }
}

impl StepCondition for FdmVppStartLimitStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.exercise_times.iter().any(|&e| close_enough(e, t)) {
            return Ok(());
        }
        let layout = self.mesher.layout();
        ensure!(
            a.size() == layout.size(),
            "array size {} does not match the mesh size {}",
            a.size(),
            layout.size()
        );

        for iter in layout.iter() {
            let state = iter.coordinates()[self.state_direction];
            a[iter.index()] += self.hourly_flow(state, self.spark_spread_price.inner_value(&iter, t));
        }

        let n_states = layout.dim()[self.state_direction];
        let stride = layout.spacing()[self.state_direction];
        let mut x = vec![0.0; n_states];
        for iter in layout.iter().filter(|it| it.coordinates()[self.state_direction] == 0) {
            let base = iter.index();
            for (k, v) in x.iter_mut().enumerate() {
                *v = a[base + k * stride];
            }
            let fuel = self.fuel_price.inner_value(&iter, t);
            let r = self.change_state(&x, self.params.start_up_cost(fuel));
            for (k, v) in r.into_iter().enumerate() {
                a[base + k * stride] = v;
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.exercise_times.clone()
    }
}
