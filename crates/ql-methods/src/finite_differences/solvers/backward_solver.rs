//! Backward time loop from maturity to the valuation time.

use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType};
use crate::finite_differences::step_conditions::{FdmStepConditionComposite, StepCondition};
use ql_core::{ensure, errors::Result, Time};
use ql_math::{close_enough, Array};
use std::sync::Arc;
use tracing::debug;

/// Rolls a solution array back in time, stopping at every stopping time
/// of the step conditions.
#[derive(Debug)]
pub struct FdmBackwardSolver {
    op: Arc<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    condition: FdmStepConditionComposite,
    scheme_desc: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// Solver for `op` with the given boundaries, conditions and scheme.
    pub fn new(
        op: Arc<dyn FdmLinearOpComposite>,
        bc_set: FdmBoundaryConditionSet,
        condition: FdmStepConditionComposite,
        scheme_desc: FdmSchemeDesc,
    ) -> Self {
        Self {
            op,
            bc_set,
            condition,
            scheme_desc,
        }
    }

    /// The step conditions.
    pub fn condition(&self) -> &FdmStepConditionComposite {
        &self.condition
    }

    /// Roll `rhs` back from `from` to `to` in `steps` steps.
    ///
    /// With `damping_steps > 0` the first part of the interval,
    /// `damping_steps / (steps + damping_steps)` of it, is covered by
    /// implicit Euler steps to smooth a non-smooth terminal condition.
    pub fn rollback(
        &mut self,
        rhs: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        damping_steps: usize,
    ) -> Result<()> {
        ensure!(from > to && to >= 0.0, "cannot roll back from {from} to {to}");
        ensure!(steps > 0, "at least one time step is required");
        ensure!(
            rhs.size() == self.op.size(),
            "array of size {} for an operator of size {}",
            rhs.size(),
            self.op.size()
        );
        if let Some(&t) = self
            .condition
            .stopping_times()
            .iter()
            .find(|&&t| t < 0.0 || (t > from && !close_enough(t, from)))
        {
            return Err(ql_core::Error::Precondition(format!(
                "stopping time {t} outside [0, {from}]"
            )));
        }

        if self
            .condition
            .stopping_times()
            .last()
            .is_some_and(|&t| close_enough(t, from))
        {
            self.condition.apply_to(rhs, from)?;
        }

        let delta_t = from - to;
        let all_steps = (steps + damping_steps) as f64;
        let damping_to = from - delta_t * damping_steps as f64 / all_steps;

        let mut start = from;
        if damping_steps > 0 && self.scheme_desc.scheme_type != FdmSchemeType::ImplicitEuler {
            let bc_set = std::mem::take(&mut self.bc_set);
            let mut implicit = FdmScheme::new(FdmSchemeDesc::implicit_euler(), Arc::clone(&self.op), bc_set);
            let damped = sweep(&mut implicit, &self.condition, rhs, from, damping_to, damping_steps);
            self.bc_set = implicit.into_boundary_conditions();
            damped?;
            start = damping_to;
        }
        let main_steps = if start == from { steps + damping_steps } else { steps };

        let bc_set = std::mem::take(&mut self.bc_set);
        let mut scheme = FdmScheme::new(self.scheme_desc, Arc::clone(&self.op), bc_set);
        let result = sweep(&mut scheme, &self.condition, rhs, start, to, main_steps);
        self.bc_set = scheme.into_boundary_conditions();
        result
    }
}

/// Step from `from` to `to`, splitting the interval at the stopping times
/// and giving each piece a share of `steps` proportional to its length.
fn sweep(
    scheme: &mut FdmScheme,
    condition: &FdmStepConditionComposite,
    rhs: &mut Array,
    from: Time,
    to: Time,
    steps: usize,
) -> Result<()> {
    let mut knots = vec![from];
    knots.extend(
        condition
            .stopping_times()
            .iter()
            .rev()
            .copied()
            .filter(|&t| t < from && t > to && !close_enough(t, from) && !close_enough(t, to)),
    );
    knots.push(to);

    let total = from - to;
    for w in knots.windows(2) {
        let (hi, lo) = (w[0], w[1]);
        let n = ((steps as f64 * (hi - lo) / total).round() as usize).max(1);
        let dt = (hi - lo) / n as f64;
        debug!(from = hi, to = lo, steps = n, dt, "backward sweep interval");

        scheme.set_step(dt);
        let mut t = hi;
        for i in 0..n {
            let next = if i + 1 == n { lo } else { t - dt };
            scheme.step(rhs, t)?;
            condition.apply_to(rhs, next)?;
            t = next;
        }
    }
    Ok(())
}
