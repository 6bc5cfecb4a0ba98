use super::{merge_times, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{ensure, errors::Result, Time};
use ql_math::{close_enough, Array};
use std::sync::Arc;

/// Early exercise at a discrete set of times.
#[derive(Debug, Clone)]
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmBermudanStepCondition {
    /// Exercise at `exercise_times`, which must be non-negative.
    pub fn new(
        exercise_times: Vec<Time>,
        mesher: Arc<dyn FdmMesher>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Result<Self> {
        ensure!(!exercise_times.is_empty(), "bermudan exercise needs at least one date");
        ensure!(
            exercise_times.iter().all(|&t| t >= 0.0 && t.is_finite()),
            "exercise times must be finite and non-negative"
        );
        Ok(Self {
            exercise_times: merge_times(exercise_times),
            mesher,
            calculator,
        })
    }

    /// Sorted exercise times.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmBermudanStepCondition {
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
            let exercise = self.calculator.inner_value(&iter, t);
            let v = &mut a[iter.index()];
            *v = v.max(exercise);
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.exercise_times.clone()
    }
}
