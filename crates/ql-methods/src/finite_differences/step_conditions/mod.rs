//! Step conditions: adjustments of the solution array between scheme
//! steps (early exercise, dividends, discrete barriers, snapshots,
//! operational constraints).

use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{errors::Result, Real, Time};
use ql_instruments::{DividendSchedule, Exercise, ExerciseType};
use ql_math::{close_enough, Array};
use std::sync::Arc;

mod american;
mod bermudan;
mod dividend_handler;
mod knock_out;
mod snapshot;
mod vpp;

pub use american::FdmAmericanStepCondition;
pub use bermudan::FdmBermudanStepCondition;
pub use dividend_handler::FdmDividendHandler;
pub use knock_out::FdmKnockOutCondition;
pub use snapshot::FdmSnapshotCondition;
pub use vpp::{vpp_state_count, FdmVppStartLimitStepCondition};

/// An adjustment of the solution array at given times.
pub trait StepCondition: std::fmt::Debug + Send + Sync {
    /// Adjust `a` at time `t`.
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()>;

    /// Times at which the backward solver must stop for this condition.
    fn stopping_times(&self) -> Vec<Time> {
        Vec::new()
    }
}

/// Sorted union of time lists, merging times that are close enough.
fn merge_times<I: IntoIterator<Item = Time>>(times: I) -> Vec<Time> {
    let mut all: Vec<Time> = times.into_iter().collect();
    all.sort_by(|a, b| a.total_cmp(b));
    all.dedup_by(|b, a| close_enough(*a, *b));
    all
}

/// Ordered list of conditions sharing one set of stopping times.
#[derive(Debug, Clone, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Arc<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// Composite from explicit stopping-time lists and the conditions,
    /// applied in the given order.
    pub fn new(stopping_times: Vec<Vec<Time>>, conditions: Vec<Arc<dyn StepCondition>>) -> Self {
        Self {
            stopping_times: merge_times(stopping_times.into_iter().flatten()),
            conditions,
        }
    }

    /// Composite whose stopping times are those the conditions report.
    pub fn from_conditions(conditions: Vec<Arc<dyn StepCondition>>) -> Self {
        let times = conditions.iter().map(|c| c.stopping_times()).collect();
        Self::new(times, conditions)
    }

    /// Sorted, duplicate-free stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The conditions in application order.
    pub fn conditions(&self) -> &[Arc<dyn StepCondition>] {
        &self.conditions
    }

    /// `true` without conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.apply_to(a, t))
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.stopping_times.clone()
    }
}

/// `c1` followed by `c2`.
pub fn join_conditions(
    c1: &FdmStepConditionComposite,
    c2: &FdmStepConditionComposite,
) -> FdmStepConditionComposite {
    let stopping_times = vec![c1.stopping_times.clone(), c2.stopping_times.clone()];
    let conditions: Vec<Arc<dyn StepCondition>> = vec![Arc::new(c1.clone()), Arc::new(c2.clone())];
    FdmStepConditionComposite::new(stopping_times, conditions)
}

/// Dividend handling plus early exercise for a vanilla option.
///
/// Dividends outside `(0, maturity]` are ignored.  American exercise is
/// applied on every step, Bermudan exercise at the exercise times.
pub fn vanilla_composite(
    dividends: &DividendSchedule,
    exercise: &Exercise,
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    maturity: Time,
    equity_direction: usize,
) -> Result<FdmStepConditionComposite> {
    let mut stopping_times = Vec::new();
    let mut conditions: Vec<Arc<dyn StepCondition>> = Vec::new();

    let relevant: Vec<(Time, Real)> = dividends
        .dividends()
        .iter()
        .filter(|d| d.time > 0.0 && d.time <= maturity)
        .map(|d| (d.time, d.amount))
        .collect();
    if !relevant.is_empty() {
        let handler = FdmDividendHandler::new(&relevant, Arc::clone(&mesher), equity_direction)?;
        stopping_times.push(handler.dividend_times().to_vec());
        conditions.push(Arc::new(handler));
    }

    match exercise.exercise_type() {
        ExerciseType::American => {
            conditions.push(Arc::new(FdmAmericanStepCondition::new(mesher, calculator)));
        }
        ExerciseType::Bermudan => {
            let bermudan = FdmBermudanStepCondition::new(exercise.times().to_vec(), mesher, calculator)?;
            stopping_times.push(bermudan.exercise_times().to_vec());
            conditions.push(Arc::new(bermudan));
        }
        ExerciseType::European => {}
    }

    Ok(FdmStepConditionComposite::new(stopping_times, conditions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Recorder {
        times: Vec<Time>,
        tag: Real,
        log: Arc<Mutex<Vec<Real>>>,
    }

    impl StepCondition for Recorder {
        fn apply_to(&self, a: &mut Array, _t: Time) -> Result<()> {
            self.log.lock().unwrap().push(self.tag);
            a[0] = a[0] * 10.0 + self.tag;
            Ok(())
        }

        fn stopping_times(&self) -> Vec<Time> {
            self.times.clone()
        }
    }

    #[test]
    fn stopping_times_are_sorted_and_deduplicated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let c1: Arc<dyn StepCondition> = Arc::new(Recorder {
            times: vec![0.5],
            tag: 1.0,
            log: log.clone(),
        });
        let c2: Arc<dyn StepCondition> = Arc::new(Recorder {
            times: vec![1.0, 0.5],
            tag: 2.0,
            log: log.clone(),
        });
        let composite = FdmStepConditionComposite::from_conditions(vec![c1, c2]);
        assert_eq!(composite.stopping_times(), &[0.5, 1.0]);

        let mut a = Array::zeros(1);
        composite.apply_to(&mut a, 0.5).unwrap();
        assert_eq!(a[0], 12.0);
        assert_eq!(*log.lock().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn joined_conditions_keep_their_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let c3: Arc<dyn StepCondition> = Arc::new(Recorder {
            times: vec![0.25],
            tag: 3.0,
            log: log.clone(),
        });
        let c4: Arc<dyn StepCondition> = Arc::new(Recorder {
            times: vec![0.75, 0.25 + 1e-16],
            tag: 4.0,
            log: log.clone(),
        });
        let first = FdmStepConditionComposite::from_conditions(vec![c3]);
        let second = FdmStepConditionComposite::from_conditions(vec![c4]);
        let joined = join_conditions(&first, &second);
        assert_eq!(joined.stopping_times().len(), 2);
        let mut a = Array::zeros(1);
        joined.apply_to(&mut a, 0.25).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![3.0, 4.0]);
    }
}
