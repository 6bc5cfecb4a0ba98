//! Ordering and stopping-time bookkeeping of combined step conditions.

use ql_core::Real;
use ql_instruments::{DividendSchedule, Exercise};
use ql_math::Array;
use ql_methods::finite_differences::meshers::{Fdm1dMesher, FdmMesher, FdmMesherComposite};
use ql_methods::finite_differences::step_conditions::{
    join_conditions, vanilla_composite, FdmKnockOutCondition, FdmSnapshotCondition, FdmStepConditionComposite,
    StepCondition,
};
use ql_methods::finite_differences::utilities::{FdmInnerValueCalculator, FdmZeroInnerValue};
use std::sync::Arc;

fn mesher() -> Arc<dyn FdmMesher> {
    Arc::new(
        FdmMesherComposite::new(vec![Arc::new(
            Fdm1dMesher::uniform(80.0_f64.ln(), 125.0_f64.ln(), 9).unwrap(),
        )])
        .unwrap(),
    )
}

#[test]
fn stopping_times_are_the_sorted_union() {
    let snapshot: Arc<dyn StepCondition> = Arc::new(FdmSnapshotCondition::new(0.5));
    let knock_out: Arc<dyn StepCondition> = Arc::new(
        FdmKnockOutCondition::new(mesher(), 0, vec![1.0, 0.5], None, Some(120.0_f64.ln()), 0.0).unwrap(),
    );
    let composite = FdmStepConditionComposite::from_conditions(vec![snapshot, knock_out]);
    assert_eq!(composite.stopping_times(), &[0.5, 1.0]);
}

#[test]
fn snapshot_before_knock_out_sees_the_unknocked_values() {
    let snapshot = Arc::new(FdmSnapshotCondition::new(0.5));
    let as_condition: Arc<dyn StepCondition> = snapshot.clone();
    let knock_out: Arc<dyn StepCondition> = Arc::new(
        FdmKnockOutCondition::new(mesher(), 0, vec![0.5], None, Some(120.0_f64.ln()), 0.0).unwrap(),
    );
    let first = FdmStepConditionComposite::from_conditions(vec![as_condition]);
    let second = FdmStepConditionComposite::from_conditions(vec![knock_out]);
    let joined = join_conditions(&first, &second);

    let mut a = Array::from_element(9, 1.0);
    joined.apply_to(&mut a, 0.5).unwrap();
    let seen = snapshot.values().unwrap();
    assert_eq!(seen[8], 1.0);
    assert_eq!(a[8], 0.0);
    assert_eq!(a[0], 1.0);
}

#[test]
fn vanilla_composite_collects_dividends_and_exercise_dates() {
    let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmZeroInnerValue);
    let dividends = DividendSchedule::new(&[(0.3, 1.0), (1.5, 1.0), (0.0, 2.0)]).unwrap();
    let exercise = Exercise::bermudan(vec![0.25, 0.5, 1.0]).unwrap();
    let composite = vanilla_composite(&dividends, &exercise, mesher(), calculator, 1.0, 0).unwrap();
    let times: Vec<Real> = composite.stopping_times().to_vec();
    assert_eq!(times, vec![0.25, 0.3, 0.5, 1.0]);
    assert_eq!(composite.conditions().len(), 2);

    let american = Exercise::american(0.0, 1.0).unwrap();
    let composite = vanilla_composite(
        &DividendSchedule::empty(),
        &american,
        mesher(),
        Arc::new(FdmZeroInnerValue),
        1.0,
        0,
    )
    .unwrap();
    assert!(composite.stopping_times().is_empty());
    assert_eq!(composite.conditions().len(), 1);
}
