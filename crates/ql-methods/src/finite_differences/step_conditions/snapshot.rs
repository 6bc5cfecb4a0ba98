use super::StepCondition;
use ql_core::{errors::Result, Time};
use ql_math::{close_enough, Array};
use std::sync::Mutex;

/// Records the solution array when the rollback passes a given time.
///
/// Used to compute theta from a second time level close to the
/// valuation time.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: Mutex<Option<Array>>,
}

impl FdmSnapshotCondition {
    /// Snapshot at `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: Mutex::new(None),
        }
    }

    /// Snapshot time.
    pub fn t(&self) -> Time {
        self.t
    }

    /// The recorded array, once the rollback has passed `t`.
    pub fn values(&self) -> Option<Array> {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if close_enough(t, self.t) {
            *self.values.lock().unwrap_or_else(|e| e.into_inner()) = Some(a.clone());
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        vec![self.t]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_array_at_its_time() {
        let snap = FdmSnapshotCondition::new(0.01);
        let mut a = Array::from_vec(vec![1.0, 2.0]);
        snap.apply_to(&mut a, 0.5).unwrap();
        assert!(snap.values().is_none());
        snap.apply_to(&mut a, 0.01).unwrap();
        assert_eq!(snap.values().unwrap().as_slice(), &[1.0, 2.0]);
        assert_eq!(snap.stopping_times(), vec![0.01]);
    }
}
