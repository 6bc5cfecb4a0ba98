use super::{merge_times, StepCondition};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::{close_enough, Array};
use std::sync::Arc;

/// Discretely monitored barrier: at each monitoring time every point
/// outside `[lower, upper]` along `direction` is replaced by the rebate.
///
/// Barrier levels are given in mesh coordinates (log-spot for the
/// Black-Scholes meshes).
#[derive(Debug, Clone)]
pub struct FdmKnockOutCondition {
    mesher: Arc<dyn FdmMesher>,
    direction: usize,
    monitoring_times: Vec<Time>,
    lower: Option<Real>,
    upper: Option<Real>,
    rebate: Real,
}

impl FdmKnockOutCondition {
    /// Knock out below `lower` and/or above `upper` at `monitoring_times`.
    pub fn new(
        mesher: Arc<dyn FdmMesher>,
        direction: usize,
        monitoring_times: Vec<Time>,
        lower: Option<Real>,
        upper: Option<Real>,
        rebate: Real,
    ) -> Result<Self> {
        ensure!(
            direction < mesher.layout().dimensions(),
            "knock-out direction {direction} outside the mesh"
        );
        ensure!(
            lower.is_some() || upper.is_some(),
            "a knock-out condition needs at least one barrier"
        );
        if let (Some(l), Some(u)) = (lower, upper) {
            ensure!(l < u, "lower barrier {l} must lie below upper barrier {u}");
        }
        ensure!(
            monitoring_times.iter().all(|&t| t >= 0.0),
            "monitoring times must be non-negative"
        );
        Ok(Self {
            mesher,
            direction,
            monitoring_times: merge_times(monitoring_times),
            lower,
            upper,
            rebate,
        })
    }

    fn knocked_out(&self, x: Real) -> bool {
        self.lower.is_some_and(|l| x < l) || self.upper.is_some_and(|u| x > u)
    }
}

impl StepCondition for FdmKnockOutCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.monitoring_times.iter().any(|&m| close_enough(m, t)) {
            return Ok(());
        }
        for iter in self.mesher.layout().iter() {
            if self.knocked_out(self.mesher.location(&iter, self.direction)) {
                a[iter.index()] = self.rebate;
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.monitoring_times.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};

    #[test]
    fn replaces_values_beyond_the_barrier() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::new(vec![Arc::new(Fdm1dMesher::uniform(0.0, 4.0, 5).unwrap())]).unwrap());
        let cond = FdmKnockOutCondition::new(mesher, 0, vec![0.5], Some(0.5), Some(3.0), 0.25).unwrap();
        let mut a = Array::from_element(5, 1.0);
        cond.apply_to(&mut a, 0.25).unwrap();
        assert_eq!(a.as_slice(), &[1.0; 5]);
        cond.apply_to(&mut a, 0.5).unwrap();
        assert_eq!(a.as_slice(), &[0.25, 1.0, 1.0, 1.0, 0.25]);
    }

    #[test]
    fn needs_a_barrier() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::new(vec![Arc::new(Fdm1dMesher::uniform(0.0, 4.0, 5).unwrap())]).unwrap());
        assert!(FdmKnockOutCondition::new(mesher, 0, vec![0.5], None, None, 0.0).is_err());
    }
}
