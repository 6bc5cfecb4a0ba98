use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmInnerValueCalculator;
use ql_core::{ensure, errors::Result, Time};
use ql_math::Array;
use std::sync::Arc;

/// Early exercise at every step: `a = max(a, exercise value)`.
#[derive(Debug, Clone)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Exercise against `calculator` on `mesher`.
    pub fn new(mesher: Arc<dyn FdmMesher>, calculator: Arc<dyn FdmInnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
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
            if exercise > *v {
                *v = exercise;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};
    use crate::finite_differences::utilities::FdmPlainInnerValue;
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    #[test]
    fn exercise_value_is_a_floor() {
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::new(vec![Arc::new(Fdm1dMesher::uniform(80.0, 120.0, 5).unwrap())]).unwrap());
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let calc = Arc::new(FdmPlainInnerValue::plain(payoff, mesher.clone(), 0));
        let cond = FdmAmericanStepCondition::new(mesher, calc);
        let mut a = Array::from_vec(vec![15.0, 12.0, 3.0, 0.5, 0.1]);
        cond.apply_to(&mut a, 0.5).unwrap();
        assert_eq!(a.as_slice(), &[20.0, 12.0, 3.0, 0.5, 0.1]);
        assert!(cond.stopping_times().is_empty());
    }
}
