use super::{BoundaryCondition, FdmDirichletBoundary, Side};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::operators::FdmOperatorWindow;
use ql_core::{errors::Result, Real, Time};
use ql_math::Array;
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Dirichlet boundary whose value is an amount paid at `maturity`,
/// discounted back to the current time: `v·D(T)/D(t)`.
#[derive(Debug, Clone)]
pub struct FdmDiscountDirichletBoundary {
    inner: FdmDirichletBoundary,
    r_ts: Arc<dyn YieldTermStructure>,
    maturity: Time,
    value_at_maturity: Real,
}

impl FdmDiscountDirichletBoundary {
    /// Boundary paying `value_at_maturity` at `maturity`.
    pub fn new(
        mesher: &dyn FdmMesher,
        r_ts: Arc<dyn YieldTermStructure>,
        maturity: Time,
        value_at_maturity: Real,
        direction: usize,
        side: Side,
    ) -> Result<Self> {
        Ok(Self {
            inner: FdmDirichletBoundary::new(mesher, value_at_maturity, direction, side)?,
            r_ts,
            maturity,
            value_at_maturity,
        })
    }
}

impl BoundaryCondition for FdmDiscountDirichletBoundary {
    fn set_time(&mut self, t: Time) -> Result<()> {
        let df = self.r_ts.discount(self.maturity) / self.r_ts.discount(t);
        self.inner.set_value(self.value_at_maturity * df);
        Ok(())
    }

    fn apply_before_applying(&self, op: &mut FdmOperatorWindow) -> Result<()> {
        self.inner.apply_before_applying(op)
    }

    fn apply_after_applying(&self, a: &mut Array) -> Result<()> {
        self.inner.apply_after_applying(a)
    }

    fn apply_after_solving(&self, a: &mut Array) -> Result<()> {
        self.inner.apply_after_solving(a)
    }

    fn as_dirichlet(&self) -> Option<&FdmDirichletBoundary> {
        Some(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};
    use approx::assert_relative_eq;
    use ql_termstructures::FlatForward;

    #[test]
    fn rebate_is_discounted_from_maturity() {
        let m = FdmMesherComposite::new(vec![Arc::new(Fdm1dMesher::uniform(0.0, 1.0, 5).unwrap())]).unwrap();
        let mut bc =
            FdmDiscountDirichletBoundary::new(&m, Arc::new(FlatForward::new(0.05)), 2.0, 3.0, 0, Side::Upper)
                .unwrap();
        bc.set_time(0.5).unwrap();
        let mut a = Array::zeros(5);
        bc.apply_after_solving(&mut a).unwrap();
        assert_relative_eq!(a[4], 3.0 * (-0.05_f64 * 1.5).exp(), epsilon = 1e-12);
        assert_eq!(a[3], 0.0);
    }
}
