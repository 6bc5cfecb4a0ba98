use super::{BoundaryCondition, Side};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;

fn boundary_indices(mesher: &dyn FdmMesher, direction: usize, side: Side) -> Result<(Vec<usize>, Real)> {
    let layout = mesher.layout();
    ensure!(
        direction < layout.dimensions(),
        "boundary direction {direction} outside a {}-dimensional mesh",
        layout.dimensions()
    );
    let edge = match side {
        Side::Lower => 0,
        Side::Upper => layout.dim()[direction] - 1,
    };
    let mut indices = Vec::new();
    let mut location = None;
    for iter in layout.iter() {
        if iter.coordinates()[direction] == edge {
            location.get_or_insert_with(|| mesher.location(&iter, direction));
            indices.push(iter.index());
        }
    }
    let location = location.ok_or_else(|| ql_core::Error::Precondition("empty boundary".into()))?;
    Ok((indices, location))
}

/// Fixed value on one face of the mesh.
#[derive(Debug, Clone)]
pub struct FdmDirichletBoundary {
    direction: usize,
    side: Side,
    location: Real,
    value: Real,
    indices: Arc<Vec<usize>>,
}

impl FdmDirichletBoundary {
    /// Boundary holding `value` on the `side` face of `direction`.
    pub fn new(mesher: &dyn FdmMesher, value: Real, direction: usize, side: Side) -> Result<Self> {
        let (indices, location) = boundary_indices(mesher, direction, side)?;
        Ok(Self {
            direction,
            side,
            location,
            value,
            indices: Arc::new(indices),
        })
    }

    /// Direction the boundary is normal to.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Face of the mesh.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Coordinate of the boundary along its direction.
    pub fn location(&self) -> Real {
        self.location
    }

    /// Lowest coordinate inside the boundary (`-∞` for an upper boundary).
    pub fn lower_bound(&self) -> Real {
        match self.side {
            Side::Lower => self.location,
            Side::Upper => Real::NEG_INFINITY,
        }
    }

    /// Highest coordinate inside the boundary (`+∞` for a lower boundary).
    pub fn upper_bound(&self) -> Real {
        match self.side {
            Side::Lower => Real::INFINITY,
            Side::Upper => self.location,
        }
    }

    /// The boundary value.
    pub fn value_on_boundary(&self) -> Real {
        self.value
    }

    /// Flat indices of the boundary points.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// `value_on_boundary` if `x` lies beyond the boundary, else `value`.
    pub fn apply_outside(&self, x: Real, value: Real) -> Real {
        if x < self.lower_bound() || x > self.upper_bound() {
            self.value
        } else {
            value
        }
    }

    pub(crate) fn set_value(&mut self, value: Real) {
        self.value = value;
    }

    fn overwrite(&self, a: &mut Array) -> Result<()> {
        for &i in self.indices.iter() {
            ensure!(i < a.size(), "boundary index {i} outside an array of size {}", a.size());
            a[i] = self.value;
        }
        Ok(())
    }
}

impl BoundaryCondition for FdmDirichletBoundary {
    fn apply_after_applying(&self, a: &mut Array) -> Result<()> {
        self.overwrite(a)
    }

    fn apply_after_solving(&self, a: &mut Array) -> Result<()> {
        self.overwrite(a)
    }

    fn as_dirichlet(&self) -> Option<&FdmDirichletBoundary> {
        Some(self)
    }
}

/// Boundary values as a function of time.
#[derive(Clone)]
pub enum BoundaryValueFn {
    /// The same value on every boundary point.
    Uniform(Arc<dyn Fn(Time) -> Real + Send + Sync>),
    /// A value per boundary point, given its flat index.
    PerPoint(Arc<dyn Fn(Time, usize) -> Real + Send + Sync>),
}

impl std::fmt::Debug for BoundaryValueFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform(_) => f.write_str("Uniform(..)"),
            Self::PerPoint(_) => f.write_str("PerPoint(..)"),
        }
    }
}

/// Dirichlet boundary with time-dependent values.
#[derive(Debug)]
pub struct FdmTimeDepDirichletBoundary {
    direction: usize,
    side: Side,
    indices: Vec<usize>,
    value_fn: BoundaryValueFn,
    values: Vec<Real>,
}

impl FdmTimeDepDirichletBoundary {
    /// Boundary on the `side` face of `direction`; values are evaluated
    /// on each [`set_time`](BoundaryCondition::set_time).
    pub fn new(mesher: &dyn FdmMesher, value_fn: BoundaryValueFn, direction: usize, side: Side) -> Result<Self> {
        let (indices, _) = boundary_indices(mesher, direction, side)?;
        let values = vec![0.0; indices.len()];
        Ok(Self {
            direction,
            side,
            indices,
            value_fn,
            values,
        })
    }

    /// Direction the boundary is normal to.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Face of the mesh.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Values set by the last `set_time`.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    fn overwrite(&self, a: &mut Array) -> Result<()> {
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            ensure!(i < a.size(), "boundary index {i} outside an array of size {}", a.size());
            a[i] = v;
        }
        Ok(())
    }
}

impl BoundaryCondition for FdmTimeDepDirichletBoundary {
    fn set_time(&mut self, t: Time) -> Result<()> {
        match &self.value_fn {
            BoundaryValueFn::Uniform(f) => {
                let v = f(t);
                self.values.iter_mut().for_each(|x| *x = v);
            }
            BoundaryValueFn::PerPoint(f) => {
                for (x, &i) in self.values.iter_mut().zip(&self.indices) {
                    *x = f(t, i);
                }
            }
        }
        Ok(())
    }

    fn apply_after_applying(&self, a: &mut Array) -> Result<()> {
        self.overwrite(a)
    }

    fn apply_after_solving(&self, a: &mut Array) -> Result<()> {
        self.overwrite(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::UniformGridMesher;
    use crate::finite_differences::utilities::FdmLinearOpLayout;

    fn mesher() -> UniformGridMesher {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![4, 3]).unwrap());
        UniformGridMesher::new(layout, &[(0.0, 3.0), (10.0, 12.0)]).unwrap()
    }

    #[test]
    fn overwrites_only_the_boundary_face() {
        let m = mesher();
        let bc = FdmDirichletBoundary::new(&m, 7.0, 1, Side::Upper).unwrap();
        assert_eq!(bc.indices(), &[8, 9, 10, 11]);
        assert_eq!(bc.location(), 12.0);
        let mut a = Array::zeros(12);
        bc.apply_after_solving(&mut a).unwrap();
        assert_eq!(a.iter().filter(|&&v| v == 7.0).count(), 4);
        assert_eq!(a[7], 0.0);
    }

    #[test]
    fn values_beyond_the_boundary_are_replaced() {
        let m = mesher();
        let lower = FdmDirichletBoundary::new(&m, -1.0, 0, Side::Lower).unwrap();
        assert_eq!(lower.apply_outside(-0.5, 4.0), -1.0);
        assert_eq!(lower.apply_outside(0.5, 4.0), 4.0);
    }

    #[test]
    fn time_dependent_values_follow_set_time() {
        let m = mesher();
        let mut bc = FdmTimeDepDirichletBoundary::new(
            &m,
            BoundaryValueFn::PerPoint(Arc::new(|t: Time, i: usize| t + i as Real)),
            0,
            Side::Lower,
        )
        .unwrap();
        bc.set_time(0.5).unwrap();
        assert_eq!(bc.values(), &[0.5, 4.5, 8.5]);
        let mut a = Array::from_element(12, 1.0);
        bc.apply_after_applying(&mut a).unwrap();
        assert_eq!(a[4], 4.5);
        assert_eq!(a[5], 1.0);
    }
}
