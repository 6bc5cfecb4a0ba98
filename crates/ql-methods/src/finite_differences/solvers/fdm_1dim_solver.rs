use super::{axis_locations, roll_back, FdmSolverDesc};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, Real};
use ql_math::interpolations::{CubicNaturalSpline, Interpolation1D};
use ql_math::Array;
use std::sync::Arc;

/// Solver on a one-dimensional mesh, interpolating with a natural cubic
/// spline.
#[derive(Debug)]
pub struct Fdm1DimSolver {
    x: Vec<Real>,
    values: Array,
    interpolation: CubicNaturalSpline,
    theta: Option<(Real, CubicNaturalSpline)>,
}

impl Fdm1DimSolver {
    /// Run the rollback described by `desc` with the given scheme and
    /// operator.
    pub fn new(desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc, op: Arc<dyn FdmLinearOpComposite>) -> Result<Self> {
        ensure!(
            desc.mesher.layout().dimensions() == 1,
            "a one-dimensional solver needs a one-dimensional mesh"
        );
        let x = axis_locations(desc.mesher.as_ref(), 0);
        let rollback = roll_back(desc, scheme_desc, op)?;
        let interpolation = CubicNaturalSpline::new(&x, rollback.values.as_slice())?;
        let theta = rollback
            .theta
            .map(|(t, v)| CubicNaturalSpline::new(&x, v.as_slice()).map(|s| (t, s)))
            .transpose()?;
        Ok(Self {
            x,
            values: rollback.values,
            interpolation,
            theta,
        })
    }

    /// Grid locations.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// Values at time zero on the grid.
    pub fn values(&self) -> &Array {
        &self.values
    }

    /// Value at `x`.
    pub fn interpolate_at(&self, x: Real) -> Real {
        self.interpolation.value(x)
    }

    /// Time decay at `x`; `None` when the rollback had a stopping time at
    /// zero.
    pub fn theta_at(&self, x: Real) -> Option<Real> {
        self.theta
            .as_ref()
            .map(|(t, s)| (s.value(x) - self.interpolation.value(x)) / t)
    }

    /// First derivative in the mesh coordinate.
    pub fn derivative_x(&self, x: Real) -> Real {
        self.interpolation.derivative(x)
    }

    /// Second derivative in the mesh coordinate.
    pub fn derivative_xx(&self, x: Real) -> Real {
        self.interpolation.second_derivative(x)
    }
}
