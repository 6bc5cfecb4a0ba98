use super::{axis_locations, roll_back, FdmSolverDesc};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, Real};
use ql_math::interpolations::BicubicSpline;
use ql_math::Array;
use std::sync::Arc;

/// Solver on a two-dimensional mesh, interpolating with a bicubic spline.
#[derive(Debug)]
pub struct Fdm2DimSolver {
    x: Vec<Real>,
    y: Vec<Real>,
    values: Array,
    interpolation: BicubicSpline,
    theta: Option<(Real, BicubicSpline)>,
}

impl Fdm2DimSolver {
    /// Run the rollback described by `desc` with the given scheme and
    /// operator.
    pub fn new(desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc, op: Arc<dyn FdmLinearOpComposite>) -> Result<Self> {
        ensure!(
            desc.mesher.layout().dimensions() == 2,
            "a two-dimensional solver needs a two-dimensional mesh"
        );
        let x = axis_locations(desc.mesher.as_ref(), 0);
        let y = axis_locations(desc.mesher.as_ref(), 1);
        let rollback = roll_back(desc, scheme_desc, op)?;
        let interpolation = BicubicSpline::new(&x, &y, rollback.values.as_slice())?;
        let theta = rollback
            .theta
            .map(|(t, v)| BicubicSpline::new(&x, &y, v.as_slice()).map(|s| (t, s)))
            .transpose()?;
        Ok(Self {
            x,
            y,
            values: rollback.values,
            interpolation,
            theta,
        })
    }

    /// Grid locations along direction 0.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// Grid locations along direction 1.
    pub fn y(&self) -> &[Real] {
        &self.y
    }

    /// Values at time zero on the grid.
    pub fn values(&self) -> &Array {
        &self.values
    }

    /// Value at `(x, y)`.
    pub fn interpolate_at(&self, x: Real, y: Real) -> Result<Real> {
        self.interpolation.value(x, y)
    }

    /// Time decay at `(x, y)`; `None` when the rollback had a stopping
    /// time at zero.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Option<Real>> {
        match &self.theta {
            Some((t, s)) => Ok(Some((s.value(x, y)? - self.interpolate_at(x, y)?) / t)),
            None => Ok(None),
        }
    }

    /// `∂V/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        self.interpolation.derivative_x(x, y)
    }

    /// `∂²V/∂x²` at `(x, y)`.
    pub fn derivative_xx(&self, x: Real, y: Real) -> Result<Real> {
        self.interpolation.second_derivative_x(x, y)
    }

    /// `∂V/∂y` at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        self.interpolation.derivative_y(x, y)
    }
}
