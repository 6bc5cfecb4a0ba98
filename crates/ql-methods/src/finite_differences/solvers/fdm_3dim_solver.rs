use super::{axis_locations, roll_back, FdmSolverDesc};
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use ql_core::{ensure, errors::Result, Real};
use ql_math::interpolations::{BicubicSpline, CubicNaturalSpline, Interpolation1D};
use ql_math::Array;
use std::sync::Arc;

/// One bicubic spline per `z` layer of a three-dimensional grid.
#[derive(Debug)]
struct LayeredSpline {
    z: Vec<Real>,
    layers: Vec<BicubicSpline>,
}

impl LayeredSpline {
    fn new(x: &[Real], y: &[Real], z: &[Real], values: &Array) -> Result<Self> {
        let layer = x.len() * y.len();
        let layers = values
            .as_slice()
            .chunks(layer)
            .map(|c| BicubicSpline::new(x, y, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { z: z.to_vec(), layers })
    }

    fn value(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        let column = self
            .layers
            .iter()
            .map(|l| l.value(x, y))
            .collect::<Result<Vec<_>>>()?;
        Ok(CubicNaturalSpline::new(&self.z, &column)?.value(z))
    }
}

/// Solver on a three-dimensional mesh: bicubic in the first two
/// directions, natural cubic across the third.
#[derive(Debug)]
pub struct Fdm3DimSolver {
    values: Array,
    interpolation: LayeredSpline,
    theta: Option<(Real, LayeredSpline)>,
}

impl Fdm3DimSolver {
    /// Run the rollback described by `desc` with the given scheme and
    /// operator.
    pub fn new(desc: FdmSolverDesc, scheme_desc: FdmSchemeDesc, op: Arc<dyn FdmLinearOpComposite>) -> Result<Self> {
        ensure!(
            desc.mesher.layout().dimensions() == 3,
            "a three-dimensional solver needs a three-dimensional mesh"
        );
        let x = axis_locations(desc.mesher.as_ref(), 0);
        let y = axis_locations(desc.mesher.as_ref(), 1);
        let z = axis_locations(desc.mesher.as_ref(), 2);
        let rollback = roll_back(desc, scheme_desc, op)?;
        let interpolation = LayeredSpline::new(&x, &y, &z, &rollback.values)?;
        let theta = rollback
            .theta
            .map(|(t, v)| LayeredSpline::new(&x, &y, &z, &v).map(|s| (t, s)))
            .transpose()?;
        Ok(Self {
            values: rollback.values,
            interpolation,
            theta,
        })
    }

    /// Values at time zero on the grid.
    pub fn values(&self) -> &Array {
        &self.values
    }

    /// Value at `(x, y, z)`.
    pub fn interpolate_at(&self, x: Real, y: Real, z: Real) -> Result<Real> {
        self.interpolation.value(x, y, z)
    }

    /// Time decay at `(x, y, z)`; `None` when the rollback had a stopping
    /// time at zero.
    pub fn theta_at(&self, x: Real, y: Real, z: Real) -> Result<Option<Real>> {
        match &self.theta {
            Some((t, s)) => Ok(Some((s.value(x, y, z)? - self.interpolate_at(x, y, z)?) / t)),
            None => Ok(None),
        }
    }
}
