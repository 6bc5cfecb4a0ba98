//! Bates operator: Heston plus log-normal jumps in the spot.
//!
//! The jump integral `λ·(E[V(x + J)] − V(x))` with `J ~ N(ν, δ²)` is
//! evaluated by Gauss-Hermite quadrature on a linear interpolation of each
//! spot line.  Jump targets beyond a Dirichlet boundary take the boundary
//! value.  The drift carries the compensator `λ·(e^{ν+δ²/2} − 1)`.

use super::{FdmHestonOp, FdmIntegroTerm, FdmLinearOpComposite, FdmOperatorWindow};
use crate::finite_differences::boundary_conditions::{FdmBoundaryConditionSet, FdmDirichletBoundary};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::integrals::{GaussHermiteIntegration, GaussianQuadrature};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_math::Array;
use ql_processes::BatesProcess;
use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

#[derive(Debug)]
struct BatesJumpIntegral {
    lambda: Real,
    nu: Real,
    delta: Real,
    quadrature: GaussianQuadrature,
    x: Vec<Real>,
    n_v: usize,
    boundaries: Vec<FdmDirichletBoundary>,
}

impl FdmIntegroTerm for BatesJumpIntegral {
    fn apply(&self, r: &Array) -> Result<Array> {
        let nx = self.x.len();
        ensure!(
            r.size() == nx * self.n_v,
            "array of size {} for a {}x{} grid",
            r.size(),
            nx,
            self.n_v
        );
        let inv_sqrt_pi = 1.0 / PI.sqrt();
        let mut out = Array::zeros(r.size());
        for j in 0..self.n_v {
            let line = &r.as_slice()[j * nx..(j + 1) * nx];
            let interp = LinearInterpolation::new(&self.x, line)?;
            for (i, &xi) in self.x.iter().enumerate() {
                let expectation = self.quadrature.integrate(|u| {
                    let target = xi + SQRT_2 * self.delta * u + self.nu;
                    self.boundaries
                        .iter()
                        .fold(interp.value(target), |v, b| b.apply_outside(target, v))
                });
                let k = j * nx + i;
                out[k] = self.lambda * (expectation * inv_sqrt_pi - r[k]);
            }
        }
        Ok(out)
    }
}

/// Bates operator.
#[derive(Debug)]
pub struct FdmBatesOp {
    heston: FdmHestonOp,
    jumps: Arc<BatesJumpIntegral>,
}

impl FdmBatesOp {
    /// Build the operator with a Gauss-Hermite rule of
    /// `integration_order` nodes.  Only Dirichlet conditions along the
    /// spot direction are supported.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: &BatesProcess,
        boundaries: &FdmBoundaryConditionSet,
        integration_order: usize,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ensure!(
            layout.dimensions() == 2,
            "the Bates operator needs a two-dimensional mesh, got {} directions",
            layout.dimensions()
        );
        let mut dirichlet = Vec::new();
        for bc in boundaries.iter() {
            let d = bc.as_dirichlet().ok_or_else(|| {
                ql_core::Error::Precondition("the Bates operator only supports Dirichlet boundaries".into())
            })?;
            ensure!(
                d.direction() == 0,
                "the Bates operator only supports boundaries along the spot direction"
            );
            dirichlet.push(d.clone());
        }

        let (lambda, nu, delta) = (process.lambda(), process.nu(), process.delta());
        let compensator = lambda * ((nu + 0.5 * delta * delta).exp() - 1.0);
        let x = layout
            .iter()
            .take(layout.dim()[0])
            .map(|it| mesher.location(&it, 0))
            .collect();

        Ok(Self {
            heston: FdmHestonOp::with_yield_spread(mesher, process.heston(), compensator)?,
            jumps: Arc::new(BatesJumpIntegral {
                lambda,
                nu,
                delta,
                quadrature: GaussHermiteIntegration::new(integration_order)?,
                x,
                n_v: layout.dim()[1],
                boundaries: dirichlet,
            }),
        })
    }

    /// The jump integral alone.
    pub fn integro(&self, r: &Array) -> Result<Array> {
        self.jumps.apply(r)
    }
}

impl FdmLinearOpComposite for FdmBatesOp {
    fn size(&self) -> usize {
        self.heston.size()
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        let jumps: Arc<dyn FdmIntegroTerm> = self.jumps.clone();
        FdmOperatorWindow::new(
            self.heston.frozen_directions(t1, t2)?,
            vec![self.heston.correlation().clone()],
            Some(jumps),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::UniformGridMesher;
    use crate::finite_differences::utilities::FdmLinearOpLayout;
    use approx::assert_abs_diff_eq;
    use ql_processes::HestonProcess;
    use ql_termstructures::FlatForward;

    fn bates() -> BatesProcess {
        let heston = HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            100.0,
            0.04,
            1.0,
            0.04,
            0.3,
            -0.5,
        )
        .unwrap();
        BatesProcess::new(heston, 0.5, -0.1, 0.15).unwrap()
    }

    #[test]
    fn jump_integral_of_the_spot_is_the_compensator() {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![400, 3]).unwrap());
        let mesher = UniformGridMesher::new(layout.clone(), &[(0.0, 9.0), (0.0, 0.5)]).unwrap();
        let op = FdmBatesOp::new(&mesher, &bates(), &FdmBoundaryConditionSet::default(), 16).unwrap();
        let spot = mesher.locations(0).map(f64::exp);
        let jumps = op.integro(&spot).unwrap();
        let comp = 0.5 * ((-0.1_f64 + 0.5 * 0.15 * 0.15).exp() - 1.0);
        // away from the edges λ(E[S e^J] − S) = S·compensator
        let it = layout.iter().nth(layout.index(&[200, 1])).unwrap();
        let s = spot[it.index()];
        assert!((jumps[it.index()] / s - comp).abs() < 1e-3);
    }

    #[test]
    fn constant_function_has_no_jump_contribution() {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![30, 5]).unwrap());
        let mesher = UniformGridMesher::new(layout.clone(), &[(3.0, 6.0), (0.0, 0.5)]).unwrap();
        let op = FdmBatesOp::new(&mesher, &bates(), &FdmBoundaryConditionSet::default(), 12).unwrap();
        let ones = Array::from_element(layout.size(), 1.0);
        for v in op.integro(&ones).unwrap().iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-10);
        }
    }
}
