//! Finite-difference derivative stencils on non-uniform meshes.
//!
//! First derivatives are central in the interior and one-sided at the
//! edges; second derivatives are central in the interior and zero at the
//! edges.  The mixed derivative is the product of the two one-directional
//! first-derivative weights.

use super::{nine_point_linear_op::slot, NinePointLinearOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesher;
use crate::finite_differences::utilities::FdmLinearOpIterator;
use ql_core::{errors::Result, Real};

/// First-derivative weights `(lower, diag, upper)` at `iter`.
fn first_derivative_weights(mesher: &dyn FdmMesher, iter: &FdmLinearOpIterator, d: usize) -> [Real; 3] {
    match (mesher.dminus(iter, d), mesher.dplus(iter, d)) {
        (None, Some(hp)) => [0.0, -1.0 / hp, 1.0 / hp],
        (Some(hm), None) => [-1.0 / hm, 1.0 / hm, 0.0],
        (Some(hm), Some(hp)) => [
            -hp / (hm * (hm + hp)),
            (hp - hm) / (hm * hp),
            hm / (hp * (hm + hp)),
        ],
        (None, None) => [0.0; 3],
    }
}

/// `∂/∂x` along one direction.
pub struct FirstDerivativeOp;

impl FirstDerivativeOp {
    /// Build the operator along `direction`.
    pub fn new(direction: usize, mesher: &dyn FdmMesher) -> Result<TripleBandLinearOp> {
        let mut op = TripleBandLinearOp::new(direction, mesher)?;
        for iter in mesher.layout().iter() {
            let [l, d, u] = first_derivative_weights(mesher, &iter, direction);
            op.set_row(iter.index(), l, d, u);
        }
        Ok(op)
    }
}

/// `∂²/∂x²` along one direction.
pub struct SecondDerivativeOp;

impl SecondDerivativeOp {
    /// Build the operator along `direction`.
    pub fn new(direction: usize, mesher: &dyn FdmMesher) -> Result<TripleBandLinearOp> {
        let mut op = TripleBandLinearOp::new(direction, mesher)?;
        for iter in mesher.layout().iter() {
            if let (Some(hm), Some(hp)) = (mesher.dminus(&iter, direction), mesher.dplus(&iter, direction)) {
                op.set_row(
                    iter.index(),
                    2.0 / (hm * (hm + hp)),
                    -2.0 / (hm * hp),
                    2.0 / (hp * (hm + hp)),
                );
            }
        }
        Ok(op)
    }
}

/// `∂²/∂x∂y` over two directions.
pub struct SecondOrderMixedDerivativeOp;

impl SecondOrderMixedDerivativeOp {
    /// Build the operator over directions `d0` and `d1`.
    pub fn new(d0: usize, d1: usize, mesher: &dyn FdmMesher) -> Result<NinePointLinearOp> {
        let op = NinePointLinearOp::new(d0, d1, mesher)?;
        let size = mesher.layout().size();
        let mut weights: [Vec<Real>; 9] = Default::default();
        for w in weights.iter_mut() {
            *w = vec![0.0; size];
        }
        for iter in mesher.layout().iter() {
            let w0 = first_derivative_weights(mesher, &iter, d0);
            let w1 = first_derivative_weights(mesher, &iter, d1);
            let i = iter.index();
            for (a, o0) in (-1..=1).enumerate() {
                for (b, o1) in (-1..=1).enumerate() {
                    weights[slot(o0, o1)][i] = w0[a] * w1[b];
                }
            }
        }
        Ok(op.with_weights(weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::UniformGridMesher;
    use crate::finite_differences::operators::Coefficient;
    use crate::finite_differences::utilities::FdmLinearOpLayout;
    use approx::assert_abs_diff_eq;
    use ql_math::Array;
    use std::sync::Arc;

    fn mesher_3d() -> UniformGridMesher {
        let layout = Arc::new(FdmLinearOpLayout::new(vec![5, 7, 8]).unwrap());
        UniformGridMesher::new(layout, &[(-5.0, 10.0), (5.0, 100.0), (10.0, 20.0)]).unwrap()
    }

    #[test]
    fn first_derivative_of_a_linear_function_is_exact() {
        let mesher = mesher_3d();
        let x = mesher.locations(1);
        let f: Array = x.iter().map(|v| 3.0 * v + 1.0).collect();
        let d = FirstDerivativeOp::new(1, &mesher).unwrap().apply(&f).unwrap();
        for v in d.iter() {
            assert_abs_diff_eq!(*v, 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn first_derivative_is_one_sided_at_the_edges() {
        let mesher = mesher_3d();
        let x = mesher.locations(0);
        let f: Array = x.iter().map(|v| v * v).collect();
        let d = FirstDerivativeOp::new(0, &mesher).unwrap().apply(&f).unwrap();
        let layout = mesher.layout().clone();
        let h = 3.75;
        for iter in layout.iter() {
            let c = iter.coordinates()[0];
            let xv = x[iter.index()];
            let expected = match c {
                0 => ((xv + h) * (xv + h) - xv * xv) / h,
                4 => (xv * xv - (xv - h) * (xv - h)) / h,
                _ => 2.0 * xv,
            };
            assert_abs_diff_eq!(d[iter.index()], expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn second_derivative_of_a_quadratic() {
        let mesher = mesher_3d();
        let x = mesher.locations(2);
        let f: Array = x.iter().map(|v| 0.5 * v * v).collect();
        let d = SecondDerivativeOp::new(2, &mesher).unwrap().apply(&f).unwrap();
        let layout = mesher.layout().clone();
        for iter in layout.iter() {
            let c = iter.coordinates()[2];
            let expected = if c == 0 || c == 7 { 0.0 } else { 1.0 };
            assert_abs_diff_eq!(d[iter.index()], expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn mixed_derivative_of_a_bilinear_function() {
        let mesher = mesher_3d();
        let x = mesher.locations(0);
        let y = mesher.locations(2);
        let f: Array = x.iter().zip(y.iter()).map(|(a, b)| a * b).collect();
        let d = SecondOrderMixedDerivativeOp::new(0, 2, &mesher).unwrap().apply(&f).unwrap();
        for v in d.iter() {
            assert_abs_diff_eq!(*v, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn mixed_derivative_is_symmetric_in_its_directions() {
        let mesher = mesher_3d();
        let x = mesher.locations(0);
        let y = mesher.locations(1);
        let f: Array = x.iter().zip(y.iter()).map(|(a, b)| (0.1 * a).sin() * (0.02 * b).exp()).collect();
        let a = SecondOrderMixedDerivativeOp::new(0, 1, &mesher).unwrap().apply(&f).unwrap();
        let b = SecondOrderMixedDerivativeOp::new(1, 0, &mesher).unwrap().apply(&f).unwrap();
        for (u, v) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*u, *v, epsilon = 1e-10);
        }
    }

    #[test]
    fn triple_band_splitting_solve_inverts_the_operator() {
        let mesher = mesher_3d();
        let layout = mesher.layout().clone();
        let dy = FirstDerivativeOp::new(1, &mesher).unwrap();
        let dxx = SecondDerivativeOp::new(0, &mesher).unwrap();
        let op = dy
            .axpyb(Coefficient::Constant(2.0), &dy, &dy, Coefficient::Constant(1.0))
            .unwrap();
        let u = Array::from_fn(layout.size(), |i| ((i * 7 % 13) as f64).sqrt() + 1.0);
        let r = op.apply(&u).unwrap();
        let back = op.solve_splitting(&r, 1.0, 0.0).unwrap();
        for (a, b) in back.iter().zip(u.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }

        // (I - s·Dxx) x = r along direction 0
        let s = 0.3;
        let v = dxx.apply(&u).unwrap();
        let rhs = &u - &(s * &v);
        let x = dxx.solve_splitting(&rhs, -s, 1.0).unwrap();
        for (a, b) in x.iter().zip(u.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
        }
    }

    #[test]
    fn dense_form_matches_apply() {
        let mesher = mesher_3d();
        let layout = mesher.layout().clone();
        let op = SecondDerivativeOp::new(1, &mesher).unwrap();
        let u = Array::from_fn(layout.size(), |i| (i as f64 * 0.37).cos());
        let dense = op.to_dense();
        let via_dense = &dense * u.inner();
        let via_apply = op.apply(&u).unwrap();
        for i in 0..layout.size() {
            assert_abs_diff_eq!(via_dense[i], via_apply[i], epsilon = 1e-10);
        }
    }
}
