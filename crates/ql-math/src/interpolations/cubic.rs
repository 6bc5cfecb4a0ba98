//! Natural cubic spline with first and second derivatives.

use ql_core::{errors::Result, Real};

use super::{check_abscissae, locate, Interpolation1D};

/// Cubic spline with vanishing second derivative at both ends.
///
/// Outside the grid the boundary cubic is continued, which keeps
/// first-derivative queries smooth slightly beyond the mesh edges.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivative at every node.
    m: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Fit the spline through `(xs[i], ys[i])`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_abscissae(xs, ys.len(), 2)?;
        let n = xs.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // tridiagonal system for the interior second derivatives
            let k = n - 2;
            let mut diag = vec![0.0; k];
            let mut upper = vec![0.0; k];
            let mut rhs = vec![0.0; k];
            for j in 0..k {
                let i = j + 1;
                let hm = xs[i] - xs[i - 1];
                let hp = xs[i + 1] - xs[i];
                diag[j] = 2.0 * (hm + hp);
                upper[j] = hp;
                rhs[j] = 6.0 * ((ys[i + 1] - ys[i]) / hp - (ys[i] - ys[i - 1]) / hm);
            }
            for j in 1..k {
                let lower = xs[j + 1] - xs[j];
                let w = lower / diag[j - 1];
                diag[j] -= w * upper[j - 1];
                rhs[j] -= w * rhs[j - 1];
            }
            m[k] = rhs[k - 1] / diag[k - 1];
            for j in (0..k - 1).rev() {
                m[j + 1] = (rhs[j] - upper[j] * m[j + 2]) / diag[j];
            }
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    fn segment(&self, x: Real) -> (usize, Real, Real) {
        let i = locate(&self.xs, x);
        (i, x - self.xs[i], self.xs[i + 1] - self.xs[i])
    }

    fn slope(&self, i: usize, h: Real) -> Real {
        (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0
    }

    /// First derivative at `x`.
    pub fn derivative(&self, x: Real) -> Real {
        let (i, t, h) = self.segment(x);
        self.slope(i, h) + self.m[i] * t + (self.m[i + 1] - self.m[i]) / (2.0 * h) * t * t
    }

    /// Second derivative at `x`.
    pub fn second_derivative(&self, x: Real) -> Real {
        let (i, t, h) = self.segment(x);
        self.m[i] + (self.m[i + 1] - self.m[i]) * t / h
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn value(&self, x: Real) -> Real {
        let (i, t, h) = self.segment(x);
        self.ys[i]
            + t * (self.slope(i, h) + t * (0.5 * self.m[i] + t * (self.m[i + 1] - self.m[i]) / (6.0 * h)))
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reproduces_nodes_and_linear_data() {
        let xs = [0.0, 0.5, 1.5, 2.0, 3.5];
        let ys: Vec<Real> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_abs_diff_eq!(s.value(*x), *y, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(s.value(2.7), 4.4, epsilon = 1e-12);
        assert_abs_diff_eq!(s.derivative(1.1), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.second_derivative(1.1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn approximates_smooth_function() {
        let xs: Vec<Real> = (0..=60).map(|i| i as Real * 0.05).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.sin()).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        let x = 1.234;
        assert_abs_diff_eq!(s.value(x), x.sin(), epsilon = 1e-6);
        assert_abs_diff_eq!(s.derivative(x), x.cos(), epsilon = 1e-4);
        assert_abs_diff_eq!(s.second_derivative(x), -x.sin(), epsilon = 1e-2);
    }

    #[test]
    fn two_points_degenerate_to_a_line() {
        let s = CubicNaturalSpline::new(&[1.0, 3.0], &[2.0, 6.0]).unwrap();
        assert_abs_diff_eq!(s.value(2.0), 4.0, epsilon = 1e-14);
        assert_abs_diff_eq!(s.derivative(2.0), 2.0, epsilon = 1e-14);
    }
}
