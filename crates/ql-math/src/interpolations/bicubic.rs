//! Bicubic spline on a rectangular grid.
//!
//! One natural cubic spline per `y`-row is fitted along `x` at
//! construction.  A query evaluates every row spline at `x` and fits a
//! second natural spline through the resulting column along `y`.  The
//! grid layout matches the flat finite-difference layout: `z[j * nx + i]`
//! is the value at `(xs[i], ys[j])`.

use ql_core::{errors::Result, Real};

use super::{CubicNaturalSpline, Interpolation1D};

/// Bicubic spline interpolation on a rectangular grid.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build a bicubic spline on the grid `(xs × ys → z)`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ql_core::ensure!(nx >= 2 && ny >= 2, "bicubic spline needs a 2x2 grid at least");
        ql_core::ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({nx}*{ny})",
            z.len()
        );

        ql_core::ensure!(
            ys.windows(2).all(|w| w[1] > w[0]),
            "y abscissae must be strictly increasing"
        );

        let row_splines = z
            .chunks(nx)
            .map(|row| CubicNaturalSpline::new(xs, row))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            row_splines,
        })
    }

    fn across_rows<F: Fn(&CubicNaturalSpline) -> Real>(&self, f: F) -> Result<CubicNaturalSpline> {
        let column: Vec<Real> = self.row_splines.iter().map(f).collect();
        CubicNaturalSpline::new(&self.ys, &column)
    }

    /// `∂f/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(|s| s.derivative(x))?.value(y))
    }

    /// `∂²f/∂x²` at `(x, y)`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(|s| s.second_derivative(x))?.value(y))
    }

    /// `∂f/∂y` at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(|s| s.value(x))?.derivative(y))
    }

    /// `f(x, y)`.
    pub fn value(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.across_rows(|s| s.value(x))?.value(y))
    }

    /// Grid range along `x`.
    pub fn x_range(&self) -> (Real, Real) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Grid range along `y`.
    pub fn y_range(&self) -> (Real, Real) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> (Vec<Real>, Vec<Real>) {
        let xs: Vec<Real> = (0..=40).map(|i| -1.0 + i as Real * 0.05).collect();
        let ys: Vec<Real> = (0..=30).map(|j| (j as Real * 0.1).powi(2) * 0.3).collect();
        (xs, ys)
    }

    #[test]
    fn reproduces_bilinear_surface_exactly() {
        let (xs, ys) = grid();
        let z: Vec<Real> = ys
            .iter()
            .flat_map(|y| xs.iter().map(move |x| 1.0 + 2.0 * x - y + 0.5 * x * y))
            .collect();
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        let (x, y) = (0.123, 0.77);
        assert_abs_diff_eq!(s.value(x, y).unwrap(), 1.0 + 2.0 * x - y + 0.5 * x * y, epsilon = 1e-10);
        assert_abs_diff_eq!(s.derivative_x(x, y).unwrap(), 2.0 + 0.5 * y, epsilon = 1e-10);
        assert_abs_diff_eq!(s.derivative_y(x, y).unwrap(), -1.0 + 0.5 * x, epsilon = 1e-10);
        assert_abs_diff_eq!(s.second_derivative_x(x, y).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn smooth_surface_derivatives() {
        let (xs, ys) = grid();
        let z: Vec<Real> = ys
            .iter()
            .flat_map(|y| xs.iter().map(move |x| x.exp() * (1.0 + y)))
            .collect();
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        let (x, y) = (0.2, 1.1);
        assert_abs_diff_eq!(s.value(x, y).unwrap(), x.exp() * (1.0 + y), epsilon = 1e-5);
        assert_abs_diff_eq!(s.derivative_x(x, y).unwrap(), x.exp() * (1.0 + y), epsilon = 1e-3);
        assert_abs_diff_eq!(s.second_derivative_x(x, y).unwrap(), x.exp() * (1.0 + y), epsilon = 5e-2);
    }

    #[test]
    fn rejects_inconsistent_grid() {
        assert!(BicubicSpline::new(&[0.0, 1.0], &[0.0, 1.0], &[0.0; 3]).is_err());
    }
}
