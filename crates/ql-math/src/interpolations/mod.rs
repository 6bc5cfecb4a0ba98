//! Interpolation on the grids produced by finite-difference meshers.
//!
//! The backward solvers hand over their value arrays on (possibly
//! non-uniform) mesh lines; these types turn them back into functions of
//! the state variables, including first and second derivatives for the
//! Greeks.

use ql_core::{errors::Result, Real};

pub mod bicubic;
pub mod cubic;

pub use bicubic::BicubicSpline;
pub use cubic::CubicNaturalSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
///
/// Evaluation outside `[x_min, x_max]` extrapolates with the boundary
/// segment.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn value(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Index `i` of the segment `[xs[i], xs[i+1]]` used for `x`, clamped to the
/// first and last segment.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // first index with xs[i] > x, minus one; a NaN `x` lands on segment 0
    xs.partition_point(|&xi| xi <= x).saturating_sub(1)
}

fn check_abscissae(xs: &[Real], ys_len: usize, min_points: usize) -> Result<()> {
    ql_core::ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    ql_core::ensure!(
        xs.len() == ys_len,
        "xs ({}) and ys ({}) must have the same length",
        xs.len(),
        ys_len
    );
    ql_core::ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        "abscissae must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from strictly increasing `xs` and
    /// the corresponding `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_abscissae(xs, ys.len(), 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_interpolation_and_extrapolation() {
        let interp = LinearInterpolation::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert_abs_diff_eq!(interp.value(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.value(1.5), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.value(3.0), 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.value(-1.0), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn locate_finds_segment() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate(&xs, -5.0), 0);
        assert_eq!(locate(&xs, 1.0), 1);
        assert_eq!(locate(&xs, 2.5), 2);
        assert_eq!(locate(&xs, 9.0), 2);
        assert_eq!(locate(&xs, Real::NAN), 0);
    }

    #[test]
    fn nan_abscissa_gives_nan_not_a_panic() {
        let interp = LinearInterpolation::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!(interp.value(Real::NAN).is_nan());
    }

    #[test]
    fn rejects_unsorted_abscissae() {
        assert!(LinearInterpolation::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(LinearInterpolation::new(&[0.0], &[0.0]).is_err());
    }
}
