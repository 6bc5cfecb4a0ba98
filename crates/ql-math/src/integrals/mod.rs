//! Numerical integration: refined Simpson rule and Gaussian quadratures.

pub mod gaussianquadratures;

pub use gaussianquadratures::{GaussHermiteIntegration, GaussLaguerreIntegration, GaussianQuadrature};

use ql_core::{
    errors::{Error, Result},
    Real,
};

/// Minimum number of refinements before the convergence test is trusted.
const MIN_REFINEMENTS: usize = 5;

/// Composite Simpson rule obtained by Richardson-extrapolating successive
/// trapezoid refinements, each of which reuses the previous evaluations.
#[derive(Debug, Clone, Copy)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_refinements: usize,
}

impl SimpsonIntegral {
    /// Create a new Simpson integrator.  `max_refinements` bounds the number
    /// of interval halvings, i.e. at most `2^max_refinements + 1` function
    /// evaluations.
    pub fn new(absolute_accuracy: Real, max_refinements: usize) -> Self {
        Self {
            absolute_accuracy,
            max_refinements,
        }
    }

    /// Integrate `f` on `[a, b]`.
    ///
    /// Fails with [`Error::Convergence`] when the refinement budget is spent
    /// before two successive estimates agree.
    pub fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        if a == b {
            return Ok(0.0);
        }
        let mut n = 1usize;
        let mut trapezoid = 0.5 * (b - a) * (f(a) + f(b));
        let mut simpson = trapezoid;
        for level in 1..=self.max_refinements {
            let h = (b - a) / n as Real;
            let midpoints: Real = (0..n).map(|i| f(a + (i as Real + 0.5) * h)).sum();
            let refined = 0.5 * (trapezoid + h * midpoints);
            let next = (4.0 * refined - trapezoid) / 3.0;
            let change = (next - simpson).abs();
            if level > MIN_REFINEMENTS && change <= self.absolute_accuracy {
                return Ok(next);
            }
            trapezoid = refined;
            simpson = next;
            n *= 2;
            if level == self.max_refinements {
                return Err(Error::Convergence {
                    method: "Simpson",
                    iterations: level,
                    residual: change,
                    tolerance: self.absolute_accuracy,
                });
            }
        }
        Err(Error::Convergence {
            method: "Simpson",
            iterations: 0,
            residual: Real::INFINITY,
            tolerance: self.absolute_accuracy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn simpson_integrates_smooth_functions() {
        let s = SimpsonIntegral::new(1e-10, 20);
        assert_abs_diff_eq!(s.integrate(|x| x * x, 0.0, 3.0).unwrap(), 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            s.integrate(|x: Real| x.exp(), 0.0, 1.0).unwrap(),
            std::f64::consts::E - 1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn simpson_handles_kinks() {
        let s = SimpsonIntegral::new(1e-8, 30);
        let v = s.integrate(|x: Real| (x - 0.3).max(0.0), 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(v, 0.245, epsilon = 1e-7);
    }

    #[test]
    fn simpson_reports_exhausted_budget() {
        let s = SimpsonIntegral::new(1e-14, 6);
        let err = s.integrate(|x: Real| (50.0 * x).sin().abs(), 0.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::Convergence { method: "Simpson", .. }));
    }
}
