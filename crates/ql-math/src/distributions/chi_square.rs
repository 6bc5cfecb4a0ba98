//! Non-central chi-square distribution.
//!
//! The transition density of the square-root (CIR) variance process is a
//! scaled non-central chi-square; its quantiles place the variance mesh of
//! the Heston family.  The CDF is the Poisson mixture of central
//! chi-square CDFs, summed outward from the Poisson mode so that large
//! non-centralities stay stable.

use ql_core::{ensure, errors::Result, Real};
use statrs::function::gamma::{gamma_lr, ln_gamma};

use crate::solvers1d::brent;

/// Non-central chi-square distribution with `df` degrees of freedom and
/// non-centrality `ncp`.
#[derive(Debug, Clone, Copy)]
pub struct NonCentralChiSquare {
    df: Real,
    ncp: Real,
}

const SERIES_TOLERANCE: Real = 1e-16;

impl NonCentralChiSquare {
    /// Create the distribution; `df > 0`, `ncp >= 0`.
    pub fn new(df: Real, ncp: Real) -> Result<Self> {
        ensure!(df > 0.0, "degrees of freedom must be positive, got {df}");
        ensure!(ncp >= 0.0, "non-centrality must be non-negative, got {ncp}");
        Ok(Self { df, ncp })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Non-centrality parameter.
    pub fn ncp(&self) -> Real {
        self.ncp
    }

    /// Mean `df + ncp`.
    pub fn mean(&self) -> Real {
        self.df + self.ncp
    }

    /// Cumulative distribution function `P(X ≤ x)`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let lambda = 0.5 * self.ncp;
        let half_x = 0.5 * x;
        let term = |j: usize| -> Real {
            let j = j as Real;
            let log_w = if lambda > 0.0 {
                -lambda + j * lambda.ln() - ln_gamma(j + 1.0)
            } else if j == 0.0 {
                0.0
            } else {
                Real::NEG_INFINITY
            };
            log_w.exp() * gamma_lr(0.5 * self.df + j, half_x)
        };

        let mode = lambda.floor() as usize;
        let mut sum = term(mode);
        let mut j = mode + 1;
        loop {
            let t = term(j);
            sum += t;
            j += 1;
            if t < SERIES_TOLERANCE && j as Real > lambda + 1.0 {
                break;
            }
        }
        for j in (0..mode).rev() {
            let t = term(j);
            sum += t;
            if t < SERIES_TOLERANCE {
                break;
            }
        }
        sum.min(1.0)
    }

    /// Quantile function, found by bracketing and Brent's method.
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ensure!(p > 0.0 && p < 1.0, "probability {p} outside (0, 1)");
        let mut upper = self.mean().max(1.0);
        let mut bracket_steps = 0;
        while self.cdf(upper) < p {
            upper *= 2.0;
            bracket_steps += 1;
            ensure!(bracket_steps < 100, "cannot bracket quantile {p}");
        }
        brent(|x| self.cdf(x) - p, 0.0, upper, 1e-10 * upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn central_case_matches_closed_form() {
        // df = 2, ncp = 0 is exponential with mean 2
        let d = NonCentralChiSquare::new(2.0, 0.0).unwrap();
        for &x in &[0.1, 1.0, 4.0, 10.0] {
            assert_abs_diff_eq!(d.cdf(x), 1.0 - (-0.5 * x).exp(), epsilon = 1e-12);
        }
    }

    #[test]
    fn one_degree_of_freedom_is_a_shifted_normal_square() {
        // X = (Z + μ)² with ncp = μ²
        let mu: Real = 1.5;
        let d = NonCentralChiSquare::new(1.0, mu * mu).unwrap();
        let x: Real = 3.0;
        let expected = crate::normal_cdf(x.sqrt() - mu) - crate::normal_cdf(-x.sqrt() - mu);
        assert_abs_diff_eq!(d.cdf(x), expected, epsilon = 1e-10);
    }

    #[test]
    fn quantile_inverts_cdf_for_large_noncentrality() {
        let d = NonCentralChiSquare::new(0.8, 250.0).unwrap();
        for &p in &[1e-4, 0.5, 0.9999] {
            let x = d.inverse_cdf(p).unwrap();
            assert_abs_diff_eq!(d.cdf(x), p, epsilon = 1e-7);
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(NonCentralChiSquare::new(0.0, 1.0).is_err());
        assert!(NonCentralChiSquare::new(1.0, -1.0).is_err());
    }
}
