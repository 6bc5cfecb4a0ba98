//! Standard normal distribution, used to place mesh boundaries at
//! quantiles of lognormal and Gaussian terminal distributions.

use ql_core::{ensure, errors::Result, Real};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

/// The standard normal probability density function.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// The inverse standard normal CDF Φ⁻¹(p) for `p ∈ (0, 1)`.
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    ensure!(p > 0.0 && p < 1.0, "probability {p} outside (0, 1)");
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}
