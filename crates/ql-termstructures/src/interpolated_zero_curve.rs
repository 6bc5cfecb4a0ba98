//! `InterpolatedZeroCurve`: a yield curve linearly interpolated in zero
//! rates over time pillars.
//!
//! Zero rates are extrapolated flat beyond the last pillar;
//! `P(t) = exp(-z(t) t)`.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};

/// A yield curve defined by zero rates at known times.
#[derive(Debug)]
pub struct InterpolatedZeroCurve {
    times: Vec<Time>,
    interp: LinearInterpolation,
}

impl InterpolatedZeroCurve {
    /// Build a zero-rate curve from pillar times (the first must be `0`)
    /// and continuously compounded zero rates.
    pub fn new(times: &[Time], rates: &[Rate]) -> Result<Self> {
        ensure!(
            times.len() >= 2,
            "need at least 2 pillars (reference + 1), got {}",
            times.len()
        );
        ensure!(times[0] == 0.0, "first pillar must be at t = 0, got {}", times[0]);
        let interp = LinearInterpolation::new(times, rates)?;
        Ok(Self {
            times: times.to_vec(),
            interp,
        })
    }

    /// Pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}

impl TermStructure for InterpolatedZeroCurve {}

impl YieldTermStructure for InterpolatedZeroCurve {
    fn zero_rate_impl(&self, t: Time) -> Rate {
        let t_max = self.times[self.times.len() - 1];
        self.interp.value(t.clamp(0.0, t_max))
    }

    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.zero_rate_impl(t) * t).exp()
    }

    fn forward_rate_impl(&self, t: Time) -> Rate {
        // d(z t)/dt = z + t z'
        let dt: Real = 1.0e-5;
        let t1 = (t - dt).max(0.0);
        let t2 = t1 + 2.0 * dt;
        (t2 * self.zero_rate_impl(t2) - t1 * self.zero_rate_impl(t1)) / (t2 - t1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolates_and_extrapolates_flat() {
        let curve = InterpolatedZeroCurve::new(&[0.0, 1.0, 2.0], &[0.01, 0.02, 0.03]).unwrap();
        assert_abs_diff_eq!(curve.zero_rate(1.5), 0.025, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.zero_rate(5.0), 0.03, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.discount(2.0), (-0.06_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn forward_rate_is_consistent_with_discounts() {
        let curve = InterpolatedZeroCurve::new(&[0.0, 1.0, 3.0], &[0.02, 0.03, 0.035]).unwrap();
        let fwd = curve.forward_rate(1.0, 3.0);
        let expected = (3.0 * 0.035 - 1.0 * 0.03) / 2.0;
        assert_abs_diff_eq!(fwd, expected, epsilon = 1e-12);
        // instantaneous forward on the first segment: z + t z' = 0.02 + 2 t 0.01
        assert_abs_diff_eq!(curve.forward_rate(0.5, 0.5), 0.03, epsilon = 1e-6);
    }

    #[test]
    fn rejects_missing_origin() {
        assert!(InterpolatedZeroCurve::new(&[0.5, 1.0], &[0.01, 0.02]).is_err());
    }
}
