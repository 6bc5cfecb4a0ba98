//! Hull-White one-factor short-rate process
//!
//! ```text
//! dr = (θ(t) − a r) dt + σ dW
//! ```
//!
//! written as `r(t) = x(t) + φ(t)` where `x` is a zero-level
//! Ornstein-Uhlenbeck process and the deterministic shift
//! `φ(t) = f(0,t) + σ²/(2a²)(1 − e^{−at})²` fits the initial curve.

use crate::ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Hull-White one-factor short-rate process in short-rate coordinates.
#[derive(Debug, Clone)]
pub struct HullWhiteProcess {
    a: Real,
    sigma: Real,
    term_structure: Arc<dyn YieldTermStructure>,
}

impl HullWhiteProcess {
    /// Create the process fitted to `term_structure`; `a` and `sigma` must
    /// be positive.
    pub fn new(term_structure: Arc<dyn YieldTermStructure>, a: Real, sigma: Real) -> Result<Self> {
        ensure!(a > 0.0, "mean-reversion speed must be positive, got {a}");
        ensure!(sigma >= 0.0, "volatility must be non-negative, got {sigma}");
        Ok(Self {
            a,
            sigma,
            term_structure,
        })
    }

    /// Mean-reversion speed.
    pub fn a(&self) -> Real {
        self.a
    }

    /// Short-rate volatility.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// The fitted yield curve.
    pub fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.term_structure
    }

    /// The deterministic shift `φ(t)`.
    pub fn phi(&self, t: Time) -> Real {
        let f = self.term_structure.forward_rate(t, t);
        let g = self.sigma * (1.0 - (-self.a * t).exp()) / self.a;
        f + 0.5 * g * g
    }

    /// Short rate for the OU state `x` at time `t`.
    pub fn short_rate(&self, t: Time, x: Real) -> Real {
        x + self.phi(t)
    }

    /// The zero-level OU process driving `x = r − φ`.
    pub fn ou_process(&self) -> Result<OrnsteinUhlenbeckProcess> {
        OrnsteinUhlenbeckProcess::new(self.a, self.sigma, 0.0, 0.0)
    }
}

impl StochasticProcess1D for HullWhiteProcess {
    fn x0(&self) -> Real {
        self.phi(0.0)
    }

    fn drift(&self, t: Time, r: Real) -> Real {
        // θ(t) − a r with θ = φ' + a φ
        let h = 1.0e-4;
        let t1 = (t - h).max(0.0);
        let t2 = t1 + 2.0 * h;
        let dphi = (self.phi(t2) - self.phi(t1)) / (t2 - t1);
        dphi + self.a * (self.phi(t) - r)
    }

    fn diffusion(&self, _t: Time, _r: Real) -> Real {
        self.sigma
    }

    fn expectation(&self, t: Time, r: Real, dt: Time) -> Real {
        let x = r - self.phi(t);
        x * (-self.a * dt).exp() + self.phi(t + dt)
    }

    fn std_deviation(&self, t: Time, r: Real, dt: Time) -> Real {
        self.variance(t, r, dt).sqrt()
    }

    fn variance(&self, _t: Time, _r: Real, dt: Time) -> Real {
        self.sigma * self.sigma * (1.0 - (-2.0 * self.a * dt).exp()) / (2.0 * self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    #[test]
    fn phi_fits_flat_curve() {
        let hw = HullWhiteProcess::new(Arc::new(FlatForward::new(0.04)), 0.1, 0.01).unwrap();
        assert_abs_diff_eq!(hw.phi(0.0), 0.04, epsilon = 1e-12);
        let t: Real = 5.0;
        let g = 0.01 * (1.0 - (-0.5_f64).exp()) / 0.1;
        assert_abs_diff_eq!(hw.phi(t), 0.04 + 0.5 * g * g, epsilon = 1e-12);
        assert_abs_diff_eq!(hw.short_rate(t, 0.01), 0.01 + hw.phi(t), epsilon = 1e-15);
    }

    #[test]
    fn expectation_tracks_the_shift() {
        let hw = HullWhiteProcess::new(Arc::new(FlatForward::new(0.04)), 0.1, 0.01).unwrap();
        // starting on the shift, the mean stays on it
        assert_abs_diff_eq!(hw.expectation(1.0, hw.phi(1.0), 2.0), hw.phi(3.0), epsilon = 1e-14);
        assert!(HullWhiteProcess::new(Arc::new(FlatForward::new(0.04)), 0.0, 0.01).is_err());
    }
}
