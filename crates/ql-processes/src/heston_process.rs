//! Heston stochastic volatility process
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```
//!
//! The finite-difference framework only reads the parameters and curves;
//! path simulation is not part of this workspace.

use ql_core::{ensure, errors::Result, Real};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// The Heston stochastic volatility process.
///
/// * `v0`   : initial variance
/// * `kappa`: mean-reversion speed of variance
/// * `theta`: long-run variance level
/// * `sigma`: vol-of-vol
/// * `rho`  : correlation between the two Brownian motions
#[derive(Debug, Clone)]
pub struct HestonProcess {
    s0: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
}

impl HestonProcess {
    /// Create a new Heston process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        s0: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!((-1.0..=1.0).contains(&rho), "correlation ρ must be in [-1, 1], got {rho}");
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa > 0.0, "mean reversion speed must be positive, got {kappa}");
        ensure!(theta > 0.0, "long-run variance must be positive, got {theta}");
        ensure!(sigma > 0.0, "vol-of-vol must be positive, got {sigma}");

        Ok(Self {
            s0,
            v0,
            kappa,
            theta,
            sigma,
            rho,
            risk_free_rate,
            dividend_yield,
        })
    }

    /// Spot price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Risk-free rate.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// `true` when `2κθ >= σ²` and the variance never reaches zero.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_termstructures::FlatForward;

    fn curves() -> (Arc<dyn YieldTermStructure>, Arc<dyn YieldTermStructure>) {
        (Arc::new(FlatForward::new(0.05)), Arc::new(FlatForward::new(0.0)))
    }

    #[test]
    fn parameters_are_validated() {
        let (r, q) = curves();
        assert!(HestonProcess::new(r.clone(), q.clone(), 100.0, 0.04, 2.5, 0.04, 0.66, -0.8).is_ok());
        assert!(HestonProcess::new(r.clone(), q.clone(), 100.0, 0.04, 2.5, 0.04, 0.66, -1.2).is_err());
        assert!(HestonProcess::new(r.clone(), q.clone(), 100.0, -0.01, 2.5, 0.04, 0.66, 0.0).is_err());
        assert!(HestonProcess::new(r, q, 100.0, 0.04, 2.5, 0.04, 0.0, 0.0).is_err());
    }

    #[test]
    fn feller_condition() {
        let (r, q) = curves();
        let p = HestonProcess::new(r.clone(), q.clone(), 100.0, 0.04, 2.5, 0.04, 0.66, -0.8).unwrap();
        assert!(!p.feller_satisfied());
        let p = HestonProcess::new(r, q, 100.0, 0.04, 2.5, 0.04, 0.3, -0.8).unwrap();
        assert!(p.feller_satisfied());
    }
}
