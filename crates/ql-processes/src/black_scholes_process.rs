//! Generalized Black-Scholes process
//!
//! `d ln S = (r(t) − q(t) − σ²/2) dt + σ dW`
//!
//! The state handed to `evolve` is the spot level; drift and diffusion are
//! those of the log-spot.  The volatility used by the process itself is the
//! Black volatility; an optional local volatility surface is carried for
//! finite-difference operators that price under local volatility.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_termstructures::{
    BlackVolTermStructure, FlatForward, LocalVolTermStructure, YieldTermStructure,
};
use std::sync::Arc;

/// A generalized Black-Scholes(-Merton) stochastic process.
#[derive(Debug, Clone)]
pub struct GeneralizedBlackScholesProcess {
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
}

impl GeneralizedBlackScholesProcess {
    /// Create a new process; the spot must be positive.
    pub fn new(
        x0: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Result<Self> {
        ensure!(x0 > 0.0, "spot must be positive, got {x0}");
        Ok(Self {
            x0,
            risk_free_rate,
            dividend_yield,
            black_vol,
            local_vol: None,
        })
    }

    /// Attach a local volatility surface.
    pub fn with_local_vol(mut self, local_vol: Arc<dyn LocalVolTermStructure>) -> Self {
        self.local_vol = Some(local_vol);
        self
    }

    /// The spot price.
    pub fn spot(&self) -> Real {
        self.x0
    }

    /// The risk-free rate term structure.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// The dividend yield term structure.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// The Black volatility surface.
    pub fn black_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.black_vol
    }

    /// The local volatility surface, if one was attached.
    pub fn local_volatility(&self) -> Option<&Arc<dyn LocalVolTermStructure>> {
        self.local_vol.as_ref()
    }

    fn forward_variance(&self, t: Time, dt: Time, strike: Real) -> Real {
        let v1 = self.black_vol.black_variance(t, strike);
        let v2 = self.black_vol.black_variance(t + dt, strike);
        (v2 - v1).max(0.0)
    }

    fn log_drift_over(&self, t: Time, dt: Time, strike: Real) -> Real {
        let r = self.risk_free_rate.discount(t) / self.risk_free_rate.discount(t + dt);
        let q = self.dividend_yield.discount(t) / self.dividend_yield.discount(t + dt);
        (r / q).ln() - 0.5 * self.forward_variance(t, dt, strike)
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let sigma = self.black_vol.black_vol(t, x);
        let r = self.risk_free_rate.forward_rate(t, t);
        let q = self.dividend_yield.forward_rate(t, t);
        r - q - 0.5 * sigma * sigma
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.black_vol.black_vol(t, x)
    }

    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x * (self.log_drift_over(t, dt, x) + 0.5 * self.forward_variance(t, dt, x)).exp()
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.forward_variance(t, dt, x).sqrt()
    }

    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        x * (self.log_drift_over(t, dt, x) + self.std_deviation(t, x, dt) * dw).exp()
    }
}

/// A Black-Scholes process with no dividends.
pub fn black_scholes_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> Result<GeneralizedBlackScholesProcess> {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, Arc::new(FlatForward::new(0.0)), black_vol)
}

/// A Black-Scholes-Merton process with continuous dividend yield.
pub fn black_scholes_merton_process(
    x0: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
) -> Result<GeneralizedBlackScholesProcess> {
    GeneralizedBlackScholesProcess::new(x0, risk_free_rate, dividend_yield, black_vol)
}
