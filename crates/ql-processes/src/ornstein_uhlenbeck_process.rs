//! Ornstein-Uhlenbeck mean-reverting process
//!
//! ```text
//! dX = a(b − X) dt + σ dW
//! ```
//!
//! where `a` is the speed of mean reversion, `b` is the long-run level,
//! and `σ` is the constant volatility.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};

/// An Ornstein-Uhlenbeck mean-reverting process.
///
/// Closed-form expectation and variance:
/// ```text
/// E[X(t+dt) | X(t)] = level + (X(t) − level) · exp(−speed · dt)
/// Var[X(t+dt) | X(t)] = σ² / (2·speed) · (1 − exp(−2·speed·dt))
/// ```
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckProcess {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeckProcess {
    /// Create a new Ornstein-Uhlenbeck process with speed `a >= 0`,
    /// volatility `σ >= 0`, initial value `x0` and long-run `level`.
    pub fn new(speed: Real, volatility: Real, x0: Real, level: Real) -> Result<Self> {
        ensure!(speed >= 0.0, "mean-reversion speed must be non-negative, got {speed}");
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            x0,
            speed,
            level,
            volatility,
        })
    }

    /// Speed of mean reversion.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level.
    pub fn level(&self) -> Real {
        self.level
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }
}

impl StochasticProcess1D for OrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        if self.speed < 1e-15 {
            // no mean reversion: Brownian motion
            self.volatility * self.volatility * dt
        } else {
            self.volatility * self.volatility * (1.0 - (-2.0 * self.speed * dt).exp())
                / (2.0 * self.speed)
        }
    }
}
