//! Extended Ornstein-Uhlenbeck process with a time-dependent level
//!
//! ```text
//! dX = a(b(t) − X) dt + σ dW
//! ```
//!
//! used for the deseasonalised log spot price of power and gas.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};
use std::fmt;
use std::sync::Arc;

/// Mean level `b(t)`.
pub type LevelFn = Arc<dyn Fn(Time) -> Real + Send + Sync>;

/// Extended Ornstein-Uhlenbeck process.
#[derive(Clone)]
pub struct ExtendedOrnsteinUhlenbeckProcess {
    speed: Real,
    sigma: Real,
    x0: Real,
    b: LevelFn,
}

impl ExtendedOrnsteinUhlenbeckProcess {
    /// Create the process; `speed` and `sigma` must be non-negative.
    pub fn new(speed: Real, sigma: Real, x0: Real, b: LevelFn) -> Result<Self> {
        ensure!(speed >= 0.0, "mean-reversion speed must be non-negative, got {speed}");
        ensure!(sigma >= 0.0, "volatility must be non-negative, got {sigma}");
        Ok(Self { speed, sigma, x0, b })
    }

    /// Speed of mean reversion.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.sigma
    }

    /// Mean level `b(t)`.
    pub fn level(&self, t: Time) -> Real {
        (self.b)(t)
    }
}

impl fmt::Debug for ExtendedOrnsteinUhlenbeckProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedOrnsteinUhlenbeckProcess")
            .field("speed", &self.speed)
            .field("sigma", &self.sigma)
            .field("x0", &self.x0)
            .finish_non_exhaustive()
    }
}

impl StochasticProcess1D for ExtendedOrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        self.speed * ((self.b)(t) - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.sigma
    }

    /// Mid-point discretisation of the level over `[t, t + dt]`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        let decay = (-self.speed * dt).exp();
        x * decay + (self.b)(t + 0.5 * dt) * (1.0 - decay)
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        if self.speed < 1e-15 {
            self.sigma * self.sigma * dt
        } else {
            0.5 * self.sigma * self.sigma / self.speed * (1.0 - (-2.0 * self.speed * dt).exp())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_level_matches_plain_ou() {
        let p = ExtendedOrnsteinUhlenbeckProcess::new(1.5, 0.2, 0.3, Arc::new(|_| 0.1)).unwrap();
        let expected = 0.1 + (0.3 - 0.1) * (-1.5_f64 * 0.7).exp();
        assert_abs_diff_eq!(p.expectation(0.0, 0.3, 0.7), expected, epsilon = 1e-14);
        assert_abs_diff_eq!(p.drift(0.0, 0.3), 1.5 * (0.1 - 0.3), epsilon = 1e-15);
    }

    #[test]
    fn level_is_sampled_at_the_mid_point() {
        let p = ExtendedOrnsteinUhlenbeckProcess::new(1.0, 0.2, 0.0, Arc::new(|t| t)).unwrap();
        let decay = (-0.5_f64).exp();
        assert_abs_diff_eq!(p.expectation(1.0, 0.0, 0.5), 1.25 * (1.0 - decay), epsilon = 1e-14);
    }
}
