//! `StochasticProcess1D`: the narrow process interface consumed by the
//! finite-difference meshers.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift,
//! diffusion and a discretisation `evolve` that advances the state given a
//! standard normal draw.  Process-driven meshers only ever call `evolve`
//! with a normal quantile in place of the draw.

use ql_core::{Real, Time};

/// A 1-dimensional stochastic process.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// Expected value `E[x(t+Δt) | x(t) = x]`.
    ///
    /// Default: Euler step.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Standard deviation of `x(t+Δt)` given `x(t) = x`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion(t, x) * dt.sqrt()
    }

    /// Variance of `x(t+Δt)` given `x(t) = x`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.std_deviation(t, x, dt);
        s * s
    }

    /// Advance `x` from `t` by `dt` for the standard normal draw `dw`.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// dX = 0.05·dt + 0.20·dW
    #[derive(Debug)]
    struct ConstantProcess;

    impl StochasticProcess1D for ConstantProcess {
        fn x0(&self) -> Real {
            100.0
        }

        fn drift(&self, _t: Time, _x: Real) -> Real {
            0.05
        }

        fn diffusion(&self, _t: Time, _x: Real) -> Real {
            0.20
        }
    }

    #[test]
    fn euler_defaults() {
        let p = ConstantProcess;
        assert_abs_diff_eq!(p.evolve(0.0, 100.0, 1.0, 0.0), 100.05, epsilon = 1e-12);
        assert_abs_diff_eq!(p.evolve(0.0, 100.0, 1.0, 1.0), 100.25, epsilon = 1e-12);
        assert_abs_diff_eq!(p.variance(0.0, 100.0, 0.25), 0.01, epsilon = 1e-15);
    }
}
