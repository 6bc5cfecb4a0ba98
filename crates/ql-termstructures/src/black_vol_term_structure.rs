//! `BlackVolTermStructure`: Black implied volatility and variance as
//! functions of time and strike.

use crate::term_structure::TermStructure;
use ql_core::{ensure, errors::Result, Real, Time, Volatility};

/// A Black-volatility term structure.
///
/// Implementors provide **exactly one** of
/// [`black_vol_impl`](BlackVolTermStructure::black_vol_impl) (σ(t, k)) or
/// [`black_variance_impl`](BlackVolTermStructure::black_variance_impl)
/// (σ²·t); the other is derived.
pub trait BlackVolTermStructure: TermStructure {
    /// Black volatility for time `t` and strike `strike`.
    fn black_vol_impl(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            return 0.0;
        }
        (self.black_variance_impl(t, strike) / t).sqrt()
    }

    /// Black variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance_impl(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol_impl(t, strike);
        vol * vol * t
    }

    /// Black volatility for a time and strike.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        self.black_vol_impl(t, strike)
    }

    /// Black variance for a time and strike.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        self.black_variance_impl(t, strike)
    }

    /// Forward variance accumulated over `[t1, t2]`.
    fn black_forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Result<Real> {
        ensure!(t2 >= t1, "forward variance needs t1 <= t2, got [{t1}, {t2}]");
        Ok(self.black_variance_impl(t2, strike) - self.black_variance_impl(t1, strike))
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// A flat (constant) Black volatility surface.
#[derive(Debug, Clone, Copy)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl TermStructure for BlackConstantVol {}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol_impl(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }

    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        self.volatility * self.volatility * t
    }
}

// ── BlackVarianceCurve ────────────────────────────────────────────────────────

/// Strike-independent Black volatility given at time pillars; total
/// variance is interpolated linearly in time and extrapolated with the
/// last forward variance rate.
#[derive(Debug, Clone)]
pub struct BlackVarianceCurve {
    times: Vec<Time>,
    variances: Vec<Real>,
}

impl BlackVarianceCurve {
    /// Build from strictly increasing positive times and the Black
    /// volatilities quoted at them.
    pub fn new(times: &[Time], vols: &[Volatility]) -> Result<Self> {
        ensure!(!times.is_empty(), "at least one pillar required");
        ensure!(times.len() == vols.len(), "times and volatilities differ in length");
        ensure!(times[0] > 0.0, "first pillar must be after t = 0");
        ensure!(
            times.windows(2).all(|w| w[1] > w[0]),
            "pillar times must be strictly increasing"
        );
        let mut ts = Vec::with_capacity(times.len() + 1);
        let mut vs = Vec::with_capacity(times.len() + 1);
        ts.push(0.0);
        vs.push(0.0);
        for (&t, &v) in times.iter().zip(vols) {
            let var = v * v * t;
            ensure!(
                var >= vs[vs.len() - 1],
                "total variance must be non-decreasing (at t = {t})"
            );
            ts.push(t);
            vs.push(var);
        }
        Ok(Self {
            times: ts,
            variances: vs,
        })
    }
}

impl TermStructure for BlackVarianceCurve {}

impl BlackVolTermStructure for BlackVarianceCurve {
    fn black_variance_impl(&self, t: Time, _strike: Real) -> Real {
        let n = self.times.len();
        let i = match self.times.iter().position(|&ti| ti >= t) {
            Some(0) => return 0.0,
            Some(i) => i,
            None => n - 1,
        };
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.variances[i - 1], self.variances[i]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}
