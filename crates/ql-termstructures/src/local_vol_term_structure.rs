//! `LocalVolTermStructure`: local volatility `σ(t, S)`.
//!
//! Evaluation is fallible: a surface may be undefined at the requested
//! point, or produce a value outside its numerical domain.

use crate::term_structure::TermStructure;
use ql_core::{errors::Result, Real, Time, Volatility};
use std::fmt;

/// A local-volatility term structure.
pub trait LocalVolTermStructure: TermStructure {
    /// Local volatility at time `t` and underlying level `underlying`.
    fn local_vol(&self, t: Time, underlying: Real) -> Result<Volatility>;
}

// ── LocalConstantVol ──────────────────────────────────────────────────────────

/// A constant local volatility surface.
#[derive(Debug, Clone, Copy)]
pub struct LocalConstantVol {
    volatility: Volatility,
}

impl LocalConstantVol {
    /// Create a constant local vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl TermStructure for LocalConstantVol {}

impl LocalVolTermStructure for LocalConstantVol {
    fn local_vol(&self, _t: Time, _underlying: Real) -> Result<Volatility> {
        Ok(self.volatility)
    }
}

// ── LocalVolFunction ──────────────────────────────────────────────────────────

type LocalVolFn = dyn Fn(Time, Real) -> Result<Volatility> + Send + Sync;

/// A local volatility surface given by a closure, e.g. a parametric smile.
pub struct LocalVolFunction {
    f: Box<LocalVolFn>,
}

impl LocalVolFunction {
    /// Wrap `f(t, s)`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Time, Real) -> Result<Volatility> + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }
}

impl fmt::Debug for LocalVolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalVolFunction").finish_non_exhaustive()
    }
}

impl TermStructure for LocalVolFunction {}

impl LocalVolTermStructure for LocalVolFunction {
    fn local_vol(&self, t: Time, underlying: Real) -> Result<Volatility> {
        (self.f)(t, underlying)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::Error;

    #[test]
    fn local_constant_vol_value() {
        let surface = LocalConstantVol::new(0.30);
        assert_abs_diff_eq!(surface.local_vol(1.0, 100.0).unwrap(), 0.30, epsilon = 1e-15);
    }

    #[test]
    fn function_surface_propagates_domain_errors() {
        let surface = LocalVolFunction::new(|_, s| {
            if s > 0.0 {
                Ok(0.2 + 0.1 * (100.0 / s).ln())
            } else {
                Err(Error::NumericalDomain(format!("level {s} not positive")))
            }
        });
        assert_abs_diff_eq!(surface.local_vol(0.5, 100.0).unwrap(), 0.2, epsilon = 1e-15);
        assert!(matches!(
            surface.local_vol(0.5, -1.0),
            Err(Error::NumericalDomain(_))
        ));
    }
}
