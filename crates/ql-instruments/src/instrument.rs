//! Pricing-engine seam.
//!
//! Instruments are plain argument bundles; an engine turns the bundle into
//! [`PricingResults`].  There is no lazy recalculation: every call to
//! [`PricingEngine::calculate`] runs a fresh backward sweep.

use ql_core::{errors::Result, Real};

/// Value and sensitivities produced by an engine.
///
/// Greeks are `None` whenever the engine cannot produce them from its grid
/// (e.g. delta of a power plant with a non-spot state axis).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResults {
    /// Present value.
    pub value: Real,
    /// First derivative with respect to the underlying.
    pub delta: Option<Real>,
    /// Second derivative with respect to the underlying.
    pub gamma: Option<Real>,
    /// Time decay, per year.
    pub theta: Option<Real>,
}

impl PricingResults {
    /// Results carrying only a value.
    pub fn from_value(value: Real) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Attach the Greeks.
    pub fn with_greeks(mut self, delta: Real, gamma: Real, theta: Real) -> Self {
        self.delta = Some(delta);
        self.gamma = Some(gamma);
        self.theta = Some(theta);
        self
    }
}

/// Base trait for all pricing engines.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}
