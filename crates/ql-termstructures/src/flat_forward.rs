//! `FlatForward`: a yield curve with a constant continuously compounded
//! rate.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{DiscountFactor, Rate, Time};

/// A flat (constant) forward-rate yield term structure,
/// `P(t) = exp(-r t)`.
#[derive(Debug, Clone, Copy)]
pub struct FlatForward {
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve from a continuously compounded rate.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// The continuously compounded flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl TermStructure for FlatForward {}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }
}
