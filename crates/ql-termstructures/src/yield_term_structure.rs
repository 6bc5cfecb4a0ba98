//! `YieldTermStructure`: discount factors and continuously compounded
//! zero and forward rates as functions of time.

use crate::term_structure::TermStructure;
use ql_core::{DiscountFactor, Rate, Real, Time};

/// Small time step used for instantaneous forward rate computations.
const DT: Real = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors provide **exactly one** of the three low-level methods:
///
/// * [`discount_impl`](YieldTermStructure::discount_impl)
/// * [`zero_rate_impl`](YieldTermStructure::zero_rate_impl)
/// * [`forward_rate_impl`](YieldTermStructure::forward_rate_impl)
///
/// the other two follow from the relations between them.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor `P(0, t)`.
    ///
    /// Default: computed from `zero_rate_impl`.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// Continuously compounded zero rate for time `t`.
    ///
    /// Default: computed from `discount_impl`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        if t == 0.0 {
            return self.forward_rate_impl(0.0);
        }
        -self.discount_impl(t).ln() / t
    }

    /// Instantaneous forward rate at time `t`.
    ///
    /// Default: central difference of `ln P`.
    fn forward_rate_impl(&self, t: Time) -> Rate {
        let t1 = (t - DT / 2.0).max(0.0);
        let t2 = t1 + DT;
        (self.discount_impl(t1).ln() - self.discount_impl(t2).ln()) / (t2 - t1)
    }

    // ── Public interface ─────────────────────────────────────────────────

    /// Discount factor for a time.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Continuously compounded zero rate for time `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        self.zero_rate_impl(t)
    }

    /// Continuously compounded forward rate over `[t1, t2]`; the
    /// instantaneous forward when the two times coincide.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        if (t2 - t1).abs() < Real::EPSILON {
            return self.forward_rate_impl(t1);
        }
        (self.discount_impl(t1) / self.discount_impl(t2)).ln() / (t2 - t1)
    }
}
