//! `TermStructure`: base trait for all time-parametrised curves and
//! surfaces.
//!
//! Time is a year fraction measured from the valuation point; there are no
//! dates or day counters in the finite-difference workspace.

use ql_core::{ensure, errors::Result, Time};

/// Base trait for all term structures.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The latest time for which the structure can be used.
    fn max_time(&self) -> Time {
        Time::INFINITY
    }

    /// Check that `t` is inside `[0, max_time]`.
    fn check_range(&self, t: Time) -> Result<()> {
        ensure!(
            t >= 0.0 && t <= self.max_time(),
            "time {t} outside term structure range [0, {}]",
            self.max_time()
        );
        Ok(())
    }
}
