//! Discrete cash dividends.

use ql_core::{ensure, errors::Result, Real, Time};

/// A cash dividend paid at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dividend {
    /// Payment time.
    pub time: Time,
    /// Cash amount.
    pub amount: Real,
}

/// Cash dividends sorted by payment time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DividendSchedule {
    dividends: Vec<Dividend>,
}

impl DividendSchedule {
    /// Build a schedule from `(time, amount)` pairs.
    pub fn new(dividends: &[(Time, Real)]) -> Result<Self> {
        ensure!(
            dividends.iter().all(|&(t, a)| t >= 0.0 && a >= 0.0),
            "dividend times and amounts must be non-negative"
        );
        let mut dividends: Vec<Dividend> = dividends
            .iter()
            .map(|&(time, amount)| Dividend { time, amount })
            .collect();
        dividends.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { dividends })
    }

    /// No dividends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dividends in payment order.
    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }

    /// `true` if there are no dividends.
    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty()
    }

    /// Dividends paid in `[0, t]`.
    pub fn up_to(&self, t: Time) -> impl Iterator<Item = &Dividend> {
        self.dividends.iter().filter(move |d| d.time <= t)
    }
}
