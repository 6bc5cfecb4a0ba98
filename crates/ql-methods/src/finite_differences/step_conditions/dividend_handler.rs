use super::StepCondition;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::interpolations::{Interpolation1D, LinearInterpolation};
use ql_math::{close_enough, Array};
use std::sync::Arc;

/// Discrete cash dividends on a log-spot direction.
///
/// Across a dividend date the spot drops by the amount, so the value just
/// before the date at spot `S` equals the value just after it at
/// `max(S_min, S - D)`.  Each grid line along the equity direction is
/// re-interpolated linearly in spot space.
#[derive(Debug, Clone)]
pub struct FdmDividendHandler {
    dividend_times: Vec<Time>,
    amounts: Vec<Real>,
    mesher: Arc<dyn FdmMesher>,
    equity_direction: usize,
    spots: Vec<Real>,
}

impl FdmDividendHandler {
    /// Handler for `(time, amount)` pairs along `equity_direction`.
    pub fn new(dividends: &[(Time, Real)], mesher: Arc<dyn FdmMesher>, equity_direction: usize) -> Result<Self> {
        let layout = mesher.layout().clone();
        ensure!(
            equity_direction < layout.dimensions(),
            "equity direction {equity_direction} outside a {}-dimensional mesh",
            layout.dimensions()
        );
        let n = layout.dim()[equity_direction];
        ensure!(n >= 2, "dividend handling needs at least two spot points");

        let mut sorted = dividends.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        ensure!(
            sorted.iter().all(|&(t, d)| t >= 0.0 && d.is_finite()),
            "dividend times must be non-negative and amounts finite"
        );

        let stride = layout.spacing()[equity_direction];
        let mut spots = Vec::with_capacity(n);
        for iter in layout.iter().step_by(stride).take(n) {
            spots.push(mesher.location(&iter, equity_direction).exp());
        }

        Ok(Self {
            dividend_times: sorted.iter().map(|d| d.0).collect(),
            amounts: sorted.iter().map(|d| d.1).collect(),
            mesher,
            equity_direction,
            spots,
        })
    }

    /// Sorted dividend times.
    pub fn dividend_times(&self) -> &[Time] {
        &self.dividend_times
    }

    /// Dividend amounts, aligned with [`dividend_times`](Self::dividend_times).
    pub fn amounts(&self) -> &[Real] {
        &self.amounts
    }
}

impl StepCondition for FdmDividendHandler {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let dividend: Real = self
            .dividend_times
            .iter()
            .zip(&self.amounts)
            .filter(|(&dt, _)| close_enough(dt, t))
            .map(|(_, &d)| d)
            .sum();
        if dividend == 0.0 {
            return Ok(());
        }

        let layout = self.mesher.layout();
        let stride = layout.spacing()[self.equity_direction];
        let n = self.spots.len();
        let mut line = vec![0.0; n];
        for iter in layout.iter().filter(|it| it.coordinates()[self.equity_direction] == 0) {
            let base = iter.index();
            for (k, v) in line.iter_mut().enumerate() {
                *v = a[base + k * stride];
            }
            let interp = LinearInterpolation::new(&self.spots, &line)?;
            for (k, &s) in self.spots.iter().enumerate() {
                a[base + k * stride] = interp.value((s - dividend).max(self.spots[0]));
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.dividend_times.clone()
    }
}
