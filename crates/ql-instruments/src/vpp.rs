//! Virtual power plant (swing) contract terms.
//!
//! A gas-fired plant bought as an option: in every hour of the exercise
//! schedule the holder decides to run at minimum or maximum load, to switch
//! off, or to start up, subject to minimum up and down times and an optional
//! cap on the number of starts.

use crate::exercise::Exercise;
use crate::instrument::{PricingEngine, PricingResults};
use ql_core::{ensure, errors::Result, Real};

/// Operational parameters of the plant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VppParams {
    /// Fuel units burnt per unit of power.
    pub heat_rate: Real,
    /// Minimum load while running.
    pub p_min: Real,
    /// Maximum load.
    pub p_max: Real,
    /// Minimum number of hours the plant must run once started.
    pub t_min_up: usize,
    /// Minimum number of hours the plant must stay off once stopped.
    pub t_min_down: usize,
    /// Fuel burnt by a start-up.
    pub start_up_fuel: Real,
    /// Fixed cost of a start-up.
    pub start_up_fix_cost: Real,
    /// Per-unit add-on to the fuel price (carbon certificates, transport).
    pub fuel_cost_addon: Real,
}

impl Default for VppParams {
    fn default() -> Self {
        Self {
            heat_rate: 2.5,
            p_min: 8.0,
            p_max: 40.0,
            t_min_up: 2,
            t_min_down: 2,
            start_up_fuel: 20.0,
            start_up_fix_cost: 100.0,
            fuel_cost_addon: 3.0,
        }
    }
}

impl VppParams {
    /// Validate the parameter set.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.heat_rate > 0.0, "heat rate must be positive");
        ensure!(
            0.0 <= self.p_min && self.p_min <= self.p_max,
            "need 0 <= p_min <= p_max, got p_min {} p_max {}",
            self.p_min,
            self.p_max
        );
        ensure!(self.t_min_up > 0, "minimum up time must be at least one hour");
        ensure!(self.t_min_down > 0, "minimum down time must be at least one hour");
        Ok(())
    }

    /// Cash flow of one hour at load `p` given the spark spread
    /// `power - heat_rate * fuel`; the fuel add-on is charged here.
    pub fn hourly_margin(&self, p: Real, spark_spread: Real) -> Real {
        p * (spark_spread - self.heat_rate * self.fuel_cost_addon)
    }

    /// Cost of one start-up at the given fuel price.
    pub fn start_up_cost(&self, fuel: Real) -> Real {
        self.start_up_fuel * (fuel + self.fuel_cost_addon) + self.start_up_fix_cost
    }
}

/// Arguments handed to a VPP engine.
#[derive(Debug, Clone)]
pub struct VppOptionArguments {
    /// Plant parameters.
    pub params: VppParams,
    /// Hourly decision times (year fractions).
    pub exercise: Exercise,
    /// Maximum number of start-ups; `None` means unlimited.
    pub n_starts: Option<usize>,
}

/// A virtual power plant option.
#[derive(Debug, Clone)]
pub struct VanillaVppOption {
    params: VppParams,
    exercise: Exercise,
    n_starts: Option<usize>,
}

impl VanillaVppOption {
    /// Create a new VPP option.
    pub fn new(params: VppParams, exercise: Exercise, n_starts: Option<usize>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            exercise,
            n_starts,
        })
    }

    /// Plant parameters.
    pub fn params(&self) -> &VppParams {
        &self.params
    }

    /// Decision times.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Start limit.
    pub fn n_starts(&self) -> Option<usize> {
        self.n_starts
    }

    /// Engine arguments.
    pub fn arguments(&self) -> VppOptionArguments {
        VppOptionArguments {
            params: self.params,
            exercise: self.exercise.clone(),
            n_starts: self.n_starts,
        }
    }

    /// Price this option using the given engine.
    pub fn price(&self, engine: &dyn PricingEngine<VppOptionArguments>) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn margin_and_start_cost() {
        let p = VppParams::default();
        // 40 * (50 - 2.5 * (10 + 3)), spark spread 50 - 2.5 * 10
        assert_abs_diff_eq!(p.hourly_margin(40.0, 25.0), 700.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.hourly_margin(0.0, 25.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.start_up_cost(10.0), 360.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_inverted_loads() {
        let p = VppParams {
            p_min: 50.0,
            ..VppParams::default()
        };
        let ex = Exercise::bermudan(vec![0.0, 1.0]).unwrap();
        assert!(VanillaVppOption::new(p, ex, None).is_err());
    }
}
