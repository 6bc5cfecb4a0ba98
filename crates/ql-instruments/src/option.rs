//! Vanilla and barrier options on a single underlying.
//!
//! Both instruments are thin bundles of payoff, exercise and (for barriers)
//! the knock level; engines receive them as `*Arguments`.

use crate::exercise::Exercise;
use crate::instrument::{PricingEngine, PricingResults};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use ql_core::{ensure, errors::Result, Real, Time};
use std::sync::Arc;

/// Arguments needed for pricing a one-asset option.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
}

/// A plain vanilla option on a single underlying asset.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
}

impl VanillaOption {
    /// Create a new vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// European call or put expiring at `expiry` (year fraction).
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self {
            payoff: Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise: Exercise::european(expiry)?,
        })
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The option type.
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.payoff
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Engine arguments.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

/// Barrier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierType {
    /// Becomes active when the underlying drops below the barrier.
    DownIn,
    /// Becomes active when the underlying rises above the barrier.
    UpIn,
    /// Expires when the underlying drops below the barrier.
    DownOut,
    /// Expires when the underlying rises above the barrier.
    UpOut,
}

impl BarrierType {
    /// `true` for the knock-in variants.
    pub fn is_knock_in(self) -> bool {
        matches!(self, BarrierType::DownIn | BarrierType::UpIn)
    }

    /// The knock-out variant on the same side.
    pub fn knock_out_counterpart(self) -> Self {
        match self {
            BarrierType::DownIn | BarrierType::DownOut => BarrierType::DownOut,
            BarrierType::UpIn | BarrierType::UpOut => BarrierType::UpOut,
        }
    }

    /// `true` if `spot` has already crossed the barrier.
    pub fn triggered(self, spot: Real, barrier: Real) -> bool {
        match self {
            BarrierType::DownIn | BarrierType::DownOut => spot < barrier,
            BarrierType::UpIn | BarrierType::UpOut => spot > barrier,
        }
    }
}

/// Arguments for a barrier option.
#[derive(Debug, Clone)]
pub struct BarrierOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
    /// Barrier type.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub barrier: Real,
    /// Cash paid on knock-out (out options) or at expiry if never knocked in.
    pub rebate: Real,
}

/// A continuously monitored single-barrier option.
#[derive(Debug, Clone)]
pub struct BarrierOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    barrier_type: BarrierType,
    barrier: Real,
    rebate: Real,
}

impl BarrierOption {
    /// Create a new barrier option.
    pub fn new(
        payoff: Arc<dyn StrikedPayoff>,
        exercise: Exercise,
        barrier_type: BarrierType,
        barrier: Real,
        rebate: Real,
    ) -> Result<Self> {
        ensure!(barrier > 0.0, "barrier must be positive, got {barrier}");
        ensure!(rebate >= 0.0, "rebate must be non-negative, got {rebate}");
        Ok(Self {
            payoff,
            exercise,
            barrier_type,
            barrier,
            rebate,
        })
    }

    /// The barrier type.
    pub fn barrier_type(&self) -> BarrierType {
        self.barrier_type
    }

    /// The barrier level.
    pub fn barrier(&self) -> Real {
        self.barrier
    }

    /// The rebate.
    pub fn rebate(&self) -> Real {
        self.rebate
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Engine arguments.
    pub fn arguments(&self) -> BarrierOptionArguments {
        BarrierOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
            barrier_type: self.barrier_type,
            barrier: self.barrier,
            rebate: self.rebate,
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<BarrierOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}
