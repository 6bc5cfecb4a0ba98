//! # ql-instruments
//!
//! Contract terms priced by the finite-difference engines: payoffs, exercise
//! schedules in year fractions, cash dividends, barrier options and virtual
//! power plants.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dividend;
pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;
pub mod vpp;

pub use dividend::{Dividend, DividendSchedule};
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::{
    BarrierOption, BarrierOptionArguments, BarrierType, VanillaOption, VanillaOptionArguments,
};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
pub use vpp::{VanillaVppOption, VppOptionArguments, VppParams};
