//! # ql-processes
//!
//! Stochastic process definitions consumed by the finite-difference
//! meshers and operators: Black-Scholes, Heston, Bates, Ornstein-Uhlenbeck
//! (plain and extended), the Kluge jump model and Hull-White.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bates_process;
pub mod black_scholes_process;
pub mod ext_ou_with_jumps_process;
pub mod extended_ornstein_uhlenbeck_process;
pub mod heston_process;
pub mod hull_white_process;
pub mod ornstein_uhlenbeck_process;
pub mod stochastic_process;

pub use bates_process::BatesProcess;
pub use black_scholes_process::{
    black_scholes_merton_process, black_scholes_process, GeneralizedBlackScholesProcess,
};
pub use ext_ou_with_jumps_process::ExtOUWithJumpsProcess;
pub use extended_ornstein_uhlenbeck_process::{ExtendedOrnsteinUhlenbeckProcess, LevelFn};
pub use heston_process::HestonProcess;
pub use hull_white_process::HullWhiteProcess;
pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use stochastic_process::StochasticProcess1D;
