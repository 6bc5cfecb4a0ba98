//! # quantlib
//!
//! Finite-difference pricing of equity, hybrid and commodity derivatives.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib::instruments::{OptionType, VanillaOption};
//! use quantlib::pricingengines::FdBlackScholesVanillaEngine;
//! use quantlib::processes::GeneralizedBlackScholesProcess;
//! use quantlib::termstructures::{BlackConstantVol, FlatForward};
//! use std::sync::Arc;
//!
//! let process = GeneralizedBlackScholesProcess::new(
//!     100.0,
//!     Arc::new(FlatForward::new(0.05)),
//!     Arc::new(FlatForward::new(0.0)),
//!     Arc::new(BlackConstantVol::new(0.2)),
//! )?;
//! let engine = FdBlackScholesVanillaEngine::new(Arc::new(process));
//! let put = VanillaOption::european(OptionType::Put, 100.0, 1.0)?;
//! let results = put.price(&engine)?;
//! assert!((results.value - 5.5735).abs() < 5e-2);
//! # Ok::<(), quantlib::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, interpolation, quadrature and linear solvers.
pub use ql_math as math;

/// Yield and volatility term structures.
pub use ql_termstructures as termstructures;

/// Stochastic process definitions.
pub use ql_processes as processes;

/// The finite-difference framework: meshers, operators, schemes, step
/// conditions and solvers.
pub use ql_methods as methods;

/// Payoffs, exercises and instruments.
pub use ql_instruments as instruments;

/// Finite-difference pricing engines.
pub use ql_pricingengines as pricingengines;
