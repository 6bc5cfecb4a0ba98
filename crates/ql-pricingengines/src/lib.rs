//! # ql-pricingengines
//!
//! Finite-difference pricing engines.  Each engine builds a mesh, a
//! terminal condition, step conditions and boundaries for its instrument,
//! hands them to a solver from `ql-methods` and reads the value (and,
//! where the model allows, the Greeks) back at the current state.
//!
//! ## Engines
//!
//! - [`FdBlackScholesVanillaEngine`]: European, Bermudan and American options, cash dividends, local volatility
//! - [`FdBlackScholesBarrierEngine`]: single barriers, continuous or discrete monitoring
//! - [`FdHestonVanillaEngine`] and [`FdBatesVanillaEngine`]: stochastic volatility, with jumps for Bates
//! - [`FdHestonHullWhiteVanillaEngine`]: Heston with stochastic short rates
//! - [`FdExtOUJumpVanillaEngine`]: Kluge power prices
//! - [`FdSimpleExtOUVppEngine`]: virtual power plant dispatch

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fd_bates_vanilla_engine;
pub mod fd_black_scholes_barrier_engine;
pub mod fd_black_scholes_vanilla_engine;
pub mod fd_ext_ou_jump_vanilla_engine;
pub mod fd_heston_hull_white_vanilla_engine;
pub mod fd_heston_vanilla_engine;
pub mod fd_simple_ext_ou_vpp_engine;

pub use fd_bates_vanilla_engine::FdBatesVanillaEngine;
pub use fd_black_scholes_barrier_engine::FdBlackScholesBarrierEngine;
pub use fd_black_scholes_vanilla_engine::{FdBlackScholesGrid, FdBlackScholesVanillaEngine};
pub use fd_ext_ou_jump_vanilla_engine::{FdExtOUJumpGrid, FdExtOUJumpVanillaEngine};
pub use fd_heston_hull_white_vanilla_engine::{FdHestonHullWhiteGrid, FdHestonHullWhiteVanillaEngine};
pub use fd_heston_vanilla_engine::{FdHestonGrid, FdHestonVanillaEngine};
pub use fd_simple_ext_ou_vpp_engine::{FdSimpleExtOUVppEngine, FdVppGrid, FuelCurve};
