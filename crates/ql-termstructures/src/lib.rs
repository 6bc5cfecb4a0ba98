//! # ql-termstructures
//!
//! Time-parametrised yield curves and volatility surfaces consumed by the
//! finite-difference operators and boundary conditions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: discount factors, zero and forward rates.
pub mod yield_term_structure;

/// `FlatForward`: constant-rate yield curve.
pub mod flat_forward;

/// `InterpolatedZeroCurve`: zero-rate interpolated yield curve.
pub mod interpolated_zero_curve;

/// `BlackVolTermStructure`, `BlackConstantVol` and `BlackVarianceCurve`.
pub mod black_vol_term_structure;

/// `LocalVolTermStructure`, `LocalConstantVol` and `LocalVolFunction`.
pub mod local_vol_term_structure;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_vol_term_structure::{BlackConstantVol, BlackVarianceCurve, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use interpolated_zero_curve::InterpolatedZeroCurve;
pub use local_vol_term_structure::{LocalConstantVol, LocalVolFunction, LocalVolTermStructure};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
