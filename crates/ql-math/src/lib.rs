//! # ql-math
//!
//! Numerical building blocks of the finite-difference framework: the
//! `Array` vector newtype (over nalgebra), cubic and bicubic splines,
//! Gaussian quadrature and adaptive Simpson integration, Brent root
//! finding, the BiCGStab Krylov solver and the normal and non-central
//! chi-square distributions (via statrs).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Dynamically sized vector newtype.
pub mod array;

/// Preconditioned BiCGStab linear solver.
pub mod bicgstab;

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use comparison::close_enough;
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf, NonCentralChiSquare};
