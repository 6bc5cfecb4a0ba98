//! Probability distributions used by the process-driven meshers.

pub mod chi_square;
pub mod normal;

pub use chi_square::NonCentralChiSquare;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
