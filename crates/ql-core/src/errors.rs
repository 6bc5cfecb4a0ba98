//! Error types for the finite-difference framework.
//!
//! Every fallible operation in the workspace returns [`Result`], carrying a
//! single `thiserror`-derived [`Error`].  Construction-time contract
//! violations are raised through the `ensure!` and `ensure_post!` macros,
//! unconditional failures through `fail!`.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated: malformed mesh, dimension mismatch, stopping
    /// time outside the pricing horizon, unsupported configuration.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// A model quantity left its numerical domain (negative local
    /// volatility, non-converging cell quadrature, ...).
    #[error("numerical domain error: {0}")]
    NumericalDomain(String),

    /// An iterative method exhausted its iteration budget.
    #[error(
        "{method} did not converge after {iterations} iterations \
         (residual {residual:e}, tolerance {tolerance:e})"
    )]
    Convergence {
        /// Name of the iterative method.
        method: &'static str,
        /// Iterations performed.
        iterations: usize,
        /// Residual reached when the budget ran out.
        residual: f64,
        /// Requested tolerance.
        tolerance: f64,
    },

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> ql_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_dim(n: usize) -> Result<usize> {
        ensure!(n > 0, "zero extent");
        Ok(n)
    }

    #[test]
    fn ensure_raises_precondition() {
        assert_eq!(checked_dim(3), Ok(3));
        assert_eq!(
            checked_dim(0),
            Err(Error::Precondition("zero extent".to_string()))
        );
    }

    #[test]
    fn convergence_message_carries_residual() {
        let e = Error::Convergence {
            method: "BiCGStab",
            iterations: 10,
            residual: 1e-3,
            tolerance: 1e-8,
        };
        let msg = e.to_string();
        assert!(msg.contains("BiCGStab"));
        assert!(msg.contains("10 iterations"));
        assert!(msg.contains("1e-3"));
    }
}
