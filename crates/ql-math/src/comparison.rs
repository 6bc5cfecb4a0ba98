//! Floating-point comparison used for grid points and stopping times.

use ql_core::Real;

/// Number of machine epsilons tolerated by [`close_enough`].
const ULPS: Real = 42.0;

/// Return `true` if `a` and `b` agree up to a few machine epsilons,
/// measured relative to the smaller magnitude of the two.
///
/// Values that are exactly equal (including two zeros) always compare
/// close; a zero compared with a non-zero never does.
#[inline]
pub fn close_enough(a: Real, b: Real) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let tolerance = ULPS * Real::EPSILON;
    diff <= tolerance * a.abs() || diff <= tolerance * b.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_rounding_in_time_arithmetic() {
        let t = 0.1 + 0.2;
        assert!(close_enough(t, 0.3));
        assert!(close_enough(0.0, 0.0));
        assert!(!close_enough(0.0, 1e-300));
        assert!(!close_enough(1.0, 1.0 + 1e-10));
    }
}
