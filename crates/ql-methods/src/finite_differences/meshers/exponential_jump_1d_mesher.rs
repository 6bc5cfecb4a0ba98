//! Mesh for the jump factor of the Kluge model.
//!
//! The jump level `y` mean-reverts at speed β and receives exponentially
//! distributed jumps (mean `1/η`) at rate λ.  Its stationary law is
//! approximated by an exponential with mean `scale/η`, where
//! `scale = 1/(1 - e^{-β/λ})`, and the mesh places nodes at equally
//! spaced probabilities of that law.

use super::Fdm1dMesher;
use ql_core::{ensure, errors::Result, Real};

/// Builder for the jump direction of a Kluge grid.
pub struct ExponentialJump1dMesher;

impl ExponentialJump1dMesher {
    /// Build with tail probability `1e-3`.
    pub fn build(size: usize, beta: Real, jump_intensity: Real, eta: Real) -> Result<Fdm1dMesher> {
        Self::build_with_eps(size, beta, jump_intensity, eta, 1e-3)
    }

    /// Build leaving tail probability `eps` outside the mesh.
    pub fn build_with_eps(
        size: usize,
        beta: Real,
        jump_intensity: Real,
        eta: Real,
        eps: Real,
    ) -> Result<Fdm1dMesher> {
        ensure!(size >= 2, "a mesh needs at least two points, got {size}");
        ensure!(beta > 0.0, "mean reversion must be positive, got {beta}");
        ensure!(jump_intensity > 0.0, "jump intensity must be positive, got {jump_intensity}");
        ensure!(eta > 0.0, "jump decay must be positive, got {eta}");
        ensure!(0.0 < eps && eps < 1.0, "tail probability must lie in (0, 1), got {eps}");

        let scale = 1.0 / (1.0 - (-beta / jump_intensity).exp());
        let last = (size - 1) as Real;
        let locations = (0..size)
            .map(|i| {
                let p = i as Real * (1.0 - eps) / last;
                scale * (-(1.0 - p).ln() / eta)
            })
            .collect();
        Fdm1dMesher::predefined(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn starts_at_zero_and_covers_the_tail() {
        let m = ExponentialJump1dMesher::build(50, 5.0, 4.0, 2.0).unwrap();
        assert_eq!(m.location(0), 0.0);
        let scale = 1.0 / (1.0 - (-5.0_f64 / 4.0).exp());
        assert_abs_diff_eq!(m.location(49), scale * (1e3_f64).ln() / 2.0, epsilon = 1e-10);
        // denser near zero
        assert!(m.dplus(0).unwrap() < m.dminus(49).unwrap());
    }
}
