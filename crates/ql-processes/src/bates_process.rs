//! Bates stochastic-volatility jump-diffusion process
//!
//! A Heston process plus log-normal jumps in the asset:
//!
//! ```text
//! dS/S = (r − q − λ m) dt + √v dW₁ + (J − 1) dN
//! dv   = κ(θ − v) dt + σ √v dW₂
//! ```
//!
//! with jump intensity `λ`, `ln J ~ N(ν, δ²)` and compensator
//! `m = exp(ν + δ²/2) − 1`.

use crate::heston_process::HestonProcess;
use ql_core::{ensure, errors::Result, Real};

/// A Bates jump-diffusion stochastic volatility process.
#[derive(Debug, Clone)]
pub struct BatesProcess {
    heston: HestonProcess,
    lambda: Real,
    nu: Real,
    delta: Real,
}

impl BatesProcess {
    /// Extend `heston` with jumps of intensity `lambda`, log-jump mean `nu`
    /// and log-jump volatility `delta`.
    pub fn new(heston: HestonProcess, lambda: Real, nu: Real, delta: Real) -> Result<Self> {
        ensure!(lambda >= 0.0, "jump intensity must be non-negative, got {lambda}");
        ensure!(delta >= 0.0, "jump volatility must be non-negative, got {delta}");
        Ok(Self {
            heston,
            lambda,
            nu,
            delta,
        })
    }

    /// The diffusive part.
    pub fn heston(&self) -> &HestonProcess {
        &self.heston
    }

    /// Jump intensity λ.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Mean of the log-jump size ν.
    pub fn nu(&self) -> Real {
        self.nu
    }

    /// Volatility of the log-jump size δ.
    pub fn delta(&self) -> Real {
        self.delta
    }

    /// Jump compensator `m = exp(ν + δ²/2) − 1`.
    pub fn jump_compensator(&self) -> Real {
        (self.nu + 0.5 * self.delta * self.delta).exp() - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_termstructures::FlatForward;
    use std::sync::Arc;

    #[test]
    fn compensator() {
        let heston = HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            100.0,
            0.04,
            1.0,
            0.04,
            0.3,
            -0.5,
        )
        .unwrap();
        let bp = BatesProcess::new(heston, 1.0, -0.1, 0.15).unwrap();
        let expected = (-0.1 + 0.5 * 0.0225_f64).exp() - 1.0;
        assert!((bp.jump_compensator() - expected).abs() < 1e-12);
        assert!(BatesProcess::new(bp.heston().clone(), -1.0, 0.0, 0.1).is_err());
    }
}
