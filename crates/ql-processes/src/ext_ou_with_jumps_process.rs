//! Kluge model: extended Ornstein-Uhlenbeck diffusion plus a mean-reverting
//! jump component
//!
//! ```text
//! S(t) = exp(X(t) + Y(t))
//! dX = a(b(t) − X) dt + σ dW
//! dY = −β Y dt + J dN,   J ~ Exp(η),  N Poisson with intensity λ
//! ```

use crate::extended_ornstein_uhlenbeck_process::ExtendedOrnsteinUhlenbeckProcess;
use ql_core::{ensure, errors::Result, Real};
use std::sync::Arc;

/// Extended OU process with exponentially distributed jumps.
#[derive(Debug, Clone)]
pub struct ExtOUWithJumpsProcess {
    ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    y0: Real,
    beta: Real,
    jump_intensity: Real,
    eta: Real,
}

impl ExtOUWithJumpsProcess {
    /// Create the process from its diffusive part, the initial jump level
    /// `y0`, jump mean reversion `beta`, intensity `jump_intensity` and the
    /// exponential jump size parameter `eta` (mean jump `1/eta`).
    pub fn new(
        ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        y0: Real,
        beta: Real,
        jump_intensity: Real,
        eta: Real,
    ) -> Result<Self> {
        ensure!(beta > 0.0, "jump mean reversion must be positive, got {beta}");
        ensure!(jump_intensity >= 0.0, "jump intensity must be non-negative, got {jump_intensity}");
        ensure!(eta > 0.0, "jump size parameter must be positive, got {eta}");
        Ok(Self {
            ou,
            y0,
            beta,
            jump_intensity,
            eta,
        })
    }

    /// The diffusive component.
    pub fn ou_process(&self) -> &Arc<ExtendedOrnsteinUhlenbeckProcess> {
        &self.ou
    }

    /// Initial jump level.
    pub fn y0(&self) -> Real {
        self.y0
    }

    /// Mean reversion of the jump component.
    pub fn beta(&self) -> Real {
        self.beta
    }

    /// Jump intensity λ.
    pub fn jump_intensity(&self) -> Real {
        self.jump_intensity
    }

    /// Exponential jump size parameter η.
    pub fn eta(&self) -> Real {
        self.eta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StochasticProcess1D;

    #[test]
    fn parameters_are_validated() {
        let ou = Arc::new(
            ExtendedOrnsteinUhlenbeckProcess::new(1.0, 0.2, 3.0, Arc::new(|_| 3.0)).unwrap(),
        );
        let p = ExtOUWithJumpsProcess::new(ou.clone(), 0.0, 10.0, 4.0, 5.0).unwrap();
        assert_eq!(p.ou_process().x0(), 3.0);
        assert!(ExtOUWithJumpsProcess::new(ou.clone(), 0.0, 0.0, 4.0, 5.0).is_err());
        assert!(ExtOUWithJumpsProcess::new(ou, 0.0, 10.0, 4.0, 0.0).is_err());
    }
}
