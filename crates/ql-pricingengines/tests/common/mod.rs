//! Market fixtures shared by the engine tests.

#![allow(dead_code)]

use ql_core::{Real, Time};
use ql_instruments::{OptionType, Payoff, StrikedPayoff};
use ql_math::normal_cdf;
use ql_processes::{GeneralizedBlackScholesProcess, HestonProcess};
use ql_termstructures::{BlackConstantVol, FlatForward};
use std::sync::Arc;

/// Closed-form Black-Scholes-Merton price.
pub fn black_scholes_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    vol: Real,
    t: Time,
) -> Real {
    let sd = vol * t.sqrt();
    let fwd = spot * ((r - q) * t).exp();
    let d1 = (fwd / strike).ln() / sd + 0.5 * sd;
    let d2 = d1 - sd;
    let phi = option_type.sign();
    (-r * t).exp() * phi * (fwd * normal_cdf(phi * d1) - strike * normal_cdf(phi * d2))
}

/// Flat Black-Scholes process.
pub fn flat_process(spot: Real, r: Real, q: Real, vol: Real) -> Arc<GeneralizedBlackScholesProcess> {
    Arc::new(
        GeneralizedBlackScholesProcess::new(
            spot,
            Arc::new(FlatForward::new(r)),
            Arc::new(FlatForward::new(q)),
            Arc::new(BlackConstantVol::new(vol)),
        )
        .unwrap(),
    )
}

/// Heston process on flat curves with `r = 5%`, `q = 0`, `S0 = 100` and
/// a strongly skewed variance (`κ = 2.5`, `θ = v0 = 0.04`, `σ = 0.66`,
/// `ρ = -0.8`).
pub fn skewed_heston() -> HestonProcess {
    HestonProcess::new(
        Arc::new(FlatForward::new(0.05)),
        Arc::new(FlatForward::new(0.0)),
        100.0,
        0.04,
        2.5,
        0.04,
        0.66,
        -0.8,
    )
    .unwrap()
}

/// A call with a fast ripple on top, too rough for the cell-averaging
/// quadrature to converge.
#[derive(Debug, Clone, Copy)]
pub struct RippledCall {
    pub strike: Real,
}

impl Payoff for RippledCall {
    fn value(&self, price: Real) -> Real {
        (price - self.strike).max(0.0) + (1e4 * price).sin()
    }

    fn name(&self) -> &str {
        "RippledCall"
    }
}

impl StrikedPayoff for RippledCall {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        OptionType::Call
    }
}
