//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ql_core::{Real, Time};
use ql_instruments::{DividendSchedule, OptionType};
use ql_math::normal_cdf;
use ql_methods::finite_differences::meshers::{
    FdmBlackScholesMesher, FdmBlackScholesMesherParams, FdmMesher, FdmMesherComposite,
};
use ql_processes::GeneralizedBlackScholesProcess;
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
pub fn flat_process(spot: Real, r: Real, q: Real, vol: Real) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(
        spot,
        Arc::new(FlatForward::new(r)),
        Arc::new(FlatForward::new(q)),
        Arc::new(BlackConstantVol::new(vol)),
    )
    .unwrap()
}

/// One-dimensional log-spot mesh concentrated at the strike.
pub fn log_spot_mesher(
    size: usize,
    process: &GeneralizedBlackScholesProcess,
    maturity: Time,
    strike: Real,
) -> Arc<dyn FdmMesher> {
    let params = FdmBlackScholesMesherParams {
        concentration: Some((strike, 0.1)),
        ..FdmBlackScholesMesherParams::default()
    };
    let m = FdmBlackScholesMesher::build(size, process, maturity, strike, &DividendSchedule::empty(), &params)
        .unwrap();
    Arc::new(FdmMesherComposite::new(vec![Arc::new(m)]).unwrap())
}
