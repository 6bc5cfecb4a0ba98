//! Heston, Bates and Heston-Hull-White engines.

mod common;

use approx::assert_abs_diff_eq;
use common::{skewed_heston, RippledCall};
use ql_instruments::{DividendSchedule, Exercise, OptionType, PlainVanillaPayoff, VanillaOption};
use ql_processes::{BatesProcess, HestonProcess, HullWhiteProcess};
use ql_pricingengines::{
    FdBatesVanillaEngine, FdHestonGrid, FdHestonHullWhiteGrid, FdHestonHullWhiteVanillaEngine,
    FdHestonVanillaEngine,
};
use ql_termstructures::FlatForward;
use std::sync::Arc;

fn grid(t_grid: usize, x_grid: usize, v_grid: usize) -> FdHestonGrid {
    FdHestonGrid {
        t_grid,
        x_grid,
        v_grid,
        ..FdHestonGrid::default()
    }
}

fn atm_put() -> VanillaOption {
    VanillaOption::european(OptionType::Put, 100.0, 1.0).unwrap()
}

#[test]
fn european_put_matches_the_semi_analytic_price() {
    let engine = FdHestonVanillaEngine::new(Arc::new(skewed_heston())).with_grid(grid(200, 100, 50));
    let results = atm_put().price(&engine).unwrap();
    assert_abs_diff_eq!(results.value, 5.1138, epsilon = 2e-2);
    assert_abs_diff_eq!(results.delta.unwrap(), -0.2514, epsilon = 1e-2);
    assert_abs_diff_eq!(results.gamma.unwrap(), 0.0161, epsilon = 5e-3);
    assert!(results.theta.is_some());
}

#[test]
fn european_put_with_a_cash_dividend() {
    let engine = FdHestonVanillaEngine::new(Arc::new(skewed_heston()))
        .with_grid(grid(50, 100, 50))
        .with_dividends(DividendSchedule::new(&[(0.5, 5.0)]).unwrap());
    let results = atm_put().price(&engine).unwrap();
    assert_abs_diff_eq!(results.value, 6.7506, epsilon = 2e-2);
    assert_abs_diff_eq!(results.delta.unwrap(), -0.3486, epsilon = 1e-2);
    assert_abs_diff_eq!(results.gamma.unwrap(), 0.0232, epsilon = 5e-3);
}

#[test]
fn american_put_is_worth_at_least_the_european() {
    let engine = FdHestonVanillaEngine::new(Arc::new(skewed_heston())).with_grid(grid(50, 60, 25));
    let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
    let european = VanillaOption::new(payoff.clone(), Exercise::european(1.0).unwrap())
        .price(&engine)
        .unwrap()
        .value;
    let american = VanillaOption::new(payoff, Exercise::american(0.0, 1.0).unwrap())
        .price(&engine)
        .unwrap()
        .value;
    assert!(american > european, "{american} vs {european}");
}

#[test]
fn bates_without_jumps_is_heston() {
    let g = grid(40, 60, 25);
    let heston = atm_put()
        .price(&FdHestonVanillaEngine::new(Arc::new(skewed_heston())).with_grid(g))
        .unwrap()
        .value;
    let bates = BatesProcess::new(skewed_heston(), 0.0, -0.1, 0.1).unwrap();
    let no_jumps = atm_put()
        .price(&FdBatesVanillaEngine::new(Arc::new(bates)).with_grid(g))
        .unwrap()
        .value;
    assert_abs_diff_eq!(no_jumps, heston, epsilon = 1e-8);
}

#[test]
fn downward_jumps_raise_the_put() {
    let g = grid(40, 60, 25);
    let heston = atm_put()
        .price(&FdHestonVanillaEngine::new(Arc::new(skewed_heston())).with_grid(g))
        .unwrap()
        .value;
    let bates = BatesProcess::new(skewed_heston(), 0.5, -0.1, 0.1).unwrap();
    let jumpy = atm_put()
        .price(&FdBatesVanillaEngine::new(Arc::new(bates)).with_grid(g))
        .unwrap()
        .value;
    assert!(jumpy > heston + 0.1, "{jumpy} vs {heston}");
}

fn mild_heston() -> HestonProcess {
    HestonProcess::new(
        Arc::new(FlatForward::new(0.03)),
        Arc::new(FlatForward::new(0.0)),
        100.0,
        0.04,
        1.0,
        0.04,
        0.2,
        -0.5,
    )
    .unwrap()
}

fn hhw_call(rate_vol: f64) -> f64 {
    let hull_white = HullWhiteProcess::new(Arc::new(FlatForward::new(0.03)), 0.1, rate_vol).unwrap();
    let engine = FdHestonHullWhiteVanillaEngine::new(Arc::new(mild_heston()), Arc::new(hull_white), 0.0).with_grid(
        FdHestonHullWhiteGrid {
            t_grid: 20,
            x_grid: 50,
            v_grid: 15,
            r_grid: 11,
            ..FdHestonHullWhiteGrid::default()
        },
    );
    VanillaOption::european(OptionType::Call, 100.0, 1.0)
        .unwrap()
        .price(&engine)
        .unwrap()
        .value
}

#[test]
fn hull_white_with_vanishing_volatility_is_heston() {
    let heston = VanillaOption::european(OptionType::Call, 100.0, 1.0)
        .unwrap()
        .price(&FdHestonVanillaEngine::new(Arc::new(mild_heston())).with_grid(grid(50, 100, 30)))
        .unwrap()
        .value;
    let hhw = hhw_call(1e-4);
    assert!((hhw - heston).abs() < 0.1, "{hhw} vs {heston}");
}

#[test]
fn stochastic_rates_add_forward_variance() {
    assert!(hhw_call(0.1) > hhw_call(1e-4) + 0.05);
}

#[test]
fn heston_engine_honours_the_quadrature_fallback() {
    let option = VanillaOption::new(Arc::new(RippledCall { strike: 100.0 }), Exercise::european(1.0).unwrap());
    let strict = FdHestonVanillaEngine::new(Arc::new(skewed_heston())).with_grid(grid(20, 40, 15));
    assert!(option.price(&strict).is_err());

    let lenient = strict.with_grid(FdHestonGrid {
        quadrature_fallback: true,
        ..grid(20, 40, 15)
    });
    assert!(option.price(&lenient).unwrap().value.is_finite());
}
