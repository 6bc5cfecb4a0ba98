//! Kluge vanilla engine and the virtual power plant engine.

use approx::assert_abs_diff_eq;
use ql_core::{Real, Time};
use ql_instruments::{Exercise, OptionType, VanillaOption, VanillaVppOption, VppParams};
use ql_processes::{ExtOUWithJumpsProcess, ExtendedOrnsteinUhlenbeckProcess, LevelFn};
use ql_pricingengines::{FdExtOUJumpGrid, FdExtOUJumpVanillaEngine, FdSimpleExtOUVppEngine, FdVppGrid, FuelCurve};
use ql_termstructures::FlatForward;
use std::sync::Arc;

const RATE: Real = 0.1;

fn kluge_engine() -> FdExtOUJumpVanillaEngine {
    let level: LevelFn = Arc::new(|_t: Time| 3.0);
    let ou = Arc::new(ExtendedOrnsteinUhlenbeckProcess::new(1.0, 2.0, 3.0, level).unwrap());
    let process = Arc::new(ExtOUWithJumpsProcess::new(ou, 0.0, 5.0, 1.0, 2.0).unwrap());
    FdExtOUJumpVanillaEngine::new(process, Arc::new(FlatForward::new(RATE))).with_grid(FdExtOUJumpGrid {
        t_grid: 25,
        x_grid: 100,
        y_grid: 30,
        ..FdExtOUJumpGrid::default()
    })
}

fn kluge_value(option_type: OptionType, strike: Real) -> Real {
    VanillaOption::european(option_type, strike, 1.0)
        .unwrap()
        .price(&kluge_engine())
        .unwrap()
        .value
}

#[test]
fn kluge_put_call_parity() {
    let discount = (-RATE).exp();
    let forward = kluge_value(OptionType::Call, 0.0);
    let call = kluge_value(OptionType::Call, 30.0);
    let put = kluge_value(OptionType::Put, 30.0);
    assert_abs_diff_eq!(call - put, forward - 30.0 * discount, epsilon = 1e-2);
    assert!(call > 0.0 && put > 0.0);
}

#[test]
fn kluge_forward_matches_the_moment_formula() {
    let (a, sigma, beta, lambda, eta, t) = (1.0_f64, 2.0_f64, 5.0_f64, 1.0_f64, 2.0_f64, 1.0_f64);
    let ou_variance = sigma * sigma * (1.0 - (-2.0 * a * t).exp()) / (2.0 * a);
    let jump_factor = ((eta - (-beta * t).exp()) / (eta - 1.0)).powf(lambda / beta);
    let expected = (-RATE * t).exp() * (3.0 + 0.5 * ou_variance).exp() * jump_factor;

    let fd = kluge_value(OptionType::Call, 0.0);
    assert!((fd / expected - 1.0).abs() < 7e-2, "fd {fd} vs {expected}");
}

const HOURS: usize = 24;
const POWER: Real = 60.0;
const FUEL: Real = 10.0;

fn hourly(hours: usize) -> Vec<Time> {
    (1..=hours).map(|h| h as Time / 8760.0).collect()
}

fn vpp_engine(shape: Option<Vec<(Time, Real)>>) -> FdSimpleExtOUVppEngine {
    let level: LevelFn = Arc::new(|_t: Time| POWER.ln());
    let power = Arc::new(ExtendedOrnsteinUhlenbeckProcess::new(1.0, 1e-3, POWER.ln(), level).unwrap());
    let fuel: FuelCurve = Arc::new(|_t: Time| FUEL);
    let engine = FdSimpleExtOUVppEngine::new(power, Arc::new(FlatForward::new(0.0)), fuel).with_grid(FdVppGrid {
        t_grid: 48,
        x_grid: 11,
        ..FdVppGrid::default()
    });
    match shape {
        Some(s) => engine.with_shape(s),
        None => engine,
    }
}

fn vpp_value(engine: &FdSimpleExtOUVppEngine, n_starts: Option<usize>) -> Real {
    VanillaVppOption::new(VppParams::default(), Exercise::bermudan(hourly(HOURS)).unwrap(), n_starts)
        .unwrap()
        .price(engine)
        .unwrap()
        .value
}

#[test]
fn constant_prices_run_the_plant_at_full_load() {
    // margin 40 * (60 - 2.5 * (10 + 3)) = 1100 per hour, one start costs
    // 20 * 13 + 100 = 360 and the first hour is spent starting up
    let engine = vpp_engine(None);
    let expected = (HOURS - 1) as Real * 1100.0 - 360.0;
    assert_abs_diff_eq!(vpp_value(&engine, None), expected, epsilon = 1.0);
    assert_abs_diff_eq!(vpp_value(&engine, Some(1)), expected, epsilon = 1.0);
    assert_eq!(vpp_value(&engine, Some(0)), 0.0);
}

#[test]
fn start_limit_binds_with_two_profitable_blocks() {
    // six expensive hours, six cheap hours, repeated
    let cheap = (20.0 / POWER).ln();
    let shape = hourly(HOURS)
        .into_iter()
        .enumerate()
        .map(|(h, t)| (t, if (h / 6) % 2 == 0 { 0.0 } else { cheap }))
        .collect();
    let engine = vpp_engine(Some(shape));
    let unlimited = vpp_value(&engine, None);
    let one = vpp_value(&engine, Some(1));
    let two = vpp_value(&engine, Some(2));
    assert!(unlimited > one + 1.0, "{unlimited} vs {one}");
    assert_abs_diff_eq!(two, unlimited, epsilon = 1e-6 * unlimited);
    assert!(one > 0.0);
}
