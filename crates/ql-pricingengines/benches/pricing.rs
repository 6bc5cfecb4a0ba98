use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ql_instruments::{
    BarrierOption, BarrierType, Exercise, OptionType, PlainVanillaPayoff, VanillaOption, VanillaVppOption, VppParams,
};
use ql_processes::{ExtendedOrnsteinUhlenbeckProcess, GeneralizedBlackScholesProcess, LevelFn};
use ql_pricingengines::{
    FdBlackScholesBarrierEngine, FdBlackScholesGrid, FdBlackScholesVanillaEngine, FdSimpleExtOUVppEngine, FuelCurve,
};
use ql_termstructures::{BlackConstantVol, FlatForward};
use std::sync::Arc;

fn process() -> Arc<GeneralizedBlackScholesProcess> {
    Arc::new(
        GeneralizedBlackScholesProcess::new(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            Arc::new(BlackConstantVol::new(0.2)),
        )
        .expect("benchmark process"),
    )
}

fn bench_american_put(c: &mut Criterion) {
    let option = VanillaOption::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
        Exercise::american(0.0, 1.0).expect("exercise"),
    );
    let mut group = c.benchmark_group("american_put");
    for &x_grid in &[100usize, 400] {
        let engine = FdBlackScholesVanillaEngine::new(process()).with_grid(FdBlackScholesGrid {
            x_grid,
            t_grid: x_grid,
            ..FdBlackScholesGrid::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(x_grid), &engine, |b, engine| {
            b.iter(|| black_box(option.price(engine).expect("price").value))
        });
    }
    group.finish();
}

fn bench_knock_in(c: &mut Criterion) {
    let option = BarrierOption::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
        Exercise::european(0.5).expect("exercise"),
        BarrierType::DownIn,
        90.0,
        3.0,
    )
    .expect("barrier option");
    let engine = FdBlackScholesBarrierEngine::new(process());
    c.bench_function("down_in_call_with_rebate", |b| {
        b.iter(|| black_box(option.price(&engine).expect("price").value))
    });
}

fn bench_vpp(c: &mut Criterion) {
    let level: LevelFn = Arc::new(|_t: f64| 60.0_f64.ln());
    let power = Arc::new(ExtendedOrnsteinUhlenbeckProcess::new(10.0, 0.5, 60.0_f64.ln(), level).expect("process"));
    let fuel: FuelCurve = Arc::new(|_t: f64| 10.0);
    let engine = FdSimpleExtOUVppEngine::new(power, Arc::new(FlatForward::new(0.0)), fuel);

    let mut group = c.benchmark_group("vpp_week");
    group.sample_size(10);
    for n_starts in [None, Some(3)] {
        let hours = (1..=168).map(|h| h as f64 / 8760.0).collect();
        let option = VanillaVppOption::new(VppParams::default(), Exercise::bermudan(hours).expect("exercise"), n_starts)
            .expect("vpp");
        let id = n_starts.map_or_else(|| "unlimited".to_string(), |n| format!("{n}_starts"));
        group.bench_function(BenchmarkId::from_parameter(id), |b| {
            b.iter(|| black_box(option.price(&engine).expect("price").value))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_american_put, bench_knock_in, bench_vpp);
criterion_main!(benches);
