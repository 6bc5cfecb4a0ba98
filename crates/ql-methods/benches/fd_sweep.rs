use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ql_instruments::{DividendSchedule, OptionType, PlainVanillaPayoff};
use ql_methods::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use ql_methods::finite_differences::meshers::{
    FdmBlackScholesMesher, FdmBlackScholesMesherParams, FdmHestonVarianceMesher, FdmMesher, FdmMesherComposite,
};
use ql_methods::finite_differences::operators::FdmBlackScholesOpConfig;
use ql_methods::finite_differences::schemes::FdmSchemeDesc;
use ql_methods::finite_differences::solvers::{FdmBlackScholesSolver, FdmHestonSolver, FdmSolverDesc};
use ql_methods::finite_differences::step_conditions::FdmStepConditionComposite;
use ql_methods::finite_differences::utilities::FdmLogInnerValue;
use ql_processes::{GeneralizedBlackScholesProcess, HestonProcess};
use ql_termstructures::{BlackConstantVol, FlatForward};
use std::sync::Arc;

const STRIKE: f64 = 100.0;
const MATURITY: f64 = 1.0;

fn mesher_params() -> FdmBlackScholesMesherParams {
    FdmBlackScholesMesherParams {
        concentration: Some((STRIKE, 0.1)),
        ..FdmBlackScholesMesherParams::default()
    }
}

fn solver_desc(mesher: Arc<dyn FdmMesher>, time_steps: usize) -> FdmSolverDesc {
    let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, STRIKE));
    FdmSolverDesc {
        calculator: Arc::new(FdmLogInnerValue::log(payoff, Arc::clone(&mesher), 0)),
        mesher,
        bc_set: FdmBoundaryConditionSet::new(),
        condition: FdmStepConditionComposite::default(),
        maturity: MATURITY,
        time_steps,
        damping_steps: 0,
    }
}

fn bench_black_scholes_1d(c: &mut Criterion) {
    let process = GeneralizedBlackScholesProcess::new(
        100.0,
        Arc::new(FlatForward::new(0.05)),
        Arc::new(FlatForward::new(0.02)),
        Arc::new(BlackConstantVol::new(0.2)),
    )
    .expect("benchmark process");

    let mut group = c.benchmark_group("black_scholes_1d_sweep");
    for &x_grid in &[100usize, 400, 1600] {
        let x = FdmBlackScholesMesher::build(
            x_grid,
            &process,
            MATURITY,
            STRIKE,
            &DividendSchedule::empty(),
            &mesher_params(),
        )
        .expect("benchmark mesh");
        let mesher: Arc<dyn FdmMesher> =
            Arc::new(FdmMesherComposite::new(vec![Arc::new(x)]).expect("benchmark mesh"));

        group.bench_with_input(BenchmarkId::from_parameter(x_grid), &x_grid, |b, _| {
            b.iter(|| {
                let solver = FdmBlackScholesSolver::new(
                    &process,
                    STRIKE,
                    solver_desc(Arc::clone(&mesher), 100),
                    FdmSchemeDesc::douglas(),
                    FdmBlackScholesOpConfig::default(),
                )
                .expect("sweep");
                black_box(solver.value_at(100.0).expect("interpolation"))
            })
        });
    }
    group.finish();
}

fn bench_heston_2d(c: &mut Criterion) {
    let r_ts = Arc::new(FlatForward::new(0.05));
    let q_ts = Arc::new(FlatForward::new(0.0));
    let process = HestonProcess::new(r_ts.clone(), q_ts.clone(), 100.0, 0.04, 2.5, 0.04, 0.66, -0.8)
        .expect("benchmark process");

    let mut group = c.benchmark_group("heston_2d_sweep");
    group.sample_size(10);
    for &(x_grid, v_grid) in &[(50usize, 25usize), (100, 50)] {
        let variance = FdmHestonVarianceMesher::new(v_grid, &process, MATURITY).expect("variance mesh");
        let helper = FdmBlackScholesMesher::process_helper(100.0, r_ts.clone(), q_ts.clone(), variance.vola_estimate())
            .expect("helper process");
        let equity = FdmBlackScholesMesher::build(
            x_grid,
            &helper,
            MATURITY,
            STRIKE,
            &DividendSchedule::empty(),
            &mesher_params(),
        )
        .expect("equity mesh");
        let mesher: Arc<dyn FdmMesher> = Arc::new(
            FdmMesherComposite::new(vec![Arc::new(equity), Arc::new(variance.into_mesher())]).expect("mesh"),
        );

        let id = format!("{x_grid}x{v_grid}");
        group.bench_function(BenchmarkId::from_parameter(id), |b| {
            b.iter(|| {
                let solver = FdmHestonSolver::new(
                    &process,
                    solver_desc(Arc::clone(&mesher), 50),
                    FdmSchemeDesc::hundsdorfer(),
                )
                .expect("sweep");
                black_box(solver.value_at(100.0, 0.04).expect("interpolation"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_black_scholes_1d, bench_heston_2d);
criterion_main!(benches);
