//! Log-spot mesh for Black-Scholes type models.
//!
//! The forward is tracked on a set of intermediate dates (at least two,
//! roughly hourly-in-years, plus every cash dividend date), its running
//! minimum and maximum widened by `Φ⁻¹(1-ε)·σ√T·scale` in log space.

use super::{ConcentratingPoint, Fdm1dMesher};
use ql_core::{ensure, errors::Result, Real, Time, Volatility};
use ql_instruments::DividendSchedule;
use ql_math::normal_cdf_inverse;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackConstantVol, YieldTermStructure};
use std::sync::Arc;

/// Tunables of [`FdmBlackScholesMesher`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmBlackScholesMesherParams {
    /// Tail probability left outside the mesh.
    pub eps: Real,
    /// Widening factor applied to the quantile distance.
    pub scale_factor: Real,
    /// Hard lower bound in log-spot, overriding the computed one.
    pub x_min_constraint: Option<Real>,
    /// Hard upper bound in log-spot, overriding the computed one.
    pub x_max_constraint: Option<Real>,
    /// Cluster point in spot terms and its density.
    pub concentration: Option<(Real, Real)>,
    /// Shift applied to the spot before the forward is tracked.
    pub spot_adjustment: Real,
}

impl Default for FdmBlackScholesMesherParams {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            scale_factor: 1.5,
            x_min_constraint: None,
            x_max_constraint: None,
            concentration: None,
            spot_adjustment: 0.0,
        }
    }
}

/// Builder for the log-spot direction of a Black-Scholes grid.
pub struct FdmBlackScholesMesher;

impl FdmBlackScholesMesher {
    /// Build a mesh with `size` points for a contract maturing at
    /// `maturity` struck at `strike`.
    pub fn build(
        size: usize,
        process: &GeneralizedBlackScholesProcess,
        maturity: Time,
        strike: Real,
        dividends: &DividendSchedule,
        params: &FdmBlackScholesMesherParams,
    ) -> Result<Fdm1dMesher> {
        let spot = process.spot() + params.spot_adjustment;
        ensure!(spot > 0.0, "negative or null underlying given: {spot}");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(
            0.0 < params.eps && params.eps < 0.5,
            "tail probability must lie in (0, 0.5), got {}",
            params.eps
        );

        let mut steps: Vec<(Time, Real)> = dividends
            .dividends()
            .iter()
            .filter(|d| 0.0 <= d.time && d.time <= maturity)
            .map(|d| (d.time, d.amount))
            .collect();
        let n_intermediate = ((24.0 * maturity) as usize).max(2);
        steps.extend(
            (0..n_intermediate).map(|i| ((i + 1) as Real * maturity / n_intermediate as Real, 0.0)),
        );
        steps.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let r_ts = process.risk_free_rate();
        let q_ts = process.dividend_yield();
        let mut last_time = 0.0;
        let mut fwd = spot;
        let (mut mi, mut ma) = (fwd, fwd);
        for &(t, amount) in &steps {
            fwd *= r_ts.discount(last_time) / r_ts.discount(t) * q_ts.discount(t)
                / q_ts.discount(last_time);
            mi = mi.min(fwd);
            ma = ma.max(fwd);
            fwd -= amount;
            mi = mi.min(fwd);
            ma = ma.max(fwd);
            last_time = t;
        }
        ensure!(
            mi > 0.0,
            "dividends exceed the forward: minimum forward {mi} on the mesh horizon"
        );

        let quantile = normal_cdf_inverse(1.0 - params.eps)?;
        let sigma_sqrt_t = process.black_volatility().black_vol(maturity, strike) * maturity.sqrt();
        let width = sigma_sqrt_t * quantile * params.scale_factor;
        let x_min = params.x_min_constraint.unwrap_or(mi.ln() - width);
        let x_max = params.x_max_constraint.unwrap_or(ma.ln() + width);

        let concentration = params.concentration.and_then(|(point, density)| {
            let lx = point.ln();
            (point > 0.0 && x_min <= lx && lx <= x_max).then(|| ConcentratingPoint::new(lx, density))
        });
        Fdm1dMesher::concentrating(x_min, x_max, size, concentration)
    }

    /// A constant-volatility Black-Scholes process used to size the spot
    /// mesh of stochastic volatility models.
    pub fn process_helper(
        s0: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        vol: Volatility,
    ) -> Result<GeneralizedBlackScholesProcess> {
        GeneralizedBlackScholesProcess::new(
            s0,
            risk_free_rate,
            dividend_yield,
            Arc::new(BlackConstantVol::new(vol)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_termstructures::FlatForward;

    fn process() -> GeneralizedBlackScholesProcess {
        FdmBlackScholesMesher::process_helper(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            0.2,
        )
        .unwrap()
    }

    #[test]
    fn mesh_covers_the_forward_quantiles() {
        let p = process();
        let params = FdmBlackScholesMesherParams::default();
        let m = FdmBlackScholesMesher::build(100, &p, 1.0, 100.0, &DividendSchedule::empty(), &params)
            .unwrap();
        let width = 0.2 * normal_cdf_inverse(1.0 - 1e-4).unwrap() * 1.5;
        assert!((m.location(0) - (100.0_f64.ln() - width)).abs() < 1e-10);
        assert!((m.location(99) - (100.0 * 0.05_f64.exp()).ln() - width).abs() < 1e-10);
    }

    #[test]
    fn dividends_lower_the_minimum() {
        let p = process();
        let params = FdmBlackScholesMesherParams::default();
        let plain = FdmBlackScholesMesher::build(50, &p, 1.0, 100.0, &DividendSchedule::empty(), &params)
            .unwrap();
        let divs = DividendSchedule::new(&[(0.5, 10.0)]).unwrap();
        let with_div = FdmBlackScholesMesher::build(50, &p, 1.0, 100.0, &divs, &params).unwrap();
        assert!(with_div.location(0) < plain.location(0));
    }

    #[test]
    fn constraints_override_bounds() {
        let p = process();
        let params = FdmBlackScholesMesherParams {
            x_min_constraint: Some(80.0_f64.ln()),
            concentration: Some((100.0, 0.1)),
            ..Default::default()
        };
        let m = FdmBlackScholesMesher::build(60, &p, 1.0, 100.0, &DividendSchedule::empty(), &params)
            .unwrap();
        assert_eq!(m.location(0), 80.0_f64.ln());
    }
}
