//! Variance mesh for the Heston model.
//!
//! Nodes follow the quantiles of the scaled non-central chi-square law of
//! the CIR variance, pooled over several horizons and block-averaged.  The
//! lowest node is always zero and `v0` is snapped onto the nearest node.

use super::Fdm1dMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::{integrals::SimpsonIntegral, NonCentralChiSquare};
use ql_processes::HestonProcess;
use tracing::warn;

/// Variance direction of a Heston grid plus a volatility estimate for the
/// spot direction.
#[derive(Debug, Clone)]
pub struct FdmHestonVarianceMesher {
    mesher: Fdm1dMesher,
    vola_estimate: Real,
}

impl FdmHestonVarianceMesher {
    /// Build with 10 averaging horizons and `ε = 1e-4`.
    pub fn new(size: usize, process: &HestonProcess, maturity: Time) -> Result<Self> {
        Self::with_params(size, process, maturity, 10, 1e-4, 1.0)
    }

    /// Build with explicit averaging horizons, tail probability and a
    /// factor applied to the vol of variance.
    pub fn with_params(
        size: usize,
        process: &HestonProcess,
        maturity: Time,
        t_avg_steps: usize,
        eps: Real,
        mixing_factor: Real,
    ) -> Result<Self> {
        ensure!(size >= 2, "a mesh needs at least two points, got {size}");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(t_avg_steps > 0, "need at least one averaging step");

        let sigma = process.sigma() * mixing_factor;
        let (mut v_grid, mut p_grid) =
            match quantile_grid(size, process, sigma, maturity, t_avg_steps, eps) {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(error = %e, "variance quantiles failed, using a uniform variance mesh");
                    uniform_grid(size, process, sigma)
                }
            };

        let skew_hint = if process.kappa() != 0.0 {
            (sigma / process.kappa()).max(1.0)
        } else {
            1.0
        };
        p_grid.sort_by(|a, b| a.total_cmp(b));
        let vola_estimate = match integrate_sqrt_variance(&p_grid, &v_grid) {
            Ok(v) => v * skew_hint.powf(1.5),
            Err(e) => {
                warn!(error = %e, "volatility estimate failed, using sqrt(theta)");
                process.theta().sqrt() * skew_hint.powf(1.5)
            }
        };

        let v0 = process.v0();
        for i in 1..v_grid.len() {
            if v_grid[i - 1] <= v0 && v_grid[i] >= v0 {
                if (v_grid[i - 1] - v0).abs() < (v_grid[i] - v0).abs() {
                    v_grid[i - 1] = v0;
                } else {
                    v_grid[i] = v0;
                }
            }
        }

        let mesher = match Fdm1dMesher::predefined(v_grid) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "degenerate variance quantiles, using a uniform variance mesh");
                Fdm1dMesher::predefined(uniform_grid(size, process, sigma).0)?
            }
        };
        Ok(Self {
            mesher,
            vola_estimate,
        })
    }

    /// The variance mesh.
    pub fn mesher(&self) -> &Fdm1dMesher {
        &self.mesher
    }

    /// Consume into the variance mesh.
    pub fn into_mesher(self) -> Fdm1dMesher {
        self.mesher
    }

    /// Effective volatility for sizing the spot mesh.
    pub fn vola_estimate(&self) -> Real {
        self.vola_estimate
    }
}

fn quantile_grid(
    size: usize,
    process: &HestonProcess,
    sigma: Real,
    maturity: Time,
    t_avg_steps: usize,
    eps: Real,
) -> Result<(Vec<Real>, Vec<Real>)> {
    let kappa = process.kappa();
    let v0 = process.v0();
    let df = 4.0 * process.theta() * kappa / (sigma * sigma);

    let mut pairs: Vec<(Real, Real)> = Vec::with_capacity(size * t_avg_steps);
    for l in 1..=t_avg_steps {
        let t = maturity * l as Real / t_avg_steps as Real;
        let decay = (-kappa * t).exp();
        let ncp = 4.0 * kappa * decay / (sigma * sigma * (1.0 - decay)) * v0;
        let k = sigma * sigma * (1.0 - decay) / (4.0 * kappa);
        let dist = NonCentralChiSquare::new(df, ncp)?;

        let q_max = v0.max(k * dist.inverse_cdf(1.0 - eps)?);
        let min_v_step = q_max / (50 * size) as Real;
        let mut p = 0.0;
        let mut v_prev = 0.0;
        pairs.push((0.0, eps));
        for i in 1..size {
            p += (1.0 - eps - p) / (size - i) as Real;
            let vx = (v_prev + min_v_step).max(k * dist.inverse_cdf(p)?);
            p = dist.cdf(vx / k);
            v_prev = vx;
            pairs.push((vx, p));
        }
    }
    ensure!(
        pairs.iter().all(|(v, p)| v.is_finite() && p.is_finite()),
        "non-finite variance quantile"
    );
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let n = pairs.len();
    let mut v_grid = vec![0.0; size];
    let mut p_grid = vec![0.0; size];
    for i in 0..size {
        let b = i * n / size;
        let e = (i + 1) * n / size;
        let w = (e - b) as Real;
        for &(v, p) in &pairs[b..e] {
            v_grid[i] += v / w;
            p_grid[i] += p / w;
        }
    }
    Ok((v_grid, p_grid))
}

fn uniform_grid(size: usize, process: &HestonProcess, sigma: Real) -> (Vec<Real>, Vec<Real>) {
    let vol = sigma * (process.theta() / (2.0 * process.kappa())).sqrt();
    let mean = process.theta();
    let v0 = process.v0();
    let upper = (v0 + 4.0 * vol).max(mean + 4.0 * vol);
    let lower = (v0 - 4.0 * vol).min(mean - 4.0 * vol).max(0.0);
    let last = (size - 1) as Real;
    let p_grid = (0..size).map(|i| i as Real / last).collect();
    let v_grid = (0..size)
        .map(|i| lower + i as Real * (upper - lower) / last)
        .collect();
    (v_grid, p_grid)
}

/// `∫ √v(p) dp` with `v` piecewise linear in `p`.
fn integrate_sqrt_variance(p_grid: &[Real], v_grid: &[Real]) -> Result<Real> {
    let (p_lo, p_hi) = (p_grid[0], p_grid[p_grid.len() - 1]);
    let v_at = |x: Real| -> Real {
        let i = p_grid
            .partition_point(|&p| p <= x)
            .clamp(1, p_grid.len() - 1);
        let (p0, p1) = (p_grid[i - 1], p_grid[i]);
        if p1 > p0 {
            v_grid[i - 1] + (x - p0) * (v_grid[i] - v_grid[i - 1]) / (p1 - p0)
        } else {
            v_grid[i]
        }
    };
    SimpsonIntegral::new(1e-4, 14).integrate(|x| v_at(x).max(0.0).sqrt(), p_lo, p_hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_termstructures::FlatForward;
    use std::sync::Arc;

    fn heston(v0: Real) -> HestonProcess {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            100.0,
            v0,
            2.5,
            0.04,
            0.66,
            -0.8,
        )
        .unwrap()
    }

    #[test]
    fn starts_at_zero_and_increases() {
        let m = FdmHestonVarianceMesher::new(51, &heston(0.04), 1.0).unwrap();
        let locs = m.mesher().locations();
        assert_eq!(locs[0], 0.0);
        assert!(locs.windows(2).all(|w| w[1] > w[0]));
        assert!(locs.iter().any(|&v| v == 0.04));
    }

    #[test]
    fn vola_estimate_is_sensible() {
        let m = FdmHestonVarianceMesher::new(51, &heston(0.04), 1.0).unwrap();
        assert!(m.vola_estimate() > 0.05 && m.vola_estimate() < 1.0);
    }
}
