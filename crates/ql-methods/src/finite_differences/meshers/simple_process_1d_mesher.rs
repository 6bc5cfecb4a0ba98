//! Quantile mesh for a one-dimensional diffusion.

use super::Fdm1dMesher;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::normal_cdf_inverse;
use ql_processes::StochasticProcess1D;

/// Mesh whose nodes are the process quantiles at equally spaced
/// probabilities, averaged over `t_avg_steps` horizons up to maturity.
pub struct FdmSimpleProcess1dMesher;

impl FdmSimpleProcess1dMesher {
    /// Build with the usual defaults (10 averaging steps, `ε = 1e-4`).
    pub fn build(size: usize, process: &dyn StochasticProcess1D, maturity: Time) -> Result<Fdm1dMesher> {
        Self::build_with(size, process, maturity, 10, 1e-4, None)
    }

    /// Build with explicit averaging steps, tail probability and an
    /// optional point that must be a node.
    pub fn build_with(
        size: usize,
        process: &dyn StochasticProcess1D,
        maturity: Time,
        t_avg_steps: usize,
        eps: Real,
        mandatory_point: Option<Real>,
    ) -> Result<Fdm1dMesher> {
        ensure!(size >= 2, "a mesh needs at least two points, got {size}");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(t_avg_steps > 0, "need at least one averaging step");
        ensure!(0.0 < eps && eps < 0.5, "tail probability must lie in (0, 0.5), got {eps}");

        let x0 = process.x0();
        let mp = mandatory_point.unwrap_or(x0);
        let dp = (1.0 - 2.0 * eps) / (size - 1) as Real;
        let z_lo = normal_cdf_inverse(eps)?;
        let z_hi = normal_cdf_inverse(1.0 - eps)?;
        let z_inner = (1..size - 1)
            .map(|i| normal_cdf_inverse(eps + i as Real * dp))
            .collect::<Result<Vec<_>>>()?;

        let mut locations = vec![0.0; size];
        for l in 1..=t_avg_steps {
            let t = maturity * l as Real / t_avg_steps as Real;
            locations[0] += mp.min(x0).min(process.evolve(0.0, x0, t, z_lo));
            for (loc, &z) in locations[1..size - 1].iter_mut().zip(&z_inner) {
                *loc += process.evolve(0.0, x0, t, z);
            }
            locations[size - 1] += mp.max(x0).max(process.evolve(0.0, x0, t, z_hi));
        }
        for loc in locations.iter_mut() {
            *loc /= t_avg_steps as Real;
        }

        if let Some(point) = mandatory_point {
            if size > 2 {
                let nearest = (1..size - 1)
                    .min_by(|&a, &b| {
                        (locations[a] - point)
                            .abs()
                            .total_cmp(&(locations[b] - point).abs())
                    })
                    .unwrap_or(1);
                locations[nearest] = point;
            }
        }
        Fdm1dMesher::predefined(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_processes::OrnsteinUhlenbeckProcess;

    #[test]
    fn ou_mesh_is_symmetric_around_the_level() {
        let ou = OrnsteinUhlenbeckProcess::new(1.0, 0.3, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::build(21, &ou, 2.0).unwrap();
        assert!(m.location(10).abs() < 1e-8);
        assert!((m.location(0) + m.location(20)).abs() < 1e-8);
        assert!(m.location(20) > 0.5);
    }

    #[test]
    fn mandatory_point_is_a_node() {
        let ou = OrnsteinUhlenbeckProcess::new(1.0, 0.3, 0.0, 0.0).unwrap();
        let m = FdmSimpleProcess1dMesher::build_with(20, &ou, 1.0, 5, 1e-4, Some(0.123)).unwrap();
        assert!(m.locations().contains(&0.123));
    }
}
