//! One-dimensional meshes.
//!
//! A mesh is a strictly increasing list of locations together with the
//! forward and backward spacings; the spacing that does not exist at an
//! edge is `None`.

use ql_core::{ensure, errors::Result, Real};

/// A point the concentrating mesh clusters around.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcentratingPoint {
    /// Location of the cluster.
    pub point: Real,
    /// Relative width of the cluster; smaller means denser.
    pub density: Real,
    /// Force the point onto a grid node.
    pub require_on_grid: bool,
}

impl ConcentratingPoint {
    /// Cluster around `point` without forcing it onto the grid.
    pub fn new(point: Real, density: Real) -> Self {
        Self {
            point,
            density,
            require_on_grid: false,
        }
    }

    /// Force the point onto a grid node.
    pub fn on_grid(mut self) -> Self {
        self.require_on_grid = true;
        self
    }
}

/// Locations and spacings along one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    dplus: Vec<Option<Real>>,
    dminus: Vec<Option<Real>>,
}

impl Fdm1dMesher {
    /// Mesh through user-supplied, strictly increasing locations.
    pub fn predefined(locations: Vec<Real>) -> Result<Self> {
        ensure!(
            locations.len() >= 2,
            "a mesh needs at least two points, got {}",
            locations.len()
        );
        ensure!(
            locations.iter().all(|x| x.is_finite()),
            "mesh locations must be finite"
        );
        ensure!(
            locations.windows(2).all(|w| w[1] > w[0]),
            "mesh locations must be strictly increasing"
        );
        let n = locations.len();
        let dplus = (0..n)
            .map(|i| (i + 1 < n).then(|| locations[i + 1] - locations[i]))
            .collect();
        let dminus = (0..n)
            .map(|i| (i > 0).then(|| locations[i] - locations[i - 1]))
            .collect();
        Ok(Self {
            locations,
            dplus,
            dminus,
        })
    }

    /// Equidistant mesh with `size` points on `[start, end]`.
    pub fn uniform(start: Real, end: Real, size: usize) -> Result<Self> {
        ensure!(size >= 2, "a mesh needs at least two points, got {size}");
        ensure!(end > start, "mesh end {end} must exceed start {start}");
        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;
        Self::predefined(locations)
    }

    /// Mesh on `[start, end]` clustered around a point via an `asinh`
    /// transform of a uniform grid.  Without a concentration this is
    /// [`Fdm1dMesher::uniform`].
    pub fn concentrating(
        start: Real,
        end: Real,
        size: usize,
        concentration: Option<ConcentratingPoint>,
    ) -> Result<Self> {
        ensure!(size >= 2, "a mesh needs at least two points, got {size}");
        ensure!(end > start, "mesh end {end} must exceed start {start}");
        let Some(cp) = concentration else {
            return Self::uniform(start, end, size);
        };
        ensure!(
            cp.density > 0.0,
            "concentration density must be positive, got {}",
            cp.density
        );

        let n = size - 1;
        let c = cp.point;
        let d = cp.density * (end - start);
        let c1 = ((start - c) / d).asinh();
        let c2 = ((end - c) / d).asinh();

        // uniform abscissae, optionally bent so that c lands on a node
        let mut u: Vec<Real> = (0..size).map(|i| i as Real / n as Real).collect();
        if cp.require_on_grid && size > 2 && start < c && c < end {
            let z0 = -c1 / (c2 - c1);
            let node = (z0 * n as Real).round().clamp(1.0, (n - 1) as Real);
            let u0 = node / n as Real;
            for ui in u.iter_mut() {
                *ui = if *ui <= u0 {
                    *ui * z0 / u0
                } else {
                    z0 + (*ui - u0) * (1.0 - z0) / (1.0 - u0)
                };
            }
        }

        let mut locations: Vec<Real> = u
            .iter()
            .map(|&li| c + d * (c1 * (1.0 - li) + c2 * li).sinh())
            .collect();
        locations[0] = start;
        locations[n] = end;
        Self::predefined(locations)
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    /// Grid locations.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Forward spacing; `None` at the last point.
    pub fn dplus(&self, i: usize) -> Option<Real> {
        self.dplus[i]
    }

    /// Backward spacing; `None` at the first point.
    pub fn dminus(&self, i: usize) -> Option<Real> {
        self.dminus[i]
    }

    /// Location of point `i`.
    pub fn location(&self, i: usize) -> Real {
        self.locations[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_spacings() {
        let m = Fdm1dMesher::uniform(-5.0, 10.0, 5).unwrap();
        assert_eq!(m.size(), 5);
        assert_abs_diff_eq!(m.location(1), -1.25, epsilon = 1e-14);
        assert_eq!(m.dminus(0), None);
        assert_eq!(m.dplus(4), None);
        assert_abs_diff_eq!(m.dplus(2).unwrap(), 3.75, epsilon = 1e-14);
    }

    #[test]
    fn concentrating_mesh_is_denser_near_the_point() {
        let m = Fdm1dMesher::concentrating(0.0, 10.0, 41, Some(ConcentratingPoint::new(3.0, 0.05)))
            .unwrap();
        assert_eq!(m.location(0), 0.0);
        assert_eq!(m.location(40), 10.0);
        let near = m
            .locations()
            .windows(2)
            .filter(|w| w[0] <= 3.0 && 3.0 <= w[1])
            .map(|w| w[1] - w[0])
            .next()
            .unwrap();
        assert!(near < 0.25, "spacing at the cluster {near}");
        assert!(m.dplus(39).unwrap() > near);
    }

    #[test]
    fn required_point_lands_on_a_node() {
        let cp = ConcentratingPoint::new(4.2, 0.1).on_grid();
        let m = Fdm1dMesher::concentrating(0.0, 10.0, 30, Some(cp)).unwrap();
        assert!(m.locations().iter().any(|&x| (x - 4.2).abs() < 1e-10));
    }

    #[test]
    fn rejects_unordered_locations() {
        assert!(Fdm1dMesher::predefined(vec![0.0, 1.0, 1.0]).is_err());
        assert!(Fdm1dMesher::uniform(1.0, 1.0, 3).is_err());
        assert!(Fdm1dMesher::uniform(0.0, 1.0, 1).is_err());
    }
}
