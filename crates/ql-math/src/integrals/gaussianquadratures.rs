//! Gaussian quadrature rules built with the Golub-Welsch algorithm.
//!
//! The nodes are the eigenvalues of the Jacobi matrix of the orthogonal
//! polynomial family, the weights follow from the first component of the
//! normalised eigenvectors.  Both jump integrals of the finite-difference
//! operators use these rules: Gauss-Hermite for normally distributed log
//! jumps, Gauss-Laguerre for exponentially distributed jumps.

use nalgebra::{DMatrix, SymmetricEigen};
use ql_core::{ensure, errors::Result, Real};
use std::f64::consts::PI;

/// A Gauss quadrature rule: `∫ f(x) w(x) dx ≈ Σ wᵢ f(xᵢ)` for the weight
/// function `w` of the family.
#[derive(Debug, Clone)]
pub struct GaussianQuadrature {
    x: Vec<Real>,
    w: Vec<Real>,
}

impl GaussianQuadrature {
    /// Quadrature nodes, ascending.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// Quadrature weights.
    pub fn w(&self) -> &[Real] {
        &self.w
    }

    /// Number of quadrature points.
    pub fn order(&self) -> usize {
        self.x.len()
    }

    /// Evaluate `Σ wᵢ f(xᵢ)`.
    pub fn integrate<F: Fn(Real) -> Real>(&self, f: F) -> Real {
        self.x.iter().zip(&self.w).map(|(&xi, &wi)| wi * f(xi)).sum()
    }
}

/// Gauss-Hermite quadrature, weight `e^{-x²}` on the real line.
pub struct GaussHermiteIntegration;

impl GaussHermiteIntegration {
    /// Build a Gauss-Hermite rule with `order` nodes.
    pub fn new(order: usize) -> Result<GaussianQuadrature> {
        let diag = vec![0.0; order];
        let off: Vec<Real> = (1..order).map(|i| (i as Real / 2.0).sqrt()).collect();
        golub_welsch(&diag, &off, PI.sqrt())
    }
}

/// Gauss-Laguerre quadrature, weight `e^{-x}` on `[0, ∞)`.
pub struct GaussLaguerreIntegration;

impl GaussLaguerreIntegration {
    /// Build a Gauss-Laguerre rule with `order` nodes.
    pub fn new(order: usize) -> Result<GaussianQuadrature> {
        let diag: Vec<Real> = (0..order).map(|i| 2.0 * i as Real + 1.0).collect();
        let off: Vec<Real> = (1..order).map(|i| i as Real).collect();
        golub_welsch(&diag, &off, 1.0)
    }
}

/// Nodes and weights from the symmetric tridiagonal Jacobi matrix with
/// diagonal `diag`, off-diagonal `off` and total mass `mu0`.
fn golub_welsch(diag: &[Real], off: &[Real], mu0: Real) -> Result<GaussianQuadrature> {
    let n = diag.len();
    ensure!(n > 0, "quadrature order must be positive");
    ensure!(off.len() + 1 == n, "inconsistent Jacobi matrix");

    let mut jacobi = DMatrix::<Real>::zeros(n, n);
    for i in 0..n {
        jacobi[(i, i)] = diag[i];
    }
    for (i, &b) in off.iter().enumerate() {
        jacobi[(i, i + 1)] = b;
        jacobi[(i + 1, i)] = b;
    }
    let eigen = SymmetricEigen::new(jacobi);

    let mut nodes: Vec<(Real, Real)> = (0..n)
        .map(|k| {
            let v0 = eigen.eigenvectors[(0, k)];
            (eigen.eigenvalues[k], mu0 * v0 * v0)
        })
        .collect();
    nodes.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(GaussianQuadrature {
        x: nodes.iter().map(|p| p.0).collect(),
        w: nodes.iter().map(|p| p.1).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hermite_moments() {
        let q = GaussHermiteIntegration::new(16).unwrap();
        assert_eq!(q.order(), 16);
        assert_abs_diff_eq!(q.integrate(|_| 1.0), PI.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(q.integrate(|x| x * x), 0.5 * PI.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(q.integrate(|x| x), 0.0, epsilon = 1e-12);
        // E[e^{σZ}] = e^{σ²/2} with x = Z/√2
        let sigma: Real = 0.4;
        let m = q.integrate(|x| (sigma * 2.0_f64.sqrt() * x).exp()) / PI.sqrt();
        assert_abs_diff_eq!(m, (0.5 * sigma * sigma).exp(), epsilon = 1e-12);
    }

    #[test]
    fn laguerre_moments() {
        let q = GaussLaguerreIntegration::new(12).unwrap();
        assert_abs_diff_eq!(q.integrate(|_| 1.0), 1.0, epsilon = 1e-12);
        // ∫ x³ e^{-x} dx = 3!
        assert_abs_diff_eq!(q.integrate(|x| x * x * x), 6.0, epsilon = 1e-9);
        assert!(q.x().windows(2).all(|w| w[1] > w[0]));
        assert!(q.x()[0] > 0.0);
    }

    #[test]
    fn zero_order_is_rejected() {
        assert!(GaussHermiteIntegration::new(0).is_err());
    }
}
