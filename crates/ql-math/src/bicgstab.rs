//! Preconditioned BiCGStab for the non-symmetric systems of implicit
//! multi-dimensional time steps.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use crate::Array;

/// Outcome of a converged BiCGStab solve.
#[derive(Debug, Clone)]
pub struct BiCGStabResult {
    /// Iterations performed.
    pub iterations: usize,
    /// Relative residual `‖b − A x‖ / ‖b‖` reached.
    pub error: Real,
    /// The solution.
    pub x: Array,
}

/// Biconjugate gradient stabilised method (van der Vorst).
#[derive(Debug, Clone, Copy)]
pub struct BiCGStab {
    max_iterations: usize,
    relative_tolerance: Real,
}

impl BiCGStab {
    /// Create a solver with an iteration budget and a relative residual
    /// target.
    pub fn new(max_iterations: usize, relative_tolerance: Real) -> Self {
        Self {
            max_iterations,
            relative_tolerance,
        }
    }

    /// Solve `A x = b` starting from `x0`; `m` applies the preconditioner
    /// `M⁻¹`.
    pub fn solve<A, M>(&self, a: A, m: M, b: &Array, x0: &Array) -> Result<BiCGStabResult>
    where
        A: Fn(&Array) -> Result<Array>,
        M: Fn(&Array) -> Result<Array>,
    {
        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.clone(),
            });
        }

        let mut x = x0.clone();
        let mut r = b - &a(&x)?;
        let r_tld = r.clone();
        let mut p = Array::zeros(b.size());
        let mut v = Array::zeros(b.size());
        let mut omega = 1.0;
        let mut alpha = 0.0;
        let mut rho_tld = 1.0;
        let mut error = r.norm() / b_norm;

        let mut i = 0;
        while i < self.max_iterations && error >= self.relative_tolerance {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }
            if i > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                p = &r + &((&p - &(&v * omega)) * beta);
            } else {
                p = r.clone();
            }

            let p_tld = m(&p)?;
            v = a(&p_tld)?;
            alpha = rho / r_tld.dot(&v);
            let s = &r - &(&v * alpha);
            if s.norm() < self.relative_tolerance * b_norm {
                x.axpy(alpha, &p_tld);
                error = s.norm() / b_norm;
                break;
            }

            let s_tld = m(&s)?;
            let t = a(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);
            x.axpy(alpha, &p_tld);
            x.axpy(omega, &s_tld);
            r = &s - &(&t * omega);
            error = r.norm() / b_norm;
            rho_tld = rho;
            i += 1;
        }

        if i >= self.max_iterations || !(error < self.relative_tolerance) {
            return Err(Error::Convergence {
                method: "BiCGStab",
                iterations: i,
                residual: error,
                tolerance: self.relative_tolerance,
            });
        }
        Ok(BiCGStabResult {
            iterations: i,
            error,
            x,
        })
    }
}
