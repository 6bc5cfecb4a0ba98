//! Tridiagonal operator along one direction of an N-dimensional grid.
//!
//! Row `i` couples grid point `i` with its two neighbours along the
//! operator's direction.  The neighbour indices and the direction-major
//! permutation used by the Thomas solve are shared between all operators
//! on the same mesh and direction.

use crate::finite_differences::meshers::FdmMesher;
use ql_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use ql_math::Array;
use nalgebra::DMatrix;
use std::sync::Arc;

/// Per-row coefficient used by [`TripleBandLinearOp::axpyb`].
#[derive(Debug, Clone, Copy)]
pub enum Coefficient<'a> {
    /// No contribution.
    Zero,
    /// The same value in every row.
    Constant(Real),
    /// One value per grid point.
    PerPoint(&'a Array),
}

impl Coefficient<'_> {
    fn at(&self, i: usize) -> Real {
        match self {
            Coefficient::Zero => 0.0,
            Coefficient::Constant(c) => *c,
            Coefficient::PerPoint(a) => a[i],
        }
    }

    fn check(&self, size: usize) -> Result<()> {
        if let Coefficient::PerPoint(a) = self {
            ensure!(
                a.size() == size,
                "coefficient has {} entries, operator has {size} rows",
                a.size()
            );
        }
        Ok(())
    }
}

#[derive(Debug)]
struct BandStencil {
    i0: Vec<usize>,
    i2: Vec<usize>,
    /// Flat index of the k-th point in direction-major order.
    reverse_index: Vec<usize>,
}

/// Tridiagonal operator in one direction.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    direction: usize,
    stencil: Arc<BandStencil>,
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
}

impl TripleBandLinearOp {
    /// Zero operator along `direction` of `mesher`.
    pub fn new(direction: usize, mesher: &dyn FdmMesher) -> Result<Self> {
        let layout = mesher.layout();
        ensure!(
            direction < layout.dimensions(),
            "direction {direction} out of range for a {}-dimensional mesh",
            layout.dimensions()
        );
        let size = layout.size();
        let mut i0 = vec![0; size];
        let mut i2 = vec![0; size];
        let mut reverse_index = vec![0; size];

        // direction-major spacing: swap direction 0 with `direction`
        let mut new_dim = layout.dim().to_vec();
        new_dim.swap(0, direction);
        let mut new_spacing = vec![1usize; new_dim.len()];
        for k in 1..new_dim.len() {
            new_spacing[k] = new_spacing[k - 1] * new_dim[k - 1];
        }
        new_spacing.swap(0, direction);

        for iter in layout.iter() {
            let i = iter.index();
            i0[i] = layout.neighbourhood(&iter, direction, -1);
            i2[i] = layout.neighbourhood(&iter, direction, 1);
            let new_index: usize = iter
                .coordinates()
                .iter()
                .zip(&new_spacing)
                .map(|(c, s)| c * s)
                .sum();
            reverse_index[new_index] = i;
        }

        Ok(Self {
            direction,
            stencil: Arc::new(BandStencil {
                i0,
                i2,
                reverse_index,
            }),
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
        })
    }

    /// Operator with explicit bands, sharing this operator's stencil.
    fn with_bands(&self, lower: Vec<Real>, diag: Vec<Real>, upper: Vec<Real>) -> Self {
        Self {
            direction: self.direction,
            stencil: Arc::clone(&self.stencil),
            lower,
            diag,
            upper,
        }
    }

    /// Set the three coefficients of row `i`.
    pub(crate) fn set_row(&mut self, i: usize, lower: Real, diag: Real, upper: Real) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Direction the operator acts along.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Sub-diagonal coefficients.
    pub fn lower(&self) -> &[Real] {
        &self.lower
    }

    /// Diagonal coefficients.
    pub fn diag(&self) -> &[Real] {
        &self.diag
    }

    /// Super-diagonal coefficients.
    pub fn upper(&self) -> &[Real] {
        &self.upper
    }

    /// `L·r`.
    pub fn apply(&self, r: &Array) -> Result<Array> {
        ensure!(
            r.size() == self.size(),
            "array of size {} applied to an operator of size {}",
            r.size(),
            self.size()
        );
        let s = &self.stencil;
        Ok(Array::from_fn(self.size(), |i| {
            r[s.i0[i]] * self.lower[i] + r[i] * self.diag[i] + r[s.i2[i]] * self.upper[i]
        }))
    }

    /// Solve `(a·L + b·I)·x = r` by the Thomas algorithm along the
    /// operator's direction.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Result<Array> {
        let n = self.size();
        ensure!(
            r.size() == n,
            "right-hand side of size {} for an operator of size {n}",
            r.size()
        );
        let ri = &self.stencil.reverse_index;
        let zero_pivot = || Error::NumericalDomain("zero pivot in tridiagonal solve".into());

        let mut ret = Array::zeros(n);
        let mut tmp = vec![0.0; n];

        let mut rim1 = ri[0];
        let mut bet = 1.0 / (a * self.diag[rim1] + b);
        if !bet.is_finite() {
            return Err(zero_pivot());
        }
        ret[rim1] = r[rim1] * bet;

        for j in 1..n {
            let k = ri[j];
            tmp[j] = a * self.upper[rim1] * bet;
            let denom = b + a * (self.diag[k] - tmp[j] * self.lower[k]);
            if denom == 0.0 || !denom.is_finite() {
                return Err(zero_pivot());
            }
            bet = 1.0 / denom;
            ret[k] = (r[k] - a * self.lower[k] * ret[rim1]) * bet;
            rim1 = k;
        }

        for j in (1..n - 1).rev() {
            let k = ri[j];
            let kp1 = ri[j + 1];
            ret[k] -= tmp[j + 1] * ret[kp1];
        }
        if n > 1 {
            let k = ri[0];
            let kp1 = ri[1];
            ret[k] -= tmp[1] * ret[kp1];
        }
        Ok(ret)
    }

    /// Row-wise scaling `diag(u)·L`.
    pub fn mult(&self, u: &Array) -> Result<Self> {
        Coefficient::PerPoint(u).check(self.size())?;
        let scale = |band: &[Real]| band.iter().enumerate().map(|(i, v)| v * u[i]).collect();
        Ok(self.with_bands(scale(&self.lower), scale(&self.diag), scale(&self.upper)))
    }

    /// `c·L`.
    pub fn scale(&self, c: Real) -> Self {
        let scale = |band: &[Real]| band.iter().map(|v| v * c).collect();
        self.with_bands(scale(&self.lower), scale(&self.diag), scale(&self.upper))
    }

    /// Band-wise sum with an operator along the same direction.
    pub fn add(&self, m: &Self) -> Result<Self> {
        ensure!(
            self.direction == m.direction && self.size() == m.size(),
            "cannot add operators along directions {} and {}",
            self.direction,
            m.direction
        );
        let sum = |a: &[Real], b: &[Real]| a.iter().zip(b).map(|(x, y)| x + y).collect();
        Ok(self.with_bands(
            sum(&self.lower, &m.lower),
            sum(&self.diag, &m.diag),
            sum(&self.upper, &m.upper),
        ))
    }

    /// `L + diag(u)`.
    pub fn add_diag(&self, u: &Array) -> Result<Self> {
        Coefficient::PerPoint(u).check(self.size())?;
        let diag = self.diag.iter().enumerate().map(|(i, d)| d + u[i]).collect();
        Ok(self.with_bands(self.lower.clone(), diag, self.upper.clone()))
    }

    /// `L + c·I`.
    pub fn add_constant_diag(&self, c: Real) -> Self {
        let diag = self.diag.iter().map(|d| d + c).collect();
        self.with_bands(self.lower.clone(), diag, self.upper.clone())
    }

    /// `diag(a)·x + y + diag(b)` with `x` and `y` on this operator's
    /// stencil.
    pub fn axpyb(&self, a: Coefficient<'_>, x: &Self, y: &Self, b: Coefficient<'_>) -> Result<Self> {
        let n = self.size();
        a.check(n)?;
        b.check(n)?;
        ensure!(
            x.size() == n && y.size() == n && x.direction == self.direction && y.direction == self.direction,
            "axpyb operands must share direction and size"
        );
        let mut lower = y.lower.clone();
        let mut diag = y.diag.clone();
        let mut upper = y.upper.clone();
        for i in 0..n {
            let s = a.at(i);
            lower[i] += s * x.lower[i];
            diag[i] += s * x.diag[i] + b.at(i);
            upper[i] += s * x.upper[i];
        }
        Ok(self.with_bands(lower, diag, upper))
    }

    /// Dense matrix representation, for diagnostics and tests.
    pub fn to_dense(&self) -> DMatrix<Real> {
        let n = self.size();
        let s = &self.stencil;
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            m[(i, s.i0[i])] += self.lower[i];
            m[(i, i)] += self.diag[i];
            m[(i, s.i2[i])] += self.upper[i];
        }
        m
    }
}
