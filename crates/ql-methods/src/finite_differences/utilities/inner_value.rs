//! Exercise values on the grid.
//!
//! A calculator maps a grid point and a time to the value of exercising
//! there.  The cell-averaged variant integrates the payoff over the half
//! cells around each node, which removes the kink of a vanilla payoff from
//! the initial condition.

use super::FdmLinearOpIterator;
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_instruments::Payoff;
use ql_math::integrals::SimpsonIntegral;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Exercise value at a grid point.
pub trait FdmInnerValueCalculator: std::fmt::Debug + Send + Sync {
    /// Value of exercising at `iter` at time `t`.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Value averaged over the cell around `iter`; used as the terminal
    /// condition.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Result<Real> {
        Ok(self.inner_value(iter, t))
    }
}

/// Always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _iter: &FdmLinearOpIterator, _t: Time) -> Real {
        0.0
    }
}

/// Grid coordinate to underlying value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridMapping {
    Identity,
    Exp,
}

impl GridMapping {
    fn apply(self, x: Real) -> Real {
        match self {
            GridMapping::Identity => x,
            GridMapping::Exp => x.exp(),
        }
    }
}

/// Payoff of a direction's coordinate, cell-averaged by Simpson
/// quadrature.
#[derive(Debug)]
pub struct FdmCellAveragingInnerValue<P: Payoff + ?Sized> {
    payoff: Arc<P>,
    mesher: Arc<dyn FdmMesher>,
    direction: usize,
    mapping: GridMapping,
    quadrature_fallback: bool,
    fallbacks: AtomicUsize,
    averages: OnceLock<Result<Vec<Real>>>,
}

/// Payoff of `exp(x)` where `x` is the log-spot coordinate.
pub type FdmLogInnerValue<P> = FdmCellAveragingInnerValue<P>;

/// Payoff of the coordinate itself.
pub type FdmPlainInnerValue<P> = FdmCellAveragingInnerValue<P>;

impl<P: Payoff + ?Sized> FdmCellAveragingInnerValue<P> {
    /// Payoff of `exp(x)` along `direction`.
    pub fn log(payoff: Arc<P>, mesher: Arc<dyn FdmMesher>, direction: usize) -> Self {
        Self::with_mapping(payoff, mesher, direction, GridMapping::Exp)
    }

    /// Payoff of the raw coordinate along `direction`.
    pub fn plain(payoff: Arc<P>, mesher: Arc<dyn FdmMesher>, direction: usize) -> Self {
        Self::with_mapping(payoff, mesher, direction, GridMapping::Identity)
    }

    fn with_mapping(
        payoff: Arc<P>,
        mesher: Arc<dyn FdmMesher>,
        direction: usize,
        mapping: GridMapping,
    ) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            mapping,
            quadrature_fallback: false,
            fallbacks: AtomicUsize::new(0),
            averages: OnceLock::new(),
        }
    }

    /// Use the point value when the cell quadrature does not converge
    /// instead of failing.
    pub fn with_quadrature_fallback(mut self) -> Self {
        self.quadrature_fallback = true;
        self
    }

    /// Number of cells that fell back to the point value.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    fn cell_average(&self, iter: &FdmLinearOpIterator) -> Result<Real> {
        let point_value = self
            .payoff
            .value(self.mapping.apply(self.mesher.location(iter, self.direction)));
        let (Some(dminus), Some(dplus)) = (
            self.mesher.dminus(iter, self.direction),
            self.mesher.dplus(iter, self.direction),
        ) else {
            return Ok(point_value);
        };

        let loc = self.mesher.location(iter, self.direction);
        let a = loc - 0.5 * dminus;
        let b = loc + 0.5 * dplus;
        let f = |x: Real| self.payoff.value(self.mapping.apply(x));
        let (fa, fb) = (f(a), f(b));
        let acc = if fa != 0.0 || fb != 0.0 {
            (fa + fb) * 5e-5
        } else {
            1e-4
        };
        match SimpsonIntegral::new(acc.abs(), 8).integrate(f, a, b) {
            Ok(v) => Ok(v / (b - a)),
            Err(e) if self.quadrature_fallback => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, location = loc, "cell average did not converge, using point value");
                Ok(point_value)
            }
            Err(e) => Err(Error::NumericalDomain(format!(
                "cell average around {loc} did not converge: {e}"
            ))),
        }
    }

    fn compute_averages(&self) -> Result<Vec<Real>> {
        let layout = self.mesher.layout();
        let n = layout.dim()[self.direction];
        let mut values = vec![0.0; n];
        let mut done = vec![false; n];
        for iter in layout.iter() {
            let c = iter.coordinates()[self.direction];
            if !done[c] {
                values[c] = self.cell_average(&iter)?;
                done[c] = true;
            }
        }
        Ok(values)
    }
}

impl<P: Payoff + ?Sized> FdmInnerValueCalculator for FdmCellAveragingInnerValue<P> {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        let x = self.mesher.location(iter, self.direction);
        self.payoff.value(self.mapping.apply(x))
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Result<Real> {
        match self.averages.get_or_init(|| self.compute_averages()) {
            Ok(values) => Ok(values[iter.coordinates()[self.direction]]),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Payoff of `exp(f(t) + x + y)` on a Kluge grid (`x` in direction 0, the
/// jump level `y` in direction 1 if present), with an optional
/// deterministic seasonal shape `f`.
#[derive(Debug)]
pub struct FdmExpExtOUInnerValue<P: Payoff + ?Sized> {
    payoff: Arc<P>,
    mesher: Arc<dyn FdmMesher>,
    shape: Option<Vec<(Time, Real)>>,
}

impl<P: Payoff + ?Sized> FdmExpExtOUInnerValue<P> {
    /// Create the calculator; `shape` must be sorted by time.
    pub fn new(payoff: Arc<P>, mesher: Arc<dyn FdmMesher>, shape: Option<Vec<(Time, Real)>>) -> Self {
        Self {
            payoff,
            mesher,
            shape,
        }
    }

    fn shape_at(&self, t: Time) -> Real {
        let Some(shape) = &self.shape else {
            return 0.0;
        };
        let cutoff = t - f64::EPSILON.sqrt();
        shape
            .iter()
            .find(|(ts, _)| *ts >= cutoff)
            .or(shape.last())
            .map_or(0.0, |&(_, f)| f)
    }
}

impl<P: Payoff + ?Sized> FdmInnerValueCalculator for FdmExpExtOUInnerValue<P> {
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let dims = self.mesher.layout().dimensions().min(2);
        let state: Real = (0..dims).map(|d| self.mesher.location(iter, d)).sum();
        self.payoff.value((self.shape_at(t) + state).exp())
    }
}
