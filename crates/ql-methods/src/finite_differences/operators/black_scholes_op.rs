//! Black-Scholes operator in log-spot.
//!
//! `L = (r − q − σ²/2)·∂x + σ²/2·∂xx − r`, with σ² either the Black
//! forward variance over the window or the local variance at the window
//! midpoint.

use super::{
    fill_directions, Coefficient, FdmLinearOpComposite, FdmOperatorWindow, FirstDerivativeOp,
    SecondDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesher;
use ql_core::{
    errors::{Error, Result},
    Real, Time, Volatility,
};
use ql_math::Array;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackVolTermStructure, LocalVolTermStructure, YieldTermStructure};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Local volatility settings of [`FdmBlackScholesOp`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmBlackScholesOpConfig {
    /// Use the process' local volatility surface instead of Black vols.
    pub enabled: bool,
    /// Volatility used wherever the surface fails or returns a value that
    /// is not a finite non-negative number; `None` makes that an error.
    pub illegal_local_vol_overwrite: Option<Volatility>,
}

/// Black-Scholes operator along one direction of a mesh.
#[derive(Debug)]
pub struct FdmBlackScholesOp {
    r_ts: Arc<dyn YieldTermStructure>,
    q_ts: Arc<dyn YieldTermStructure>,
    vol_ts: Arc<dyn BlackVolTermStructure>,
    local_vol: Option<Arc<dyn LocalVolTermStructure>>,
    overwrite: Option<Volatility>,
    overwrites: AtomicUsize,
    spots: Array,
    strike: Real,
    direction: usize,
    dx: TripleBandLinearOp,
    dxx: TripleBandLinearOp,
    template: Vec<TripleBandLinearOp>,
    size: usize,
}

impl FdmBlackScholesOp {
    /// Build the operator along `direction`; `strike` selects the Black
    /// volatility.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        local_vol: FdmBlackScholesOpConfig,
        direction: usize,
    ) -> Result<Self> {
        let local_surface = if local_vol.enabled {
            Some(Arc::clone(process.local_volatility().ok_or_else(|| {
                Error::Precondition("local volatility requested but the process carries none".into())
            })?))
        } else {
            None
        };
        let spots = mesher.locations(direction).map(f64::exp);
        Ok(Self {
            r_ts: Arc::clone(process.risk_free_rate()),
            q_ts: Arc::clone(process.dividend_yield()),
            vol_ts: Arc::clone(process.black_volatility()),
            local_vol: local_surface,
            overwrite: local_vol.illegal_local_vol_overwrite,
            overwrites: AtomicUsize::new(0),
            spots,
            strike,
            direction,
            dx: FirstDerivativeOp::new(direction, mesher)?,
            dxx: SecondDerivativeOp::new(direction, mesher)?,
            template: fill_directions(mesher, Vec::new())?,
            size: mesher.layout().size(),
        })
    }

    /// Number of grid points where an illegal local volatility was
    /// replaced so far.
    pub fn local_vol_overwrites(&self) -> usize {
        self.overwrites.load(Ordering::Relaxed)
    }

    fn local_variances(&self, surface: &dyn LocalVolTermStructure, t: Time) -> Result<Array> {
        let mut replaced = 0usize;
        let mut v = Array::zeros(self.size);
        for (i, &s) in self.spots.iter().enumerate() {
            let sigma = match surface.local_vol(t, s) {
                Ok(sigma) if sigma.is_finite() && sigma >= 0.0 => sigma,
                outcome => match self.overwrite {
                    Some(fallback) => {
                        replaced += 1;
                        fallback
                    }
                    None => {
                        return Err(match outcome {
                            Err(e) => e,
                            Ok(sigma) => Error::NumericalDomain(format!(
                                "illegal local volatility {sigma} at t = {t}, S = {s}"
                            )),
                        })
                    }
                },
            };
            v[i] = sigma * sigma;
        }
        if replaced > 0 {
            self.overwrites.fetch_add(replaced, Ordering::Relaxed);
            warn!(t, replaced, "illegal local volatility overwritten");
        }
        Ok(v)
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> usize {
        self.size
    }

    fn dimensions(&self) -> usize {
        self.template.len()
    }

    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow> {
        let r = self.r_ts.forward_rate(t1, t2);
        let q = self.q_ts.forward_rate(t1, t2);

        let part = match &self.local_vol {
            Some(surface) => {
                let v = self.local_variances(surface.as_ref(), 0.5 * (t1 + t2))?;
                let drift = v.map(|vi| r - q - 0.5 * vi);
                let half_v = 0.5 * &v;
                self.dx.axpyb(
                    Coefficient::PerPoint(&drift),
                    &self.dx,
                    &self.dxx.mult(&half_v)?,
                    Coefficient::Constant(-r),
                )?
            }
            None => {
                let v = if t2 - t1 > 1e-12 {
                    self.vol_ts.black_forward_variance(t1, t2, self.strike)? / (t2 - t1)
                } else {
                    let sigma = self.vol_ts.black_vol(t2, self.strike);
                    sigma * sigma
                };
                self.dx.axpyb(
                    Coefficient::Constant(r - q - 0.5 * v),
                    &self.dx,
                    &self.dxx.scale(0.5 * v),
                    Coefficient::Constant(-r),
                )?
            }
        };

        let mut directions = self.template.clone();
        directions[self.direction] = part;
        FdmOperatorWindow::new(directions, Vec::new(), None)
            .map(|w| w.with_preconditioner_direction(self.direction))
    }
}
