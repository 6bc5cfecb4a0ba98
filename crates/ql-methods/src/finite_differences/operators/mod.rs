//! Spatial operators of the pricing PDEs.
//!
//! A model operator ([`FdmLinearOpComposite`]) is frozen on a time window
//! `[t1, t2]` into an [`FdmOperatorWindow`]: one tridiagonal part per
//! direction, the mixed-derivative parts and an optional jump integral.
//! The schemes work on the window only, so a frozen window can be handed
//! across threads while the model operator stays immutable.

use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;

mod bates_op;
mod black_scholes_op;
mod derivatives;
mod ext_ou_jump_op;
mod heston_hull_white_op;
mod heston_op;
mod hull_white_op;
mod nine_point_linear_op;
mod ornstein_uhlenbeck_op;
mod triple_band_linear_op;

pub use bates_op::FdmBatesOp;
pub use black_scholes_op::{FdmBlackScholesOp, FdmBlackScholesOpConfig};
pub use derivatives::{FirstDerivativeOp, SecondDerivativeOp, SecondOrderMixedDerivativeOp};
pub use ext_ou_jump_op::{FdmExtOUJumpOp, DEFAULT_JUMP_INTEGRATION_ORDER};
pub use heston_hull_white_op::FdmHestonHullWhiteOp;
pub use heston_op::FdmHestonOp;
pub use hull_white_op::FdmHullWhiteOp;
pub use nine_point_linear_op::NinePointLinearOp;
pub use ornstein_uhlenbeck_op::FdmOrnsteinUhlenbeckOp;
pub use triple_band_linear_op::{Coefficient, TripleBandLinearOp};

/// A non-local term of the operator, treated explicitly by every scheme.
pub trait FdmIntegroTerm: std::fmt::Debug + Send + Sync {
    /// Evaluate the term on `r`.
    fn apply(&self, r: &Array) -> Result<Array>;
}

/// Model operator: a time-dependent sum of directional, mixed and
/// integral parts.
pub trait FdmLinearOpComposite: std::fmt::Debug + Send + Sync {
    /// Number of grid points.
    fn size(&self) -> usize;

    /// Number of directions (length of the window's directional parts).
    fn dimensions(&self) -> usize;

    /// The operator with its coefficients frozen on `[t1, t2]`.
    fn freeze(&self, t1: Time, t2: Time) -> Result<FdmOperatorWindow>;
}

/// A model operator frozen on one time window.
#[derive(Debug, Clone)]
pub struct FdmOperatorWindow {
    directions: Vec<TripleBandLinearOp>,
    mixed: Vec<NinePointLinearOp>,
    integro: Option<Arc<dyn FdmIntegroTerm>>,
    preconditioner_direction: usize,
}

impl FdmOperatorWindow {
    /// Window from its directional parts (one per direction, in order),
    /// mixed parts and optional integral term.
    pub fn new(
        directions: Vec<TripleBandLinearOp>,
        mixed: Vec<NinePointLinearOp>,
        integro: Option<Arc<dyn FdmIntegroTerm>>,
    ) -> Result<Self> {
        ensure!(!directions.is_empty(), "an operator window needs at least one direction");
        let size = directions[0].size();
        for (i, d) in directions.iter().enumerate() {
            ensure!(
                d.direction() == i,
                "directional part {i} acts along direction {}",
                d.direction()
            );
            ensure!(d.size() == size, "directional parts differ in size");
        }
        ensure!(
            mixed.iter().all(|m| m.size() == size),
            "mixed parts differ in size from the directional parts"
        );
        Ok(Self {
            directions,
            mixed,
            integro,
            preconditioner_direction: 0,
        })
    }

    /// Use the implicit solve along `direction` as preconditioner.
    pub fn with_preconditioner_direction(mut self, direction: usize) -> Self {
        self.preconditioner_direction = direction.min(self.directions.len() - 1);
        self
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.directions[0].size()
    }

    /// Number of directions.
    pub fn dimensions(&self) -> usize {
        self.directions.len()
    }

    /// The directional parts.
    pub fn directions(&self) -> &[TripleBandLinearOp] {
        &self.directions
    }

    /// Mutable access to the directional part along `direction`, for
    /// boundary conditions that modify the operator before it is used.
    pub fn direction_mut(&mut self, direction: usize) -> Option<&mut TripleBandLinearOp> {
        self.directions.get_mut(direction)
    }

    /// The whole operator applied to `r`.
    pub fn apply(&self, r: &Array) -> Result<Array> {
        let mut out = self.apply_mixed(r)?;
        for d in &self.directions {
            out += &d.apply(r)?;
        }
        Ok(out)
    }

    /// The mixed-derivative and integral parts applied to `r`.
    pub fn apply_mixed(&self, r: &Array) -> Result<Array> {
        let mut out = Array::zeros(r.size());
        for m in &self.mixed {
            out += &m.apply(r)?;
        }
        if let Some(integro) = &self.integro {
            out += &integro.apply(r)?;
        }
        Ok(out)
    }

    /// The directional part along `direction` applied to `r`.
    pub fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array> {
        self.part(direction)?.apply(r)
    }

    /// Solve `(I − s·L_direction)·x = r`.
    pub fn solve_splitting(&self, direction: usize, r: &Array, s: Real) -> Result<Array> {
        self.part(direction)?.solve_splitting(r, -s, 1.0)
    }

    /// Approximate inverse of `I − dt·L` used by iterative implicit solves.
    pub fn preconditioner(&self, r: &Array, dt: Real) -> Result<Array> {
        self.solve_splitting(self.preconditioner_direction, r, dt)
    }

    fn part(&self, direction: usize) -> Result<&TripleBandLinearOp> {
        self.directions.get(direction).ok_or_else(|| {
            ql_core::Error::Precondition(format!(
                "direction {direction} out of range for a {}-dimensional operator",
                self.directions.len()
            ))
        })
    }
}

/// Zero directional parts for every direction of `mesher` except the
/// ones supplied.
pub(crate) fn fill_directions(
    mesher: &dyn crate::finite_differences::meshers::FdmMesher,
    active: Vec<TripleBandLinearOp>,
) -> Result<Vec<TripleBandLinearOp>> {
    let dims = mesher.layout().dimensions();
    let mut slots: Vec<Option<TripleBandLinearOp>> = (0..dims).map(|_| None).collect();
    for op in active {
        let d = op.direction();
        ensure!(d < dims, "operator direction {d} outside a {dims}-dimensional mesh");
        slots[d] = Some(op);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(d, op)| match op {
            Some(op) => Ok(op),
            None => TripleBandLinearOp::new(d, mesher),
        })
        .collect()
}
