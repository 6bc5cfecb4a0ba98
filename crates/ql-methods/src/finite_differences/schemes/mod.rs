//! Time-stepping schemes.
//!
//! Every scheme advances the solution array backwards by one step `dt`,
//! from `t` to `t − dt`, on the operator frozen on `[max(0, t − dt), t]`.
//! The operator-splitting family (Douglas, Hundsdorfer, Craig-Sneyd)
//! treats the mixed and integral parts explicitly and solves one
//! tridiagonal system per direction.

use crate::finite_differences::boundary_conditions::FdmBoundaryConditionSet;
use crate::finite_differences::operators::{FdmLinearOpComposite, FdmOperatorWindow};
use ql_core::{ensure, errors::Result, Real, Time};
use ql_math::Array;
use std::sync::Arc;

mod craig_sneyd;
mod crank_nicolson;
mod douglas;
mod explicit_euler;
mod hundsdorfer;
mod implicit_euler;
mod modified_craig_sneyd;

pub use craig_sneyd::CraigSneydScheme;
pub use crank_nicolson::CrankNicolsonScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::{ImplicitEulerScheme, DEFAULT_RELATIVE_TOLERANCE};
pub use modified_craig_sneyd::ModifiedCraigSneydScheme;

// ─── Scheme description ──────────────────────────────────────────────────────

/// Scheme family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeType {
    /// Hundsdorfer-Verwer.
    Hundsdorfer,
    /// Douglas-Rachford.
    Douglas,
    /// Craig-Sneyd.
    CraigSneyd,
    /// Modified Craig-Sneyd (In't Hout & Foulon).
    ModifiedCraigSneyd,
    /// Fully implicit Euler.
    ImplicitEuler,
    /// Explicit Euler.
    ExplicitEuler,
    /// Crank-Nicolson.
    CrankNicolson,
}

/// Scheme family plus its weights.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// Scheme family.
    pub scheme_type: FdmSchemeType,
    /// Implicitness weight θ.
    pub theta: Real,
    /// Corrector weight μ.
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Description from its parts.
    pub const fn new(scheme_type: FdmSchemeType, theta: Real, mu: Real) -> Self {
        Self { scheme_type, theta, mu }
    }

    /// Douglas with θ = 1/2.
    pub const fn douglas() -> Self {
        Self::new(FdmSchemeType::Douglas, 0.5, 0.0)
    }

    /// Implicit Euler.
    pub const fn implicit_euler() -> Self {
        Self::new(FdmSchemeType::ImplicitEuler, 0.0, 0.0)
    }

    /// Explicit Euler.
    pub const fn explicit_euler() -> Self {
        Self::new(FdmSchemeType::ExplicitEuler, 0.0, 0.0)
    }

    /// Crank-Nicolson with θ = 1/2.
    pub const fn crank_nicolson() -> Self {
        Self::new(FdmSchemeType::CrankNicolson, 0.5, 0.0)
    }

    /// Craig-Sneyd with θ = μ = 1/2.
    pub const fn craig_sneyd() -> Self {
        Self::new(FdmSchemeType::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd with θ = μ = 1/3.
    pub const fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer with θ = 1/2 + √3/6.
    pub fn hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 0.5 + 3.0_f64.sqrt() / 6.0, 0.5)
    }

    /// Hundsdorfer with θ = 1 − √2/2.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 1.0 - 0.5 * std::f64::consts::SQRT_2, 0.5)
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

// ─── Shared state ─────────────────────────────────────────────────────────────

/// Operator, boundary conditions and step size owned by every scheme.
#[derive(Debug)]
pub(crate) struct SchemeState {
    op: Arc<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    dt: Option<Time>,
}

impl SchemeState {
    fn new(op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        Self { op, bc_set, dt: None }
    }

    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    /// Move the boundaries to the start of the step and freeze the
    /// operator on it; returns the window and the step size.
    fn begin_step(&mut self, t: Time) -> Result<(FdmOperatorWindow, Time)> {
        let dt = self
            .dt
            .ok_or_else(|| ql_core::Error::Precondition("scheme step size not set".into()))?;
        ensure!(dt > 0.0, "scheme step size must be positive, got {dt}");
        ensure!(t >= 0.0, "scheme stepping from negative time {t}");
        let t0 = (t - dt).max(0.0);
        self.bc_set.set_time(t0)?;
        Ok((self.op.freeze(t0, t)?, dt))
    }
}

/// `a + c·lx`, followed by the after-applying hooks.
fn explicit_update(bc_set: &FdmBoundaryConditionSet, a: &Array, c: Real, lx: &Array) -> Result<Array> {
    let mut y = a.clone();
    y.axpy(c, lx);
    bc_set.apply_after_applying(&mut y)?;
    Ok(y)
}

/// `(I − θdt·L_i)⁻¹(y − θdt·L_i(x))` for every direction `i` in turn.
fn directional_corrections(window: &FdmOperatorWindow, y: Array, x: &Array, theta_dt: Real) -> Result<Array> {
    let mut y = y;
    for i in 0..window.dimensions() {
        let mut rhs = y;
        rhs.axpy(-theta_dt, &window.apply_direction(i, x)?);
        y = window.solve_splitting(i, &rhs, theta_dt)?;
    }
    Ok(y)
}

// ─── Scheme dispatch ──────────────────────────────────────────────────────────

/// A time-stepping scheme.
#[derive(Debug)]
pub enum FdmScheme {
    /// Explicit Euler.
    ExplicitEuler(ExplicitEulerScheme),
    /// Implicit Euler.
    ImplicitEuler(ImplicitEulerScheme),
    /// Crank-Nicolson.
    CrankNicolson(CrankNicolsonScheme),
    /// Douglas.
    Douglas(DouglasScheme),
    /// Hundsdorfer.
    Hundsdorfer(HundsdorferScheme),
    /// Craig-Sneyd.
    CraigSneyd(CraigSneydScheme),
    /// Modified Craig-Sneyd.
    ModifiedCraigSneyd(ModifiedCraigSneydScheme),
}

impl FdmScheme {
    /// The scheme described by `desc` on `op`, taking ownership of the
    /// boundary conditions.
    pub fn new(desc: FdmSchemeDesc, op: Arc<dyn FdmLinearOpComposite>, bc_set: FdmBoundaryConditionSet) -> Self {
        let FdmSchemeDesc { theta, mu, .. } = desc;
        match desc.scheme_type {
            FdmSchemeType::ExplicitEuler => Self::ExplicitEuler(ExplicitEulerScheme::new(op, bc_set)),
            FdmSchemeType::ImplicitEuler => Self::ImplicitEuler(ImplicitEulerScheme::new(op, bc_set)),
            FdmSchemeType::CrankNicolson => Self::CrankNicolson(CrankNicolsonScheme::new(theta, op, bc_set)),
            FdmSchemeType::Douglas => Self::Douglas(DouglasScheme::new(theta, op, bc_set)),
            FdmSchemeType::Hundsdorfer => Self::Hundsdorfer(HundsdorferScheme::new(theta, mu, op, bc_set)),
            FdmSchemeType::CraigSneyd => Self::CraigSneyd(CraigSneydScheme::new(theta, mu, op, bc_set)),
            FdmSchemeType::ModifiedCraigSneyd => {
                Self::ModifiedCraigSneyd(ModifiedCraigSneydScheme::new(theta, mu, op, bc_set))
            }
        }
    }

    /// Set the step size used by [`step`](Self::step).
    pub fn set_step(&mut self, dt: Time) {
        self.state_mut().set_step(dt);
    }

    /// Advance `a` from `t` to `t − dt`.
    pub fn step(&mut self, a: &mut Array, t: Time) -> Result<()> {
        match self {
            Self::ExplicitEuler(s) => s.step(a, t),
            Self::ImplicitEuler(s) => s.step(a, t),
            Self::CrankNicolson(s) => s.step(a, t),
            Self::Douglas(s) => s.step(a, t),
            Self::Hundsdorfer(s) => s.step(a, t),
            Self::CraigSneyd(s) => s.step(a, t),
            Self::ModifiedCraigSneyd(s) => s.step(a, t),
        }
    }

    /// Give back the boundary conditions.
    pub fn into_boundary_conditions(self) -> FdmBoundaryConditionSet {
        match self {
            Self::ExplicitEuler(s) => s.state.bc_set,
            Self::ImplicitEuler(s) => s.state.bc_set,
            Self::CrankNicolson(s) => s.state.bc_set,
            Self::Douglas(s) => s.state.bc_set,
            Self::Hundsdorfer(s) => s.state.bc_set,
            Self::CraigSneyd(s) => s.state.bc_set,
            Self::ModifiedCraigSneyd(s) => s.state.bc_set,
        }
    }

    fn state_mut(&mut self) -> &mut SchemeState {
        match self {
            Self::ExplicitEuler(s) => &mut s.state,
            Self::ImplicitEuler(s) => &mut s.state,
            Self::CrankNicolson(s) => &mut s.state,
            Self::Douglas(s) => &mut s.state,
            Self::Hundsdorfer(s) => &mut s.state,
            Self::CraigSneyd(s) => &mut s.state,
            Self::ModifiedCraigSneyd(s) => &mut s.state,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{black_scholes_1d, heston_2d};
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn presets_carry_published_weights() {
        assert_eq!(FdmSchemeDesc::default(), FdmSchemeDesc::douglas());
        assert_relative_eq!(FdmSchemeDesc::hundsdorfer().theta, 0.788675134594813, epsilon = 1e-12);
        assert_relative_eq!(FdmSchemeDesc::modified_hundsdorfer().theta, 0.292893218813452, epsilon = 1e-12);
        assert_eq!(FdmSchemeDesc::modified_craig_sneyd().scheme_type, FdmSchemeType::ModifiedCraigSneyd);
    }

    #[test]
    fn stepping_without_a_step_size_fails() {
        let (op, n) = heston_2d();
        let mut scheme = FdmScheme::new(FdmSchemeDesc::douglas(), op, FdmBoundaryConditionSet::default());
        let mut a = Array::from_element(n, 1.0);
        assert!(scheme.step(&mut a, 1.0).is_err());
    }

    #[test]
    fn every_scheme_discounts_a_constant() {
        let descs = [
            FdmSchemeDesc::douglas(),
            FdmSchemeDesc::hundsdorfer(),
            FdmSchemeDesc::modified_hundsdorfer(),
            FdmSchemeDesc::craig_sneyd(),
            FdmSchemeDesc::modified_craig_sneyd(),
            FdmSchemeDesc::implicit_euler(),
            FdmSchemeDesc::crank_nicolson(),
            FdmSchemeDesc::explicit_euler(),
        ];
        for desc in descs {
            let (op, n) = heston_2d();
            let mut scheme = FdmScheme::new(desc, op, FdmBoundaryConditionSet::default());
            scheme.set_step(0.01);
            let mut a = Array::from_element(n, 1.0);
            let mut t = 0.5;
            for _ in 0..50 {
                scheme.step(&mut a, t).unwrap();
                t -= 0.01;
            }
            // the constant stays constant; its level is the discount factor
            let df = (-0.05_f64 * 0.5).exp();
            for v in a.iter() {
                assert_relative_eq!(*v, df, max_relative = 2e-3);
            }
        }
    }

    #[test]
    fn modified_craig_sneyd_uses_its_corrector_weight() {
        let roll = |mu: Real| {
            let (op, x) = black_scholes_1d(100);
            let desc = FdmSchemeDesc::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, mu);
            let mut scheme = FdmScheme::new(desc, op, FdmBoundaryConditionSet::default());
            scheme.set_step(0.02);
            let mut a = x.map(|x| (x.exp() - 100.0).max(0.0));
            let mut t = 1.0;
            for _ in 0..50 {
                scheme.step(&mut a, t).unwrap();
                t -= 0.02;
            }
            a
        };
        let (standard, half, zero) = (roll(1.0 / 3.0), roll(0.5), roll(0.0));
        let atm = standard.size() / 2;
        assert!((standard[atm] - half[atm]).abs() > 1e-6);
        assert!((standard[atm] - zero[atm]).abs() > 1e-6);
    }
}
