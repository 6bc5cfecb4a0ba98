//! Boundary conditions applied around each scheme step.
//!
//! A condition gets four hooks: before the operator is applied (it may
//! modify the frozen operator), after an explicit application, before an
//! implicit solve and after it.  Only the "after" hooks are required.

use crate::finite_differences::operators::FdmOperatorWindow;
use ql_core::{errors::Result, Time};
use ql_math::Array;

mod dirichlet;
mod discount_dirichlet;

pub use dirichlet::{BoundaryValueFn, FdmDirichletBoundary, FdmTimeDepDirichletBoundary};
pub use discount_dirichlet::FdmDiscountDirichletBoundary;

/// Which end of a direction a boundary sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// First grid line of the direction.
    Lower,
    /// Last grid line of the direction.
    Upper,
}

/// A boundary condition of the discretised PDE.
pub trait BoundaryCondition: std::fmt::Debug + Send + Sync {
    /// Move the condition to time `t`.
    fn set_time(&mut self, _t: Time) -> Result<()> {
        Ok(())
    }

    /// Hook before the operator is applied explicitly.
    fn apply_before_applying(&self, _op: &mut FdmOperatorWindow) -> Result<()> {
        Ok(())
    }

    /// Hook after an explicit application.
    fn apply_after_applying(&self, a: &mut Array) -> Result<()>;

    /// Hook before an implicit solve.
    fn apply_before_solving(&self, _op: &mut FdmOperatorWindow, _rhs: &mut Array) -> Result<()> {
        Ok(())
    }

    /// Hook after an implicit solve.
    fn apply_after_solving(&self, a: &mut Array) -> Result<()>;

    /// The condition viewed as a fixed-value Dirichlet boundary, if it is one.
    fn as_dirichlet(&self) -> Option<&FdmDirichletBoundary> {
        None
    }
}

/// Ordered collection of boundary conditions.
#[derive(Debug, Default)]
pub struct FdmBoundaryConditionSet {
    conditions: Vec<Box<dyn BoundaryCondition>>,
}

impl FdmBoundaryConditionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn push<B: BoundaryCondition + 'static>(&mut self, condition: B) {
        self.conditions.push(Box::new(condition));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<B: BoundaryCondition + 'static>(mut self, condition: B) -> Self {
        self.push(condition);
        self
    }

    /// The conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn BoundaryCondition> + '_ {
        self.conditions.iter().map(|c| c.as_ref())
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// `true` without conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn set_time(&mut self, t: Time) -> Result<()> {
        self.conditions.iter_mut().try_for_each(|c| c.set_time(t))
    }

    pub(crate) fn apply_before_applying(&self, op: &mut FdmOperatorWindow) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.apply_before_applying(op))
    }

    pub(crate) fn apply_after_applying(&self, a: &mut Array) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.apply_after_applying(a))
    }

    pub(crate) fn apply_before_solving(&self, op: &mut FdmOperatorWindow, rhs: &mut Array) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.apply_before_solving(op, rhs))
    }

    pub(crate) fn apply_after_solving(&self, a: &mut Array) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.apply_after_solving(a))
    }
}
