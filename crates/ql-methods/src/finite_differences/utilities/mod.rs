//! Grid bookkeeping shared by meshers, operators and solvers.

mod inner_value;
mod layout;

pub use inner_value::{
    FdmCellAveragingInnerValue, FdmExpExtOUInnerValue, FdmInnerValueCalculator, FdmLogInnerValue,
    FdmPlainInnerValue, FdmZeroInnerValue,
};
pub use layout::{FdmLinearOpIterator, FdmLinearOpLayout};
