//! Figure-of-merit formulas over a [`SpecTable`](crate::spec::SpecTable).

mod registry;
pub mod weights;

pub use registry::{Evaluator, Fom, FomArgs, FomRegistry};
