//! Evaluator factories for the expressions the value core executes directly.

mod access;
mod constructors;
mod operators;
mod sequence;

pub use access::{ConstantFactory, FieldAccessFactory};
pub use constructors::{ObjectUnionFactory, PIConstructorFactory};
pub use operators::{
    ArithmeticFactory, CastFactory, GeneralComparisonFactory, ValueComparisonFactory,
};
pub use sequence::{CountAggregateFactory, CountFactory, SumAggregateFactory};
