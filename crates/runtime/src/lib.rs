//! Operator engines and evaluator factories for the Tessera value core.
//!
//! Everything here reads operands as [`TaggedValue`](tessera_datamodel::TaggedValue)
//! views and appends results to a caller-owned
//! [`ValueStorage`](tessera_datamodel::ValueStorage).
//!
//! # Key Types
//!
//! - [`ValueComparison`]: one method per canonical type pair, with `eq` and
//!   `lt` as the primitives the other four comparisons derive from
//! - [`ArithmeticOperation`]: the six arithmetic operators with central
//!   numeric promotion and mirror handling
//! - [`DynamicContext`]: implicit timezone, clock and decimal scale, built
//!   from an [`EngineConfig`]
//! - [`ScalarEvaluatorFactory`]: the contract between compiled expressions
//!   and the engines
//!
//! # Example
//!
//! ```ignore
//! use tessera_runtime::{ComparisonOperator, DynamicContext, compare_tagged_values};
//!
//! let ctx = DynamicContext::default();
//! let less = compare_tagged_values(ComparisonOperator::Lt, left, right, &ctx)?;
//! ```

pub mod arithmetic;
pub mod cast;
pub mod comparison;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod numeric;

pub use arithmetic::{ArithmeticOperation, ArithmeticOperator, apply_arithmetic};
pub use cast::cast_tagged_value;
pub use comparison::{
    ComparisonOperator, GeneralComparisonScratch, ValueComparison, compare_general,
    compare_tagged_values,
};
pub use config::{ConfigError, EngineConfig};
pub use context::DynamicContext;
pub use evaluator::{
    AggregateEvaluator, AggregateEvaluatorFactory, ScalarEvaluator, ScalarEvaluatorFactory,
};
pub use numeric::Numeric;
