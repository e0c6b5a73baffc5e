//! Tessera: a tagged binary value core for XQuery and JSONiq evaluation.
//!
//! The workspace is layered:
//!
//! - [`types`]: value tags, the type registry and [`SystemError`]
//! - [`datamodel`]: the binary codec, pointables and builders
//! - [`runtime`]: comparison, arithmetic and cast engines, evaluator
//!   factories and the [`DynamicContext`]
//! - [`executor`]: sequential and rayon executors
//!
//! This crate re-exports them and adds [`PartitionRunner`], which drives
//! evaluator factories over partitions of tuples.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera::{DynamicContext, ExecutorImpl, PartitionRunner};
//! use tessera::runtime::functions::FieldAccessFactory;
//!
//! let results = PartitionRunner::run(
//!     &ExecutorImpl::default(),
//!     Arc::new(FieldAccessFactory::new(0)),
//!     &DynamicContext::default(),
//!     partitions,
//! )?;
//! ```

pub mod partition;

pub use tessera_datamodel as datamodel;
pub use tessera_executor as executor;
pub use tessera_runtime as runtime;
pub use tessera_types as types;

pub use partition::{PartitionRunner, Tuple};
pub use tessera_datamodel::{TaggedValue, ValueStorage};
pub use tessera_executor::{Executor, ExecutorError, ExecutorImpl, SyncExecutor};
pub use tessera_runtime::{DynamicContext, EngineConfig};
pub use tessera_types::{ErrorCode, Result, SystemError, ValueTag};
