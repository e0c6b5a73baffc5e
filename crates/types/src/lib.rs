//! Type tags, the atomic type registry and the error taxonomy shared by every
//! Tessera crate.
//!
//! # Key Types
//!
//! - [`ValueTag`]: one-byte discriminant prefixing every encoded value
//! - [`TypeRegistry`]: base-type links and canonical normalization
//! - [`CanonicalType`]: dispatch groups for the operator engines
//! - [`SystemError`]: failures carrying a stable [`ErrorCode`]
//!
//! # Example
//!
//! ```ignore
//! use tessera_types::{CanonicalType, ValueTag, base_type_for_arithmetic};
//!
//! assert_eq!(base_type_for_arithmetic(ValueTag::Short)?, CanonicalType::Integer);
//! ```

pub mod error;
pub mod registry;
pub mod tag;

pub use error::{ErrorCode, Result, SystemError};
pub use registry::{
    CanonicalType, FIRST_DERIVED_TYPE_ID, MAX_TYPE_DEPTH, TypeId, TypeRegistry,
    TypeRegistryBuilder, base_type_for_arithmetic, base_type_for_comparison,
    base_type_for_general_comparison,
};
pub use tag::ValueTag;
