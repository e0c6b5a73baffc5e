//! Binary representation of Tessera values.
//!
//! Every value is a tag byte followed by a payload. This crate owns the output
//! buffer values are written into, the typed setters that write them, the
//! zero-copy pointables that read them back and the builders for sequences,
//! JSON containers and XML nodes.
//!
//! # Key Types
//!
//! - [`ValueStorage`]: bounded, reusable output buffer
//! - [`TaggedValue`]: a borrowed view of one complete encoded value
//! - [`pointable`]: typed accessors bound to a [`TaggedValue`]
//! - [`builder`]: incremental writers for structural values
//!
//! # Example
//!
//! ```ignore
//! use tessera_datamodel::{ValueStorage, codec, pointable::IntegerPointable};
//! use tessera_types::ValueTag;
//!
//! let mut out = ValueStorage::new();
//! codec::write_integer(&mut out, ValueTag::Long, 42)?;
//! assert_eq!(out.tagged()?.get::<IntegerPointable>()?.as_i64(), 42);
//! ```

mod bytes;
pub mod builder;
pub mod codec;
pub mod pointable;
pub mod slotted;
pub mod storage;
pub mod tagged;
pub mod values;

pub use slotted::SlottedRegion;
pub use storage::{DEFAULT_MAX_VALUE_BYTES, ValueStorage};
pub use tagged::{TaggedValue, encoded_len};
pub use values::{NodeName, Timezone, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
