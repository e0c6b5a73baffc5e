//! Zero-copy typed accessors over encoded values.
//!
//! A pointable is bound to a [`TaggedValue`] with a tag and length check only;
//! it never copies and is valid for as long as the underlying buffer is.

mod atomic;
mod node;
mod sequence;
mod temporal;
mod text;

pub use atomic::{
    BooleanPointable, DecimalPointable, DoublePointable, FloatPointable, IntegerPointable,
};
pub use node::{
    AttributeNodePointable, DictionaryPointable, DocumentNodePointable, ElementNodePointable,
    NodeTreePointable, PINodePointable, TextNodePointable,
};
pub use sequence::{ObjectPointable, SequencePointable};
pub use temporal::{
    DatePointable, DateTimePointable, DayTimeDurationPointable, DurationPointable, TimePointable,
    YearMonthDurationPointable,
};
pub use text::{BinaryPointable, QNamePointable, StringPointable};

use crate::tagged::TaggedValue;
use tessera_types::{Result, SystemError, ValueTag};

/// A typed view bound to one encoded value.
pub trait Pointable<'a>: Sized {
    fn bind(value: TaggedValue<'a>) -> Result<Self>;
}

/// Pointables whose payload width is known from the tag alone.
pub trait FixedLength {
    /// Payload bytes, excluding the tag byte.
    const FIXED_LENGTH: usize;
}

pub(crate) fn expect_payload<'a>(
    value: TaggedValue<'a>,
    accepts: bool,
    expected: &str,
    min_len: usize,
) -> Result<&'a [u8]> {
    if !accepts {
        return Err(SystemError::type_error(format!(
            "expected {expected}, found {}",
            value.tag()
        )));
    }
    let payload = value.payload();
    if payload.len() < min_len {
        return Err(SystemError::internal(format!(
            "{} payload of {} bytes is shorter than {min_len}",
            value.tag(),
            payload.len()
        )));
    }
    Ok(payload)
}

pub(crate) fn is_tag(tag: ValueTag, expected: ValueTag) -> bool {
    tag == expected
}
