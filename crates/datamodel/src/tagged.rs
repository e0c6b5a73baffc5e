use crate::bytes::{read_length_prefixed, read_u8, read_u16, read_u32, slice};
use crate::codec::integer_width;
use crate::pointable::Pointable;
use crate::slotted::SlottedRegion;
use std::fmt;
use tessera_types::{Result, SystemError, ValueTag};

/// Header bit: element has a namespace chunk.
pub const NS_CHUNK_FLAG: u8 = 0x01;
/// Header bit: element has an attribute chunk.
pub const ATTRIBUTES_CHUNK_FLAG: u8 = 0x02;
/// Header bit: element has a children chunk.
pub const CHILDREN_CHUNK_FLAG: u8 = 0x04;
/// Header bit: node tree carries a string dictionary.
pub const DICTIONARY_FLAG: u8 = 0x01;

/// Bytes of the element/attribute prelude after the header: three name codes
/// and the local node id.
pub(crate) const NAME_AND_ID_LEN: usize = 16;

/// A non-owning view of exactly one encoded value: tag byte plus payload.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TaggedValue<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl<'a> TaggedValue<'a> {
    /// Binds to `bytes`, which must hold exactly one complete value.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let (value, rest) = Self::split_first(bytes)?;
        if !rest.is_empty() {
            return Err(SystemError::internal(format!(
                "{} trailing bytes after {}",
                rest.len(),
                value.tag
            )));
        }
        Ok(value)
    }

    /// Binds to the value at the start of `bytes` and returns the remainder.
    pub fn split_first(bytes: &'a [u8]) -> Result<(Self, &'a [u8])> {
        let len = encoded_len(bytes)?;
        let tag = ValueTag::try_from(bytes[0])?;
        let (head, rest) = bytes.split_at(len);
        Ok((TaggedValue { tag, bytes: head }, rest))
    }

    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    /// The full encoding, tag byte included.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[1..]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Binds a typed accessor of type `P`.
    pub fn get<P: Pointable<'a>>(&self) -> Result<P> {
        P::bind(*self)
    }
}

impl fmt::Debug for TaggedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedValue")
            .field("tag", &self.tag)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Byte length of the value encoded at the start of `bytes`, tag included.
pub fn encoded_len(bytes: &[u8]) -> Result<usize> {
    let code = *bytes
        .first()
        .ok_or_else(|| SystemError::internal("empty value encoding"))?;
    let tag = ValueTag::try_from(code)?;
    let payload = &bytes[1..];
    let payload_len = payload_len(tag, payload)?;
    if payload_len > payload.len() {
        return Err(SystemError::internal(format!(
            "{tag} needs {payload_len} payload bytes, found {}",
            payload.len()
        )));
    }
    Ok(1 + payload_len)
}

fn payload_len(tag: ValueTag, payload: &[u8]) -> Result<usize> {
    use ValueTag as T;
    if let Some(width) = integer_width(tag) {
        return Ok(width);
    }
    let len = match tag {
        T::Boolean => 1,
        T::Float | T::YearMonthDuration => 4,
        T::Double | T::DayTimeDuration => 8,
        T::Decimal => 9,
        T::Date | T::GYearMonth | T::GYear | T::GMonthDay | T::GDay | T::GMonth => 8,
        T::DateTime | T::Duration => 12,
        T::Time => 6,
        T::Null => 0,
        T::HexBinary | T::Base64Binary => 2 + read_u16(payload, 0)? as usize,
        t if t.is_string_like() => 2 + read_u16(payload, 0)? as usize,
        T::QName => {
            let (_, at) = read_length_prefixed(payload, 0)?;
            let (_, at) = read_length_prefixed(payload, at)?;
            let (_, at) = read_length_prefixed(payload, at)?;
            at
        }
        T::Sequence | T::Array | T::Object => SlottedRegion::parse(payload, 0)?.1,
        T::ElementNode => element_len(payload)?,
        T::AttributeNode => {
            let at = 1 + NAME_AND_ID_LEN;
            at + encoded_len(slice(payload, at, payload.len().saturating_sub(at))?)?
        }
        T::TextNode | T::CommentNode => read_length_prefixed(payload, 4)?.1,
        T::PiNode => {
            let (_, at) = read_length_prefixed(payload, 4)?;
            read_length_prefixed(payload, at)?.1
        }
        T::DocumentNode => SlottedRegion::parse(payload, 4)?.1,
        T::NodeTree => {
            let header = read_u8(payload, 0)?;
            let mut at = 1;
            if header & DICTIONARY_FLAG != 0 {
                at += 4 + read_u32(payload, at)? as usize;
            }
            at + encoded_len(slice(payload, at, payload.len().saturating_sub(at))?)?
        }
        _ => {
            return Err(SystemError::internal(format!(
                "{tag} has no value encoding"
            )));
        }
    };
    Ok(len)
}

fn element_len(payload: &[u8]) -> Result<usize> {
    let header = read_u8(payload, 0)?;
    let mut at = 1 + NAME_AND_ID_LEN;
    if header & NS_CHUNK_FLAG != 0 {
        at += 4 + 8 * read_u32(payload, at)? as usize;
    }
    if header & ATTRIBUTES_CHUNK_FLAG != 0 {
        at = SlottedRegion::parse(payload, at)?.1;
    }
    if header & CHILDREN_CHUNK_FLAG != 0 {
        at = SlottedRegion::parse(payload, at)?.1;
    }
    Ok(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::storage::ValueStorage;

    #[test]
    fn test_fixed_and_variable_lengths() {
        let mut out = ValueStorage::new();
        codec::write_double(&mut out, 1.5).unwrap();
        assert_eq!(encoded_len(out.as_bytes()).unwrap(), 9);

        out.reset();
        codec::write_string(&mut out, ValueTag::Token, "abc").unwrap();
        assert_eq!(encoded_len(out.as_bytes()).unwrap(), 6);

        out.reset();
        codec::write_qname(&mut out, "p", "urn:x", "local").unwrap();
        assert_eq!(encoded_len(out.as_bytes()).unwrap(), 1 + 3 + 7 + 7);
    }

    #[test]
    fn test_split_first_walks_back_to_back_values() {
        let mut out = ValueStorage::new();
        codec::write_boolean(&mut out, true).unwrap();
        codec::write_integer(&mut out, ValueTag::Int, 9).unwrap();
        let (first, rest) = TaggedValue::split_first(out.as_bytes()).unwrap();
        assert_eq!(first.tag(), ValueTag::Boolean);
        let second = TaggedValue::new(rest).unwrap();
        assert_eq!(second.tag(), ValueTag::Int);
        assert_eq!(second.payload(), &[0, 0, 0, 9]);
    }

    #[test]
    fn test_truncated_and_trailing_bytes_are_rejected() {
        let mut out = ValueStorage::new();
        codec::write_double(&mut out, 2.0).unwrap();
        assert!(TaggedValue::new(&out.as_bytes()[..5]).is_err());
        out.write_u8(0).unwrap();
        assert!(TaggedValue::new(out.as_bytes()).is_err());
        assert!(TaggedValue::new(&[]).is_err());
        assert!(TaggedValue::new(&[ValueTag::AnyAtomic.code()]).is_err());
    }
}
