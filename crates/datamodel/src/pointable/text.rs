use super::{Pointable, expect_payload};
use crate::bytes::read_length_prefixed;
use crate::tagged::TaggedValue;
use tessera_types::{Result, ValueTag};

/// Accessor for every UTF-8 payload: the string family, `xs:untypedAtomic`,
/// `xs:anyURI` and `xs:NOTATION`.
#[derive(Debug, Clone, Copy)]
pub struct StringPointable<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl<'a> StringPointable<'a> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    /// The UTF-8 bytes, without the length prefix.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn utf8_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_str(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.bytes)?)
    }
}

impl<'a> Pointable<'a> for StringPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(value, value.tag().is_string_like(), "a string", 2)?;
        let (bytes, _) = read_length_prefixed(payload, 0)?;
        Ok(Self {
            tag: value.tag(),
            bytes,
        })
    }
}

/// Accessor for `xs:hexBinary` and `xs:base64Binary`; both carry raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct BinaryPointable<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl<'a> BinaryPointable<'a> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Pointable<'a> for BinaryPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let accepts = matches!(value.tag(), ValueTag::HexBinary | ValueTag::Base64Binary);
        let payload = expect_payload(value, accepts, "binary", 2)?;
        let (bytes, _) = read_length_prefixed(payload, 0)?;
        Ok(Self {
            tag: value.tag(),
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QNamePointable<'a> {
    prefix: &'a [u8],
    uri: &'a [u8],
    local: &'a [u8],
}

impl<'a> QNamePointable<'a> {
    pub fn prefix(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.prefix)?)
    }

    pub fn uri(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.uri)?)
    }

    pub fn local_name(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.local)?)
    }

    /// Namespace URI and local name bytes; the prefix takes no part in
    /// QName identity.
    pub fn expanded_name(&self) -> (&'a [u8], &'a [u8]) {
        (self.uri, self.local)
    }
}

impl<'a> Pointable<'a> for QNamePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(value, value.tag() == ValueTag::QName, "xs:QName", 6)?;
        let (prefix, at) = read_length_prefixed(payload, 0)?;
        let (uri, at) = read_length_prefixed(payload, at)?;
        let (local, _) = read_length_prefixed(payload, at)?;
        Ok(Self { prefix, uri, local })
    }
}
