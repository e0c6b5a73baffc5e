use super::{FixedLength, Pointable, expect_payload, is_tag};
use crate::codec::integer_width;
use crate::tagged::TaggedValue;
use crate::values::XsDecimal;
use tessera_types::{Result, ValueTag};

#[derive(Debug, Clone, Copy)]
pub struct BooleanPointable<'a> {
    payload: &'a [u8],
}

impl BooleanPointable<'_> {
    pub fn get(&self) -> bool {
        self.payload[0] != 0
    }
}

impl FixedLength for BooleanPointable<'_> {
    const FIXED_LENGTH: usize = 1;
}

impl<'a> Pointable<'a> for BooleanPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::Boolean),
            "xs:boolean",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

/// Accessor for `xs:integer` and all of its restrictions, whatever their
/// payload width.
#[derive(Debug, Clone, Copy)]
pub struct IntegerPointable<'a> {
    tag: ValueTag,
    payload: &'a [u8],
}

impl IntegerPointable<'_> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn as_i64(&self) -> i64 {
        let p = self.payload;
        match p.len() {
            1 => p[0] as i8 as i64,
            2 => i16::from_be_bytes([p[0], p[1]]) as i64,
            4 => i32::from_be_bytes([p[0], p[1], p[2], p[3]]) as i64,
            _ => i64::from_be_bytes([p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]]),
        }
    }
}

impl<'a> Pointable<'a> for IntegerPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let width = integer_width(value.tag()).unwrap_or(0);
        let payload = expect_payload(value, width > 0, "an integer", width)?;
        Ok(Self {
            tag: value.tag(),
            payload: &payload[..width],
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatPointable<'a> {
    payload: &'a [u8],
}

impl FloatPointable<'_> {
    pub fn get(&self) -> f32 {
        let p = self.payload;
        f32::from_be_bytes([p[0], p[1], p[2], p[3]])
    }
}

impl FixedLength for FloatPointable<'_> {
    const FIXED_LENGTH: usize = 4;
}

impl<'a> Pointable<'a> for FloatPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::Float),
            "xs:float",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoublePointable<'a> {
    payload: &'a [u8],
}

impl DoublePointable<'_> {
    pub fn get(&self) -> f64 {
        let p = self.payload;
        f64::from_be_bytes([p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]])
    }
}

impl FixedLength for DoublePointable<'_> {
    const FIXED_LENGTH: usize = 8;
}

impl<'a> Pointable<'a> for DoublePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::Double),
            "xs:double",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

/// Accessor for `xs:decimal`: scale byte then 64-bit mantissa.
#[derive(Debug, Clone, Copy)]
pub struct DecimalPointable<'a> {
    payload: &'a [u8],
}

impl DecimalPointable<'_> {
    pub fn scale(&self) -> i8 {
        self.payload[0] as i8
    }

    pub fn mantissa(&self) -> i64 {
        let p = &self.payload[1..9];
        i64::from_be_bytes([p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]])
    }

    pub fn decimal_parts(&self) -> XsDecimal {
        XsDecimal::new(self.mantissa(), self.scale())
    }
}

impl FixedLength for DecimalPointable<'_> {
    const FIXED_LENGTH: usize = 9;
}

impl<'a> Pointable<'a> for DecimalPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::Decimal),
            "xs:decimal",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}
