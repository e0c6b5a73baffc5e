//! Typed setters that encode a tag and its payload into a [`ValueStorage`].
//!
//! Every setter writes one complete tagged value. On error nothing is
//! written, except where a multi-part payload fails halfway; callers discard
//! the output on error either way.

use crate::storage::ValueStorage;
use crate::values::{Timezone, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::{Result, SystemError, ValueTag};

/// Byte marking an absent timezone in both offset fields.
pub const NO_TIMEZONE: i8 = i8::MAX;

/// Largest byte length of a string or binary payload.
pub const MAX_VARIABLE_LENGTH: usize = u16::MAX as usize;

/// Payload width of an integer-family tag.
pub const fn integer_width(tag: ValueTag) -> Option<usize> {
    use ValueTag as T;
    match tag {
        T::Integer
        | T::Long
        | T::NonPositiveInteger
        | T::NegativeInteger
        | T::NonNegativeInteger
        | T::PositiveInteger
        | T::UnsignedLong
        | T::UnsignedInt => Some(8),
        T::Int | T::UnsignedShort => Some(4),
        T::Short | T::UnsignedByte => Some(2),
        T::Byte => Some(1),
        _ => None,
    }
}

/// Inclusive value range of an integer-family tag.
pub const fn integer_range(tag: ValueTag) -> (i64, i64) {
    use ValueTag as T;
    match tag {
        T::NonPositiveInteger => (i64::MIN, 0),
        T::NegativeInteger => (i64::MIN, -1),
        T::NonNegativeInteger | T::UnsignedLong => (0, i64::MAX),
        T::PositiveInteger => (1, i64::MAX),
        T::UnsignedInt => (0, u32::MAX as i64),
        T::Int => (i32::MIN as i64, i32::MAX as i64),
        T::UnsignedShort => (0, u16::MAX as i64),
        T::Short => (i16::MIN as i64, i16::MAX as i64),
        T::UnsignedByte => (0, u8::MAX as i64),
        T::Byte => (i8::MIN as i64, i8::MAX as i64),
        _ => (i64::MIN, i64::MAX),
    }
}

fn expect_tag(tag: ValueTag, accepted: bool, expected: &str) -> Result<()> {
    if accepted {
        Ok(())
    } else {
        Err(SystemError::type_error(format!(
            "cannot encode {tag} as {expected}"
        )))
    }
}

pub fn write_boolean(out: &mut ValueStorage, value: bool) -> Result<()> {
    out.write_tag(ValueTag::Boolean)?;
    out.write_u8(value as u8)
}

/// Writes an integer of any integer-family tag, range checked against the
/// tag's value space.
pub fn write_integer(out: &mut ValueStorage, tag: ValueTag, value: i64) -> Result<()> {
    let width = integer_width(tag)
        .ok_or_else(|| SystemError::type_error(format!("{tag} is not an integer type")))?;
    let (min, max) = integer_range(tag);
    if value < min || value > max {
        return Err(SystemError::invalid_cast(tag.name(), value.to_string()));
    }
    out.write_tag(tag)?;
    match width {
        8 => out.write_i64(value),
        4 => out.write_i32(value as i32),
        2 => out.write_i16(value as i16),
        _ => out.write_i8(value as i8),
    }
}

pub fn write_float(out: &mut ValueStorage, value: f32) -> Result<()> {
    out.write_tag(ValueTag::Float)?;
    out.write_f32(value)
}

pub fn write_double(out: &mut ValueStorage, value: f64) -> Result<()> {
    out.write_tag(ValueTag::Double)?;
    out.write_f64(value)
}

pub fn write_decimal(out: &mut ValueStorage, value: XsDecimal) -> Result<()> {
    out.write_tag(ValueTag::Decimal)?;
    out.write_i8(value.scale)?;
    out.write_i64(value.mantissa)
}

pub(crate) fn write_length_prefixed(out: &mut ValueStorage, bytes: &[u8]) -> Result<()> {
    let len = u16::try_from(bytes.len()).map_err(|_| SystemError::ValueTooLarge {
        size: bytes.len(),
        max: MAX_VARIABLE_LENGTH,
    })?;
    out.write_u16(len)?;
    out.write_bytes(bytes)
}

/// Writes a value of the string family, `xs:untypedAtomic`, `xs:anyURI` or
/// `xs:NOTATION`.
pub fn write_string(out: &mut ValueStorage, tag: ValueTag, value: &str) -> Result<()> {
    expect_tag(tag, tag.is_string_like(), "a string")?;
    if value.len() > MAX_VARIABLE_LENGTH {
        return Err(SystemError::ValueTooLarge {
            size: value.len(),
            max: MAX_VARIABLE_LENGTH,
        });
    }
    out.write_tag(tag)?;
    write_length_prefixed(out, value.as_bytes())
}

/// Like [`write_string`], for text already rendered into a byte buffer.
pub fn write_utf8(out: &mut ValueStorage, tag: ValueTag, bytes: &[u8]) -> Result<()> {
    write_string(out, tag, std::str::from_utf8(bytes)?)
}

pub fn write_binary(out: &mut ValueStorage, tag: ValueTag, bytes: &[u8]) -> Result<()> {
    expect_tag(
        tag,
        matches!(tag, ValueTag::HexBinary | ValueTag::Base64Binary),
        "binary",
    )?;
    if bytes.len() > MAX_VARIABLE_LENGTH {
        return Err(SystemError::ValueTooLarge {
            size: bytes.len(),
            max: MAX_VARIABLE_LENGTH,
        });
    }
    out.write_tag(tag)?;
    write_length_prefixed(out, bytes)
}

pub fn write_qname(out: &mut ValueStorage, prefix: &str, uri: &str, local: &str) -> Result<()> {
    out.write_tag(ValueTag::QName)?;
    write_length_prefixed(out, prefix.as_bytes())?;
    write_length_prefixed(out, uri.as_bytes())?;
    write_length_prefixed(out, local.as_bytes())
}

fn write_timezone(out: &mut ValueStorage, timezone: Option<Timezone>) -> Result<()> {
    match timezone {
        Some(tz) => {
            out.write_i8(tz.hours())?;
            out.write_i8(tz.minutes())
        }
        None => {
            out.write_i8(NO_TIMEZONE)?;
            out.write_i8(NO_TIMEZONE)
        }
    }
}

pub(crate) fn read_timezone(hours: i8, minutes: i8) -> Option<Timezone> {
    if hours == NO_TIMEZONE {
        None
    } else {
        Timezone::from_hours_minutes(hours, minutes)
    }
}

/// Writes `xs:date` or one of the gregorian fragment types, which share the
/// date layout.
pub fn write_date(out: &mut ValueStorage, tag: ValueTag, value: &XsDate) -> Result<()> {
    expect_tag(
        tag,
        tag == ValueTag::Date || tag.is_gregorian(),
        "a date",
    )?;
    out.write_tag(tag)?;
    out.write_i32(value.year)?;
    out.write_u8(value.month)?;
    out.write_u8(value.day)?;
    write_timezone(out, value.timezone)
}

pub fn write_datetime(out: &mut ValueStorage, value: &XsDateTime) -> Result<()> {
    out.write_tag(ValueTag::DateTime)?;
    out.write_i32(value.year)?;
    out.write_u8(value.month)?;
    out.write_u8(value.day)?;
    out.write_u8(value.hour)?;
    out.write_u8(value.minute)?;
    out.write_u16(value.millis)?;
    write_timezone(out, value.timezone)
}

pub fn write_time(out: &mut ValueStorage, value: &XsTime) -> Result<()> {
    out.write_tag(ValueTag::Time)?;
    out.write_u8(value.hour)?;
    out.write_u8(value.minute)?;
    out.write_u16(value.millis)?;
    write_timezone(out, value.timezone)
}

pub fn write_duration(out: &mut ValueStorage, value: XsDuration) -> Result<()> {
    out.write_tag(ValueTag::Duration)?;
    out.write_i32(value.months)?;
    out.write_i64(value.millis)
}

pub fn write_day_time_duration(out: &mut ValueStorage, millis: i64) -> Result<()> {
    out.write_tag(ValueTag::DayTimeDuration)?;
    out.write_i64(millis)
}

pub fn write_year_month_duration(out: &mut ValueStorage, months: i32) -> Result<()> {
    out.write_tag(ValueTag::YearMonthDuration)?;
    out.write_i32(months)
}

pub fn write_null(out: &mut ValueStorage) -> Result<()> {
    out.write_tag(ValueTag::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_layout_is_scale_then_mantissa() {
        let mut out = ValueStorage::new();
        write_decimal(&mut out, XsDecimal::new(12345, 2)).unwrap();
        assert_eq!(
            out.as_bytes(),
            &[ValueTag::Decimal.code(), 2, 0, 0, 0, 0, 0, 0, 0x30, 0x39]
        );
    }

    #[test]
    fn test_integer_width_follows_subtype() {
        let mut out = ValueStorage::new();
        write_integer(&mut out, ValueTag::Short, -2).unwrap();
        assert_eq!(out.as_bytes(), &[ValueTag::Short.code(), 0xff, 0xfe]);

        out.reset();
        write_integer(&mut out, ValueTag::Byte, 7).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_integer_subtype_range_is_enforced() {
        let mut out = ValueStorage::new();
        let err = write_integer(&mut out, ValueTag::UnsignedByte, 256).unwrap_err();
        assert!(matches!(err, SystemError::InvalidCast { .. }));
        assert!(write_integer(&mut out, ValueTag::NegativeInteger, 0).is_err());
        assert!(write_integer(&mut out, ValueTag::Decimal, 1).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_string_length_limit() {
        let mut out = ValueStorage::new();
        let long = "x".repeat(MAX_VARIABLE_LENGTH + 1);
        let err = write_string(&mut out, ValueTag::String, &long).unwrap_err();
        assert!(matches!(err, SystemError::ValueTooLarge { .. }));
        assert!(out.is_empty());

        write_string(&mut out, ValueTag::AnyUri, "urn:a").unwrap();
        assert_eq!(out.as_bytes()[..3], [ValueTag::AnyUri.code(), 0, 5]);
    }

    #[test]
    fn test_absent_timezone_marker() {
        let mut out = ValueStorage::new();
        write_date(&mut out, ValueTag::Date, &XsDate::new(2024, 2, 29, None)).unwrap();
        assert_eq!(&out.as_bytes()[7..], &[NO_TIMEZONE as u8, NO_TIMEZONE as u8]);
        assert!(write_date(&mut out, ValueTag::Time, &XsDate::new(1, 1, 1, None)).is_err());
    }
}
