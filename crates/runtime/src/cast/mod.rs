//! `cast as` between atomic types.
//!
//! Three routes, tried in order: rendering into a string-family target,
//! parsing a textual source, and direct conversion between typed values.
//! Anything outside those routes is a type error.

pub mod lexical;

use crate::context::DynamicContext;
use crate::format;
use crate::numeric::Numeric;
use base64::{Engine, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tessera_datamodel::pointable::{
    BinaryPointable, BooleanPointable, DatePointable, DateTimePointable, DurationPointable,
    QNamePointable, StringPointable, TimePointable,
};
use tessera_datamodel::{
    TaggedValue, ValueStorage, XsDate, XsDateTime, XsDecimal, XsDuration, codec,
};
use tessera_types::{CanonicalType, Result, SystemError, ValueTag, base_type_for_comparison};

/// Casts `value` to `target`, appending the result to `out`.
///
/// `out` is left untouched when the cast fails.
pub fn cast_tagged_value(
    value: TaggedValue<'_>,
    target: ValueTag,
    _ctx: &DynamicContext,
    out: &mut ValueStorage,
) -> Result<()> {
    let start = out.len();
    let result = cast_into(value, target, out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

fn cast_into(value: TaggedValue<'_>, target: ValueTag, out: &mut ValueStorage) -> Result<()> {
    if matches!(target, ValueTag::Notation | ValueTag::AnyAtomic) || !target.is_atomic() {
        return Err(SystemError::type_error(format!("cannot cast to {target}")));
    }
    if value.tag() == target {
        return out.write_bytes(value.bytes());
    }

    let source = base_type_for_comparison(value.tag())?;
    if target.is_string_like() {
        let mut text = Vec::new();
        write_lexical_form(value, &mut text)?;
        return write_string_target(target, std::str::from_utf8(&text)?, out);
    }
    if source.is_string_family() {
        if source == CanonicalType::AnyUri {
            return Err(SystemError::type_error(format!(
                "xs:anyURI cannot be cast to {target}"
            )));
        }
        let text = value.get::<StringPointable>()?.as_str()?;
        return cast_from_text(text.trim(), target, out);
    }
    cast_typed(value, source, target, out)
}

/// Writes the canonical lexical form of an atomic `value`.
pub fn write_lexical_form(value: TaggedValue<'_>, out: &mut Vec<u8>) -> Result<()> {
    let tag = value.tag();
    match base_type_for_comparison(tag)? {
        canonical if canonical.is_string_family() => {
            out.extend_from_slice(value.get::<StringPointable>()?.as_bytes());
        }
        CanonicalType::Boolean => {
            let text: &[u8] = if value.get::<BooleanPointable>()?.get() {
                b"true"
            } else {
                b"false"
            };
            out.extend_from_slice(text);
        }
        canonical @ (CanonicalType::Integer
        | CanonicalType::Decimal
        | CanonicalType::Float
        | CanonicalType::Double) => match Numeric::read(value, canonical)? {
            Numeric::Integer(v) => format::write_integer(v, out),
            Numeric::Decimal(d) => format::write_decimal(d, out),
            Numeric::Float(f) => format::write_float(f, out),
            Numeric::Double(d) => format::write_double(d, out),
        },
        CanonicalType::Duration => {
            format::write_duration(value.get::<DurationPointable>()?.duration_parts(), out)
        }
        CanonicalType::DayTimeDuration => format::write_day_time_duration(
            value.get::<DurationPointable>()?.duration_parts().millis,
            out,
        ),
        CanonicalType::YearMonthDuration => format::write_year_month_duration(
            value.get::<DurationPointable>()?.duration_parts().months,
            out,
        ),
        CanonicalType::DateTime => {
            format::write_datetime(&value.get::<DateTimePointable>()?.datetime_parts(), out)
        }
        CanonicalType::Time => format::write_time(&value.get::<TimePointable>()?.time_parts(), out),
        CanonicalType::Date
        | CanonicalType::GYearMonth
        | CanonicalType::GYear
        | CanonicalType::GMonthDay
        | CanonicalType::GDay
        | CanonicalType::GMonth => {
            format::write_gregorian(tag, &value.get::<DatePointable>()?.date_parts(), out)
        }
        CanonicalType::HexBinary => {
            let bytes = value.get::<BinaryPointable>()?.bytes();
            out.extend_from_slice(hex::encode_upper(bytes).as_bytes());
        }
        CanonicalType::Base64Binary => {
            let bytes = value.get::<BinaryPointable>()?.bytes();
            out.extend_from_slice(STANDARD.encode(bytes).as_bytes());
        }
        CanonicalType::QName => {
            let qname = value.get::<QNamePointable>()?;
            let prefix = qname.prefix()?;
            if !prefix.is_empty() {
                out.extend_from_slice(prefix.as_bytes());
                out.push(b':');
            }
            out.extend_from_slice(qname.local_name()?.as_bytes());
        }
        other => {
            return Err(SystemError::internal(format!("no lexical form for {other}")));
        }
    }
    Ok(())
}

/// Reads an untypedAtomic (or any string-like) operand as xs:double.
pub(crate) fn untyped_to_double(value: TaggedValue<'_>) -> Result<f64> {
    let text = value.get::<StringPointable>()?.as_str()?.trim();
    lexical::parse_double(text).ok_or_else(|| SystemError::invalid_cast("xs:double", text))
}

fn write_string_target(target: ValueTag, text: &str, out: &mut ValueStorage) -> Result<()> {
    let normalized = lexical::normalize_whitespace(target, text);
    if !lexical::is_valid_string_subtype(target, &normalized) {
        return Err(SystemError::invalid_cast(target.name(), text));
    }
    codec::write_string(out, target, &normalized)
}

fn cast_from_text(text: &str, target: ValueTag, out: &mut ValueStorage) -> Result<()> {
    let invalid = || SystemError::invalid_cast(target.name(), text);
    match target {
        ValueTag::Boolean => {
            codec::write_boolean(out, lexical::parse_boolean(text).ok_or_else(invalid)?)
        }
        tag if tag.is_integer() => {
            codec::write_integer(out, tag, lexical::parse_integer(text).ok_or_else(invalid)?)
        }
        ValueTag::Decimal => {
            codec::write_decimal(out, lexical::parse_decimal(text).ok_or_else(invalid)?)
        }
        ValueTag::Float => {
            codec::write_float(out, lexical::parse_double(text).ok_or_else(invalid)? as f32)
        }
        ValueTag::Double => {
            codec::write_double(out, lexical::parse_double(text).ok_or_else(invalid)?)
        }
        ValueTag::Duration | ValueTag::DayTimeDuration | ValueTag::YearMonthDuration => {
            let duration = lexical::parse_duration(target, text).ok_or_else(invalid)?;
            write_duration_as(target, duration.months, duration.millis, out)
        }
        ValueTag::DateTime => {
            let datetime = lexical::parse_datetime(text).ok_or_else(invalid)?;
            codec::write_datetime(out, &datetime)
        }
        ValueTag::Date => {
            let date = lexical::parse_date(text).ok_or_else(invalid)?;
            codec::write_date(out, target, &date)
        }
        ValueTag::Time => {
            let time = lexical::parse_time(text).ok_or_else(invalid)?;
            codec::write_time(out, &time)
        }
        tag if tag.is_gregorian() => {
            let date = lexical::parse_gregorian(tag, text).ok_or_else(invalid)?;
            codec::write_date(out, tag, &date)
        }
        ValueTag::HexBinary => {
            let bytes = hex::decode(text).map_err(|_| invalid())?;
            codec::write_binary(out, target, &bytes)
        }
        ValueTag::Base64Binary => {
            let compact: String = text.split_whitespace().collect();
            let bytes = STANDARD.decode(compact).map_err(|_| invalid())?;
            codec::write_binary(out, target, &bytes)
        }
        _ => Err(SystemError::type_error(format!(
            "a string cannot be cast to {target}"
        ))),
    }
}

fn cast_typed(
    value: TaggedValue<'_>,
    source: CanonicalType,
    target: ValueTag,
    out: &mut ValueStorage,
) -> Result<()> {
    match source {
        CanonicalType::Boolean
        | CanonicalType::Integer
        | CanonicalType::Decimal
        | CanonicalType::Float
        | CanonicalType::Double => {
            let numeric = if source == CanonicalType::Boolean {
                Numeric::Integer(value.get::<BooleanPointable>()?.get() as i64)
            } else {
                Numeric::read(value, source)?
            };
            cast_numeric(numeric, target, out)
        }
        CanonicalType::Date => {
            let date = value.get::<DatePointable>()?.date_parts();
            match target {
                ValueTag::DateTime => codec::write_datetime(out, &XsDateTime::from_date(date)),
                tag if tag.is_gregorian() => {
                    codec::write_date(out, tag, &project_gregorian(tag, date))
                }
                _ => Err(unsupported(source, target)),
            }
        }
        CanonicalType::DateTime => {
            let datetime = value.get::<DateTimePointable>()?.datetime_parts();
            match target {
                ValueTag::Date => codec::write_date(out, target, &datetime.date()),
                ValueTag::Time => codec::write_time(out, &datetime.time()),
                tag if tag.is_gregorian() => {
                    codec::write_date(out, tag, &project_gregorian(tag, datetime.date()))
                }
                _ => Err(unsupported(source, target)),
            }
        }
        CanonicalType::Duration | CanonicalType::DayTimeDuration | CanonicalType::YearMonthDuration
            if matches!(
                target,
                ValueTag::Duration | ValueTag::DayTimeDuration | ValueTag::YearMonthDuration
            ) =>
        {
            let duration = value.get::<DurationPointable>()?.duration_parts();
            write_duration_as(target, duration.months, duration.millis, out)
        }
        CanonicalType::HexBinary | CanonicalType::Base64Binary
            if matches!(target, ValueTag::HexBinary | ValueTag::Base64Binary) =>
        {
            codec::write_binary(out, target, value.get::<BinaryPointable>()?.bytes())
        }
        _ => Err(unsupported(source, target)),
    }
}

fn cast_numeric(numeric: Numeric, target: ValueTag, out: &mut ValueStorage) -> Result<()> {
    match target {
        ValueTag::Boolean => {
            let truth = match numeric {
                Numeric::Integer(v) => v != 0,
                Numeric::Decimal(d) => !d.is_zero(),
                other => {
                    let v = other.to_f64();
                    v != 0.0 && !v.is_nan()
                }
            };
            codec::write_boolean(out, truth)
        }
        tag if tag.is_integer() => {
            codec::write_integer(out, tag, numeric_to_integer(numeric, tag)?)
        }
        ValueTag::Decimal => codec::write_decimal(out, numeric_to_decimal(numeric)?),
        ValueTag::Float => codec::write_float(out, numeric.to_f32()),
        ValueTag::Double => codec::write_double(out, numeric.to_f64()),
        _ => Err(SystemError::type_error(format!(
            "a numeric value cannot be cast to {target}"
        ))),
    }
}

fn numeric_to_integer(numeric: Numeric, target: ValueTag) -> Result<i64> {
    match numeric {
        Numeric::Integer(v) => Ok(v),
        Numeric::Decimal(d) => d
            .to_decimal()?
            .trunc()
            .to_i64()
            .ok_or_else(|| SystemError::invalid_cast(target.name(), format!("{d:?}"))),
        other => {
            let v = other.to_f64();
            if !v.is_finite() {
                return Err(SystemError::InvalidLexicalValue(format!(
                    "{v} cannot be cast to {target}"
                )));
            }
            let truncated = v.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(SystemError::invalid_cast(target.name(), v.to_string()));
            }
            Ok(truncated as i64)
        }
    }
}

fn numeric_to_decimal(numeric: Numeric) -> Result<XsDecimal> {
    if let Some(decimal) = numeric.to_decimal() {
        return Ok(decimal);
    }
    let v = numeric.to_f64();
    if !v.is_finite() {
        return Err(SystemError::InvalidLexicalValue(format!(
            "{v} cannot be cast to xs:decimal"
        )));
    }
    let invalid = || SystemError::invalid_cast("xs:decimal", v.to_string());
    let converted = Decimal::from_f64(v).ok_or_else(invalid)?;
    XsDecimal::from_decimal(converted).map_err(|_| invalid())
}

fn write_duration_as(
    target: ValueTag,
    months: i32,
    millis: i64,
    out: &mut ValueStorage,
) -> Result<()> {
    match target {
        ValueTag::DayTimeDuration => codec::write_day_time_duration(out, millis),
        ValueTag::YearMonthDuration => codec::write_year_month_duration(out, months),
        _ => codec::write_duration(out, XsDuration::new(months, millis)),
    }
}

/// Keeps the fields of `date` that the gregorian `tag` carries and resets the
/// rest to the values the lexical parser uses.
fn project_gregorian(tag: ValueTag, date: XsDate) -> XsDate {
    let reference = lexical::REFERENCE_YEAR;
    let (year, month, day) = match tag {
        ValueTag::GYearMonth => (date.year, date.month, 1),
        ValueTag::GYear => (date.year, 1, 1),
        ValueTag::GMonthDay => (reference, date.month, date.day),
        ValueTag::GDay => (reference, 12, date.day),
        _ => (reference, date.month, 1),
    };
    XsDate::new(year, month, day, date.timezone)
}

fn unsupported(source: CanonicalType, target: ValueTag) -> SystemError {
    SystemError::type_error(format!("{source} cannot be cast to {target}"))
}
