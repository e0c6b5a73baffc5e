//! Numeric operands decoded from tagged values and the promotion ladder
//! integer → decimal → float → double shared by comparison and arithmetic.

use crate::format::{digit_count, pow10_i128};
use rust_decimal::prelude::ToPrimitive;
use std::cmp::Ordering;
use tessera_datamodel::pointable::{
    DecimalPointable, DoublePointable, FloatPointable, IntegerPointable,
};
use tessera_datamodel::{TaggedValue, XsDecimal};
use tessera_types::{CanonicalType, Result, SystemError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Decimal(XsDecimal),
    Float(f32),
    Double(f64),
}

/// Two operands widened to the same numeric type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericPair {
    Integer(i64, i64),
    Decimal(XsDecimal, XsDecimal),
    Float(f32, f32),
    Double(f64, f64),
}

impl Numeric {
    /// Reads `value`, already normalized to the numeric `canonical` type.
    pub fn read(value: TaggedValue<'_>, canonical: CanonicalType) -> Result<Self> {
        Ok(match canonical {
            CanonicalType::Integer => Numeric::Integer(value.get::<IntegerPointable>()?.as_i64()),
            CanonicalType::Decimal => {
                Numeric::Decimal(value.get::<DecimalPointable>()?.decimal_parts())
            }
            CanonicalType::Float => Numeric::Float(value.get::<FloatPointable>()?.get()),
            CanonicalType::Double => Numeric::Double(value.get::<DoublePointable>()?.get()),
            other => {
                return Err(SystemError::type_error(format!(
                    "{} is not numeric",
                    other.tag()
                )));
            }
        })
    }

    fn rank(self) -> u8 {
        match self {
            Numeric::Integer(_) => 0,
            Numeric::Decimal(_) => 1,
            Numeric::Float(_) => 2,
            Numeric::Double(_) => 3,
        }
    }

    pub fn to_decimal(self) -> Option<XsDecimal> {
        match self {
            Numeric::Integer(v) => Some(XsDecimal::from_integer(v)),
            Numeric::Decimal(d) => Some(d),
            Numeric::Float(_) | Numeric::Double(_) => None,
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Numeric::Integer(v) => v as f64,
            Numeric::Decimal(d) => decimal_to_f64(d),
            Numeric::Float(f) => f as f64,
            Numeric::Double(d) => d,
        }
    }

    pub fn to_f32(self) -> f32 {
        match self {
            Numeric::Float(f) => f,
            other => other.to_f64() as f32,
        }
    }

    pub fn is_nan(self) -> bool {
        match self {
            Numeric::Float(f) => f.is_nan(),
            Numeric::Double(d) => d.is_nan(),
            Numeric::Integer(_) | Numeric::Decimal(_) => false,
        }
    }

    /// Widens the lower-ranked operand so both share one type. Operand order
    /// is preserved.
    pub fn promote(left: Numeric, right: Numeric) -> NumericPair {
        match left.rank().max(right.rank()) {
            0 => match (left, right) {
                (Numeric::Integer(a), Numeric::Integer(b)) => NumericPair::Integer(a, b),
                _ => NumericPair::Double(left.to_f64(), right.to_f64()),
            },
            1 => match (left.to_decimal(), right.to_decimal()) {
                (Some(a), Some(b)) => NumericPair::Decimal(a, b),
                _ => NumericPair::Double(left.to_f64(), right.to_f64()),
            },
            2 => NumericPair::Float(left.to_f32(), right.to_f32()),
            _ => NumericPair::Double(left.to_f64(), right.to_f64()),
        }
    }
}

pub fn decimal_to_f64(value: XsDecimal) -> f64 {
    match value.to_decimal().ok().and_then(|d| d.to_f64()) {
        Some(f) => f,
        None => value.mantissa as f64 * 10f64.powi(-(value.scale as i32)),
    }
}

/// Exact decimal ordering without converting to floating point.
pub fn compare_decimals(a: XsDecimal, b: XsDecimal) -> Ordering {
    let sign = a.signum().cmp(&b.signum());
    if sign != Ordering::Equal || a.is_zero() {
        return sign;
    }
    // Same sign, both nonzero: compare magnitudes, flipping for negatives.
    let magnitude = compare_magnitudes(a, b);
    if a.signum() < 0 {
        magnitude.reverse()
    } else {
        magnitude
    }
}

fn compare_magnitudes(a: XsDecimal, b: XsDecimal) -> Ordering {
    let (ma, mb) = (a.mantissa.unsigned_abs(), b.mantissa.unsigned_abs());
    let exponent_a = digit_count(ma) as i32 - a.scale as i32;
    let exponent_b = digit_count(mb) as i32 - b.scale as i32;
    if exponent_a != exponent_b {
        return exponent_a.cmp(&exponent_b);
    }
    // Equal adjusted exponents bound the scale gap by the digit-count gap (< 20).
    let gap = (a.scale as i32 - b.scale as i32).unsigned_abs();
    let factor = pow10_i128(gap).unwrap_or(i128::MAX);
    let (wa, wb) = if a.scale >= b.scale {
        (ma as i128, mb as i128 * factor)
    } else {
        (ma as i128 * factor, mb as i128)
    };
    wa.cmp(&wb)
}

/// Rescales both mantissas to the larger scale, failing on overflow.
pub fn align_decimals(a: XsDecimal, b: XsDecimal) -> Result<(i64, i64, i8)> {
    let scale = a.scale.max(b.scale);
    Ok((rescale(a, scale)?, rescale(b, scale)?, scale))
}

fn rescale(value: XsDecimal, scale: i8) -> Result<i64> {
    let gap = (scale as i32 - value.scale as i32) as u32;
    crate::format::pow10(gap)
        .and_then(|factor| value.mantissa.checked_mul(factor))
        .ok_or_else(|| {
            SystemError::overflow(format!("decimal rescale of {value:?} to scale {scale}"))
        })
}
