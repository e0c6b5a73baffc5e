//! Value and general comparison over tagged values.
//!
//! Both operands are normalized with [`base_type_for_comparison`], bound to
//! the pointable of their canonical type and handed to one pair method of a
//! [`ValueComparison`]. `eq` and `lt` implement pair methods; the other four
//! operators are derived from them.

mod derived;
mod eq;
mod general;
mod lt;

pub use derived::{ValueGe, ValueGt, ValueLe, ValueNe};
pub use eq::ValueEq;
pub use general::{GeneralComparisonScratch, compare_general};
pub use lt::ValueLt;

use crate::context::DynamicContext;
use crate::numeric::{Numeric, NumericPair};
use tessera_datamodel::pointable::{
    BinaryPointable, BooleanPointable, DatePointable, DateTimePointable,
    DayTimeDurationPointable, DurationPointable, QNamePointable, StringPointable, TimePointable,
    YearMonthDurationPointable,
};
use tessera_datamodel::{TaggedValue, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::{CanonicalType, Result, SystemError, base_type_for_comparison};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Eq,
        ComparisonOperator::Ne,
        ComparisonOperator::Lt,
        ComparisonOperator::Le,
        ComparisonOperator::Gt,
        ComparisonOperator::Ge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Le => "le",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Ge => "ge",
        }
    }
}

/// Compares two atomic values with the value comparison `op`.
pub fn compare_tagged_values(
    op: ComparisonOperator,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
) -> Result<bool> {
    match op {
        ComparisonOperator::Eq => ValueEq.compare(left, right, ctx),
        ComparisonOperator::Ne => ValueNe.compare(left, right, ctx),
        ComparisonOperator::Lt => ValueLt.compare(left, right, ctx),
        ComparisonOperator::Le => ValueLe.compare(left, right, ctx),
        ComparisonOperator::Gt => ValueGt.compare(left, right, ctx),
        ComparisonOperator::Ge => ValueGe.compare(left, right, ctx),
    }
}

fn not_defined(op: &str, operands: &str) -> SystemError {
    SystemError::type_error(format!("'{op}' is not defined for {operands}"))
}

/// One comparison operator, with a method per pair of canonical operand
/// types. Pairs the operator does not support keep the default, which is a
/// type error.
pub trait ValueComparison {
    fn name(&self) -> &'static str;

    fn compare(
        &self,
        left: TaggedValue<'_>,
        right: TaggedValue<'_>,
        ctx: &DynamicContext,
    ) -> Result<bool> {
        dispatch(self, left, right, ctx)
    }

    fn boolean_boolean(&self, _left: bool, _right: bool) -> Result<bool> {
        Err(not_defined(self.name(), "xs:boolean operands"))
    }

    fn integer_integer(&self, _left: i64, _right: i64) -> Result<bool> {
        Err(not_defined(self.name(), "xs:integer operands"))
    }

    fn decimal_decimal(&self, _left: XsDecimal, _right: XsDecimal) -> Result<bool> {
        Err(not_defined(self.name(), "xs:decimal operands"))
    }

    fn float_float(&self, _left: f32, _right: f32) -> Result<bool> {
        Err(not_defined(self.name(), "xs:float operands"))
    }

    fn double_double(&self, _left: f64, _right: f64) -> Result<bool> {
        Err(not_defined(self.name(), "xs:double operands"))
    }

    /// Any two members of the string family, compared by codepoint.
    fn string_string(&self, _left: &[u8], _right: &[u8]) -> Result<bool> {
        Err(not_defined(self.name(), "xs:string operands"))
    }

    fn any_uri_any_uri(&self, _left: &[u8], _right: &[u8]) -> Result<bool> {
        Err(not_defined(self.name(), "xs:anyURI operands"))
    }

    fn date_date(&self, _left: &XsDate, _right: &XsDate, _ctx: &DynamicContext) -> Result<bool> {
        Err(not_defined(self.name(), "xs:date operands"))
    }

    fn datetime_datetime(
        &self,
        _left: &XsDateTime,
        _right: &XsDateTime,
        _ctx: &DynamicContext,
    ) -> Result<bool> {
        Err(not_defined(self.name(), "xs:dateTime operands"))
    }

    fn time_time(&self, _left: &XsTime, _right: &XsTime, _ctx: &DynamicContext) -> Result<bool> {
        Err(not_defined(self.name(), "xs:time operands"))
    }

    /// Two values of the same gregorian fragment type.
    fn gregorian_gregorian(
        &self,
        _left: &XsDate,
        _right: &XsDate,
        _ctx: &DynamicContext,
    ) -> Result<bool> {
        Err(not_defined(self.name(), "gregorian operands"))
    }

    /// Any two durations that are not both of the same ordered subtype.
    fn duration_duration(&self, _left: XsDuration, _right: XsDuration) -> Result<bool> {
        Err(not_defined(self.name(), "xs:duration operands"))
    }

    fn day_time_duration_day_time_duration(&self, _left: i64, _right: i64) -> Result<bool> {
        Err(not_defined(self.name(), "xs:dayTimeDuration operands"))
    }

    fn year_month_duration_year_month_duration(&self, _left: i32, _right: i32) -> Result<bool> {
        Err(not_defined(self.name(), "xs:yearMonthDuration operands"))
    }

    fn hex_binary_hex_binary(&self, _left: &[u8], _right: &[u8]) -> Result<bool> {
        Err(not_defined(self.name(), "xs:hexBinary operands"))
    }

    fn base64_binary_base64_binary(&self, _left: &[u8], _right: &[u8]) -> Result<bool> {
        Err(not_defined(self.name(), "xs:base64Binary operands"))
    }

    /// QNames as `(namespace uri, local name)` byte pairs.
    fn qname_qname(&self, _left: (&[u8], &[u8]), _right: (&[u8], &[u8])) -> Result<bool> {
        Err(not_defined(self.name(), "xs:QName operands"))
    }
}

fn dispatch<C: ValueComparison + ?Sized>(
    cmp: &C,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
) -> Result<bool> {
    use CanonicalType as T;

    let left_type = base_type_for_comparison(left.tag())?;
    let right_type = base_type_for_comparison(right.tag())?;
    match (left_type, right_type) {
        (T::Boolean, T::Boolean) => cmp.boolean_boolean(
            left.get::<BooleanPointable>()?.get(),
            right.get::<BooleanPointable>()?.get(),
        ),
        (l, r) if l.is_numeric() && r.is_numeric() => {
            match Numeric::promote(Numeric::read(left, l)?, Numeric::read(right, r)?) {
                NumericPair::Integer(a, b) => cmp.integer_integer(a, b),
                NumericPair::Decimal(a, b) => cmp.decimal_decimal(a, b),
                NumericPair::Float(a, b) => cmp.float_float(a, b),
                NumericPair::Double(a, b) => cmp.double_double(a, b),
            }
        }
        (T::AnyUri, T::AnyUri) => cmp.any_uri_any_uri(
            left.get::<StringPointable>()?.as_bytes(),
            right.get::<StringPointable>()?.as_bytes(),
        ),
        (l, r) if l.is_string_family() && r.is_string_family() => cmp.string_string(
            left.get::<StringPointable>()?.as_bytes(),
            right.get::<StringPointable>()?.as_bytes(),
        ),
        (T::Date, T::Date) => cmp.date_date(
            &left.get::<DatePointable>()?.date_parts(),
            &right.get::<DatePointable>()?.date_parts(),
            ctx,
        ),
        (T::DateTime, T::DateTime) => cmp.datetime_datetime(
            &left.get::<DateTimePointable>()?.datetime_parts(),
            &right.get::<DateTimePointable>()?.datetime_parts(),
            ctx,
        ),
        (T::Time, T::Time) => cmp.time_time(
            &left.get::<TimePointable>()?.time_parts(),
            &right.get::<TimePointable>()?.time_parts(),
            ctx,
        ),
        (l, r) if l.is_gregorian() && l == r => cmp.gregorian_gregorian(
            &left.get::<DatePointable>()?.date_parts(),
            &right.get::<DatePointable>()?.date_parts(),
            ctx,
        ),
        (T::DayTimeDuration, T::DayTimeDuration) => cmp.day_time_duration_day_time_duration(
            left.get::<DayTimeDurationPointable>()?.millis(),
            right.get::<DayTimeDurationPointable>()?.millis(),
        ),
        (T::YearMonthDuration, T::YearMonthDuration) => cmp
            .year_month_duration_year_month_duration(
                left.get::<YearMonthDurationPointable>()?.months(),
                right.get::<YearMonthDurationPointable>()?.months(),
            ),
        (l, r) if l.is_duration() && r.is_duration() => cmp.duration_duration(
            left.get::<DurationPointable>()?.duration_parts(),
            right.get::<DurationPointable>()?.duration_parts(),
        ),
        (T::HexBinary, T::HexBinary) => cmp.hex_binary_hex_binary(
            left.get::<BinaryPointable>()?.bytes(),
            right.get::<BinaryPointable>()?.bytes(),
        ),
        (T::Base64Binary, T::Base64Binary) => cmp.base64_binary_base64_binary(
            left.get::<BinaryPointable>()?.bytes(),
            right.get::<BinaryPointable>()?.bytes(),
        ),
        (T::QName, T::QName) => cmp.qname_qname(
            left.get::<QNamePointable>()?.expanded_name(),
            right.get::<QNamePointable>()?.expanded_name(),
        ),
        (l, r) => Err(not_defined(cmp.name(), &format!("{l} and {r}"))),
    }
}
