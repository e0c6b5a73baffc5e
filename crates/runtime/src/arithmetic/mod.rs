//! Binary arithmetic over tagged values.
//!
//! Dispatch normalizes both operands with [`base_type_for_arithmetic`],
//! promotes numeric pairs to a common type and calls one pair method of an
//! [`ArithmeticOperation`]. Pairs written with the duration on the right
//! (`3 * $d`, `$d + $date`) are swapped here, once, and only for commutative
//! operators.

mod add;
mod divide;
mod integer_divide;
mod modulo;
mod multiply;
mod subtract;
pub mod temporal;

pub use add::Add;
pub use divide::Divide;
pub use integer_divide::IntegerDivide;
pub use modulo::Modulo;
pub use multiply::Multiply;
pub use subtract::Subtract;

use crate::cast::untyped_to_double;
use crate::context::DynamicContext;
use crate::numeric::{Numeric, NumericPair};
use rust_decimal::Decimal;
use tessera_datamodel::pointable::{
    DatePointable, DateTimePointable, DayTimeDurationPointable, TimePointable,
    YearMonthDurationPointable,
};
use tessera_datamodel::{
    TaggedValue, ValueStorage, XsDate, XsDateTime, XsDecimal, XsTime, codec,
};
use tessera_types::{CanonicalType, Result, SystemError, ValueTag, base_type_for_arithmetic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
}

impl ArithmeticOperator {
    pub const ALL: [ArithmeticOperator; 6] = [
        ArithmeticOperator::Add,
        ArithmeticOperator::Subtract,
        ArithmeticOperator::Multiply,
        ArithmeticOperator::Divide,
        ArithmeticOperator::IntegerDivide,
        ArithmeticOperator::Modulo,
    ];

    pub fn name(self) -> &'static str {
        self.operation().name()
    }

    pub fn operation(self) -> &'static dyn ArithmeticOperation {
        match self {
            ArithmeticOperator::Add => &Add,
            ArithmeticOperator::Subtract => &Subtract,
            ArithmeticOperator::Multiply => &Multiply,
            ArithmeticOperator::Divide => &Divide,
            ArithmeticOperator::IntegerDivide => &IntegerDivide,
            ArithmeticOperator::Modulo => &Modulo,
        }
    }
}

/// Applies `op` to two atomic operands and appends the result to `out`.
///
/// On error `out` is truncated back to its length on entry.
pub fn apply_arithmetic(
    op: ArithmeticOperator,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
    out: &mut ValueStorage,
) -> Result<()> {
    op.operation().apply(left, right, ctx, out)
}

fn not_defined(op: &str, operands: &str) -> SystemError {
    SystemError::type_error(format!("'{op}' is not defined for {operands}"))
}

/// One arithmetic operator, with a method per pair of canonical operand
/// types. Unsupported pairs keep the default type error.
pub trait ArithmeticOperation {
    fn name(&self) -> &'static str;

    /// Whether `a op b == b op a`, which allows mirrored operand pairs.
    fn is_commutative(&self) -> bool {
        false
    }

    fn apply(
        &self,
        left: TaggedValue<'_>,
        right: TaggedValue<'_>,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let start = out.len();
        let result = dispatch(self, left, right, ctx, out);
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    fn integer_integer(
        &self,
        _left: i64,
        _right: i64,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:integer operands"))
    }

    fn decimal_decimal(
        &self,
        _left: XsDecimal,
        _right: XsDecimal,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:decimal operands"))
    }

    fn float_float(&self, _left: f32, _right: f32, _out: &mut ValueStorage) -> Result<()> {
        Err(not_defined(self.name(), "xs:float operands"))
    }

    fn double_double(&self, _left: f64, _right: f64, _out: &mut ValueStorage) -> Result<()> {
        Err(not_defined(self.name(), "xs:double operands"))
    }

    fn date_day_time_duration(
        &self,
        _left: &XsDate,
        _millis: i64,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:date and xs:dayTimeDuration"))
    }

    fn date_year_month_duration(
        &self,
        _left: &XsDate,
        _months: i32,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:date and xs:yearMonthDuration"))
    }

    fn datetime_day_time_duration(
        &self,
        _left: &XsDateTime,
        _millis: i64,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:dateTime and xs:dayTimeDuration"))
    }

    fn datetime_year_month_duration(
        &self,
        _left: &XsDateTime,
        _months: i32,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:dateTime and xs:yearMonthDuration"))
    }

    fn time_day_time_duration(
        &self,
        _left: &XsTime,
        _millis: i64,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:time and xs:dayTimeDuration"))
    }

    fn date_date(
        &self,
        _left: &XsDate,
        _right: &XsDate,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:date operands"))
    }

    fn datetime_datetime(
        &self,
        _left: &XsDateTime,
        _right: &XsDateTime,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:dateTime operands"))
    }

    fn time_time(
        &self,
        _left: &XsTime,
        _right: &XsTime,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:time operands"))
    }

    fn day_time_duration_day_time_duration(
        &self,
        _left: i64,
        _right: i64,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:dayTimeDuration operands"))
    }

    fn year_month_duration_year_month_duration(
        &self,
        _left: i32,
        _right: i32,
        _ctx: &DynamicContext,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:yearMonthDuration operands"))
    }

    fn day_time_duration_numeric(
        &self,
        _left: i64,
        _right: Numeric,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:dayTimeDuration and a number"))
    }

    fn year_month_duration_numeric(
        &self,
        _left: i32,
        _right: Numeric,
        _out: &mut ValueStorage,
    ) -> Result<()> {
        Err(not_defined(self.name(), "xs:yearMonthDuration and a number"))
    }
}

/// Re-encodes an untypedAtomic operand as xs:double in `buf`; other values
/// pass through unchanged.
fn untyped_as_double<'a>(value: TaggedValue<'a>, buf: &'a mut [u8; 9]) -> Result<TaggedValue<'a>> {
    if value.tag() != ValueTag::UntypedAtomic {
        return Ok(value);
    }
    let double = untyped_to_double(value)?;
    buf[0] = ValueTag::Double.code();
    buf[1..].copy_from_slice(&double.to_be_bytes());
    let buf: &'a [u8; 9] = buf;
    TaggedValue::new(buf)
}

fn dispatch<O: ArithmeticOperation + ?Sized>(
    op: &O,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
    out: &mut ValueStorage,
) -> Result<()> {
    use CanonicalType as T;

    let mut left_buf = [0u8; 9];
    let mut right_buf = [0u8; 9];
    let left = untyped_as_double(left, &mut left_buf)?;
    let right = untyped_as_double(right, &mut right_buf)?;

    let left_type = base_type_for_arithmetic(left.tag())?;
    let right_type = base_type_for_arithmetic(right.tag())?;
    match (left_type, right_type) {
        (l, r) if l.is_numeric() && r.is_numeric() => {
            match Numeric::promote(Numeric::read(left, l)?, Numeric::read(right, r)?) {
                NumericPair::Integer(a, b) => op.integer_integer(a, b, ctx, out),
                NumericPair::Decimal(a, b) => op.decimal_decimal(a, b, ctx, out),
                NumericPair::Float(a, b) => op.float_float(a, b, out),
                NumericPair::Double(a, b) => op.double_double(a, b, out),
            }
        }
        (T::Date, T::DayTimeDuration) => op.date_day_time_duration(
            &left.get::<DatePointable>()?.date_parts(),
            right.get::<DayTimeDurationPointable>()?.millis(),
            out,
        ),
        (T::Date, T::YearMonthDuration) => op.date_year_month_duration(
            &left.get::<DatePointable>()?.date_parts(),
            right.get::<YearMonthDurationPointable>()?.months(),
            out,
        ),
        (T::DateTime, T::DayTimeDuration) => op.datetime_day_time_duration(
            &left.get::<DateTimePointable>()?.datetime_parts(),
            right.get::<DayTimeDurationPointable>()?.millis(),
            out,
        ),
        (T::DateTime, T::YearMonthDuration) => op.datetime_year_month_duration(
            &left.get::<DateTimePointable>()?.datetime_parts(),
            right.get::<YearMonthDurationPointable>()?.months(),
            out,
        ),
        (T::Time, T::DayTimeDuration) => op.time_day_time_duration(
            &left.get::<TimePointable>()?.time_parts(),
            right.get::<DayTimeDurationPointable>()?.millis(),
            out,
        ),
        (T::Date, T::Date) => op.date_date(
            &left.get::<DatePointable>()?.date_parts(),
            &right.get::<DatePointable>()?.date_parts(),
            ctx,
            out,
        ),
        (T::DateTime, T::DateTime) => op.datetime_datetime(
            &left.get::<DateTimePointable>()?.datetime_parts(),
            &right.get::<DateTimePointable>()?.datetime_parts(),
            ctx,
            out,
        ),
        (T::Time, T::Time) => op.time_time(
            &left.get::<TimePointable>()?.time_parts(),
            &right.get::<TimePointable>()?.time_parts(),
            ctx,
            out,
        ),
        (T::DayTimeDuration, T::DayTimeDuration) => op.day_time_duration_day_time_duration(
            left.get::<DayTimeDurationPointable>()?.millis(),
            right.get::<DayTimeDurationPointable>()?.millis(),
            ctx,
            out,
        ),
        (T::YearMonthDuration, T::YearMonthDuration) => op
            .year_month_duration_year_month_duration(
                left.get::<YearMonthDurationPointable>()?.months(),
                right.get::<YearMonthDurationPointable>()?.months(),
                ctx,
                out,
            ),
        (T::DayTimeDuration, n) if n.is_numeric() => op.day_time_duration_numeric(
            left.get::<DayTimeDurationPointable>()?.millis(),
            Numeric::read(right, n)?,
            out,
        ),
        (T::YearMonthDuration, n) if n.is_numeric() => op.year_month_duration_numeric(
            left.get::<YearMonthDurationPointable>()?.months(),
            Numeric::read(right, n)?,
            out,
        ),
        (n, T::DayTimeDuration | T::YearMonthDuration) if n.is_numeric() => {
            mirror(op, left, right, ctx, out)
        }
        (T::DayTimeDuration, T::Date | T::DateTime | T::Time)
        | (T::YearMonthDuration, T::Date | T::DateTime) => mirror(op, left, right, ctx, out),
        (l, r) => Err(not_defined(op.name(), &format!("{l} and {r}"))),
    }
}

fn mirror<O: ArithmeticOperation + ?Sized>(
    op: &O,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
    out: &mut ValueStorage,
) -> Result<()> {
    if !op.is_commutative() {
        return Err(not_defined(
            op.name(),
            &format!("{} and {}", left.tag(), right.tag()),
        ));
    }
    dispatch(op, right, left, ctx, out)
}

/// Exact decimal quotient, rounded to `scale` fraction digits.
pub(crate) fn divide_decimals(left: Decimal, right: Decimal, scale: u32) -> Result<XsDecimal> {
    if right.is_zero() {
        return Err(SystemError::DivisionByZero);
    }
    let quotient = left
        .checked_div(right)
        .ok_or_else(|| SystemError::overflow(format!("{left} div {right}")))?;
    XsDecimal::from_decimal(quotient.round_dp(scale))
}

pub(crate) fn write_checked_integer(out: &mut ValueStorage, value: Option<i64>) -> Result<()> {
    let value = value.ok_or_else(|| SystemError::overflow("xs:integer result out of range"))?;
    codec::write_integer(out, ValueTag::Integer, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::pointable::{DecimalPointable, DoublePointable, IntegerPointable};
    use tessera_types::ErrorCode;

    fn encode(fill: impl FnOnce(&mut ValueStorage) -> Result<()>) -> ValueStorage {
        let mut storage = ValueStorage::new();
        fill(&mut storage).unwrap();
        storage
    }

    fn apply(
        op: ArithmeticOperator,
        left: &ValueStorage,
        right: &ValueStorage,
    ) -> Result<ValueStorage> {
        let ctx = DynamicContext::default();
        let mut out = ValueStorage::new();
        apply_arithmetic(op, left.tagged()?, right.tagged()?, &ctx, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_untyped_operand_becomes_double() {
        let two = encode(|s| codec::write_string(s, ValueTag::UntypedAtomic, "2"));
        let three = encode(|s| codec::write_integer(s, ValueTag::Integer, 3));
        let out = apply(ArithmeticOperator::Add, &two, &three).unwrap();
        let value = out.tagged().unwrap();
        assert_eq!(value.tag(), ValueTag::Double);
        assert_eq!(value.get::<DoublePointable>().unwrap().get(), 5.0);

        let bad = encode(|s| codec::write_string(s, ValueTag::UntypedAtomic, "two"));
        let err = apply(ArithmeticOperator::Add, &bad, &three).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FORG0001);
    }

    #[test]
    fn test_mixed_numerics_are_byte_identical_both_ways() {
        let six = encode(|s| codec::write_integer(s, ValueTag::Integer, 6));
        let two = encode(|s| codec::write_decimal(s, XsDecimal::new(2, 0)));
        let a = apply(ArithmeticOperator::Multiply, &six, &two).unwrap();
        let b = apply(ArithmeticOperator::Multiply, &two, &six).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(
            a.tagged().unwrap().get::<DecimalPointable>().unwrap().decimal_parts(),
            XsDecimal::new(12, 0)
        );
    }

    #[test]
    fn test_subtract_keeps_operand_order() {
        let one = encode(|s| codec::write_integer(s, ValueTag::Byte, 1));
        let half = encode(|s| codec::write_double(s, 0.5));
        let out = apply(ArithmeticOperator::Subtract, &one, &half).unwrap();
        assert_eq!(out.tagged().unwrap().get::<DoublePointable>().unwrap().get(), 0.5);
        let out = apply(ArithmeticOperator::Subtract, &half, &one).unwrap();
        assert_eq!(out.tagged().unwrap().get::<DoublePointable>().unwrap().get(), -0.5);
    }

    #[test]
    fn test_mirror_only_for_commutative_operators() {
        let three = encode(|s| codec::write_integer(s, ValueTag::Integer, 3));
        let day = encode(|s| codec::write_day_time_duration(s, 86_400_000));
        let out = apply(ArithmeticOperator::Multiply, &three, &day).unwrap();
        assert_eq!(
            out.tagged().unwrap().get::<DayTimeDurationPointable>().unwrap().millis(),
            3 * 86_400_000
        );
        let swapped = apply(ArithmeticOperator::Multiply, &day, &three).unwrap();
        assert_eq!(out.as_bytes(), swapped.as_bytes());

        let err = apply(ArithmeticOperator::Divide, &three, &day).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);

        let date = encode(|s| codec::write_date(s, ValueTag::Date, &XsDate::new(2024, 1, 1, None)));
        assert!(apply(ArithmeticOperator::Add, &day, &date).is_ok());
        let err = apply(ArithmeticOperator::Subtract, &day, &date).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
    }

    #[test]
    fn test_invalid_pairs_are_type_errors() {
        let date = encode(|s| codec::write_date(s, ValueTag::Date, &XsDate::new(2024, 1, 1, None)));
        let err = apply(ArithmeticOperator::Multiply, &date, &date).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
        let text = encode(|s| codec::write_string(s, ValueTag::String, "1"));
        let one = encode(|s| codec::write_integer(s, ValueTag::Integer, 1));
        let err = apply(ArithmeticOperator::Add, &text, &one).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
    }

    #[test]
    fn test_failed_operation_leaves_output_untouched() {
        let max = encode(|s| codec::write_integer(s, ValueTag::Integer, i64::MAX));
        let mut out = ValueStorage::new();
        codec::write_boolean(&mut out, true).unwrap();
        let before = out.clone();
        let value = max.tagged().unwrap();
        let err = apply_arithmetic(
            ArithmeticOperator::Add,
            value,
            value,
            &DynamicContext::default(),
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FOAR0002);
        assert_eq!(out, before);
    }

    #[test]
    fn test_operator_names() {
        let names: Vec<_> = ArithmeticOperator::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names, ["add", "subtract", "multiply", "divide", "integer-divide", "mod"]);
        let out = apply(
            ArithmeticOperator::IntegerDivide,
            &encode(|s| codec::write_integer(s, ValueTag::Integer, 7)),
            &encode(|s| codec::write_integer(s, ValueTag::Integer, 2)),
        )
        .unwrap();
        assert_eq!(out.tagged().unwrap().get::<IntegerPointable>().unwrap().as_i64(), 3);
    }
}
