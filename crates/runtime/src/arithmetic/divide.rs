use super::temporal::{scale_duration, scale_months};
use super::{ArithmeticOperation, divide_decimals};
use crate::context::DynamicContext;
use crate::numeric::Numeric;
use rust_decimal::Decimal;
use tessera_datamodel::{ValueStorage, XsDecimal, codec};
use tessera_types::Result;

/// `div`. Integer operands produce an xs:decimal quotient.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

impl ArithmeticOperation for Divide {
    fn name(&self) -> &'static str {
        "divide"
    }

    fn integer_integer(
        &self,
        left: i64,
        right: i64,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let quotient = divide_decimals(
            Decimal::from(left),
            Decimal::from(right),
            ctx.decimal_division_scale(),
        )?;
        codec::write_decimal(out, quotient)
    }

    fn decimal_decimal(
        &self,
        left: XsDecimal,
        right: XsDecimal,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let quotient = divide_decimals(
            left.to_decimal()?,
            right.to_decimal()?,
            ctx.decimal_division_scale(),
        )?;
        codec::write_decimal(out, quotient)
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        codec::write_float(out, left / right)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        codec::write_double(out, left / right)
    }

    fn day_time_duration_day_time_duration(
        &self,
        left: i64,
        right: i64,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let quotient = divide_decimals(
            Decimal::from(left),
            Decimal::from(right),
            ctx.decimal_division_scale(),
        )?;
        codec::write_decimal(out, quotient)
    }

    fn year_month_duration_year_month_duration(
        &self,
        left: i32,
        right: i32,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let quotient = divide_decimals(
            Decimal::from(left),
            Decimal::from(right),
            ctx.decimal_division_scale(),
        )?;
        codec::write_decimal(out, quotient)
    }

    fn day_time_duration_numeric(
        &self,
        left: i64,
        right: Numeric,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_day_time_duration(out, scale_duration(left, right, true)?)
    }

    fn year_month_duration_numeric(
        &self,
        left: i32,
        right: Numeric,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_year_month_duration(out, scale_months(left, right, true)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::pointable::{DecimalPointable, DoublePointable};
    use tessera_types::ErrorCode;

    fn decimal_result(out: &ValueStorage) -> XsDecimal {
        out.tagged().unwrap().get::<DecimalPointable>().unwrap().decimal_parts()
    }

    #[test]
    fn test_integer_division_is_decimal() {
        let ctx = DynamicContext::default();
        let mut out = ValueStorage::new();
        Divide.integer_integer(7, 2, &ctx, &mut out).unwrap();
        assert_eq!(decimal_result(&out), XsDecimal::new(35, 1));

        let mut out = ValueStorage::new();
        Divide.integer_integer(1, 3, &ctx.with_decimal_division_scale(4), &mut out).unwrap();
        assert_eq!(decimal_result(&out), XsDecimal::new(3333, 4));
    }

    #[test]
    fn test_division_by_zero() {
        let ctx = DynamicContext::default();
        let err = Divide.integer_integer(1, 0, &ctx, &mut ValueStorage::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FOAR0001);
        let (one, zero) = (XsDecimal::new(1, 0), XsDecimal::new(0, 2));
        let err = Divide
            .decimal_decimal(one, zero, &ctx, &mut ValueStorage::new())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FOAR0001);

        let mut out = ValueStorage::new();
        Divide.double_double(1.0, 0.0, &mut out).unwrap();
        assert_eq!(out.tagged().unwrap().get::<DoublePointable>().unwrap().get(), f64::INFINITY);
    }

    #[test]
    fn test_duration_ratio() {
        let ctx = DynamicContext::default();
        let mut out = ValueStorage::new();
        Divide.year_month_duration_year_month_duration(18, 12, &ctx, &mut out).unwrap();
        assert_eq!(decimal_result(&out), XsDecimal::new(15, 1));

        let err = Divide
            .day_time_duration_numeric(1000, Numeric::Double(0.0), &mut ValueStorage::new())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FODT0002);
    }
}
