use super::temporal::{scale_duration, scale_months};
use super::{ArithmeticOperation, write_checked_integer};
use crate::context::DynamicContext;
use crate::numeric::Numeric;
use tessera_datamodel::{ValueStorage, XsDecimal, codec};
use tessera_types::{Result, SystemError};

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

impl ArithmeticOperation for Multiply {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn integer_integer(
        &self,
        left: i64,
        right: i64,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        write_checked_integer(out, left.checked_mul(right))
    }

    fn decimal_decimal(
        &self,
        left: XsDecimal,
        right: XsDecimal,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let overflow = || SystemError::overflow("xs:decimal multiplication");
        let mantissa = left.mantissa.checked_mul(right.mantissa).ok_or_else(overflow)?;
        let scale = left.scale.checked_add(right.scale).ok_or_else(overflow)?;
        codec::write_decimal(out, XsDecimal::new(mantissa, scale))
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        codec::write_float(out, left * right)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        codec::write_double(out, left * right)
    }

    fn day_time_duration_numeric(
        &self,
        left: i64,
        right: Numeric,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_day_time_duration(out, scale_duration(left, right, false)?)
    }

    fn year_month_duration_numeric(
        &self,
        left: i32,
        right: Numeric,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_year_month_duration(out, scale_months(left, right, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::pointable::{DecimalPointable, YearMonthDurationPointable};
    use tessera_types::ErrorCode;

    #[test]
    fn test_decimal_scales_add() {
        let mut out = ValueStorage::new();
        let ctx = DynamicContext::default();
        Multiply
            .decimal_decimal(XsDecimal::new(15, 1), XsDecimal::new(25, 2), &ctx, &mut out)
            .unwrap();
        let product = out.tagged().unwrap().get::<DecimalPointable>().unwrap().decimal_parts();
        assert_eq!(product, XsDecimal::new(375, 3));
    }

    #[test]
    fn test_decimal_overflow() {
        let ctx = DynamicContext::default();
        let err = Multiply
            .decimal_decimal(
                XsDecimal::new(i64::MAX, 0),
                XsDecimal::new(2, 0),
                &ctx,
                &mut ValueStorage::new(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FOAR0002);
    }

    #[test]
    fn test_duration_times_number() {
        let mut out = ValueStorage::new();
        Multiply.year_month_duration_numeric(12, Numeric::Double(1.5), &mut out).unwrap();
        let months = out.tagged().unwrap().get::<YearMonthDurationPointable>().unwrap().months();
        assert_eq!(months, 18);

        let err = Multiply
            .day_time_duration_numeric(1, Numeric::Float(f32::NAN), &mut ValueStorage::new())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FOCA0005);
    }
}
