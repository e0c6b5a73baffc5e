use super::ValueComparison;
use crate::context::DynamicContext;
use crate::numeric::compare_decimals;
use std::cmp::Ordering;
use tessera_datamodel::{XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::Result;

/// `eq`: defined for every pair of comparable types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEq;

impl ValueComparison for ValueEq {
    fn name(&self) -> &'static str {
        "eq"
    }

    fn boolean_boolean(&self, left: bool, right: bool) -> Result<bool> {
        Ok(left == right)
    }

    fn integer_integer(&self, left: i64, right: i64) -> Result<bool> {
        Ok(left == right)
    }

    fn decimal_decimal(&self, left: XsDecimal, right: XsDecimal) -> Result<bool> {
        Ok(compare_decimals(left, right) == Ordering::Equal)
    }

    fn float_float(&self, left: f32, right: f32) -> Result<bool> {
        Ok(left == right)
    }

    fn double_double(&self, left: f64, right: f64) -> Result<bool> {
        Ok(left == right)
    }

    fn string_string(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left == right)
    }

    fn any_uri_any_uri(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left == right)
    }

    fn date_date(&self, left: &XsDate, right: &XsDate, ctx: &DynamicContext) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_epoch_millis(tz) == right.to_epoch_millis(tz))
    }

    fn datetime_datetime(
        &self,
        left: &XsDateTime,
        right: &XsDateTime,
        ctx: &DynamicContext,
    ) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_epoch_millis(tz) == right.to_epoch_millis(tz))
    }

    fn time_time(&self, left: &XsTime, right: &XsTime, ctx: &DynamicContext) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_reference_millis(tz) == right.to_reference_millis(tz))
    }

    fn gregorian_gregorian(
        &self,
        left: &XsDate,
        right: &XsDate,
        ctx: &DynamicContext,
    ) -> Result<bool> {
        self.date_date(left, right, ctx)
    }

    fn duration_duration(&self, left: XsDuration, right: XsDuration) -> Result<bool> {
        Ok(left == right)
    }

    fn day_time_duration_day_time_duration(&self, left: i64, right: i64) -> Result<bool> {
        Ok(left == right)
    }

    fn year_month_duration_year_month_duration(&self, left: i32, right: i32) -> Result<bool> {
        Ok(left == right)
    }

    fn hex_binary_hex_binary(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left == right)
    }

    fn base64_binary_base64_binary(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left == right)
    }

    fn qname_qname(&self, left: (&[u8], &[u8]), right: (&[u8], &[u8])) -> Result<bool> {
        Ok(left == right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_unequal_to_itself() {
        assert!(!ValueEq.double_double(f64::NAN, f64::NAN).unwrap());
        assert!(!ValueEq.float_float(f32::NAN, f32::NAN).unwrap());
    }

    #[test]
    fn test_decimal_equality_ignores_scale() {
        let a = XsDecimal::new(150, 2);
        let b = XsDecimal::new(15, 1);
        assert!(ValueEq.decimal_decimal(a, b).unwrap());
    }

    #[test]
    fn test_mixed_durations_compare_both_components() {
        let a = XsDuration::new(12, 0);
        let b = XsDuration::new(12, 1);
        assert!(!ValueEq.duration_duration(a, b).unwrap());
        assert!(ValueEq.duration_duration(a, a).unwrap());
    }
}
