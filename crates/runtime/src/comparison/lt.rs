use super::ValueComparison;
use crate::context::DynamicContext;
use crate::numeric::compare_decimals;
use std::cmp::Ordering;
use tessera_datamodel::{XsDate, XsDateTime, XsDecimal, XsTime};
use tessera_types::Result;

/// `lt`: defined for the totally ordered types only. gregorian types,
/// binaries, QNames and mixed durations keep the type error default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueLt;

impl ValueComparison for ValueLt {
    fn name(&self) -> &'static str {
        "lt"
    }

    fn boolean_boolean(&self, left: bool, right: bool) -> Result<bool> {
        Ok(!left & right)
    }

    fn integer_integer(&self, left: i64, right: i64) -> Result<bool> {
        Ok(left < right)
    }

    fn decimal_decimal(&self, left: XsDecimal, right: XsDecimal) -> Result<bool> {
        Ok(compare_decimals(left, right) == Ordering::Less)
    }

    fn float_float(&self, left: f32, right: f32) -> Result<bool> {
        Ok(left < right)
    }

    fn double_double(&self, left: f64, right: f64) -> Result<bool> {
        Ok(left < right)
    }

    fn string_string(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left < right)
    }

    fn any_uri_any_uri(&self, left: &[u8], right: &[u8]) -> Result<bool> {
        Ok(left < right)
    }

    fn date_date(&self, left: &XsDate, right: &XsDate, ctx: &DynamicContext) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_epoch_millis(tz) < right.to_epoch_millis(tz))
    }

    fn datetime_datetime(
        &self,
        left: &XsDateTime,
        right: &XsDateTime,
        ctx: &DynamicContext,
    ) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_epoch_millis(tz) < right.to_epoch_millis(tz))
    }

    fn time_time(&self, left: &XsTime, right: &XsTime, ctx: &DynamicContext) -> Result<bool> {
        let tz = ctx.implicit_timezone();
        Ok(left.to_reference_millis(tz) < right.to_reference_millis(tz))
    }

    fn day_time_duration_day_time_duration(&self, left: i64, right: i64) -> Result<bool> {
        Ok(left < right)
    }

    fn year_month_duration_year_month_duration(&self, left: i32, right: i32) -> Result<bool> {
        Ok(left < right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_never_less() {
        assert!(!ValueLt.double_double(f64::NAN, 1.0).unwrap());
        assert!(!ValueLt.double_double(1.0, f64::NAN).unwrap());
    }

    #[test]
    fn test_decimal_order_is_exact() {
        let a = XsDecimal::new(1_000_000_000_000_000_001, 18);
        let b = XsDecimal::new(1_000_000_000_000_000_002, 18);
        assert!(ValueLt.decimal_decimal(a, b).unwrap());
        assert!(!ValueLt.decimal_decimal(b, a).unwrap());
    }

    #[test]
    fn test_time_order_uses_timezone() {
        let ctx = DynamicContext::default();
        let early = XsTime { hour: 10, minute: 0, millis: 0, timezone: None };
        let late = XsTime { hour: 11, minute: 0, millis: 0, timezone: None };
        assert!(ValueLt.time_time(&early, &late, &ctx).unwrap());
    }
}
