use super::temporal::{
    add_millis_to_date, add_millis_to_datetime, add_millis_to_time, add_months_to_date,
    add_months_to_datetime, negate_millis, negate_months,
};
use super::{ArithmeticOperation, write_checked_integer};
use crate::context::DynamicContext;
use crate::numeric::align_decimals;
use tessera_datamodel::{ValueStorage, XsDate, XsDateTime, XsDecimal, XsTime, codec};
use tessera_types::{Result, SystemError, ValueTag};

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtract;

fn write_difference(out: &mut ValueStorage, left: i128, right: i128) -> Result<()> {
    let millis = i64::try_from(left - right).map_err(|_| SystemError::DurationOverflow)?;
    codec::write_day_time_duration(out, millis)
}

impl ArithmeticOperation for Subtract {
    fn name(&self) -> &'static str {
        "subtract"
    }

    fn integer_integer(
        &self,
        left: i64,
        right: i64,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        write_checked_integer(out, left.checked_sub(right))
    }

    fn decimal_decimal(
        &self,
        left: XsDecimal,
        right: XsDecimal,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let (a, b, scale) = align_decimals(left, right)?;
        let difference = a
            .checked_sub(b)
            .ok_or_else(|| SystemError::overflow("xs:decimal subtraction"))?;
        codec::write_decimal(out, XsDecimal::new(difference, scale))
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        codec::write_float(out, left - right)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        codec::write_double(out, left - right)
    }

    fn date_day_time_duration(
        &self,
        left: &XsDate,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let date = add_millis_to_date(left, negate_millis(millis)?)?;
        codec::write_date(out, ValueTag::Date, &date)
    }

    fn date_year_month_duration(
        &self,
        left: &XsDate,
        months: i32,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let date = add_months_to_date(left, negate_months(months)?)?;
        codec::write_date(out, ValueTag::Date, &date)
    }

    fn datetime_day_time_duration(
        &self,
        left: &XsDateTime,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_datetime(out, &add_millis_to_datetime(left, negate_millis(millis)?)?)
    }

    fn datetime_year_month_duration(
        &self,
        left: &XsDateTime,
        months: i32,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_datetime(out, &add_months_to_datetime(left, negate_months(months)?)?)
    }

    fn time_day_time_duration(
        &self,
        left: &XsTime,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_time(out, &add_millis_to_time(left, negate_millis(millis)?))
    }

    fn date_date(
        &self,
        left: &XsDate,
        right: &XsDate,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let tz = ctx.implicit_timezone();
        write_difference(out, left.to_epoch_millis(tz), right.to_epoch_millis(tz))
    }

    fn datetime_datetime(
        &self,
        left: &XsDateTime,
        right: &XsDateTime,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let tz = ctx.implicit_timezone();
        write_difference(out, left.to_epoch_millis(tz), right.to_epoch_millis(tz))
    }

    fn time_time(
        &self,
        left: &XsTime,
        right: &XsTime,
        ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let tz = ctx.implicit_timezone();
        write_difference(out, i128::from(left.to_reference_millis(tz)), i128::from(right.to_reference_millis(tz)))
    }

    fn day_time_duration_day_time_duration(
        &self,
        left: i64,
        right: i64,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        write_difference(out, i128::from(left), i128::from(right))
    }

    fn year_month_duration_year_month_duration(
        &self,
        left: i32,
        right: i32,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let months = left.checked_sub(right).ok_or(SystemError::DurationOverflow)?;
        codec::write_year_month_duration(out, months)
    }
}
