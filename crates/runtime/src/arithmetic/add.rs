use super::temporal::{
    add_millis_to_date, add_millis_to_datetime, add_millis_to_time, add_months_to_date,
    add_months_to_datetime,
};
use super::{ArithmeticOperation, write_checked_integer};
use crate::context::DynamicContext;
use crate::numeric::align_decimals;
use tessera_datamodel::{ValueStorage, XsDate, XsDateTime, XsDecimal, XsTime, codec};
use tessera_types::{Result, SystemError, ValueTag};

#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl ArithmeticOperation for Add {
    fn name(&self) -> &'static str {
        "add"
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
        write_checked_integer(out, left.checked_add(right))
    }

    fn decimal_decimal(
        &self,
        left: XsDecimal,
        right: XsDecimal,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let (a, b, scale) = align_decimals(left, right)?;
        let sum = a
            .checked_add(b)
            .ok_or_else(|| SystemError::overflow("xs:decimal addition"))?;
        codec::write_decimal(out, XsDecimal::new(sum, scale))
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        codec::write_float(out, left + right)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        codec::write_double(out, left + right)
    }

    fn date_day_time_duration(
        &self,
        left: &XsDate,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_date(out, ValueTag::Date, &add_millis_to_date(left, millis)?)
    }

    fn date_year_month_duration(
        &self,
        left: &XsDate,
        months: i32,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_date(out, ValueTag::Date, &add_months_to_date(left, months)?)
    }

    fn datetime_day_time_duration(
        &self,
        left: &XsDateTime,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_datetime(out, &add_millis_to_datetime(left, millis)?)
    }

    fn datetime_year_month_duration(
        &self,
        left: &XsDateTime,
        months: i32,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_datetime(out, &add_months_to_datetime(left, months)?)
    }

    fn time_day_time_duration(
        &self,
        left: &XsTime,
        millis: i64,
        out: &mut ValueStorage,
    ) -> Result<()> {
        codec::write_time(out, &add_millis_to_time(left, millis))
    }

    fn day_time_duration_day_time_duration(
        &self,
        left: i64,
        right: i64,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let sum = left.checked_add(right).ok_or(SystemError::DurationOverflow)?;
        codec::write_day_time_duration(out, sum)
    }

    fn year_month_duration_year_month_duration(
        &self,
        left: i32,
        right: i32,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        let sum = left.checked_add(right).ok_or(SystemError::DurationOverflow)?;
        codec::write_year_month_duration(out, sum)
    }
}
