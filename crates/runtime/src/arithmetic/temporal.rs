//! Calendar arithmetic shared by the add and subtract operators.

use crate::numeric::Numeric;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tessera_datamodel::values::{MILLIS_PER_DAY, days_from_civil, days_in_month};
use tessera_datamodel::{XsDate, XsDateTime, XsTime};
use tessera_types::{Result, SystemError};

/// Shifts `date` by `months`, clamping the day to the end of the target
/// month (`2024-01-31 + P1M` is `2024-02-29`).
pub fn add_months_to_date(date: &XsDate, months: i32) -> Result<XsDate> {
    let total = date.year as i64 * 12 + (date.month as i64 - 1) + months as i64;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u8;
    let day = date.day.min(days_in_month(year, month));
    let year = i32::try_from(year).map_err(|_| SystemError::DateTimeOverflow)?;
    Ok(XsDate::new(year, month, day, date.timezone))
}

pub fn add_months_to_datetime(datetime: &XsDateTime, months: i32) -> Result<XsDateTime> {
    let date = add_months_to_date(&datetime.date(), months)?;
    Ok(XsDateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        ..*datetime
    })
}

/// Adds `millis` to local midnight of `date` and keeps the date part.
pub fn add_millis_to_date(date: &XsDate, millis: i64) -> Result<XsDate> {
    let days = days_from_civil(date.year as i64, date.month, date.day)
        .checked_add(millis.div_euclid(MILLIS_PER_DAY))
        .ok_or(SystemError::DateTimeOverflow)?;
    XsDate::from_epoch_days(days, date.timezone)
}

pub fn add_millis_to_datetime(datetime: &XsDateTime, millis: i64) -> Result<XsDateTime> {
    let local = datetime.local_epoch_millis() + i128::from(millis);
    XsDateTime::from_local_epoch_millis(local, datetime.timezone)
}

/// Times wrap around midnight.
pub fn add_millis_to_time(time: &XsTime, millis: i64) -> XsTime {
    let shifted = time.local_millis_of_day() + millis.rem_euclid(MILLIS_PER_DAY);
    XsTime::from_local_millis_of_day(shifted, time.timezone)
}

pub fn negate_millis(millis: i64) -> Result<i64> {
    millis.checked_neg().ok_or(SystemError::DurationOverflow)
}

pub fn negate_months(months: i32) -> Result<i32> {
    months.checked_neg().ok_or(SystemError::DurationOverflow)
}

/// Multiplies or divides a duration component by a number, rounding half
/// away from zero to the component's unit.
pub fn scale_duration(value: i64, factor: Numeric, divide: bool) -> Result<i64> {
    match factor {
        Numeric::Integer(_) | Numeric::Decimal(_) => {
            let factor = factor
                .to_decimal()
                .ok_or_else(|| SystemError::internal("exact factor without decimal form"))?
                .to_decimal()?;
            let value = Decimal::from(value);
            let scaled = if divide {
                if factor.is_zero() {
                    return Err(SystemError::DurationOverflow);
                }
                value.checked_div(factor)
            } else {
                value.checked_mul(factor)
            };
            scaled
                .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
                .and_then(|v| v.to_i64())
                .ok_or(SystemError::DurationOverflow)
        }
        Numeric::Float(_) | Numeric::Double(_) => {
            let factor = factor.to_f64();
            if factor.is_nan() {
                return Err(SystemError::NanArgument);
            }
            if divide && factor == 0.0 {
                return Err(SystemError::DurationOverflow);
            }
            let scaled = if divide {
                value as f64 / factor
            } else {
                value as f64 * factor
            };
            let rounded = scaled.round();
            if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(SystemError::DurationOverflow);
            }
            Ok(rounded as i64)
        }
    }
}

pub fn scale_months(months: i32, factor: Numeric, divide: bool) -> Result<i32> {
    let scaled = scale_duration(months as i64, factor, divide)?;
    i32::try_from(scaled).map_err(|_| SystemError::DurationOverflow)
}
