//! Decoded forms of the fixed-layout atomic payloads.
//!
//! Pointables hand these out by value; they hold no reference to the buffer
//! they were read from.

use rust_decimal::Decimal;
use tessera_types::{Result, SystemError};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60_000;
pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Largest scale `rust_decimal` can represent.
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// xs:decimal as `mantissa * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDecimal {
    pub mantissa: i64,
    pub scale: i8,
}

impl XsDecimal {
    pub const fn new(mantissa: i64, scale: i8) -> Self {
        Self { mantissa, scale }
    }

    pub const fn from_integer(value: i64) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    pub const fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    pub const fn signum(self) -> i64 {
        self.mantissa.signum()
    }

    pub fn to_decimal(self) -> Result<Decimal> {
        let overflow = || SystemError::overflow(format!("{self:?} exceeds decimal precision"));
        if self.scale >= 0 {
            Decimal::try_from_i128_with_scale(self.mantissa as i128, self.scale as u32)
                .map_err(|_| overflow())
        } else {
            let factor = 10i128
                .checked_pow(self.scale.unsigned_abs() as u32)
                .ok_or_else(overflow)?;
            let widened = (self.mantissa as i128)
                .checked_mul(factor)
                .ok_or_else(overflow)?;
            Decimal::try_from_i128_with_scale(widened, 0).map_err(|_| overflow())
        }
    }

    /// Converts back from `rust_decimal`, dropping trailing zeros and then
    /// rounding away fraction digits until the mantissa fits in an `i64`.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let mut value = value.normalize();
        loop {
            if let Ok(mantissa) = i64::try_from(value.mantissa()) {
                return Ok(Self {
                    mantissa,
                    scale: value.scale() as i8,
                });
            }
            if value.scale() == 0 {
                return Err(SystemError::overflow(format!(
                    "{value} does not fit a 64-bit decimal mantissa"
                )));
            }
            value = value.round_dp(value.scale() - 1);
        }
    }
}

/// Timezone offset in minutes east of UTC, within +/-14:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timezone {
    pub offset_minutes: i16,
}

impl Timezone {
    pub const UTC: Timezone = Timezone { offset_minutes: 0 };

    pub fn new(offset_minutes: i32) -> Option<Self> {
        if (-840..=840).contains(&offset_minutes) {
            Some(Self {
                offset_minutes: offset_minutes as i16,
            })
        } else {
            None
        }
    }

    pub fn from_hours_minutes(hours: i8, minutes: i8) -> Option<Self> {
        Self::new(hours as i32 * 60 + minutes as i32)
    }

    /// Signed hour component; carries the sign of the offset.
    pub fn hours(self) -> i8 {
        (self.offset_minutes / 60) as i8
    }

    /// Signed minute component; carries the sign of the offset.
    pub fn minutes(self) -> i8 {
        (self.offset_minutes % 60) as i8
    }

    pub fn offset_millis(self) -> i64 {
        self.offset_minutes as i64 * MILLIS_PER_MINUTE
    }
}

/// xs:date, and the carrier for the gregorian fragment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub timezone: Option<Timezone>,
}

/// xs:dateTime with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    /// Milliseconds within the minute, `0..60_000`.
    pub millis: u16,
    pub timezone: Option<Timezone>,
}

/// xs:time with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsTime {
    pub hour: u8,
    pub minute: u8,
    /// Milliseconds within the minute, `0..60_000`.
    pub millis: u16,
    pub timezone: Option<Timezone>,
}

/// xs:duration normalized to a month part and a millisecond part.
///
/// Both parts carry the same sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XsDuration {
    pub months: i32,
    pub millis: i64,
}

/// Dictionary codes naming an element or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeName {
    pub prefix: i32,
    pub uri: i32,
    pub local: i32,
}

impl NodeName {
    /// Code meaning "no entry" (for example the empty prefix).
    pub const NONE: i32 = -1;

    pub const fn new(prefix: i32, uri: i32, local: i32) -> Self {
        Self { prefix, uri, local }
    }
}

impl Default for NodeName {
    fn default() -> Self {
        Self::new(Self::NONE, Self::NONE, Self::NONE)
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i64, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Days between 1970-01-01 and the given proleptic Gregorian date.
pub fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
pub fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };
    (year, m as u8, d as u8)
}

fn days_to_millis(days: i64) -> i128 {
    i128::from(days) * i128::from(MILLIS_PER_DAY)
}

fn checked_year(year: i64) -> Result<i32> {
    i32::try_from(year).map_err(|_| SystemError::DateTimeOverflow)
}

impl XsDate {
    pub fn new(year: i32, month: u8, day: u8, timezone: Option<Timezone>) -> Self {
        Self {
            year,
            month,
            day,
            timezone,
        }
    }

    /// Milliseconds since the epoch of midnight starting this date, in UTC.
    ///
    /// Widened to `i128`: years near `i32::MAX` do not fit in `i64` millis.
    pub fn to_epoch_millis(self, implicit: Timezone) -> i128 {
        let tz = self.timezone.unwrap_or(implicit);
        days_to_millis(days_from_civil(self.year as i64, self.month, self.day))
            - i128::from(tz.offset_millis())
    }

    /// The date containing local midnight of `days` since the epoch.
    pub fn from_epoch_days(days: i64, timezone: Option<Timezone>) -> Result<Self> {
        let (year, month, day) = civil_from_days(days);
        Ok(Self {
            year: checked_year(year)?,
            month,
            day,
            timezone,
        })
    }
}

impl XsDateTime {
    pub fn from_date(date: XsDate) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: 0,
            minute: 0,
            millis: 0,
            timezone: date.timezone,
        }
    }

    pub fn date(self) -> XsDate {
        XsDate::new(self.year, self.month, self.day, self.timezone)
    }

    pub fn time(self) -> XsTime {
        XsTime {
            hour: self.hour,
            minute: self.minute,
            millis: self.millis,
            timezone: self.timezone,
        }
    }

    /// Milliseconds since the local midnight, ignoring the timezone.
    pub fn local_millis_of_day(self) -> i64 {
        self.hour as i64 * MILLIS_PER_HOUR
            + self.minute as i64 * MILLIS_PER_MINUTE
            + self.millis as i64
    }

    /// Milliseconds since the local epoch, ignoring the timezone.
    pub fn local_epoch_millis(self) -> i128 {
        days_to_millis(days_from_civil(self.year as i64, self.month, self.day))
            + i128::from(self.local_millis_of_day())
    }

    /// Milliseconds since the epoch in UTC, using `implicit` when the value
    /// has no timezone.
    pub fn to_epoch_millis(self, implicit: Timezone) -> i128 {
        let tz = self.timezone.unwrap_or(implicit);
        self.local_epoch_millis() - i128::from(tz.offset_millis())
    }

    /// Builds a value from local milliseconds since the epoch, keeping
    /// `timezone` as its label.
    pub fn from_local_epoch_millis(local: i128, timezone: Option<Timezone>) -> Result<Self> {
        let per_day = i128::from(MILLIS_PER_DAY);
        let days = i64::try_from(local.div_euclid(per_day))
            .map_err(|_| SystemError::DateTimeOverflow)?;
        let in_day = local.rem_euclid(per_day) as i64;
        let (year, month, day) = civil_from_days(days);
        Ok(Self {
            year: checked_year(year)?,
            month,
            day,
            hour: (in_day / MILLIS_PER_HOUR) as u8,
            minute: (in_day % MILLIS_PER_HOUR / MILLIS_PER_MINUTE) as u8,
            millis: (in_day % MILLIS_PER_MINUTE) as u16,
            timezone,
        })
    }
}

impl XsTime {
    pub fn local_millis_of_day(self) -> i64 {
        self.hour as i64 * MILLIS_PER_HOUR
            + self.minute as i64 * MILLIS_PER_MINUTE
            + self.millis as i64
    }

    /// Milliseconds relative to UTC midnight of a shared reference day; the
    /// result may fall outside one day after applying the offset.
    pub fn to_reference_millis(self, implicit: Timezone) -> i64 {
        let tz = self.timezone.unwrap_or(implicit);
        self.local_millis_of_day() - tz.offset_millis()
    }

    pub fn from_local_millis_of_day(millis: i64, timezone: Option<Timezone>) -> Self {
        let in_day = millis.rem_euclid(MILLIS_PER_DAY);
        Self {
            hour: (in_day / MILLIS_PER_HOUR) as u8,
            minute: (in_day % MILLIS_PER_HOUR / MILLIS_PER_MINUTE) as u8,
            millis: (in_day % MILLIS_PER_MINUTE) as u16,
            timezone,
        }
    }
}

impl XsDuration {
    pub const fn new(months: i32, millis: i64) -> Self {
        Self { months, millis }
    }

    pub fn is_negative(self) -> bool {
        self.months < 0 || self.millis < 0
    }
}
