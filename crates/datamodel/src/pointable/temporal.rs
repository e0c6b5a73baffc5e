use super::{FixedLength, Pointable, expect_payload, is_tag};
use crate::codec::read_timezone;
use crate::tagged::TaggedValue;
use crate::values::{Timezone, XsDate, XsDateTime, XsDuration, XsTime};
use tessera_types::{Result, ValueTag};

fn be_i32(p: &[u8]) -> i32 {
    i32::from_be_bytes([p[0], p[1], p[2], p[3]])
}

fn be_i64(p: &[u8]) -> i64 {
    i64::from_be_bytes([p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]])
}

/// Accessor for `xs:date` and the gregorian fragment types, which share its
/// layout.
#[derive(Debug, Clone, Copy)]
pub struct DatePointable<'a> {
    tag: ValueTag,
    payload: &'a [u8],
}

impl DatePointable<'_> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn year(&self) -> i32 {
        be_i32(self.payload)
    }

    pub fn month(&self) -> u8 {
        self.payload[4]
    }

    pub fn day(&self) -> u8 {
        self.payload[5]
    }

    pub fn timezone(&self) -> Option<Timezone> {
        read_timezone(self.payload[6] as i8, self.payload[7] as i8)
    }

    pub fn date_parts(&self) -> XsDate {
        XsDate::new(self.year(), self.month(), self.day(), self.timezone())
    }
}

impl FixedLength for DatePointable<'_> {
    const FIXED_LENGTH: usize = 8;
}

impl<'a> Pointable<'a> for DatePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let tag = value.tag();
        let payload = expect_payload(
            value,
            tag == ValueTag::Date || tag.is_gregorian(),
            "a date",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { tag, payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DateTimePointable<'a> {
    payload: &'a [u8],
}

impl DateTimePointable<'_> {
    pub fn year(&self) -> i32 {
        be_i32(self.payload)
    }

    pub fn month(&self) -> u8 {
        self.payload[4]
    }

    pub fn day(&self) -> u8 {
        self.payload[5]
    }

    pub fn hour(&self) -> u8 {
        self.payload[6]
    }

    pub fn minute(&self) -> u8 {
        self.payload[7]
    }

    /// Milliseconds within the minute.
    pub fn millis(&self) -> u16 {
        u16::from_be_bytes([self.payload[8], self.payload[9]])
    }

    pub fn timezone(&self) -> Option<Timezone> {
        read_timezone(self.payload[10] as i8, self.payload[11] as i8)
    }

    pub fn datetime_parts(&self) -> XsDateTime {
        XsDateTime {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            millis: self.millis(),
            timezone: self.timezone(),
        }
    }
}

impl FixedLength for DateTimePointable<'_> {
    const FIXED_LENGTH: usize = 12;
}

impl<'a> Pointable<'a> for DateTimePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::DateTime),
            "xs:dateTime",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimePointable<'a> {
    payload: &'a [u8],
}

impl TimePointable<'_> {
    pub fn hour(&self) -> u8 {
        self.payload[0]
    }

    pub fn minute(&self) -> u8 {
        self.payload[1]
    }

    pub fn millis(&self) -> u16 {
        u16::from_be_bytes([self.payload[2], self.payload[3]])
    }

    pub fn timezone(&self) -> Option<Timezone> {
        read_timezone(self.payload[4] as i8, self.payload[5] as i8)
    }

    pub fn time_parts(&self) -> XsTime {
        XsTime {
            hour: self.hour(),
            minute: self.minute(),
            millis: self.millis(),
            timezone: self.timezone(),
        }
    }
}

impl FixedLength for TimePointable<'_> {
    const FIXED_LENGTH: usize = 6;
}

impl<'a> Pointable<'a> for TimePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::Time),
            "xs:time",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

/// Accessor for `xs:duration`. Also binds the two duration subtypes,
/// presenting them with the missing component as zero.
#[derive(Debug, Clone, Copy)]
pub struct DurationPointable<'a> {
    tag: ValueTag,
    payload: &'a [u8],
}

impl DurationPointable<'_> {
    pub fn months(&self) -> i32 {
        match self.tag {
            ValueTag::Duration | ValueTag::YearMonthDuration => be_i32(self.payload),
            _ => 0,
        }
    }

    pub fn millis(&self) -> i64 {
        match self.tag {
            ValueTag::Duration => be_i64(&self.payload[4..]),
            ValueTag::DayTimeDuration => be_i64(self.payload),
            _ => 0,
        }
    }

    pub fn duration_parts(&self) -> XsDuration {
        XsDuration::new(self.months(), self.millis())
    }
}

impl FixedLength for DurationPointable<'_> {
    const FIXED_LENGTH: usize = 12;
}

impl<'a> Pointable<'a> for DurationPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let tag = value.tag();
        let min_len = match tag {
            ValueTag::DayTimeDuration => DayTimeDurationPointable::FIXED_LENGTH,
            ValueTag::YearMonthDuration => YearMonthDurationPointable::FIXED_LENGTH,
            _ => Self::FIXED_LENGTH,
        };
        let accepts = matches!(
            tag,
            ValueTag::Duration | ValueTag::DayTimeDuration | ValueTag::YearMonthDuration
        );
        let payload = expect_payload(value, accepts, "a duration", min_len)?;
        Ok(Self { tag, payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DayTimeDurationPointable<'a> {
    payload: &'a [u8],
}

impl DayTimeDurationPointable<'_> {
    pub fn millis(&self) -> i64 {
        be_i64(self.payload)
    }
}

impl FixedLength for DayTimeDurationPointable<'_> {
    const FIXED_LENGTH: usize = 8;
}

impl<'a> Pointable<'a> for DayTimeDurationPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::DayTimeDuration),
            "xs:dayTimeDuration",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct YearMonthDurationPointable<'a> {
    payload: &'a [u8],
}

impl YearMonthDurationPointable<'_> {
    pub fn months(&self) -> i32 {
        be_i32(self.payload)
    }
}

impl FixedLength for YearMonthDurationPointable<'_> {
    const FIXED_LENGTH: usize = 4;
}

impl<'a> Pointable<'a> for YearMonthDurationPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            is_tag(value.tag(), ValueTag::YearMonthDuration),
            "xs:yearMonthDuration",
            Self::FIXED_LENGTH,
        )?;
        Ok(Self { payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::storage::ValueStorage;

    #[test]
    fn test_datetime_parts_round_trip() {
        let value = XsDateTime {
            year: -44,
            month: 3,
            day: 15,
            hour: 23,
            minute: 59,
            millis: 59_999,
            timezone: Timezone::new(-300),
        };
        let mut out = ValueStorage::new();
        codec::write_datetime(&mut out, &value).unwrap();
        let dt: DateTimePointable = out.tagged().unwrap().get().unwrap();
        assert_eq!(dt.datetime_parts(), value);
    }

    #[test]
    fn test_date_pointable_binds_gregorian_tags() {
        let mut out = ValueStorage::new();
        let value = XsDate::new(1972, 12, 25, None);
        codec::write_date(&mut out, ValueTag::GMonthDay, &value).unwrap();
        let date: DatePointable = out.tagged().unwrap().get().unwrap();
        assert_eq!(date.tag(), ValueTag::GMonthDay);
        assert_eq!(date.date_parts(), value);
        assert!(date.timezone().is_none());
    }

    #[test]
    fn test_duration_pointable_presents_subtypes() {
        let mut out = ValueStorage::new();
        codec::write_day_time_duration(&mut out, -90_000).unwrap();
        let d: DurationPointable = out.tagged().unwrap().get().unwrap();
        assert_eq!(d.duration_parts(), XsDuration::new(0, -90_000));

        out.reset();
        codec::write_year_month_duration(&mut out, 14).unwrap();
        let d: DurationPointable = out.tagged().unwrap().get().unwrap();
        assert_eq!(d.duration_parts(), XsDuration::new(14, 0));

        out.reset();
        codec::write_duration(&mut out, XsDuration::new(1, 2)).unwrap();
        let d: DurationPointable = out.tagged().unwrap().get().unwrap();
        assert_eq!((d.months(), d.millis()), (1, 2));
    }
}
