//! Lexical forms of the non-string atomic types.
//!
//! Parsers take an already trimmed string and return `None` when it is not a
//! valid lexical form of the type.

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use tessera_datamodel::values::{
    MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND, days_in_month,
};
use tessera_datamodel::{Timezone, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::ValueTag;

const TZ: &str = r"(Z|[+-]\d{2}:\d{2})?";

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d+$").expect("BUG: invalid INTEGER_RE regex literal")
});

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("BUG: invalid DECIMAL_RE regex literal")
});

static DOUBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$")
        .expect("BUG: invalid DOUBLE_RE regex literal")
});

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(-?\d{{4,}})-(\d{{2}})-(\d{{2}})T(\d{{2}}):(\d{{2}}):(\d{{2}})(\.\d+)?{TZ}$"
    ))
    .expect("BUG: invalid DATETIME_RE regex literal")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(-?\d{{4,}})-(\d{{2}})-(\d{{2}}){TZ}$"))
        .expect("BUG: invalid DATE_RE regex literal")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(\d{{2}}):(\d{{2}}):(\d{{2}})(\.\d+)?{TZ}$"))
        .expect("BUG: invalid TIME_RE regex literal")
});

static G_YEAR_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(-?\d{{4,}})-(\d{{2}}){TZ}$"))
        .expect("BUG: invalid G_YEAR_MONTH_RE regex literal")
});

static G_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(-?\d{{4,}}){TZ}$")).expect("BUG: invalid G_YEAR_RE regex literal")
});

static G_MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^--(\d{{2}})-(\d{{2}}){TZ}$"))
        .expect("BUG: invalid G_MONTH_DAY_RE regex literal")
});

static G_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^---(\d{{2}}){TZ}$")).expect("BUG: invalid G_DAY_RE regex literal")
});

static G_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^--(\d{{2}}){TZ}$")).expect("BUG: invalid G_MONTH_RE regex literal")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d+))?S)?)?$",
    )
    .expect("BUG: invalid DURATION_RE regex literal")
});

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$")
        .expect("BUG: invalid LANGUAGE_RE regex literal")
});

static NMTOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}._:\-]+$").expect("BUG: invalid NMTOKEN_RE regex literal")
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_:][\p{L}\p{N}._:\-]*$").expect("BUG: invalid NAME_RE regex literal")
});

static NCNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}._\-]*$").expect("BUG: invalid NCNAME_RE regex literal")
});

/// Reference year for gregorian fragments that carry no year (a leap year,
/// so `--02-29` is valid).
pub const REFERENCE_YEAR: i32 = 1972;

pub fn parse_integer(s: &str) -> Option<i64> {
    if !INTEGER_RE.is_match(s) {
        return None;
    }
    s.strip_prefix('+').unwrap_or(s).parse().ok()
}

pub fn parse_decimal(s: &str) -> Option<XsDecimal> {
    if !DECIMAL_RE.is_match(s) {
        return None;
    }
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    let normalized = if let Some(rest) = unsigned.strip_prefix("-.") {
        format!("-0.{rest}")
    } else if let Some(rest) = unsigned.strip_prefix('.') {
        format!("0.{rest}")
    } else {
        unsigned.trim_end_matches('.').to_string()
    };
    let value = Decimal::from_str(&normalized).ok()?;
    XsDecimal::from_decimal(value).ok()
}

pub fn parse_double(s: &str) -> Option<f64> {
    match s {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if DOUBLE_RE.is_match(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn parse_boolean(s: &str) -> Option<bool> {
    match s {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_timezone(s: &str) -> Option<Timezone> {
    if s == "Z" {
        return Some(Timezone::UTC);
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes > 59 || hours > 14 || (hours == 14 && minutes != 0) {
        return None;
    }
    Timezone::new(sign * (hours * 60 + minutes))
}

fn timezone_group(caps: &Captures<'_>, index: usize) -> Option<Option<Timezone>> {
    match caps.get(index) {
        Some(m) => parse_timezone(m.as_str()).map(Some),
        None => Some(None),
    }
}

fn number<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

/// Milliseconds of a `.ddd…` fraction, truncated to three digits.
fn fraction_millis(fraction: Option<&str>) -> u16 {
    let Some(digits) = fraction else {
        return 0;
    };
    let digits = digits.trim_start_matches('.');
    let mut millis = 0u16;
    for (i, d) in digits.bytes().chain(std::iter::repeat(b'0')).take(3).enumerate() {
        millis += (d - b'0') as u16 * [100, 10, 1][i];
    }
    millis
}

fn valid_day(year: i32, month: u8, day: u8) -> bool {
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year as i64, month)
}

pub fn parse_date(s: &str) -> Option<XsDate> {
    let caps = DATE_RE.captures(s)?;
    let year: i32 = number(&caps, 1)?;
    let month: u8 = number(&caps, 2)?;
    let day: u8 = number(&caps, 3)?;
    if !valid_day(year, month, day) {
        return None;
    }
    Some(XsDate::new(year, month, day, timezone_group(&caps, 4)?))
}

pub fn parse_datetime(s: &str) -> Option<XsDateTime> {
    let caps = DATETIME_RE.captures(s)?;
    let year: i32 = number(&caps, 1)?;
    let month: u8 = number(&caps, 2)?;
    let day: u8 = number(&caps, 3)?;
    let hour: u8 = number(&caps, 4)?;
    let minute: u8 = number(&caps, 5)?;
    let second: u16 = number(&caps, 6)?;
    let timezone = timezone_group(&caps, 8)?;
    if !valid_day(year, month, day) || minute > 59 || second > 59 {
        return None;
    }
    let millis = second * 1_000 + fraction_millis(caps.get(7).map(|m| m.as_str()));
    if hour == 24 {
        // 24:00:00 is the first instant of the next day.
        if minute != 0 || millis != 0 {
            return None;
        }
        let midnight = XsDateTime::from_date(XsDate::new(year, month, day, timezone));
        return XsDateTime::from_local_epoch_millis(
            midnight.local_epoch_millis() + i128::from(MILLIS_PER_DAY),
            timezone,
        )
        .ok();
    }
    if hour > 23 {
        return None;
    }
    Some(XsDateTime {
        year,
        month,
        day,
        hour,
        minute,
        millis,
        timezone,
    })
}

pub fn parse_time(s: &str) -> Option<XsTime> {
    let caps = TIME_RE.captures(s)?;
    let hour: u8 = number(&caps, 1)?;
    let minute: u8 = number(&caps, 2)?;
    let second: u16 = number(&caps, 3)?;
    let timezone = timezone_group(&caps, 5)?;
    if minute > 59 || second > 59 {
        return None;
    }
    let millis = second * 1_000 + fraction_millis(caps.get(4).map(|m| m.as_str()));
    let hour = match hour {
        24 if minute == 0 && millis == 0 => 0,
        h if h < 24 => h,
        _ => return None,
    };
    Some(XsTime {
        hour,
        minute,
        millis,
        timezone,
    })
}

/// Parses one of the five gregorian fragment types into its [`XsDate`]
/// carrier, filling the missing fields with fixed reference values.
pub fn parse_gregorian(tag: ValueTag, s: &str) -> Option<XsDate> {
    let (year, month, day, timezone) = match tag {
        ValueTag::GYearMonth => {
            let caps = G_YEAR_MONTH_RE.captures(s)?;
            (number(&caps, 1)?, number(&caps, 2)?, 1, timezone_group(&caps, 3)?)
        }
        ValueTag::GYear => {
            let caps = G_YEAR_RE.captures(s)?;
            (number(&caps, 1)?, 1, 1, timezone_group(&caps, 2)?)
        }
        ValueTag::GMonthDay => {
            let caps = G_MONTH_DAY_RE.captures(s)?;
            (REFERENCE_YEAR, number(&caps, 1)?, number(&caps, 2)?, timezone_group(&caps, 3)?)
        }
        ValueTag::GDay => {
            let caps = G_DAY_RE.captures(s)?;
            (REFERENCE_YEAR, 12, number(&caps, 1)?, timezone_group(&caps, 2)?)
        }
        ValueTag::GMonth => {
            let caps = G_MONTH_RE.captures(s)?;
            (REFERENCE_YEAR, number(&caps, 1)?, 1, timezone_group(&caps, 2)?)
        }
        _ => return None,
    };
    if !valid_day(year, month, day) {
        return None;
    }
    Some(XsDate::new(year, month, day, timezone))
}

/// Parses xs:duration and, with `tag`, its two restricted subtypes.
pub fn parse_duration(tag: ValueTag, s: &str) -> Option<XsDuration> {
    if s.ends_with('P') || s.ends_with('T') {
        return None;
    }
    let caps = DURATION_RE.captures(s)?;
    let has_month_part = caps.get(2).is_some() || caps.get(3).is_some();
    let has_time_part = (4..=7).any(|i| caps.get(i).is_some());
    match tag {
        ValueTag::DayTimeDuration if has_month_part => return None,
        ValueTag::YearMonthDuration if has_time_part => return None,
        _ => {}
    }

    let component = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let months = component(2)?.checked_mul(12)?.checked_add(component(3)?)?;
    let millis = component(4)?
        .checked_mul(MILLIS_PER_DAY)?
        .checked_add(component(5)?.checked_mul(MILLIS_PER_HOUR)?)?
        .checked_add(component(6)?.checked_mul(MILLIS_PER_MINUTE)?)?
        .checked_add(component(7)?.checked_mul(MILLIS_PER_SECOND)?)?
        .checked_add(fraction_millis(caps.get(8).map(|m| m.as_str())) as i64)?;
    let months = i32::try_from(months).ok()?;
    Some(if caps.get(1).is_some() {
        XsDuration::new(-months, -millis)
    } else {
        XsDuration::new(months, millis)
    })
}

/// Applies the whitespace facet of a string-family `tag`.
pub fn normalize_whitespace(tag: ValueTag, s: &str) -> String {
    match tag {
        ValueTag::String | ValueTag::UntypedAtomic | ValueTag::AnyUri => s.to_string(),
        ValueTag::NormalizedString => s.replace(['\t', '\n', '\r'], " "),
        _ => s.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Checks the pattern facet of a string-family `tag`; types without one
/// accept everything.
pub fn is_valid_string_subtype(tag: ValueTag, s: &str) -> bool {
    match tag {
        ValueTag::Language => LANGUAGE_RE.is_match(s),
        ValueTag::NmToken => NMTOKEN_RE.is_match(s),
        ValueTag::Name => NAME_RE.is_match(s),
        ValueTag::NcName | ValueTag::Id | ValueTag::IdRef | ValueTag::Entity => {
            NCNAME_RE.is_match(s)
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse_integer("+42"), Some(42));
        assert_eq!(parse_integer("4.2"), None);
        assert_eq!(parse_integer("99999999999999999999"), None);
        assert_eq!(parse_decimal("123.45"), Some(XsDecimal::new(12345, 2)));
        assert_eq!(parse_decimal("-.5"), Some(XsDecimal::new(-5, 1)));
        assert_eq!(parse_decimal("3."), Some(XsDecimal::new(3, 0)));
        assert_eq!(parse_decimal("1e3"), None);
        assert_eq!(parse_double("1e3"), Some(1000.0));
        assert!(parse_double("NaN").unwrap().is_nan());
        assert_eq!(parse_double("-INF"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_double("inf"), None);
        assert_eq!(parse_boolean("1"), Some(true));
        assert_eq!(parse_boolean("TRUE"), None);
    }

    #[test]
    fn test_timezones() {
        assert_eq!(parse_timezone("Z"), Some(Timezone::UTC));
        assert_eq!(parse_timezone("-05:30"), Timezone::new(-330));
        assert_eq!(parse_timezone("+14:00"), Timezone::new(840));
        assert_eq!(parse_timezone("+14:30"), None);
        assert_eq!(parse_timezone("05:00"), None);
    }

    #[test]
    fn test_dates_and_times() {
        assert_eq!(parse_date("2024-02-29"), Some(XsDate::new(2024, 2, 29, None)));
        assert_eq!(parse_date("2023-02-29"), None);
        let dt = parse_datetime("2024-01-31T23:59:59.5+01:00").unwrap();
        assert_eq!((dt.hour, dt.minute, dt.millis), (23, 59, 59_500));
        assert_eq!(dt.timezone, Timezone::new(60));
        let rolled = parse_datetime("2024-12-31T24:00:00").unwrap();
        assert_eq!((rolled.year, rolled.month, rolled.day, rolled.hour), (2025, 1, 1, 0));
        assert_eq!(parse_datetime("2024-12-31T24:00:01"), None);
        let t = parse_time("12:00:00.123456Z").unwrap();
        assert_eq!(t.millis, 123);
        assert_eq!(parse_time("25:00:00"), None);
    }

    #[test]
    fn test_gregorian_fragments() {
        let md = parse_gregorian(ValueTag::GMonthDay, "--02-29").unwrap();
        assert_eq!((md.year, md.month, md.day), (REFERENCE_YEAR, 2, 29));
        let gd = parse_gregorian(ValueTag::GDay, "---31Z").unwrap();
        assert_eq!(gd.timezone, Some(Timezone::UTC));
        assert!(parse_gregorian(ValueTag::GMonth, "--13").is_none());
        assert!(parse_gregorian(ValueTag::GYear, "24").is_none());
    }

    #[test]
    fn test_string_subtype_facets() {
        assert_eq!(normalize_whitespace(ValueTag::NormalizedString, "a\tb\n"), "a b ");
        assert_eq!(normalize_whitespace(ValueTag::Token, "  a \n b "), "a b");
        assert!(is_valid_string_subtype(ValueTag::Language, "en-GB"));
        assert!(!is_valid_string_subtype(ValueTag::Language, "english-language"));
        assert!(is_valid_string_subtype(ValueTag::Name, "xsl:template"));
        assert!(!is_valid_string_subtype(ValueTag::NcName, "xsl:template"));
        assert!(!is_valid_string_subtype(ValueTag::NcName, "1abc"));
        assert!(is_valid_string_subtype(ValueTag::NmToken, "1abc"));
    }

    #[test]
    fn test_durations() {
        let d = parse_duration(ValueTag::Duration, "-P1Y2M3DT4H5M6.7S").unwrap();
        assert_eq!(d.months, -14);
        assert_eq!(
            d.millis,
            -(3 * MILLIS_PER_DAY + 4 * MILLIS_PER_HOUR + 5 * MILLIS_PER_MINUTE + 6_700)
        );
        assert!(parse_duration(ValueTag::Duration, "P").is_none());
        assert!(parse_duration(ValueTag::Duration, "P1YT").is_none());
        assert!(parse_duration(ValueTag::DayTimeDuration, "P1M").is_none());
        assert!(parse_duration(ValueTag::YearMonthDuration, "PT1S").is_none());
        assert_eq!(
            parse_duration(ValueTag::YearMonthDuration, "P2Y"),
            Some(XsDuration::new(24, 0))
        );
    }
}
