//! Canonical lexical rendering of atomic values, plus the numeric helpers the
//! renderers and decimal kernels share.
//!
//! Writers append ASCII or UTF-8 bytes to a caller-owned `Vec<u8>` and never
//! fail.

use tessera_datamodel::values::{
    MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND,
};
use tessera_datamodel::{Timezone, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::ValueTag;

/// Writes `value` in decimal, zero-padded to at least `min_digits` digits
/// after the sign.
pub fn write_padded_number(value: i64, min_digits: u32, out: &mut Vec<u8>) {
    if value < 0 {
        out.push(b'-');
    }
    write_padded_unsigned(value.unsigned_abs(), min_digits, out);
}

fn write_padded_unsigned(value: u64, min_digits: u32, out: &mut Vec<u8>) {
    let digits = digit_count(value);
    for _ in digits..min_digits {
        out.push(b'0');
    }
    let mut buf = [0u8; 20];
    let mut rest = value;
    for slot in buf[..digits as usize].iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    out.extend_from_slice(&buf[..digits as usize]);
}

/// Number of decimal digits in `value`; zero has one digit.
pub fn digit_count(value: u64) -> u32 {
    match value.checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

pub fn pow10(exponent: u32) -> Option<i64> {
    10i64.checked_pow(exponent)
}

pub fn pow10_i128(exponent: u32) -> Option<i128> {
    10i128.checked_pow(exponent)
}

pub fn write_char(c: char, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Sign test used when rendering: zero counts as non-negative.
pub fn is_non_negative(value: i64) -> bool {
    value >= 0
}

pub fn write_timezone(timezone: Option<Timezone>, out: &mut Vec<u8>) {
    let Some(tz) = timezone else {
        return;
    };
    if tz.offset_minutes == 0 {
        out.push(b'Z');
        return;
    }
    out.push(if is_non_negative(tz.offset_minutes as i64) {
        b'+'
    } else {
        b'-'
    });
    let abs = tz.offset_minutes.unsigned_abs() as u64;
    write_padded_unsigned(abs / 60, 2, out);
    out.push(b':');
    write_padded_unsigned(abs % 60, 2, out);
}

fn write_year(year: i32, out: &mut Vec<u8>) {
    write_padded_number(year as i64, 4, out);
}

fn write_two(value: u8, out: &mut Vec<u8>) {
    write_padded_unsigned(value as u64, 2, out);
}

/// Seconds with an optional millisecond fraction, trailing zeros trimmed.
fn write_seconds(millis_in_minute: u16, out: &mut Vec<u8>) {
    let millis = millis_in_minute as u64;
    write_padded_unsigned(millis / 1_000, 2, out);
    write_fraction(millis % 1_000, out);
}

fn write_fraction(mut millis: u64, out: &mut Vec<u8>) {
    if millis == 0 {
        return;
    }
    let mut width = 3;
    while millis % 10 == 0 {
        millis /= 10;
        width -= 1;
    }
    out.push(b'.');
    write_padded_unsigned(millis, width, out);
}

pub fn write_date(date: &XsDate, out: &mut Vec<u8>) {
    write_year(date.year, out);
    out.push(b'-');
    write_two(date.month, out);
    out.push(b'-');
    write_two(date.day, out);
    write_timezone(date.timezone, out);
}

fn write_clock(hour: u8, minute: u8, millis: u16, out: &mut Vec<u8>) {
    write_two(hour, out);
    out.push(b':');
    write_two(minute, out);
    out.push(b':');
    write_seconds(millis, out);
}

pub fn write_time(time: &XsTime, out: &mut Vec<u8>) {
    write_clock(time.hour, time.minute, time.millis, out);
    write_timezone(time.timezone, out);
}

pub fn write_datetime(datetime: &XsDateTime, out: &mut Vec<u8>) {
    write_year(datetime.year, out);
    out.push(b'-');
    write_two(datetime.month, out);
    out.push(b'-');
    write_two(datetime.day, out);
    out.push(b'T');
    write_clock(datetime.hour, datetime.minute, datetime.millis, out);
    write_timezone(datetime.timezone, out);
}

/// Lexical form of a gregorian fragment stored as an [`XsDate`].
pub fn write_gregorian(tag: ValueTag, date: &XsDate, out: &mut Vec<u8>) {
    match tag {
        ValueTag::GYearMonth => {
            write_year(date.year, out);
            out.push(b'-');
            write_two(date.month, out);
        }
        ValueTag::GYear => write_year(date.year, out),
        ValueTag::GMonthDay => {
            out.extend_from_slice(b"--");
            write_two(date.month, out);
            out.push(b'-');
            write_two(date.day, out);
        }
        ValueTag::GDay => {
            out.extend_from_slice(b"---");
            write_two(date.day, out);
        }
        ValueTag::GMonth => {
            out.extend_from_slice(b"--");
            write_two(date.month, out);
        }
        _ => {
            write_date(date, out);
            return;
        }
    }
    write_timezone(date.timezone, out);
}

/// Canonical xs:decimal: no exponent, no trailing fraction zeros, at least
/// one integer digit and no trailing point.
pub fn write_decimal(value: XsDecimal, out: &mut Vec<u8>) {
    if value.mantissa < 0 {
        out.push(b'-');
    }
    let abs = value.mantissa.unsigned_abs();
    if value.scale <= 0 || abs == 0 {
        write_padded_unsigned(abs, 1, out);
        if abs != 0 {
            for _ in 0..value.scale.unsigned_abs() {
                out.push(b'0');
            }
        }
        return;
    }

    let scale = value.scale as usize;
    let mut buf = [0u8; 20];
    let digits = digit_count(abs) as usize;
    let mut rest = abs;
    for slot in buf[..digits].iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    let digits_bytes = &buf[..digits];

    let (integer, fraction, leading_zeros): (&[u8], &[u8], usize) = if digits > scale {
        let split = digits - scale;
        (&digits_bytes[..split], &digits_bytes[split..], 0)
    } else {
        (b"0", digits_bytes, scale - digits)
    };
    out.extend_from_slice(integer);

    let kept = fraction
        .iter()
        .rposition(|&d| d != b'0')
        .map_or(0, |i| i + 1);
    if kept == 0 {
        return;
    }
    out.push(b'.');
    out.extend(std::iter::repeat_n(b'0', leading_zeros));
    out.extend_from_slice(&fraction[..kept]);
}

pub fn write_integer(value: i64, out: &mut Vec<u8>) {
    write_padded_number(value, 1, out);
}

/// Canonical xs:double: decimal notation for magnitudes in `[1e-6, 1e6)`,
/// otherwise a mantissa with at least one fraction digit and an exponent.
pub fn write_double(value: f64, out: &mut Vec<u8>) {
    if let Some(special) = special_float(value) {
        out.extend_from_slice(special.as_bytes());
        return;
    }
    let abs = value.abs();
    if (1e-6..1e6).contains(&abs) {
        out.extend_from_slice(format!("{value}").as_bytes());
    } else {
        write_scientific(&format!("{value:E}"), out);
    }
}

pub fn write_float(value: f32, out: &mut Vec<u8>) {
    if let Some(special) = special_float(value as f64) {
        out.extend_from_slice(special.as_bytes());
        return;
    }
    let abs = value.abs();
    if (1e-6..1e6).contains(&abs) {
        out.extend_from_slice(format!("{value}").as_bytes());
    } else {
        write_scientific(&format!("{value:E}"), out);
    }
}

fn special_float(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value.is_infinite() {
        Some(if value > 0.0 { "INF" } else { "-INF" })
    } else if value == 0.0 {
        Some(if value.is_sign_negative() { "-0" } else { "0" })
    } else {
        None
    }
}

/// Rewrites Rust's `1E7` style into `1.0E7`.
fn write_scientific(text: &str, out: &mut Vec<u8>) {
    match text.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            out.extend_from_slice(mantissa.as_bytes());
            out.extend_from_slice(b".0E");
            out.extend_from_slice(exponent.as_bytes());
        }
        _ => out.extend_from_slice(text.as_bytes()),
    }
}

pub fn write_year_month_duration(months: i32, out: &mut Vec<u8>) {
    if months == 0 {
        out.extend_from_slice(b"P0M");
        return;
    }
    if months < 0 {
        out.push(b'-');
    }
    out.push(b'P');
    write_month_part(months.unsigned_abs(), out);
}

fn write_month_part(months: u32, out: &mut Vec<u8>) {
    let (years, months) = (months / 12, months % 12);
    if years > 0 {
        write_padded_unsigned(years as u64, 1, out);
        out.push(b'Y');
    }
    if months > 0 {
        write_padded_unsigned(months as u64, 1, out);
        out.push(b'M');
    }
}

pub fn write_day_time_duration(millis: i64, out: &mut Vec<u8>) {
    if millis == 0 {
        out.extend_from_slice(b"PT0S");
        return;
    }
    if millis < 0 {
        out.push(b'-');
    }
    out.push(b'P');
    write_time_part(millis.unsigned_abs(), out);
}

fn write_time_part(millis: u64, out: &mut Vec<u8>) {
    let days = millis / MILLIS_PER_DAY as u64;
    let hours = millis % MILLIS_PER_DAY as u64 / MILLIS_PER_HOUR as u64;
    let minutes = millis % MILLIS_PER_HOUR as u64 / MILLIS_PER_MINUTE as u64;
    let seconds = millis % MILLIS_PER_MINUTE as u64;
    if days > 0 {
        write_padded_unsigned(days, 1, out);
        out.push(b'D');
    }
    if hours == 0 && minutes == 0 && seconds == 0 {
        return;
    }
    out.push(b'T');
    if hours > 0 {
        write_padded_unsigned(hours, 1, out);
        out.push(b'H');
    }
    if minutes > 0 {
        write_padded_unsigned(minutes, 1, out);
        out.push(b'M');
    }
    if seconds > 0 {
        write_padded_unsigned(seconds / MILLIS_PER_SECOND as u64, 1, out);
        write_fraction(seconds % MILLIS_PER_SECOND as u64, out);
        out.push(b'S');
    }
}

pub fn write_duration(duration: XsDuration, out: &mut Vec<u8>) {
    if duration.months == 0 && duration.millis == 0 {
        out.extend_from_slice(b"PT0S");
        return;
    }
    if duration.is_negative() {
        out.push(b'-');
    }
    out.push(b'P');
    write_month_part(duration.months.unsigned_abs(), out);
    if duration.millis != 0 {
        write_time_part(duration.millis.unsigned_abs(), out);
    }
}
