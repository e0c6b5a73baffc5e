use crate::cast::lexical;
use crate::config::{ConfigError, EngineConfig};
use chrono::{Datelike, Local, Timelike, Utc};
use tessera_datamodel::{Timezone, XsDateTime};

/// Read-only evaluation settings shared by every operator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicContext {
    implicit_timezone: Timezone,
    current_datetime: XsDateTime,
    decimal_division_scale: u32,
    max_value_bytes: usize,
}

impl DynamicContext {
    /// Resolves `config`, reading the clock and the local offset for
    /// anything left unset.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let implicit_timezone = match config.implicit_timezone_minutes {
            Some(minutes) => Timezone::new(minutes).ok_or(ConfigError::InvalidValue {
                field: "implicit_timezone_minutes",
                message: format!("{minutes} is not a valid offset"),
            })?,
            None => local_timezone(),
        };
        let current_datetime = match &config.current_datetime {
            Some(lexical) => {
                lexical::parse_datetime(lexical).ok_or_else(|| ConfigError::InvalidValue {
                    field: "current_datetime",
                    message: format!("'{lexical}' is not an xs:dateTime"),
                })?
            }
            None => clock_datetime(implicit_timezone)?,
        };
        Ok(Self {
            implicit_timezone,
            current_datetime,
            decimal_division_scale: config.decimal_division_scale,
            max_value_bytes: config.max_value_bytes,
        })
    }

    /// A context with a fixed implicit timezone and current dateTime, for tests and
    /// reproducible runs.
    pub fn fixed(implicit_timezone: Timezone, current_datetime: XsDateTime) -> Self {
        let defaults = EngineConfig::default();
        Self {
            implicit_timezone,
            current_datetime,
            decimal_division_scale: defaults.decimal_division_scale,
            max_value_bytes: defaults.max_value_bytes,
        }
    }

    pub fn with_implicit_timezone(mut self, timezone: Timezone) -> Self {
        self.implicit_timezone = timezone;
        self
    }

    pub fn with_decimal_division_scale(mut self, scale: u32) -> Self {
        self.decimal_division_scale = scale;
        self
    }

    pub fn implicit_timezone(&self) -> Timezone {
        self.implicit_timezone
    }

    pub fn current_datetime(&self) -> XsDateTime {
        self.current_datetime
    }

    pub fn decimal_division_scale(&self) -> u32 {
        self.decimal_division_scale
    }

    pub fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }
}

impl Default for DynamicContext {
    fn default() -> Self {
        let epoch = XsDateTime::from_date(tessera_datamodel::XsDate::new(
            1970,
            1,
            1,
            Some(Timezone::UTC),
        ));
        Self::fixed(Timezone::UTC, epoch)
    }
}

fn local_timezone() -> Timezone {
    let seconds = Local::now().offset().local_minus_utc();
    Timezone::new(seconds / 60).unwrap_or(Timezone::UTC)
}

fn clock_datetime(timezone: Timezone) -> Result<XsDateTime, ConfigError> {
    let now = Utc::now() + chrono::TimeDelta::minutes(timezone.offset_minutes as i64);
    let millis = now.second() * 1_000 + now.timestamp_subsec_millis().min(999);
    Ok(XsDateTime {
        year: now.year(),
        month: now.month() as u8,
        day: now.day() as u8,
        hour: now.hour() as u8,
        minute: now.minute() as u8,
        millis: u16::try_from(millis).map_err(|_| ConfigError::InvalidValue {
            field: "current_datetime",
            message: "clock returned an out-of-range second".to_string(),
        })?,
        timezone: Some(timezone),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_values_win() {
        let config = EngineConfig {
            implicit_timezone_minutes: Some(-300),
            current_datetime: Some("2024-02-29T12:30:00Z".to_string()),
            ..EngineConfig::default()
        };
        let ctx = DynamicContext::new(&config).unwrap();
        assert_eq!(ctx.implicit_timezone().offset_minutes, -300);
        let now = ctx.current_datetime();
        assert_eq!((now.year, now.month, now.day, now.hour), (2024, 2, 29, 12));
        assert_eq!(now.timezone, Some(Timezone::UTC));
    }

    #[test]
    fn test_clock_fallback_labels_implicit_timezone() {
        let config = EngineConfig {
            implicit_timezone_minutes: Some(60),
            ..EngineConfig::default()
        };
        let ctx = DynamicContext::new(&config).unwrap();
        assert_eq!(ctx.current_datetime().timezone, Timezone::new(60));
        assert!(ctx.current_datetime().millis < 60_000);
    }

    #[test]
    fn test_invalid_current_datetime() {
        let config = EngineConfig {
            current_datetime: Some("yesterday".to_string()),
            ..EngineConfig::default()
        };
        assert!(DynamicContext::new(&config).is_err());
    }
}
