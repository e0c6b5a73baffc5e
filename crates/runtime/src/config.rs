use serde::Deserialize;
use tessera_datamodel::DEFAULT_MAX_VALUE_BYTES;
use thiserror::Error;

/// Scale used for decimal quotients unless configured otherwise.
pub const DEFAULT_DECIMAL_DIVISION_SCALE: u32 = 18;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid engine configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Settings a [`DynamicContext`](crate::DynamicContext) is built from.
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Implicit timezone in minutes east of UTC (default: the local offset)
    pub implicit_timezone_minutes: Option<i32>,
    /// Current dateTime as an xs:dateTime lexical form (default: the clock)
    pub current_datetime: Option<String>,
    /// Fraction digits kept by decimal division (default: 18)
    pub decimal_division_scale: u32,
    /// Byte limit for a single output buffer (default: 16 MiB)
    pub max_value_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            implicit_timezone_minutes: None,
            current_datetime: None,
            decimal_division_scale: DEFAULT_DECIMAL_DIVISION_SCALE,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(minutes) = self.implicit_timezone_minutes
            && !(-840..=840).contains(&minutes)
        {
            return Err(ConfigError::InvalidValue {
                field: "implicit_timezone_minutes",
                message: format!("{minutes} is outside -840..=840"),
            });
        }
        if self.decimal_division_scale > tessera_datamodel::values::MAX_DECIMAL_SCALE {
            return Err(ConfigError::InvalidValue {
                field: "decimal_division_scale",
                message: format!(
                    "{} exceeds {}",
                    self.decimal_division_scale,
                    tessera_datamodel::values::MAX_DECIMAL_SCALE
                ),
            });
        }
        if self.max_value_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_value_bytes",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
