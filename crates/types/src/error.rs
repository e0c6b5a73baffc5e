use std::fmt;
use thiserror::Error;

/// Stable symbolic error codes surfaced by the value core.
///
/// Upstream layers match on these to build diagnostics; the human readable
/// message of a [`SystemError`] is presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Operand types have no defined operation.
    XPTY0004,
    /// Division by zero.
    FOAR0001,
    /// Numeric overflow or underflow.
    FOAR0002,
    /// Invalid value for cast or constructor.
    FORG0001,
    /// Invalid lexical value.
    FOCA0002,
    /// NaN supplied as a float or double argument.
    FOCA0005,
    /// Overflow or underflow in date/time arithmetic.
    FODT0001,
    /// Overflow or underflow in duration arithmetic.
    FODT0002,
    /// Duplicate key in an object constructor.
    JNDY0003,
    /// Internal error.
    SYSE0001,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::FOAR0001 => "FOAR0001",
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::FOCA0002 => "FOCA0002",
            ErrorCode::FOCA0005 => "FOCA0005",
            ErrorCode::FODT0001 => "FODT0001",
            ErrorCode::FODT0002 => "FODT0002",
            ErrorCode::JNDY0003 => "JNDY0003",
            ErrorCode::SYSE0001 => "SYSE0001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("Invalid operand types: {0}")]
    InvalidOperandTypes(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric overflow: {0}")]
    Overflow(String),

    #[error("Invalid value for cast to {target}: '{value}'")]
    InvalidCast { target: String, value: String },

    #[error("Invalid lexical value: {0}")]
    InvalidLexicalValue(String),

    #[error("NaN supplied as float/double value")]
    NanArgument,

    #[error("Overflow in date/time operation")]
    DateTimeOverflow,

    #[error("Overflow in duration operation")]
    DurationOverflow,

    #[error("Duplicate key '{0}' in object")]
    DuplicateKey(String),

    #[error("Value of {size} bytes exceeds the limit of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SystemError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::InvalidOperandTypes(message.into())
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::Overflow(message.into())
    }

    pub fn invalid_cast(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidCast {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The stable code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            SystemError::InvalidOperandTypes(_) => ErrorCode::XPTY0004,
            SystemError::DivisionByZero => ErrorCode::FOAR0001,
            SystemError::Overflow(_) => ErrorCode::FOAR0002,
            SystemError::InvalidCast { .. } => ErrorCode::FORG0001,
            SystemError::InvalidLexicalValue(_) => ErrorCode::FOCA0002,
            SystemError::NanArgument => ErrorCode::FOCA0005,
            SystemError::DateTimeOverflow => ErrorCode::FODT0001,
            SystemError::DurationOverflow => ErrorCode::FODT0002,
            SystemError::DuplicateKey(_) => ErrorCode::JNDY0003,
            SystemError::ValueTooLarge { .. } | SystemError::Internal(_) => ErrorCode::SYSE0001,
        }
    }
}

impl From<std::str::Utf8Error> for SystemError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Internal(format!("malformed UTF-8 payload: {err}"))
    }
}

impl From<std::num::TryFromIntError> for SystemError {
    fn from(err: std::num::TryFromIntError) -> Self {
        Self::Internal(format!("integer conversion failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, SystemError>;
