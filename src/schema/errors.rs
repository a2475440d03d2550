//! Validation error types
//!
//! Error codes:
//! - REQUIRED
//! - TYPE_MISMATCH
//! - ENUM
//! - TIMESTAMP_ISO8601
//! - RULE_MIN
//! - RULE_MAX
//! - RULE_REGEX
//! - UNKNOWN_FIELD

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cell and row validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    /// Required value missing or null
    Required,
    /// Value has the wrong JSON type
    TypeMismatch,
    /// Value outside the enum list
    Enum,
    /// Timestamp string is not ISO-8601
    #[serde(rename = "TIMESTAMP_ISO8601")]
    TimestampIso8601,
    /// Number below `rules.min`
    RuleMin,
    /// Number above `rules.max`
    RuleMax,
    /// String does not match `rules.regex`
    RuleRegex,
    /// Key has no matching column
    UnknownField,
}

impl ValidationErrorCode {
    /// Returns the wire code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::Required => "REQUIRED",
            ValidationErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ValidationErrorCode::Enum => "ENUM",
            ValidationErrorCode::TimestampIso8601 => "TIMESTAMP_ISO8601",
            ValidationErrorCode::RuleMin => "RULE_MIN",
            ValidationErrorCode::RuleMax => "RULE_MAX",
            ValidationErrorCode::RuleRegex => "RULE_REGEX",
            ValidationErrorCode::UnknownField => "UNKNOWN_FIELD",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single validation failure for one field.
///
/// Optional members carry whatever context the code needs:
/// types for `TYPE_MISMATCH`, the allowed list for `ENUM`, the bound or pattern for rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Column key (or the unknown key)
    pub field: String,
    pub code: ValidationErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl ValidationError {
    fn new(field: impl Into<String>, code: ValidationErrorCode, message: String) -> Self {
        Self {
            field: field.into(),
            code,
            message,
            expected_type: None,
            actual_type: None,
            allowed: None,
            min: None,
            max: None,
            regex: None,
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(
            field,
            ValidationErrorCode::Required,
            format!("The field \"{}\" is required", field),
        )
    }

    pub fn type_mismatch(field: &str, expected: &str, actual: &str) -> Self {
        Self {
            expected_type: Some(expected.to_string()),
            actual_type: Some(actual.to_string()),
            ..Self::new(
                field,
                ValidationErrorCode::TypeMismatch,
                format!("The field \"{}\" must be {}", field, expected),
            )
        }
    }

    pub fn not_in_enum(field: &str, allowed: &[String]) -> Self {
        Self {
            allowed: Some(allowed.to_vec()),
            ..Self::new(
                field,
                ValidationErrorCode::Enum,
                format!("The field \"{}\" must be one of: {}", field, allowed.join(", ")),
            )
        }
    }

    pub fn malformed_timestamp(field: &str) -> Self {
        Self::new(
            field,
            ValidationErrorCode::TimestampIso8601,
            format!("The field \"{}\" must be an ISO-8601 timestamp", field),
        )
    }

    pub fn below_min(field: &str, min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::new(
                field,
                ValidationErrorCode::RuleMin,
                format!("The field \"{}\" must be >= {}", field, min),
            )
        }
    }

    pub fn above_max(field: &str, max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::new(
                field,
                ValidationErrorCode::RuleMax,
                format!("The field \"{}\" must be <= {}", field, max),
            )
        }
    }

    pub fn pattern_mismatch(field: &str, regex: &str) -> Self {
        Self {
            regex: Some(regex.to_string()),
            ..Self::new(
                field,
                ValidationErrorCode::RuleRegex,
                format!("The field \"{}\" does not match the format", field),
            )
        }
    }

    pub fn unknown_field(field: &str) -> Self {
        Self::new(
            field,
            ValidationErrorCode::UnknownField,
            format!("Field \"{}\" is not defined in table columns", field),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Column payload rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PayloadError {
    message: String,
}

impl PayloadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
