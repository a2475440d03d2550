//! Cell and row validation
//!
//! Validation semantics:
//! - Absent and null values only fail on required columns
//! - Types are checked exactly, no coercion
//! - Rules run only after the type check passes; the first failing rule is reported
//! - Row validation reports every problem, never just the first
//! - Keys without a matching column are rejected
//!
//! Both validators are pure: they do not touch storage and do not mutate values.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use regex::Regex;
use serde_json::Value;

use super::errors::ValidationError;
use super::types::{Column, ColumnType, RowValues};

/// `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)`, fraction 1-9 digits, timezone mandatory
const TIMESTAMP_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+\-]\d{2}:\d{2})$";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern is valid"))
}

/// Upper bound on cached rule patterns; the cache is cleared when it fills
const PATTERN_CACHE_LIMIT: usize = 1024;

/// Compiled `rules.regex` pattern, or `None` if it does not compile.
///
/// Each distinct pattern is compiled once per process.
fn rule_pattern(pattern: &str) -> Option<Regex> {
    static CACHE: OnceLock<RwLock<HashMap<String, Option<Regex>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(Default::default);

    if let Ok(compiled) = cache.read() {
        if let Some(found) = compiled.get(pattern) {
            return found.clone();
        }
    }

    let regex = Regex::new(pattern).ok();
    if let Ok(mut compiled) = cache.write() {
        if compiled.len() >= PATTERN_CACHE_LIMIT {
            compiled.clear();
        }
        compiled.insert(pattern.to_string(), regex.clone());
    }
    regex
}

/// Returns true if `value` is an ISO-8601 timestamp string as accepted by timestamp columns.
pub fn is_iso8601(value: &str) -> bool {
    timestamp_regex().is_match(value)
}

/// Validates one value against one column.
///
/// `None` and `Some(Value::Null)` are both treated as absent.
pub fn validate_cell(column: &Column, value: Option<&Value>) -> Option<ValidationError> {
    let field = column.key.as_str();

    let value = match value {
        None | Some(Value::Null) => {
            return column.required.then(|| ValidationError::required(field));
        }
        Some(v) => v,
    };

    if let Some(err) = check_type(column, value) {
        return Some(err);
    }

    check_rules(column, value)
}

/// Validates a full value map against a column list.
///
/// # Errors
///
/// Returns every cell error (in column order) followed by one `UNKNOWN_FIELD`
/// error per key that has no column.
pub fn validate_row(columns: &[Column], values: &RowValues) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = columns
        .iter()
        .filter_map(|column| validate_cell(column, values.get(&column.key)))
        .collect();

    for key in values.keys() {
        if !columns.iter().any(|c| &c.key == key) {
            errors.push(ValidationError::unknown_field(key));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_type(column: &Column, value: &Value) -> Option<ValidationError> {
    let field = column.key.as_str();

    match column.column_type {
        ColumnType::String => {
            if !value.is_string() {
                return Some(type_error(field, "string", value));
            }
        }
        ColumnType::Number => {
            // JSON cannot carry NaN, so any number passes
            if !value.is_number() {
                return Some(type_error(field, "number", value));
            }
        }
        ColumnType::Enum => {
            let s = match value.as_str() {
                Some(s) => s,
                None => return Some(type_error(field, "string(enum)", value)),
            };
            let allowed = column.enum_values.as_deref().unwrap_or_default();
            if !allowed.iter().any(|a| a == s) {
                return Some(ValidationError::not_in_enum(field, allowed));
            }
        }
        ColumnType::Timestamp => {
            let s = match value.as_str() {
                Some(s) => s,
                None => return Some(type_error(field, "ISO-8601 string", value)),
            };
            if !is_iso8601(s) {
                return Some(ValidationError::malformed_timestamp(field));
            }
        }
        ColumnType::Object => {
            if !value.is_object() {
                return Some(type_error(field, "object", value));
            }
        }
        ColumnType::Array => {
            if !value.is_array() {
                return Some(type_error(field, "array", value));
            }
        }
    }

    None
}

fn check_rules(column: &Column, value: &Value) -> Option<ValidationError> {
    let rules = column.rules.as_ref()?;
    let field = column.key.as_str();

    match (column.column_type, value) {
        (ColumnType::Number, Value::Number(n)) => {
            let n = n.as_f64()?;
            if let Some(min) = rules.min {
                if n < min {
                    return Some(ValidationError::below_min(field, min));
                }
            }
            if let Some(max) = rules.max {
                if n > max {
                    return Some(ValidationError::above_max(field, max));
                }
            }
        }
        (ColumnType::String, Value::String(s)) => {
            if let Some(pattern) = rules.regex.as_deref() {
                // Patterns are checked when the column is created; one that no longer
                // compiles cannot match anything.
                let matched = rule_pattern(pattern).is_some_and(|re| re.is_match(s));
                if !matched {
                    return Some(ValidationError::pattern_mismatch(field, pattern));
                }
            }
        }
        _ => {}
    }

    None
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(field: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::type_mismatch(field, expected, json_type_name(actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationErrorCode;
    use crate::schema::types::{demo_table, ColumnRules};
    use serde_json::json;

    fn values(v: Value) -> RowValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_missing() {
        let col = Column::new("name", "Name", ColumnType::String, true);

        let err = validate_cell(&col, None).unwrap();
        assert_eq!(err.code, ValidationErrorCode::Required);
        assert_eq!(err.field, "name");

        let err = validate_cell(&col, Some(&Value::Null)).unwrap();
        assert_eq!(err.code, ValidationErrorCode::Required);
    }

    #[test]
    fn test_optional_missing_passes_for_every_type() {
        for t in ColumnType::ALL {
            let col = Column::new("x", "X", t, false);
            assert!(validate_cell(&col, None).is_none());
            assert!(validate_cell(&col, Some(&Value::Null)).is_none());
        }
    }

    #[test]
    fn test_number_rejects_string() {
        let col = Column::new("price", "Price", ColumnType::Number, true);
        let err = validate_cell(&col, Some(&json!("100"))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
        assert_eq!(err.field, "price");
        assert_eq!(err.expected_type.as_deref(), Some("number"));
        assert_eq!(err.actual_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_enum_membership() {
        let col = Column::enumeration("status", "Status", true, ["NEW", "PAID"]);

        let err = validate_cell(&col, Some(&json!("CANCELLED"))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::Enum);
        assert_eq!(err.allowed, Some(vec!["NEW".to_string(), "PAID".to_string()]));

        assert!(validate_cell(&col, Some(&json!("PAID"))).is_none());

        let err = validate_cell(&col, Some(&json!(1))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
    }

    #[test]
    fn test_timestamp_formats() {
        let col = Column::new("createdAt", "Created", ColumnType::Timestamp, true);

        for ok in [
            "2024-01-01T00:00:00Z",
            "2026-01-21T10:20:30.123Z",
            "2026-01-21T10:20:30+02:00",
            "2026-01-21T10:20:30.123456789-05:30",
        ] {
            assert!(validate_cell(&col, Some(&json!(ok))).is_none(), "{ok}");
        }

        for bad in [
            "2024-01-01",
            "2024-01-01T00:00:00",
            "2024-01-01 00:00:00Z",
            "2024-01-01T00:00:00.1234567890Z",
            "2024-01-01T00:00:00+0200",
        ] {
            let err = validate_cell(&col, Some(&json!(bad))).unwrap();
            assert_eq!(err.code, ValidationErrorCode::TimestampIso8601, "{bad}");
        }

        let err = validate_cell(&col, Some(&json!(1700000000))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
    }

    #[test]
    fn test_object_and_array_are_distinct() {
        let obj = Column::new("meta", "Meta", ColumnType::Object, false);
        let arr = Column::new("tags", "Tags", ColumnType::Array, false);

        assert!(validate_cell(&obj, Some(&json!({"a": 1}))).is_none());
        assert_eq!(
            validate_cell(&obj, Some(&json!([1]))).unwrap().actual_type.as_deref(),
            Some("array")
        );
        assert!(validate_cell(&arr, Some(&json!(["a"]))).is_none());
        assert_eq!(
            validate_cell(&arr, Some(&json!({}))).unwrap().code,
            ValidationErrorCode::TypeMismatch
        );
    }

    #[test]
    fn test_min_boundary() {
        let col = Column::new("price", "Price", ColumnType::Number, true)
            .with_rules(ColumnRules::min(0.0));

        let err = validate_cell(&col, Some(&json!(-1))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::RuleMin);
        assert_eq!(err.min, Some(0.0));
        assert!(validate_cell(&col, Some(&json!(0))).is_none());
    }

    #[test]
    fn test_min_reported_before_max() {
        // An inverted range can fail both bounds; min wins.
        let rules = ColumnRules {
            min: Some(10.0),
            max: Some(5.0),
            regex: None,
        };
        let col = Column::new("n", "N", ColumnType::Number, true).with_rules(rules);
        let err = validate_cell(&col, Some(&json!(7))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::RuleMin);
    }

    #[test]
    fn test_max_rule() {
        let rules = ColumnRules {
            max: Some(100.0),
            ..Default::default()
        };
        let col = Column::new("n", "N", ColumnType::Number, true).with_rules(rules);
        assert_eq!(
            validate_cell(&col, Some(&json!(100.5))).unwrap().code,
            ValidationErrorCode::RuleMax
        );
        assert!(validate_cell(&col, Some(&json!(100))).is_none());
    }

    #[test]
    fn test_regex_is_a_search() {
        let col = Column::new("code", "Code", ColumnType::String, true)
            .with_rules(ColumnRules::regex("[0-9]{3}"));

        assert!(validate_cell(&col, Some(&json!("abc123def"))).is_none());
        let err = validate_cell(&col, Some(&json!("abc"))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::RuleRegex);
        assert_eq!(err.regex.as_deref(), Some("[0-9]{3}"));
    }

    #[test]
    fn test_rule_pattern_cache() {
        let first = rule_pattern("^[A-Z]-[0-9]+$").unwrap();
        let second = rule_pattern("^[A-Z]-[0-9]+$").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert!(second.is_match("B-12"));

        // Uncompilable patterns are cached as misses and never match
        assert!(rule_pattern("([a-z").is_none());
        assert!(rule_pattern("([a-z").is_none());
        let col = Column::new("s", "S", ColumnType::String, true)
            .with_rules(ColumnRules::regex("([a-z"));
        let err = validate_cell(&col, Some(&json!("abc"))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::RuleRegex);
    }

    #[test]
    fn test_rules_ignored_for_other_types() {
        let col = Column::new("tags", "Tags", ColumnType::Array, false)
            .with_rules(ColumnRules::min(5.0));
        assert!(validate_cell(&col, Some(&json!([]))).is_none());
    }

    #[test]
    fn test_row_valid() {
        let table = demo_table();
        let row = values(json!({
            "name": "Book",
            "price": 10,
            "status": "NEW",
            "createdAt": "2024-01-01T00:00:00Z"
        }));
        assert!(validate_row(&table.columns, &row).is_ok());
    }

    #[test]
    fn test_row_reports_every_error() {
        let table = demo_table();
        let row = values(json!({"price": 5, "color": "red"}));

        let errors = validate_row(&table.columns, &row).unwrap_err();
        let codes: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            codes,
            vec![
                ("name", ValidationErrorCode::Required),
                ("status", ValidationErrorCode::Required),
                ("createdAt", ValidationErrorCode::Required),
                ("color", ValidationErrorCode::UnknownField),
            ]
        );
    }

    #[test]
    fn test_row_one_error_per_cell() {
        let table = demo_table();
        let row = values(json!({
            "name": 1,
            "price": -3,
            "status": "GONE",
            "createdAt": "yesterday",
            "meta": [],
            "tags": "a"
        }));

        let errors = validate_row(&table.columns, &row).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors[1].code, ValidationErrorCode::RuleMin);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("s")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
