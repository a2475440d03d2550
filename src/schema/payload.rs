//! Column definition payload parsing
//!
//! Turns an untyped JSON body into a typed [`Column`]. Checks run in a fixed order and
//! the first failure is returned. Unrecognised top-level members are ignored; unrecognised
//! members inside `rules` are rejected.

use regex::Regex;
use serde_json::{Map, Value};

use super::errors::PayloadError;
use super::types::{Column, ColumnRules, ColumnType};

/// Column key reserved for the row id in flattened row listings
pub const RESERVED_KEY: &str = "id";

/// Parses and validates a column definition payload.
///
/// # Errors
///
/// Returns `PayloadError` if the body is not an object, a member has the wrong type,
/// an enum column has no values, or the rules do not fit the column type.
pub fn parse_column(body: &Value) -> Result<Column, PayloadError> {
    let obj = body
        .as_object()
        .ok_or_else(|| PayloadError::new("Request body must be a JSON object"))?;

    let key = non_empty_string(obj, "key")?;
    if key == RESERVED_KEY {
        return Err(PayloadError::new(format!(
            "\"key\" must not be \"{}\" (reserved for the row id)",
            RESERVED_KEY
        )));
    }
    let title = non_empty_string(obj, "title")?;

    let column_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(ColumnType::from_name)
        .ok_or_else(|| {
            let names: Vec<_> = ColumnType::ALL.iter().map(|t| t.type_name()).collect();
            PayloadError::new(format!("\"type\" must be one of: {}", names.join(", ")))
        })?;

    let required = obj
        .get("required")
        .and_then(Value::as_bool)
        .ok_or_else(|| PayloadError::new("\"required\" must be boolean"))?;

    // enumValues on non-enum columns are dropped
    let enum_values = if column_type == ColumnType::Enum {
        Some(parse_enum_values(obj.get("enumValues"))?)
    } else {
        None
    };

    let rules = match obj.get("rules") {
        None => None,
        Some(raw) => Some(parse_rules(raw, column_type)?),
    };

    Ok(Column {
        key,
        title,
        column_type,
        required,
        enum_values,
        rules,
    })
}

fn non_empty_string(obj: &Map<String, Value>, name: &str) -> Result<String, PayloadError> {
    match obj.get(name).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(PayloadError::new(format!("\"{}\" must be a non-empty string", name))),
    }
}

fn parse_enum_values(raw: Option<&Value>) -> Result<Vec<String>, PayloadError> {
    let invalid = || PayloadError::new("\"enumValues\" must be string[] for enum columns");

    let items = raw.and_then(Value::as_array).ok_or_else(invalid)?;
    let values = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;

    if values.is_empty() {
        return Err(PayloadError::new("\"enumValues\" must not be empty"));
    }
    Ok(values)
}

fn parse_rules(raw: &Value, column_type: ColumnType) -> Result<ColumnRules, PayloadError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| PayloadError::new("\"rules\" must be an object"))?;

    if obj.keys().any(|k| !matches!(k.as_str(), "min" | "max" | "regex")) {
        return Err(PayloadError::new("\"rules\" contains unsupported fields"));
    }

    let min = optional_number(obj, "min")?;
    let max = optional_number(obj, "max")?;
    let regex = match obj.get("regex") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(PayloadError::new("\"rules.regex\" must be a string")),
    };

    if (min.is_some() || max.is_some()) && column_type != ColumnType::Number {
        return Err(PayloadError::new(
            "\"rules.min\" and \"rules.max\" apply only to number columns",
        ));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(PayloadError::new("\"rules.min\" must not exceed \"rules.max\""));
        }
    }
    if let Some(pattern) = regex.as_deref() {
        if column_type != ColumnType::String {
            return Err(PayloadError::new(
                "\"rules.regex\" applies only to string columns",
            ));
        }
        if let Err(e) = Regex::new(pattern) {
            return Err(PayloadError::new(format!(
                "\"rules.regex\" is not a valid pattern: {}",
                e
            )));
        }
    }

    Ok(ColumnRules { min, max, regex })
}

fn optional_number(obj: &Map<String, Value>, name: &str) -> Result<Option<f64>, PayloadError> {
    match obj.get(name) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| PayloadError::new(format!("\"rules.{}\" must be a number", name))),
    }
}
