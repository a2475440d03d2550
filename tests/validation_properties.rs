//! Validation Property Tests
//!
//! Cell and row validation behavior across every column type:
//! - Absent values fail only on required columns
//! - Types match exactly, no coercion
//! - Rules run after the type check, min before max before regex
//! - Row validation reports every problem

use schemagrid::schema::{
    demo_table, validate_cell, validate_row, Column, ColumnRules, ColumnType, RowValues,
    ValidationErrorCode,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_value(column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::String => json!("text"),
        ColumnType::Number => json!(42),
        ColumnType::Enum => json!("A"),
        ColumnType::Timestamp => json!("2024-05-01T12:30:00Z"),
        ColumnType::Object => json!({"k": 1}),
        ColumnType::Array => json!([1, 2]),
    }
}

fn column_of(column_type: ColumnType, required: bool) -> Column {
    match column_type {
        ColumnType::Enum => Column::enumeration("c", "C", required, ["A", "B"]),
        other => Column::new("c", "C", other, required),
    }
}

fn values(v: Value) -> RowValues {
    v.as_object().cloned().unwrap()
}

// =============================================================================
// Presence Tests
// =============================================================================

/// Absent or null on a required column is always REQUIRED.
#[test]
fn test_required_absent_for_every_type() {
    for column_type in ColumnType::ALL {
        let column = column_of(column_type, true);

        for value in [None, Some(&Value::Null)] {
            let err = validate_cell(&column, value).unwrap();
            assert_eq!(err.code, ValidationErrorCode::Required, "{:?}", column_type);
            assert_eq!(err.field, "c");
        }
    }
}

/// Absent or null on an optional column is never an error.
#[test]
fn test_optional_absent_for_every_type() {
    for column_type in ColumnType::ALL {
        let column = column_of(column_type, false);
        assert!(validate_cell(&column, None).is_none());
        assert!(validate_cell(&column, Some(&Value::Null)).is_none());
    }
}

/// A well-formed value of the declared type passes.
#[test]
fn test_sample_values_pass() {
    for column_type in ColumnType::ALL {
        let column = column_of(column_type, true);
        assert!(
            validate_cell(&column, Some(&sample_value(column_type))).is_none(),
            "{:?}",
            column_type
        );
    }
}

// =============================================================================
// Type Tests
// =============================================================================

/// Values of every other JSON kind are TYPE_MISMATCH.
#[test]
fn test_cross_type_values_mismatch() {
    let column = Column::new("c", "C", ColumnType::Number, true);
    for value in [json!("42"), json!(true), json!([42]), json!({"n": 42})] {
        let err = validate_cell(&column, Some(&value)).unwrap();
        assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
        assert_eq!(err.expected_type.as_deref(), Some("number"));
    }

    let column = Column::new("c", "C", ColumnType::Object, true);
    let err = validate_cell(&column, Some(&json!([]))).unwrap();
    assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
    assert_eq!(err.actual_type.as_deref(), Some("array"));
}

/// ENUM carries exactly the declared value list.
#[test]
fn test_enum_reports_allowed_values() {
    let column = Column::enumeration("status", "Status", true, ["NEW", "PAID"]);

    let err = validate_cell(&column, Some(&json!("SHIPPED"))).unwrap();
    assert_eq!(err.code, ValidationErrorCode::Enum);
    assert_eq!(
        err.allowed,
        Some(vec!["NEW".to_string(), "PAID".to_string()])
    );

    // Case-sensitive
    assert!(validate_cell(&column, Some(&json!("new"))).is_some());
}

/// Timestamps need a date, a time and a timezone.
#[test]
fn test_timestamp_shapes() {
    let column = Column::new("t", "T", ColumnType::Timestamp, true);

    for ok in [
        "2024-01-01T00:00:00Z",
        "2024-01-01T00:00:00.5+02:00",
        "2024-01-01T00:00:00.123456789-05:30",
    ] {
        assert!(validate_cell(&column, Some(&json!(ok))).is_none(), "{}", ok);
    }

    for bad in [
        "2024-01-01",
        "2024-01-01T00:00:00",
        "2024-01-01 00:00:00Z",
        "2024-01-01T00:00:00.1234567890Z",
        "yesterday",
    ] {
        let err = validate_cell(&column, Some(&json!(bad))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::TimestampIso8601, "{}", bad);
    }
}

// =============================================================================
// Rule Tests
// =============================================================================

/// RULE_MIN fires at m - 1 and not at m.
#[test]
fn test_min_boundary() {
    for m in [-10.0, 0.0, 3.5, 1000.0] {
        let column =
            Column::new("n", "N", ColumnType::Number, true).with_rules(ColumnRules::min(m));

        assert!(validate_cell(&column, Some(&json!(m))).is_none());
        let err = validate_cell(&column, Some(&json!(m - 1.0))).unwrap();
        assert_eq!(err.code, ValidationErrorCode::RuleMin);
        assert_eq!(err.min, Some(m));
    }
}

/// When both bounds fail the check order decides which is reported.
#[test]
fn test_min_reported_before_max() {
    let column = Column::new("n", "N", ColumnType::Number, true).with_rules(ColumnRules {
        min: Some(10.0),
        max: Some(5.0),
        regex: None,
    });

    let err = validate_cell(&column, Some(&json!(7))).unwrap();
    assert_eq!(err.code, ValidationErrorCode::RuleMin);
}

/// Regex is a search, not a full match.
#[test]
fn test_regex_is_unanchored() {
    let column = Column::new("s", "S", ColumnType::String, true)
        .with_rules(ColumnRules::regex("[0-9]{3}"));

    assert!(validate_cell(&column, Some(&json!("abc123def"))).is_none());
    let err = validate_cell(&column, Some(&json!("abc"))).unwrap();
    assert_eq!(err.code, ValidationErrorCode::RuleRegex);
    assert_eq!(err.regex.as_deref(), Some("[0-9]{3}"));
}

/// Rules never run when the type is wrong.
#[test]
fn test_type_checked_before_rules() {
    let column =
        Column::new("n", "N", ColumnType::Number, true).with_rules(ColumnRules::min(0.0));
    let err = validate_cell(&column, Some(&json!("-5"))).unwrap();
    assert_eq!(err.code, ValidationErrorCode::TypeMismatch);
}

// =============================================================================
// Row Tests
// =============================================================================

/// Every failing column and every unknown key is reported.
#[test]
fn test_row_collects_all_errors() {
    let table = demo_table();
    let row = values(json!({
        "price": -1,
        "status": "LOST",
        "createdAt": "today",
        "color": "red"
    }));

    let errors = validate_row(&table.columns, &row).unwrap_err();
    let codes: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.code)).collect();

    assert_eq!(
        codes,
        vec![
            ("name", ValidationErrorCode::Required),
            ("price", ValidationErrorCode::RuleMin),
            ("status", ValidationErrorCode::Enum),
            ("createdAt", ValidationErrorCode::TimestampIso8601),
            ("color", ValidationErrorCode::UnknownField),
        ]
    );
}

/// A complete demo row passes, with or without optional columns.
#[test]
fn test_demo_row_passes() {
    let table = demo_table();
    let minimal = values(json!({
        "name": "Book",
        "price": 0,
        "status": "PAID",
        "createdAt": "2024-01-01T00:00:00Z"
    }));
    assert!(validate_row(&table.columns, &minimal).is_ok());

    let mut full = minimal.clone();
    full.insert("meta".into(), json!({"sku": "B-1"}));
    full.insert("tags".into(), json!(["paper"]));
    assert!(validate_row(&table.columns, &full).is_ok());
}

/// Validation is deterministic.
#[test]
fn test_validation_is_deterministic() {
    let table = demo_table();
    let row = values(json!({"price": "x"}));

    let first = validate_row(&table.columns, &row).unwrap_err();
    for _ in 0..50 {
        assert_eq!(validate_row(&table.columns, &row).unwrap_err(), first);
    }
}
