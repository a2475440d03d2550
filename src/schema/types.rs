//! Table model definitions
//!
//! Supported column types:
//! - string: UTF-8 string
//! - number: JSON number
//! - enum: string restricted to a declared value list
//! - timestamp: ISO-8601 string with mandatory timezone
//! - object: JSON object
//! - array: JSON array

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Enum,
    Timestamp,
    Object,
    Array,
}

impl ColumnType {
    /// Every supported type, in declaration order
    pub const ALL: [ColumnType; 6] = [
        ColumnType::String,
        ColumnType::Number,
        ColumnType::Enum,
        ColumnType::Timestamp,
        ColumnType::Object,
        ColumnType::Array,
    ];

    /// Returns the type name used on the wire and in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Enum => "enum",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Object => "object",
            ColumnType::Array => "array",
        }
    }

    /// Parses a wire type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_name() == name)
    }
}

/// Per-column value rules.
///
/// `min`/`max` apply to number columns, `regex` to string columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl ColumnRules {
    /// Rules with only a lower bound
    pub fn min(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Default::default()
        }
    }

    /// Rules with only a pattern
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.regex.is_none()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique key inside the table; also the key in row values
    pub key: String,
    /// Display label
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub required: bool,
    /// Allowed values, present only for enum columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<ColumnRules>,
}

impl Column {
    /// Create a column without enum values or rules
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        column_type: ColumnType,
        required: bool,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            column_type,
            required,
            enum_values: None,
            rules: None,
        }
    }

    /// Create an enum column
    pub fn enumeration<I, S>(
        key: impl Into<String>,
        title: impl Into<String>,
        required: bool,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::new(key, title, ColumnType::Enum, required)
        }
    }

    /// Attach rules to this column
    pub fn with_rules(mut self, rules: ColumnRules) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// Row values keyed by column key
pub type RowValues = Map<String, Value>;

/// A stored row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Store-generated identifier
    pub id: String,
    /// Owning table id (lookup only)
    pub table_id: String,
    pub values: RowValues,
}

impl Row {
    /// Flatten into `{id, ...values}`.
    ///
    /// Column keys cannot be `id`, so the row id is never shadowed.
    pub fn flatten(&self) -> Map<String, Value> {
        let mut record = Map::with_capacity(self.values.len() + 1);
        record.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.values {
            record.insert(key.clone(), value.clone());
        }
        record
    }
}

/// Table snapshot: schema plus rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
    /// Insertion order is display order
    pub columns: Vec<Column>,
    /// Insertion order
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(id: impl Into<String>, name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }
}

/// Id of the seeded demo table
pub const DEMO_TABLE_ID: &str = "demo";

/// The demo table every store starts with
pub fn demo_table() -> Table {
    Table::new(
        DEMO_TABLE_ID,
        "Demo table",
        vec![
            Column::new("name", "Name", ColumnType::String, true),
            Column::new("price", "Price", ColumnType::Number, true).with_rules(ColumnRules::min(0.0)),
            Column::enumeration("status", "Status", true, ["NEW", "PAID"]),
            Column::new("createdAt", "Created At", ColumnType::Timestamp, true),
            Column::new("meta", "Meta", ColumnType::Object, false),
            Column::new("tags", "Tags", ColumnType::Array, false),
        ],
    )
}
