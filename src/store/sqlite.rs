//! SQLite-backed table store
//!
//! Layout:
//! - `tables(id, name)`
//! - `columns(id, table_id, key, title, type, required, enum_values, rules)`,
//!   unique on `(table_id, key)`, ordered by `id`
//! - `rows(id, table_id, values_json)`, ordered by `rowid`
//!
//! `enum_values`, `rules` and `values_json` hold JSON text. Every operation runs in a single
//! transaction on one mutex-guarded connection; writes use `BEGIN IMMEDIATE`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::backend::{
    AddColumnOutcome, AddRowOutcome, DeleteColumnOutcome, DeleteRowOutcome, GetRowOutcome,
    TableStore, UpdateCellOutcome,
};
use super::errors::{StoreError, StoreResult};
use crate::schema::{
    demo_table, validate_cell, validate_row, Column, ColumnType, Row, RowValues, Table,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tables (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS columns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id TEXT NOT NULL,
    key TEXT NOT NULL,
    title TEXT NOT NULL,
    type TEXT NOT NULL,
    required INTEGER NOT NULL,
    enum_values TEXT,
    rules TEXT,
    UNIQUE(table_id, key),
    FOREIGN KEY(table_id) REFERENCES tables(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS rows (
    id TEXT PRIMARY KEY,
    table_id TEXT NOT NULL,
    values_json TEXT NOT NULL,
    FOREIGN KEY(table_id) REFERENCES tables(id) ON DELETE CASCADE
);
";

/// Durable store over a single SQLite connection
#[derive(Debug)]
pub struct SqliteTableStore {
    conn: Mutex<Connection>,
}

impl SqliteTableStore {
    /// Open (or create) a database file, creating parent directories as needed.
    ///
    /// An empty database is seeded with the demo table.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| StoreError::Open(format!("{}: {}", dir.display(), e)))?;
        }
        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        debug!(path = %path.display(), "sqlite table store opened");
        Ok(store)
    }

    /// Create a seeded in-memory database (for tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self::init(Connection::open_in_memory()?)?;
        debug!("in-memory sqlite table store opened");
        Ok(store)
    }

    fn init(mut conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM tables", [], |r| r.get(0))?;
        if count == 0 {
            seed(&tx)?;
        }
        tx.commit()?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl TableStore for SqliteTableStore {
    fn get_table(&self, table_id: &str) -> StoreResult<Option<Table>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let name: Option<String> = tx
            .query_row(
                "SELECT name FROM tables WHERE id = ?1",
                params![table_id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(name) = name else {
            return Ok(None);
        };

        let table = Table {
            id: table_id.to_string(),
            name,
            columns: load_columns(&tx, table_id)?,
            rows: load_rows(&tx, table_id)?,
        };
        tx.commit()?;
        Ok(Some(table))
    }

    fn list_columns(&self, table_id: &str) -> StoreResult<Option<Vec<Column>>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if !table_exists(&tx, table_id)? {
            return Ok(None);
        }
        let columns = load_columns(&tx, table_id)?;
        tx.commit()?;
        Ok(Some(columns))
    }

    fn list_rows(&self, table_id: &str) -> StoreResult<Option<Vec<Row>>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if !table_exists(&tx, table_id)? {
            return Ok(None);
        }
        let rows = load_rows(&tx, table_id)?;
        tx.commit()?;
        Ok(Some(rows))
    }

    fn get_row(&self, table_id: &str, row_id: &str) -> StoreResult<GetRowOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if !table_exists(&tx, table_id)? {
            return Ok(GetRowOutcome::TableNotFound);
        }
        let values = load_row_values(&tx, table_id, row_id)?;
        tx.commit()?;

        Ok(match values {
            Some(values) => GetRowOutcome::Found(Row {
                id: row_id.to_string(),
                table_id: table_id.to_string(),
                values,
            }),
            None => GetRowOutcome::RowNotFound,
        })
    }

    fn add_row(&self, table_id: &str, values: RowValues) -> StoreResult<Option<Row>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(None);
        }

        let row = insert_row(&tx, table_id, values)?;
        tx.commit()?;
        Ok(Some(row))
    }

    fn add_row_checked(&self, table_id: &str, values: RowValues) -> StoreResult<AddRowOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(AddRowOutcome::TableNotFound);
        }
        if let Err(errors) = validate_row(&load_columns(&tx, table_id)?, &values) {
            return Ok(AddRowOutcome::Invalid(errors));
        }

        let row = insert_row(&tx, table_id, values)?;
        tx.commit()?;
        Ok(AddRowOutcome::Added(row))
    }

    fn update_cell(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(UpdateCellOutcome::TableNotFound);
        }
        let Some(values) = load_row_values(&tx, table_id, row_id)? else {
            return Ok(UpdateCellOutcome::RowNotFound);
        };

        let row = store_cell(&tx, table_id, row_id, values, key, value)?;
        tx.commit()?;
        Ok(UpdateCellOutcome::Updated(row))
    }

    fn update_cell_checked(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(UpdateCellOutcome::TableNotFound);
        }
        let Some(values) = load_row_values(&tx, table_id, row_id)? else {
            return Ok(UpdateCellOutcome::RowNotFound);
        };
        let Some(column) = load_column(&tx, table_id, key)? else {
            return Ok(UpdateCellOutcome::ColumnNotFound);
        };
        if let Some(err) = validate_cell(&column, Some(&value)) {
            return Ok(UpdateCellOutcome::Invalid(err));
        }

        let row = store_cell(&tx, table_id, row_id, values, key, value)?;
        tx.commit()?;
        Ok(UpdateCellOutcome::Updated(row))
    }

    fn delete_row(&self, table_id: &str, row_id: &str) -> StoreResult<DeleteRowOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(DeleteRowOutcome::TableNotFound);
        }

        let removed = tx.execute(
            "DELETE FROM rows WHERE id = ?1 AND table_id = ?2",
            params![row_id, table_id],
        )?;
        tx.commit()?;

        if removed == 0 {
            Ok(DeleteRowOutcome::RowNotFound)
        } else {
            Ok(DeleteRowOutcome::Deleted)
        }
    }

    fn add_column(&self, table_id: &str, column: Column) -> StoreResult<AddColumnOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(AddColumnOutcome::TableNotFound);
        }

        let exists = tx
            .query_row(
                "SELECT 1 FROM columns WHERE table_id = ?1 AND key = ?2",
                params![table_id, column.key],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(AddColumnOutcome::ColumnExists);
        }

        insert_column(&tx, table_id, &column)?;
        tx.commit()?;
        Ok(AddColumnOutcome::Added)
    }

    fn delete_column(&self, table_id: &str, key: &str) -> StoreResult<DeleteColumnOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !table_exists(&tx, table_id)? {
            return Ok(DeleteColumnOutcome::TableNotFound);
        }

        let removed = tx.execute(
            "DELETE FROM columns WHERE table_id = ?1 AND key = ?2",
            params![table_id, key],
        )?;
        if removed == 0 {
            return Ok(DeleteColumnOutcome::ColumnNotFound);
        }

        // Strip the key inside the same transaction so no reader sees the column gone
        // from the schema but still present on a row.
        for mut row in load_rows(&tx, table_id)? {
            if row.values.shift_remove(key).is_some() {
                tx.execute(
                    "UPDATE rows SET values_json = ?1 WHERE id = ?2",
                    params![serde_json::to_string(&row.values)?, row.id],
                )?;
            }
        }
        tx.commit()?;
        Ok(DeleteColumnOutcome::Deleted)
    }

    fn reset(&self) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch("DELETE FROM rows; DELETE FROM columns; DELETE FROM tables;")?;
        seed(&tx)?;
        tx.commit()?;
        Ok(())
    }
}

fn seed(conn: &Connection) -> StoreResult<()> {
    let table = demo_table();
    conn.execute(
        "INSERT INTO tables (id, name) VALUES (?1, ?2)",
        params![table.id, table.name],
    )?;
    for column in &table.columns {
        insert_column(conn, &table.id, column)?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table_id: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM tables WHERE id = ?1",
            params![table_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn insert_column(conn: &Connection, table_id: &str, column: &Column) -> StoreResult<()> {
    let enum_values = column
        .enum_values
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let rules = column.rules.as_ref().map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO columns (table_id, key, title, type, required, enum_values, rules)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            table_id,
            column.key,
            column.title,
            column.column_type.type_name(),
            column.required,
            enum_values,
            rules
        ],
    )?;
    Ok(())
}

fn insert_row(conn: &Connection, table_id: &str, values: RowValues) -> StoreResult<Row> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO rows (id, table_id, values_json) VALUES (?1, ?2, ?3)",
        params![id, table_id, serde_json::to_string(&values)?],
    )?;
    Ok(Row {
        id,
        table_id: table_id.to_string(),
        values,
    })
}

/// Write one key into already-loaded row values
fn store_cell(
    conn: &Connection,
    table_id: &str,
    row_id: &str,
    mut values: RowValues,
    key: &str,
    value: Value,
) -> StoreResult<Row> {
    values.insert(key.to_string(), value);
    conn.execute(
        "UPDATE rows SET values_json = ?1 WHERE id = ?2",
        params![serde_json::to_string(&values)?, row_id],
    )?;
    Ok(Row {
        id: row_id.to_string(),
        table_id: table_id.to_string(),
        values,
    })
}

fn load_row_values(
    conn: &Connection,
    table_id: &str,
    row_id: &str,
) -> StoreResult<Option<RowValues>> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT values_json FROM rows WHERE table_id = ?1 AND id = ?2",
            params![table_id, row_id],
            |r| r.get(0),
        )
        .optional()?;
    stored.as_deref().map(parse_values).transpose()
}

/// Raw `columns` record before JSON members are decoded
struct ColumnRecord {
    key: String,
    title: String,
    column_type: String,
    required: bool,
    enum_values: Option<String>,
    rules: Option<String>,
}

impl ColumnRecord {
    fn into_column(self) -> StoreResult<Column> {
        let column_type = ColumnType::from_name(&self.column_type).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "column '{}' has unknown type '{}'",
                self.key, self.column_type
            ))
        })?;

        Ok(Column {
            key: self.key,
            title: self.title,
            column_type,
            required: self.required,
            enum_values: self.enum_values.as_deref().map(serde_json::from_str).transpose()?,
            rules: self.rules.as_deref().map(serde_json::from_str).transpose()?,
        })
    }
}

const COLUMN_FIELDS: &str = "key, title, type, required, enum_values, rules";

fn column_record(r: &rusqlite::Row<'_>) -> rusqlite::Result<ColumnRecord> {
    Ok(ColumnRecord {
        key: r.get(0)?,
        title: r.get(1)?,
        column_type: r.get(2)?,
        required: r.get(3)?,
        enum_values: r.get(4)?,
        rules: r.get(5)?,
    })
}

fn load_columns(conn: &Connection, table_id: &str) -> StoreResult<Vec<Column>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM columns WHERE table_id = ?1 ORDER BY id",
        COLUMN_FIELDS
    ))?;
    let records = stmt
        .query_map(params![table_id], column_record)?
        .collect::<Result<Vec<_>, _>>()?;

    records.into_iter().map(ColumnRecord::into_column).collect()
}

fn load_column(conn: &Connection, table_id: &str, key: &str) -> StoreResult<Option<Column>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {} FROM columns WHERE table_id = ?1 AND key = ?2",
                COLUMN_FIELDS
            ),
            params![table_id, key],
            column_record,
        )
        .optional()?;
    record.map(ColumnRecord::into_column).transpose()
}

fn load_rows(conn: &Connection, table_id: &str) -> StoreResult<Vec<Row>> {
    let mut stmt = conn.prepare(
        "SELECT id, values_json FROM rows WHERE table_id = ?1 ORDER BY rowid",
    )?;
    let records = stmt
        .query_map(params![table_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    records
        .into_iter()
        .map(|(id, json)| {
            Ok(Row {
                id,
                table_id: table_id.to_string(),
                values: parse_values(&json)?,
            })
        })
        .collect()
}

fn parse_values(json: &str) -> StoreResult<RowValues> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(values) => Ok(values),
        other => Err(StoreError::Corrupt(format!(
            "row values must be an object, found {}",
            crate::schema::json_type_name(&other)
        ))),
    }
}
