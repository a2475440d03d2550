//! Table use cases
//!
//! Each method delegates to one store call and translates its outcome. Writes that carry
//! values use the store's checked variants, so the columns they are validated against are
//! the columns present when the write lands.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{ServiceError, ServiceResult};
use crate::schema::{parse_column, Column, Row, RowValues};
use crate::store::{
    AddColumnOutcome, AddRowOutcome, DeleteColumnOutcome, DeleteRowOutcome, GetRowOutcome,
    TableStore, UpdateCellOutcome,
};

/// Column listing for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumns {
    pub table_id: String,
    pub columns: Vec<Column>,
}

/// Orchestrates validators and the table store
#[derive(Clone)]
pub struct TableService {
    store: Arc<dyn TableStore>,
}

impl TableService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub fn list_columns(&self, table_id: &str) -> ServiceResult<TableColumns> {
        let columns = self
            .store
            .list_columns(table_id)?
            .ok_or_else(|| ServiceError::TableNotFound(table_id.to_string()))?;

        Ok(TableColumns {
            table_id: table_id.to_string(),
            columns,
        })
    }

    /// Add an already-parsed column
    pub fn add_column(&self, table_id: &str, column: Column) -> ServiceResult<Column> {
        match self.store.add_column(table_id, column.clone())? {
            AddColumnOutcome::Added => Ok(column),
            AddColumnOutcome::TableNotFound => {
                Err(ServiceError::TableNotFound(table_id.to_string()))
            }
            AddColumnOutcome::ColumnExists => Err(ServiceError::ColumnExists(column.key)),
        }
    }

    /// Parse a raw column definition, then add it
    pub fn add_column_payload(&self, table_id: &str, payload: &Value) -> ServiceResult<Column> {
        let column = parse_column(payload)?;
        self.add_column(table_id, column)
    }

    /// Remove a column and every row value stored under its key
    pub fn delete_column(&self, table_id: &str, key: &str) -> ServiceResult<()> {
        match self.store.delete_column(table_id, key)? {
            DeleteColumnOutcome::Deleted => Ok(()),
            DeleteColumnOutcome::TableNotFound => {
                Err(ServiceError::TableNotFound(table_id.to_string()))
            }
            DeleteColumnOutcome::ColumnNotFound => {
                Err(ServiceError::ColumnNotFound(key.to_string()))
            }
        }
    }

    /// Rows flattened to `{id, ...values}`
    pub fn list_rows(&self, table_id: &str) -> ServiceResult<Vec<Map<String, Value>>> {
        let rows = self
            .store
            .list_rows(table_id)?
            .ok_or_else(|| ServiceError::TableNotFound(table_id.to_string()))?;

        Ok(rows.iter().map(Row::flatten).collect())
    }

    /// Look up one row. Adapters use it to reject unknown rows before reading a body.
    pub fn get_row(&self, table_id: &str, row_id: &str) -> ServiceResult<Row> {
        match self.store.get_row(table_id, row_id)? {
            GetRowOutcome::Found(row) => Ok(row),
            GetRowOutcome::TableNotFound => Err(ServiceError::TableNotFound(table_id.to_string())),
            GetRowOutcome::RowNotFound => Err(ServiceError::RowNotFound(row_id.to_string())),
        }
    }

    pub fn add_row(&self, table_id: &str, values: RowValues) -> ServiceResult<Row> {
        match self.store.add_row_checked(table_id, values)? {
            AddRowOutcome::Added(row) => Ok(row),
            AddRowOutcome::TableNotFound => Err(ServiceError::TableNotFound(table_id.to_string())),
            AddRowOutcome::Invalid(errors) => Err(ServiceError::Validation(errors)),
        }
    }

    /// Overwrite one cell. Null on a required column is rejected like any other invalid value.
    pub fn update_cell(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> ServiceResult<Row> {
        match self.store.update_cell_checked(table_id, row_id, key, value)? {
            UpdateCellOutcome::Updated(row) => Ok(row),
            UpdateCellOutcome::TableNotFound => {
                Err(ServiceError::TableNotFound(table_id.to_string()))
            }
            UpdateCellOutcome::RowNotFound => Err(ServiceError::RowNotFound(row_id.to_string())),
            UpdateCellOutcome::ColumnNotFound => {
                Err(ServiceError::ColumnNotFound(key.to_string()))
            }
            UpdateCellOutcome::Invalid(err) => Err(ServiceError::Validation(vec![err])),
        }
    }

    pub fn delete_row(&self, table_id: &str, row_id: &str) -> ServiceResult<()> {
        match self.store.delete_row(table_id, row_id)? {
            DeleteRowOutcome::Deleted => Ok(()),
            DeleteRowOutcome::TableNotFound => {
                Err(ServiceError::TableNotFound(table_id.to_string()))
            }
            DeleteRowOutcome::RowNotFound => Err(ServiceError::RowNotFound(row_id.to_string())),
        }
    }

    /// Drop all data and re-seed the demo table
    pub fn reset(&self) -> ServiceResult<()> {
        Ok(self.store.reset()?)
    }
}
