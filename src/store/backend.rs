//! Table store contract
//!
//! Both backends implement [`TableStore`] and must be indistinguishable to callers.
//! `add_row` and `update_cell` write what they are given. The `_checked` variants validate
//! against the columns read inside the same atomic unit as the write.

use serde_json::Value;

use super::errors::StoreResult;
use crate::schema::{Column, Row, RowValues, Table, ValidationError};

/// Outcome of [`TableStore::get_row`]
#[derive(Debug, Clone, PartialEq)]
pub enum GetRowOutcome {
    Found(Row),
    TableNotFound,
    RowNotFound,
}

/// Outcome of [`TableStore::add_row_checked`]
#[derive(Debug, Clone, PartialEq)]
pub enum AddRowOutcome {
    Added(Row),
    TableNotFound,
    Invalid(Vec<ValidationError>),
}

/// Outcome of [`TableStore::update_cell`] and [`TableStore::update_cell_checked`]
///
/// `ColumnNotFound` and `Invalid` only come from the checked variant.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCellOutcome {
    Updated(Row),
    TableNotFound,
    RowNotFound,
    ColumnNotFound,
    Invalid(ValidationError),
}

/// Outcome of [`TableStore::delete_row`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRowOutcome {
    Deleted,
    TableNotFound,
    RowNotFound,
}

/// Outcome of [`TableStore::add_column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddColumnOutcome {
    Added,
    TableNotFound,
    ColumnExists,
}

/// Outcome of [`TableStore::delete_column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteColumnOutcome {
    Deleted,
    TableNotFound,
    ColumnNotFound,
}

/// Authoritative storage for tables, their columns and their rows.
///
/// Every method is one atomic unit: concurrent readers observe either none or all of
/// a mutation's effects.
pub trait TableStore: Send + Sync {
    /// Snapshot of a table with its columns and rows
    fn get_table(&self, table_id: &str) -> StoreResult<Option<Table>>;

    /// Columns of a table in display order
    fn list_columns(&self, table_id: &str) -> StoreResult<Option<Vec<Column>>> {
        Ok(self.get_table(table_id)?.map(|t| t.columns))
    }

    /// Rows of a table in insertion order
    fn list_rows(&self, table_id: &str) -> StoreResult<Option<Vec<Row>>> {
        Ok(self.get_table(table_id)?.map(|t| t.rows))
    }

    /// Point lookup of one row
    fn get_row(&self, table_id: &str, row_id: &str) -> StoreResult<GetRowOutcome>;

    /// Store a new row under a fresh id. Returns `None` if the table does not exist.
    fn add_row(&self, table_id: &str, values: RowValues) -> StoreResult<Option<Row>>;

    /// Row-validate `values` against the table's current columns, then store them
    fn add_row_checked(&self, table_id: &str, values: RowValues) -> StoreResult<AddRowOutcome>;

    /// Overwrite (or create) one key of a row's values
    fn update_cell(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome>;

    /// Checks table, row and column in that order, cell-validates, then writes
    fn update_cell_checked(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome>;

    fn delete_row(&self, table_id: &str, row_id: &str) -> StoreResult<DeleteRowOutcome>;

    /// Append a column; keys stay unique
    fn add_column(&self, table_id: &str, column: Column) -> StoreResult<AddColumnOutcome>;

    /// Remove a column and strip its key from every row of the table
    fn delete_column(&self, table_id: &str, key: &str) -> StoreResult<DeleteColumnOutcome>;

    /// Drop everything and re-seed the demo table
    fn reset(&self) -> StoreResult<()>;
}
