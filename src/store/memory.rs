//! In-process table store
//!
//! One `RwLock` guards the whole table map. Mutations hold the write lock for their full
//! duration, so a column delete and the row strip that follows it land together.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use super::backend::{
    AddColumnOutcome, AddRowOutcome, DeleteColumnOutcome, DeleteRowOutcome, GetRowOutcome,
    TableStore, UpdateCellOutcome,
};
use super::errors::{StoreError, StoreResult};
use crate::schema::{demo_table, validate_cell, validate_row, Column, Row, RowValues, Table};

/// Ephemeral store, seeded with the demo table
#[derive(Debug)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(seeded()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seeded() -> HashMap<String, Table> {
    let demo = demo_table();
    let mut tables = HashMap::new();
    tables.insert(demo.id.clone(), demo);
    tables
}

fn push_row(table: &mut Table, values: RowValues) -> Row {
    let row = Row {
        id: Uuid::new_v4().to_string(),
        table_id: table.id.clone(),
        values,
    };
    table.rows.push(row.clone());
    row
}

impl TableStore for MemoryTableStore {
    fn get_table(&self, table_id: &str) -> StoreResult<Option<Table>> {
        Ok(self.read()?.get(table_id).cloned())
    }

    fn list_columns(&self, table_id: &str) -> StoreResult<Option<Vec<Column>>> {
        Ok(self.read()?.get(table_id).map(|t| t.columns.clone()))
    }

    fn list_rows(&self, table_id: &str) -> StoreResult<Option<Vec<Row>>> {
        Ok(self.read()?.get(table_id).map(|t| t.rows.clone()))
    }

    fn get_row(&self, table_id: &str, row_id: &str) -> StoreResult<GetRowOutcome> {
        let tables = self.read()?;
        let Some(table) = tables.get(table_id) else {
            return Ok(GetRowOutcome::TableNotFound);
        };
        Ok(match table.row(row_id) {
            Some(row) => GetRowOutcome::Found(row.clone()),
            None => GetRowOutcome::RowNotFound,
        })
    }

    fn add_row(&self, table_id: &str, values: RowValues) -> StoreResult<Option<Row>> {
        let mut tables = self.write()?;
        Ok(tables.get_mut(table_id).map(|table| push_row(table, values)))
    }

    fn add_row_checked(&self, table_id: &str, values: RowValues) -> StoreResult<AddRowOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(AddRowOutcome::TableNotFound);
        };
        if let Err(errors) = validate_row(&table.columns, &values) {
            return Ok(AddRowOutcome::Invalid(errors));
        }

        Ok(AddRowOutcome::Added(push_row(table, values)))
    }

    fn update_cell(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(UpdateCellOutcome::TableNotFound);
        };
        let Some(row) = table.rows.iter_mut().find(|r| r.id == row_id) else {
            return Ok(UpdateCellOutcome::RowNotFound);
        };

        row.values.insert(key.to_string(), value);
        Ok(UpdateCellOutcome::Updated(row.clone()))
    }

    fn update_cell_checked(
        &self,
        table_id: &str,
        row_id: &str,
        key: &str,
        value: Value,
    ) -> StoreResult<UpdateCellOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(UpdateCellOutcome::TableNotFound);
        };
        let Table { columns, rows, .. } = table;
        let Some(row) = rows.iter_mut().find(|r| r.id == row_id) else {
            return Ok(UpdateCellOutcome::RowNotFound);
        };
        let Some(column) = columns.iter().find(|c| c.key == key) else {
            return Ok(UpdateCellOutcome::ColumnNotFound);
        };
        if let Some(err) = validate_cell(column, Some(&value)) {
            return Ok(UpdateCellOutcome::Invalid(err));
        }

        row.values.insert(key.to_string(), value);
        Ok(UpdateCellOutcome::Updated(row.clone()))
    }

    fn delete_row(&self, table_id: &str, row_id: &str) -> StoreResult<DeleteRowOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(DeleteRowOutcome::TableNotFound);
        };

        let before = table.rows.len();
        table.rows.retain(|r| r.id != row_id);
        if table.rows.len() == before {
            return Ok(DeleteRowOutcome::RowNotFound);
        }
        Ok(DeleteRowOutcome::Deleted)
    }

    fn add_column(&self, table_id: &str, column: Column) -> StoreResult<AddColumnOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(AddColumnOutcome::TableNotFound);
        };
        if table.column(&column.key).is_some() {
            return Ok(AddColumnOutcome::ColumnExists);
        }

        table.columns.push(column);
        Ok(AddColumnOutcome::Added)
    }

    fn delete_column(&self, table_id: &str, key: &str) -> StoreResult<DeleteColumnOutcome> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(table_id) else {
            return Ok(DeleteColumnOutcome::TableNotFound);
        };
        let Some(position) = table.columns.iter().position(|c| c.key == key) else {
            return Ok(DeleteColumnOutcome::ColumnNotFound);
        };

        table.columns.remove(position);
        for row in &mut table.rows {
            row.values.shift_remove(key);
        }
        Ok(DeleteColumnOutcome::Deleted)
    }

    fn reset(&self) -> StoreResult<()> {
        *self.write()? = seeded();
        Ok(())
    }
}
