//! Table storage
//!
//! One contract, two backends selected at startup:
//! - [`MemoryTableStore`]: process-local, lost on exit
//! - [`SqliteTableStore`]: durable, one transaction per operation
//!
//! Stores own referential integrity: unique column keys, and a deleted column's values are
//! stripped from every row. Checked writes validate inside the store's own lock or
//! transaction so a concurrent column delete cannot slip between validation and write.

mod backend;
mod errors;
mod memory;
mod sqlite;

pub use backend::{
    AddColumnOutcome, AddRowOutcome, DeleteColumnOutcome, DeleteRowOutcome, GetRowOutcome,
    TableStore, UpdateCellOutcome,
};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryTableStore;
pub use sqlite::SqliteTableStore;
