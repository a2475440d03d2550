//! Observable events for schemagrid
//!
//! Events are explicit and typed. Adapters log them; the core never does.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Table store opened
    StoreOpened,
    /// Listening for requests
    Serving,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Schema mutations
    /// Column appended to a table
    ColumnAdded,
    /// Column removed, values stripped
    ColumnDeleted,

    // Row mutations
    /// Row created
    RowAdded,
    /// Single cell overwritten
    CellUpdated,
    /// Row removed
    RowDeleted,

    // Rejections
    /// Write rejected by the validator
    ValidationFailed,
    /// Request rejected before reaching the service
    RequestRejected,
    /// Backend fault surfaced as an internal error
    StorageFailed,

    // Maintenance
    /// Store wiped and demo table re-seeded
    StoreReset,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "SCHEMAGRID_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::Serving => "SCHEMAGRID_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ColumnAdded => "COLUMN_ADDED",
            Event::ColumnDeleted => "COLUMN_DELETED",

            Event::RowAdded => "ROW_ADDED",
            Event::CellUpdated => "CELL_UPDATED",
            Event::RowDeleted => "ROW_DELETED",

            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::StorageFailed => "STORAGE_FAILED",

            Event::StoreReset => "STORE_RESET",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::ValidationFailed | Event::RequestRejected | Event::StorageFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::BootStart,
            Event::ConfigLoaded,
            Event::StoreOpened,
            Event::Serving,
            Event::ShutdownStart,
            Event::ShutdownComplete,
            Event::ColumnAdded,
            Event::ColumnDeleted,
            Event::RowAdded,
            Event::CellUpdated,
            Event::RowDeleted,
            Event::ValidationFailed,
            Event::RequestRejected,
            Event::StorageFailed,
            Event::StoreReset,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::ValidationFailed.is_failure());
        assert!(Event::StorageFailed.is_failure());
        assert!(!Event::RowAdded.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CellUpdated), "CELL_UPDATED");
    }
}
