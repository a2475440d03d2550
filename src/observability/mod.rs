//! Observability subsystem
//!
//! Provides:
//! - Structured logging via `tracing` (text or JSON lines)
//! - Lifecycle and mutation events
//! - Atomic counters exposed over HTTP
//!
//! # Usage
//!
//! ```ignore
//! log_event!(Event::RowAdded, table_id = %table_id, row_id = %row.id);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_rows_added();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{init_logging, LogFormat, DEFAULT_FILTER};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use thiserror::Error;

/// Observability error. Never fatal to request handling.
#[derive(Debug, Error)]
#[error("observability: {message}")]
pub struct ObservabilityError {
    message: String,
}

impl ObservabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

/// Log an [`Event`] with optional structured fields in `tracing` field syntax.
///
/// Failure events log at WARN, everything else at INFO.
macro_rules! log_event {
    ($event:expr $(, $($field:tt)+)?) => {{
        let event: $crate::observability::Event = $event;
        if event.is_failure() {
            ::tracing::warn!(event = event.as_str() $(, $($field)+)?);
        } else {
            ::tracing::info!(event = event.as_str() $(, $($field)+)?);
        }
    }};
}

pub(crate) use log_event;

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::{Arc, Mutex};

    /// Collects everything the subscriber writes
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_json(emit: impl FnOnce()) -> Vec<serde_json::Value> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_log_event_without_subscriber() {
        log_event!(Event::BootStart);
        log_event!(Event::ValidationFailed, errors = 2);
    }

    #[test]
    fn test_log_event_fields_are_structured() {
        let table_id = String::from("demo");
        let lines = capture_json(|| {
            log_event!(Event::RowAdded, table_id = %table_id, row_id = "r1");
            log_event!(Event::StorageFailed);
        });

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["fields"]["event"], "ROW_ADDED");
        assert_eq!(lines[0]["fields"]["table_id"], "demo");
        assert_eq!(lines[0]["fields"]["row_id"], "r1");
        assert_eq!(lines[1]["level"], "WARN");
    }

    #[test]
    fn test_error_display() {
        let err = ObservabilityError::new("boom");
        assert_eq!(err.to_string(), "observability: boom");
        assert_eq!(err.message(), "boom");
    }
}
