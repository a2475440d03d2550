//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for table mutations and rejections
///
/// All counters use Relaxed atomic increments.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    rows_added: AtomicU64,
    rows_deleted: AtomicU64,
    cells_updated: AtomicU64,
    columns_added: AtomicU64,
    columns_deleted: AtomicU64,
    /// Writes rejected by the validator
    validation_failures: AtomicU64,
    /// Requests rejected for any other reason (bad JSON, not found, conflicts)
    requests_rejected: AtomicU64,
    /// Requests that failed inside the table store
    storage_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_rows_added(&self) {
        self.rows_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rows_deleted(&self) {
        self.rows_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cells_updated(&self) {
        self.cells_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_columns_added(&self) {
        self.columns_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_columns_deleted(&self) {
        self.columns_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_storage_failures(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_added: self.rows_added.load(Ordering::Relaxed),
            rows_deleted: self.rows_deleted.load(Ordering::Relaxed),
            cells_updated: self.cells_updated.load(Ordering::Relaxed),
            columns_added: self.columns_added.load(Ordering::Relaxed),
            columns_deleted: self.columns_deleted.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub rows_added: u64,
    pub rows_deleted: u64,
    pub cells_updated: u64,
    pub columns_added: u64,
    pub columns_deleted: u64,
    pub validation_failures: u64,
    pub requests_rejected: u64,
    pub storage_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();

        assert_eq!(snapshot.rows_added, 0);
        assert_eq!(snapshot.cells_updated, 0);
        assert_eq!(snapshot.validation_failures, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_rows_added();
        registry.increment_rows_added();
        registry.increment_rows_deleted();
        registry.increment_cells_updated();
        registry.increment_columns_added();
        registry.increment_columns_deleted();
        registry.increment_validation_failures();
        registry.increment_requests_rejected();
        registry.increment_storage_failures();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.rows_added, 2);
        assert_eq!(snapshot.rows_deleted, 1);
        assert_eq!(snapshot.cells_updated, 1);
        assert_eq!(snapshot.columns_added, 1);
        assert_eq!(snapshot.columns_deleted, 1);
        assert_eq!(snapshot.validation_failures, 1);
        assert_eq!(snapshot.requests_rejected, 1);
        assert_eq!(snapshot.storage_failures, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_cells_updated();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["cells_updated"], 1);
        assert_eq!(json["rows_added"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_rows_added();
                    reg.increment_validation_failures();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.rows_added, 1000);
        assert_eq!(snapshot.validation_failures, 1000);
    }
}
