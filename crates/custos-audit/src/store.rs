//! Audit store abstraction and the simple stores.

use crate::event::{AuditRecord, EventKind};
use parking_lot::Mutex;
use std::fmt::Debug;
use tracing::{info, warn};

/// Destination for audit records.
pub trait AuditStore: Send + Sync + Debug {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;

    /// Flushes any buffered records.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&self) -> Result<(), StoreError>;

    /// Returns the store name for identification.
    fn name(&self) -> &'static str;
}

/// Errors that can occur while storing audit records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serialization error
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Store-specific error
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store that emits records as structured tracing events.
#[derive(Debug, Default)]
pub struct TracingStore;

impl TracingStore {
    /// Creates a new tracing store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditStore for TracingStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let entry = serde_json::to_string(&record.trail_entry())?;
        let resource_id = record.resource_id.as_ref().map(ToString::to_string);

        if record.event == EventKind::FailedLogin {
            warn!(
                event = %record.event,
                username = ?record.username,
                audit_event = %entry,
                "Audit event"
            );
        } else {
            info!(
                event = %record.event,
                resource_type = %record.resource_type,
                resource_id = ?resource_id,
                username = ?record.username,
                audit_event = %entry,
                "Audit event"
            );
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// In-memory store for testing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<AuditRecord> {
        self.records.lock().last().cloned()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Returns the number of stored records of the given kind.
    #[must_use]
    pub fn count(&self, kind: &EventKind) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| &r.event == kind)
            .count()
    }

    /// Clears all stored records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl AuditStore for InMemoryStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
