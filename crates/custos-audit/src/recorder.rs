//! Audit recorder: the single write path for every interception point.

use crate::event::{AuditRecord, EventKind, LoginDetails};
use crate::jsonl::JsonLinesStore;
use crate::sqlite::SqliteStore;
use crate::store::{AuditStore, StoreError};
use custos_core::{ActorIdentity, AuditSettings, ResourceDescriptor, ResourceId};
use std::sync::Arc;
use tracing::{debug, error};

/// Audit recorder that writes records to the configured stores.
///
/// Recording is best-effort: store failures are logged and swallowed so the
/// audited operation is never affected.
#[derive(Debug)]
pub struct AuditRecorder {
    /// Stores to write records to
    stores: Vec<Arc<dyn AuditStore>>,

    /// Whether recording is enabled
    enabled: bool,
}

impl Default for AuditRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditRecorder {
    /// Creates a new recorder with no stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stores: Vec::new(),
            enabled: true,
        }
    }

    /// Creates a builder for configuring the recorder.
    #[must_use]
    pub fn builder() -> AuditRecorderBuilder {
        AuditRecorderBuilder::new()
    }

    /// Creates a recorder from settings: a [`SqliteStore`] when `database`
    /// is set (schema created if missing) and a [`JsonLinesStore`] when
    /// `logfile_location` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialised.
    pub fn from_settings(settings: &AuditSettings) -> Result<Self, StoreError> {
        let mut builder = Self::builder();

        if let Some(database) = &settings.database {
            let store = SqliteStore::open(database)?;
            store.init_schema()?;
            builder = builder.with_store(Arc::new(store));
        }

        if let Some(location) = &settings.logfile_location {
            builder = builder.with_store(Arc::new(JsonLinesStore::new(location.clone())));
        }

        Ok(builder.build())
    }

    /// Adds a store to the recorder.
    pub fn add_store(&mut self, store: Arc<dyn AuditStore>) {
        self.stores.push(store);
    }

    /// Enables or disables the recorder.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Records one event.
    pub fn record(
        &self,
        event: impl Into<EventKind>,
        resource_type: &str,
        resource_id: Option<ResourceId>,
        actor: Option<&ActorIdentity>,
    ) {
        self.append(&AuditRecord::new(event, resource_type, resource_id, actor));
    }

    /// Records an event about a resolved domain object.
    pub fn record_resource(
        &self,
        event: impl Into<EventKind>,
        resource: &ResourceDescriptor,
        actor: Option<&ActorIdentity>,
    ) {
        self.append(&AuditRecord::for_resource(event, resource, actor));
    }

    /// Records an authentication event.
    pub fn record_login(&self, event: impl Into<EventKind>, details: LoginDetails) {
        self.append(&AuditRecord::for_login(event, details));
    }

    /// Writes a prepared record to every store.
    pub fn append(&self, record: &AuditRecord) {
        if !self.enabled {
            debug!(event = %record.event, "Audit recording disabled, skipping record");
            return;
        }

        for store in &self.stores {
            if let Err(e) = store.append(record) {
                error!(
                    store = store.name(),
                    event = %record.event,
                    resource_type = %record.resource_type,
                    "Failed to store audit record: {}",
                    e
                );
            }
        }
    }

    /// Flushes all stores.
    ///
    /// # Errors
    ///
    /// Returns an error if any store fails to flush.
    pub fn flush(&self) -> Result<(), StoreError> {
        for store in &self.stores {
            store.flush()?;
        }
        Ok(())
    }

    /// Returns the number of configured stores.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Returns whether recording is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Builder for configuring an audit recorder.
#[derive(Debug, Default)]
pub struct AuditRecorderBuilder {
    stores: Vec<Arc<dyn AuditStore>>,
    disabled: bool,
}

impl AuditRecorderBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a store to the recorder.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Enables or disables the recorder.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.disabled = !enabled;
        self
    }

    /// Builds the audit recorder.
    #[must_use]
    pub fn build(self) -> AuditRecorder {
        AuditRecorder {
            stores: self.stores,
            enabled: !self.disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FILE_RESOURCE_TYPE;
    use crate::store::InMemoryStore;

    #[derive(Debug)]
    struct BrokenStore;

    impl AuditStore for BrokenStore {
        fn append(&self, _record: &AuditRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("store offline".to_string()))
        }

        fn flush(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_recorder_with_in_memory_store() {
        let store = Arc::new(InMemoryStore::new());
        let recorder = AuditRecorder::builder().with_store(store.clone()).build();

        let actor = ActorIdentity::new("alice");
        recorder.record(
            EventKind::FileRead,
            FILE_RESOURCE_TYPE,
            Some(ResourceId::from("/tmp/a")),
            Some(&actor),
        );

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, EventKind::FileRead);
        assert_eq!(records[0].username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_recorder_disabled() {
        let store = Arc::new(InMemoryStore::new());
        let recorder = AuditRecorder::builder()
            .with_store(store.clone())
            .enabled(false)
            .build();

        recorder.record(EventKind::Create, "Layer", None, None);
        assert!(store.is_empty());
        assert!(!recorder.is_enabled());
    }

    #[test]
    fn test_store_failure_is_swallowed() {
        let store = Arc::new(InMemoryStore::new());
        let recorder = AuditRecorder::builder()
            .with_store(Arc::new(BrokenStore))
            .with_store(store.clone())
            .build();

        recorder.record(EventKind::Delete, "Layer", None, None);

        // The failing store does not prevent later stores from recording
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_multiple_stores() {
        let store1 = Arc::new(InMemoryStore::new());
        let store2 = Arc::new(InMemoryStore::new());

        let recorder = AuditRecorder::builder()
            .with_store(store1.clone())
            .with_store(store2.clone())
            .build();

        recorder.record(EventKind::Update, "Map", None, None);

        assert_eq!(store1.len(), 1);
        assert_eq!(store2.len(), 1);
        assert_eq!(recorder.store_count(), 2);
    }

    #[test]
    fn test_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AuditSettings::new()
            .with_database(dir.path().join("audit.sqlite3"))
            .with_logfile_location(dir.path().join("audit.json"));

        let recorder = AuditRecorder::from_settings(&settings).unwrap();
        assert_eq!(recorder.store_count(), 2);

        recorder.record(EventKind::Create, "Layer", Some(ResourceId::Integer(1)), None);

        let trail = std::fs::read_to_string(dir.path().join("audit.json")).unwrap();
        assert_eq!(trail.lines().count(), 1);

        let db = SqliteStore::open(dir.path().join("audit.sqlite3")).unwrap();
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_from_empty_settings() {
        let recorder = AuditRecorder::from_settings(&AuditSettings::new()).unwrap();
        assert_eq!(recorder.store_count(), 0);

        // No stores: recording is a no-op
        recorder.record(EventKind::Create, "Layer", None, None);
    }
}
