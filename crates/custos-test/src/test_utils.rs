//! Harness construction and assertion helpers.
//!
//! # Examples
//!
//! ```rust
//! use custos_audit::{EventKind, LifecycleListener};
//! use custos_test::{assert_single_event, sample_settings, AuditHarness, Layer};
//!
//! let harness = AuditHarness::new(&sample_settings());
//! harness.hooks.post_save(&Layer::new(1, "roads", "alice"), true);
//!
//! let record = assert_single_event(&harness.store, &EventKind::Create);
//! assert_eq!(record.resource_type, "Layer");
//! ```

use custos_audit::{AuditHooks, AuditRecord, AuditRecorder, EventKind, InMemoryStore};
use custos_core::{AuditSettings, ResourceResolver};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// A recorder wired to an in-memory store plus hooks over a resolver.
#[derive(Debug, Clone)]
pub struct AuditHarness {
    /// Store receiving every record.
    pub store: Arc<InMemoryStore>,
    /// Recorder writing to `store`.
    pub recorder: Arc<AuditRecorder>,
    /// Hooks recording through `recorder`.
    pub hooks: Arc<AuditHooks>,
}

impl AuditHarness {
    /// Builds a harness for the models listed in `settings`.
    ///
    /// # Panics
    ///
    /// Panics if `settings` contains an invalid type path.
    #[must_use]
    #[track_caller]
    pub fn new(settings: &AuditSettings) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let recorder = Arc::new(AuditRecorder::builder().with_store(store.clone()).build());
        let resolver = match ResourceResolver::new(settings.audit_models.clone()) {
            Ok(resolver) => resolver,
            Err(e) => panic!("Invalid audit settings: {e}"),
        };
        let hooks = Arc::new(AuditHooks::new(Arc::new(resolver), recorder.clone()));

        Self {
            store,
            recorder,
            hooks,
        }
    }
}

/// Asserts that `store` holds exactly one record and that it has `kind`.
///
/// # Panics
///
/// Panics if the store holds zero or several records, or a record of
/// another kind.
#[track_caller]
pub fn assert_single_event(store: &InMemoryStore, kind: &EventKind) -> AuditRecord {
    let mut records = store.records();
    assert_eq!(
        records.len(),
        1,
        "Expected exactly one audit record, found {}: {:?}",
        records.len(),
        records.iter().map(|r| r.event.as_str()).collect::<Vec<_>>()
    );
    let record = records.remove(0);
    assert_eq!(&record.event, kind, "Unexpected event kind");
    record
}

/// Asserts that `store` holds no records.
///
/// # Panics
///
/// Panics if any record was stored.
#[track_caller]
pub fn assert_no_events(store: &InMemoryStore) {
    let records = store.records();
    assert!(
        records.is_empty(),
        "Expected no audit records, found {}: {:?}",
        records.len(),
        records.iter().map(|r| r.event.as_str()).collect::<Vec<_>>()
    );
}

/// Reads a JSON-lines trail into one value per line.
///
/// # Panics
///
/// Panics if the file cannot be read or a line is not valid JSON.
#[track_caller]
pub fn read_trail(path: impl AsRef<Path>) -> Vec<Value> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => panic!("Failed to read trail {}: {e}", path.display()),
    };

    contents
        .lines()
        .map(|line| match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => panic!("Invalid trail line {line:?}: {e}"),
        })
        .collect()
}
