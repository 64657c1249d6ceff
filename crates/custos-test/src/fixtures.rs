//! Fixture domain types and stores.
//!
//! - [`TestModel`], [`Layer`], [`Map`] - auditable models with the identifier
//!   and owner shapes seen in practice
//! - [`Comment`] - a model never listed in configuration
//! - [`InMemoryRepository`] - a persistence layer that notifies lifecycle
//!   listeners after each save or delete
//! - [`FailingStore`] - an audit store that always fails

use custos_audit::{AuditRecord, AuditStore, LifecycleListener, StoreError};
use custos_core::resource::ID_FIELDS;
use custos_core::{AuditSettings, Auditable, OwnerRef, ResourceId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Type path of [`TestModel`].
pub const TEST_MODEL_PATH: &str = "custos_test.models.TestModel";

/// Type path of [`Layer`].
pub const LAYER_PATH: &str = "geonode.layers.models.Layer";

/// Type path of the common base of [`Layer`] and [`Map`].
pub const RESOURCE_BASE_PATH: &str = "geonode.base.models.ResourceBase";

/// Type path of [`Map`].
pub const MAP_PATH: &str = "geonode.maps.models.Map";

/// Type path of [`Comment`].
pub const COMMENT_PATH: &str = "custos_test.models.Comment";

/// Model with every identifier field, each optional except `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestModel {
    /// Integer primary key.
    pub id: i64,
    /// Optional text identifier.
    pub uid: Option<String>,
    /// Optional UUID.
    pub uuid: Option<Uuid>,
    /// Optional owner.
    pub owner: Option<String>,
}

impl TestModel {
    /// Creates a model with only an integer key.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Sets the text identifier.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the UUID.
    #[must_use]
    pub const fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl Auditable for TestModel {
    fn type_paths(&self) -> &[&'static str] {
        &[TEST_MODEL_PATH]
    }

    fn id_field(&self, name: &str) -> Option<ResourceId> {
        match name {
            "uuid" => self.uuid.map(ResourceId::from),
            "uid" => self.uid.clone().map(ResourceId::Text),
            "id" => Some(ResourceId::Integer(self.id)),
            _ => None,
        }
    }

    fn owner_field(&self, name: &str) -> Option<OwnerRef> {
        match name {
            "owner" => self.owner.as_deref().map(OwnerRef::named),
            _ => None,
        }
    }
}

/// Layer owned through an `owner` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Integer primary key.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Owner username.
    pub owner: String,
}

impl Layer {
    /// Creates a layer.
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            owner: owner.into(),
        }
    }
}

impl Auditable for Layer {
    fn type_paths(&self) -> &[&'static str] {
        &[LAYER_PATH, RESOURCE_BASE_PATH]
    }

    fn id_field(&self, name: &str) -> Option<ResourceId> {
        (name == "id").then_some(ResourceId::Integer(self.id))
    }

    fn owner_field(&self, name: &str) -> Option<OwnerRef> {
        (name == "owner").then(|| OwnerRef::named(self.owner.as_str()))
    }
}

/// Map identified by UUID, owned through a `user` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    /// Primary identifier.
    pub uuid: Uuid,
    /// Owning user reference; the user may lack a username.
    pub user: Option<OwnerRef>,
}

impl Map {
    /// Creates a map with a fresh UUID and no owner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user: None,
        }
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_user(mut self, user: OwnerRef) -> Self {
        self.user = Some(user);
        self
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Auditable for Map {
    fn type_paths(&self) -> &[&'static str] {
        &[MAP_PATH, RESOURCE_BASE_PATH]
    }

    fn id_field(&self, name: &str) -> Option<ResourceId> {
        (name == "uuid").then_some(ResourceId::from(self.uuid))
    }

    fn owner_field(&self, name: &str) -> Option<OwnerRef> {
        match name {
            "user" => self.user.clone(),
            _ => None,
        }
    }
}

/// A model that no configuration registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Integer primary key.
    pub id: i64,
    /// Comment body.
    pub body: String,
}

impl Auditable for Comment {
    fn type_paths(&self) -> &[&'static str] {
        &[COMMENT_PATH]
    }

    fn id_field(&self, name: &str) -> Option<ResourceId> {
        (name == "id").then_some(ResourceId::Integer(self.id))
    }
}

/// Settings registering [`TestModel`] as "TestModel" and [`Layer`] as
/// "Layer". [`Map`] and [`Comment`] stay unregistered.
#[must_use]
pub fn sample_settings() -> AuditSettings {
    AuditSettings::new()
        .with_model(TEST_MODEL_PATH, "TestModel")
        .with_model(LAYER_PATH, "Layer")
}

/// Persistence layer keyed by the first present identifier.
///
/// Listeners run after the object is stored or removed, so a listener
/// failure cannot undo the operation. Objects without any identifier are
/// notified as created and not kept.
pub struct InMemoryRepository<T> {
    objects: Mutex<HashMap<ResourceId, T>>,
    listeners: Vec<Arc<dyn LifecycleListener>>,
}

impl<T> std::fmt::Debug for InMemoryRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("objects", &self.objects.lock().len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> InMemoryRepository<T>
where
    T: Auditable + Clone,
{
    /// Creates an empty repository with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            listeners: Vec::new(),
        }
    }

    /// Adds a lifecycle listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn LifecycleListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Inserts or replaces `object`. Returns `true` if it was new.
    pub fn save(&self, object: T) -> bool {
        let created = match key_of(&object) {
            Some(key) => self.objects.lock().insert(key, object.clone()).is_none(),
            None => true,
        };
        debug!(created, "Saved object");
        for listener in &self.listeners {
            listener.post_save(&object, created);
        }
        created
    }

    /// Removes `object`. Returns `true` if it was present.
    pub fn delete(&self, object: &T) -> bool {
        let removed = key_of(object).is_some_and(|key| self.objects.lock().remove(&key).is_some());
        if removed {
            for listener in &self.listeners {
                listener.post_delete(object);
            }
        }
        removed
    }

    /// Returns the stored object with the given identifier.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<T> {
        self.objects.lock().get(id).cloned()
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

impl<T> Default for InMemoryRepository<T>
where
    T: Auditable + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

fn key_of(object: &dyn Auditable) -> Option<ResourceId> {
    ID_FIELDS.iter().find_map(|field| object.id_field(field))
}

/// Audit store that rejects every record and counts the attempts.
#[derive(Debug, Default)]
pub struct FailingStore {
    attempts: AtomicUsize,
}

impl FailingStore {
    /// Creates a failing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many appends were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuditStore for FailingStore {
    fn append(&self, _record: &AuditRecord) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("simulated store failure".to_string()))
    }

    fn flush(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("simulated store failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingListener {
        saves: Mutex<Vec<bool>>,
        deletes: AtomicUsize,
    }

    impl LifecycleListener for CountingListener {
        fn post_save(&self, _instance: &dyn Auditable, created: bool) {
            self.saves.lock().push(created);
        }

        fn post_delete(&self, _instance: &dyn Auditable) {
            self.deletes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_repository_notifies_listeners() {
        let listener = Arc::new(CountingListener::default());
        let repo = InMemoryRepository::new().with_listener(listener.clone());

        let layer = Layer::new(1, "roads", "alice");
        assert!(repo.save(layer.clone()));
        assert!(!repo.save(Layer::new(1, "roads v2", "alice")));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(&ResourceId::Integer(1)).unwrap().title, "roads v2");

        assert!(repo.delete(&layer));
        assert!(!repo.delete(&layer));
        assert!(repo.is_empty());

        assert_eq!(*listener.saves.lock(), vec![true, false]);
        assert_eq!(listener.deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repository_keys_by_identifier_priority() {
        let repo = InMemoryRepository::new();
        let model = TestModel::new(1).with_uid("abc");
        repo.save(model);

        assert!(repo.get(&ResourceId::from("abc")).is_some());
        assert!(repo.get(&ResourceId::Integer(1)).is_none());
    }

    #[test]
    fn test_failing_store_counts_attempts() {
        let store = FailingStore::new();
        let record = AuditRecord::new("create", "Layer", None, None);

        assert!(store.append(&record).is_err());
        assert!(store.append(&record).is_err());
        assert_eq!(store.attempts(), 2);
    }

    #[test]
    fn test_sample_settings() {
        let settings = sample_settings();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.audit_models.len(), 2);
    }
}
