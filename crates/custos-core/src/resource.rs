//! Resource resolution for audited domain objects.
//!
//! Domain types opt into auditing by implementing [`Auditable`]. The
//! [`ResourceResolver`] matches an instance against the configured
//! `audit_models` list and, when it matches, extracts a normalized
//! [`ResourceDescriptor`] (`{id, type, username}`).
//!
//! Matching is polymorphic: an instance lists every type path it satisfies
//! (its own first, then any parent types), and the first configured entry whose
//! path appears in that list wins.

use crate::config::AuditModelSpec;
use crate::error::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier fields checked on an instance, highest priority first.
pub const ID_FIELDS: [&str; 3] = ["uuid", "uid", "id"];

/// Owner reference fields checked on an instance, highest priority first.
pub const OWNER_FIELDS: [&str; 2] = ["user", "owner"];

/// Opaque identifier of an audited resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Numeric primary key.
    Integer(i64),
    /// Textual key: UUIDs, slugs, file paths.
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ResourceId {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for ResourceId {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Uuid> for ResourceId {
    fn from(id: Uuid) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<&Path> for ResourceId {
    fn from(path: &Path) -> Self {
        Self::Text(path.to_string_lossy().into_owned())
    }
}

/// A reference from an audited object to the user owning it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerRef {
    /// Username of the referenced user, if it has one.
    pub username: Option<String>,
}

impl OwnerRef {
    /// Reference to a user with the given username.
    #[must_use]
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }
}

/// A domain type whose lifecycle can be audited.
///
/// # Examples
///
/// ```rust
/// use custos_core::{Auditable, OwnerRef, ResourceId};
///
/// struct Layer {
///     id: i64,
///     owner: String,
/// }
///
/// impl Auditable for Layer {
///     fn type_paths(&self) -> &[&'static str] {
///         &["geonode.layers.models.Layer", "geonode.base.models.ResourceBase"]
///     }
///
///     fn id_field(&self, name: &str) -> Option<ResourceId> {
///         (name == "id").then(|| self.id.into())
///     }
///
///     fn owner_field(&self, name: &str) -> Option<OwnerRef> {
///         (name == "owner").then(|| OwnerRef::named(&self.owner))
///     }
/// }
/// ```
pub trait Auditable {
    /// Dotted type paths this instance satisfies, most specific first.
    fn type_paths(&self) -> &[&'static str];

    /// Value of the identifier field `name` (one of [`ID_FIELDS`]), or `None`
    /// when the field is absent or null.
    fn id_field(&self, name: &str) -> Option<ResourceId>;

    /// Owner reference held in field `name` (one of [`OWNER_FIELDS`]), or
    /// `None` when the field is absent or null.
    fn owner_field(&self, _name: &str) -> Option<OwnerRef> {
        None
    }
}

/// Normalized summary of an audited object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Resource identifier, if the object exposes one.
    pub id: Option<ResourceId>,
    /// Configured resource-type label.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Username of the owning user, if any.
    pub username: Option<String>,
}

impl ResourceDescriptor {
    /// Extracts a descriptor from `instance` under the given label.
    #[must_use]
    pub fn from_instance(instance: &dyn Auditable, resource_type: &str) -> Self {
        let id = ID_FIELDS.iter().find_map(|field| instance.id_field(field));
        let username = OWNER_FIELDS
            .iter()
            .find_map(|field| instance.owner_field(field))
            .and_then(|owner| owner.username);

        Self {
            id,
            resource_type: resource_type.to_string(),
            username,
        }
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Resource-type label.
    pub resource_type: String,
    /// Dotted type path.
    pub type_path: String,
}

/// Ordered mapping from resource-type label to audited type path.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: Vec<RegistryEntry>,
}

impl ResourceRegistry {
    /// Builds the registry from configuration entries.
    ///
    /// Entry order is preserved. A label configured twice keeps its first
    /// position and takes the later type path.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is malformed.
    pub fn from_specs(specs: &[AuditModelSpec]) -> Result<Self> {
        specs.iter().try_for_each(AuditModelSpec::validate)?;
        Ok(Self::build(specs))
    }

    fn build(specs: &[AuditModelSpec]) -> Self {
        if specs.is_empty() {
            warn!("No models specified for audit, audit_models is probably not set");
        }

        let mut entries: Vec<RegistryEntry> = Vec::with_capacity(specs.len());
        for spec in specs {
            debug!(type_path = %spec.type_path, resource_type = %spec.resource_type, "Registering audited type");
            if let Some(existing) = entries
                .iter_mut()
                .find(|e| e.resource_type == spec.resource_type)
            {
                existing.type_path.clone_from(&spec.type_path);
            } else {
                entries.push(RegistryEntry {
                    resource_type: spec.resource_type.clone(),
                    type_path: spec.type_path.clone(),
                });
            }
        }

        Self { entries }
    }

    /// Returns the label of the first entry `instance` matches.
    #[must_use]
    pub fn lookup(&self, instance: &dyn Auditable) -> Option<&str> {
        let paths = instance.type_paths();
        self.entries
            .iter()
            .find(|entry| paths.iter().any(|path| *path == entry.type_path))
            .map(|entry| entry.resource_type.as_str())
    }

    /// Returns the registry entries in match order.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves domain objects to resource descriptors.
///
/// The registry is built on first use and reused for the resolver's lifetime.
#[derive(Debug)]
pub struct ResourceResolver {
    specs: Vec<AuditModelSpec>,
    registry: OnceCell<ResourceRegistry>,
}

impl ResourceResolver {
    /// Creates a resolver for the given configuration entries.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is malformed.
    pub fn new(specs: Vec<AuditModelSpec>) -> Result<Self> {
        specs.iter().try_for_each(AuditModelSpec::validate)?;
        Ok(Self {
            specs,
            registry: OnceCell::new(),
        })
    }

    /// Returns the registry, building it on first call.
    pub fn registry(&self) -> &ResourceRegistry {
        self.registry
            .get_or_init(|| ResourceRegistry::build(&self.specs))
    }

    /// Returns the descriptor for `instance`, or `None` if its type is not
    /// audited.
    #[must_use]
    pub fn resolve(&self, instance: &dyn Auditable) -> Option<ResourceDescriptor> {
        let Some(resource_type) = self.registry().lookup(instance) else {
            debug!(type_paths = ?instance.type_paths(), "Instance type not audited");
            return None;
        };
        Some(ResourceDescriptor::from_instance(instance, resource_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Sample {
        paths: &'static [&'static str],
        uuid: Option<Uuid>,
        uid: Option<String>,
        id: Option<i64>,
        user: Option<OwnerRef>,
        owner: Option<OwnerRef>,
    }

    impl Auditable for Sample {
        fn type_paths(&self) -> &[&'static str] {
            self.paths
        }

        fn id_field(&self, name: &str) -> Option<ResourceId> {
            match name {
                "uuid" => self.uuid.map(ResourceId::from),
                "uid" => self.uid.clone().map(ResourceId::from),
                "id" => self.id.map(ResourceId::from),
                _ => None,
            }
        }

        fn owner_field(&self, name: &str) -> Option<OwnerRef> {
            match name {
                "user" => self.user.clone(),
                "owner" => self.owner.clone(),
                _ => None,
            }
        }
    }

    const LAYER: &[&str] = &["app.layers.Layer", "app.base.ResourceBase"];
    const MAP: &[&str] = &["app.maps.Map", "app.base.ResourceBase"];

    fn resolver(specs: &[(&str, &str)]) -> ResourceResolver {
        ResourceResolver::new(
            specs
                .iter()
                .map(|(path, label)| AuditModelSpec::new(*path, *label))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_registered_type_resolves() {
        let resolver = resolver(&[("app.layers.Layer", "Layer")]);
        let layer = Sample {
            paths: LAYER,
            id: Some(7),
            ..Default::default()
        };

        let descriptor = resolver.resolve(&layer).unwrap();
        assert_eq!(descriptor.resource_type, "Layer");
        assert_eq!(descriptor.id, Some(ResourceId::Integer(7)));
        assert_eq!(descriptor.username, None);
    }

    #[test]
    fn test_unregistered_type_is_none() {
        let resolver = resolver(&[("app.layers.Layer", "Layer")]);
        let map = Sample {
            paths: MAP,
            ..Default::default()
        };
        assert!(resolver.resolve(&map).is_none());
    }

    #[test]
    #[traced_test]
    fn test_empty_registry_warns_and_resolves_nothing() {
        let resolver = resolver(&[]);
        let layer = Sample {
            paths: LAYER,
            ..Default::default()
        };
        assert!(resolver.registry().is_empty());
        assert!(resolver.resolve(&layer).is_none());
        assert!(logs_contain("No models specified for audit"));
    }

    #[test]
    #[traced_test]
    fn test_configured_registry_does_not_warn() {
        let resolver = resolver(&[("app.layers.Layer", "Layer")]);
        assert_eq!(resolver.registry().len(), 1);
        assert!(!logs_contain("No models specified for audit"));
    }

    #[test]
    fn test_parent_type_matches() {
        let resolver = resolver(&[("app.base.ResourceBase", "Resource")]);
        let map = Sample {
            paths: MAP,
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&map).unwrap().resource_type, "Resource");
    }

    #[test]
    fn test_first_registered_wins() {
        let resolver = resolver(&[
            ("app.base.ResourceBase", "Resource"),
            ("app.layers.Layer", "Layer"),
        ]);
        let layer = Sample {
            paths: LAYER,
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&layer).unwrap().resource_type, "Resource");
    }

    #[test]
    fn test_duplicate_label_keeps_position() {
        let registry = ResourceRegistry::from_specs(&[
            AuditModelSpec::new("app.a.A", "Thing"),
            AuditModelSpec::new("app.b.B", "Other"),
            AuditModelSpec::new("app.c.C", "Thing"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.entries()[0].resource_type, "Thing");
        assert_eq!(registry.entries()[0].type_path, "app.c.C");
    }

    #[test]
    fn test_identifier_priority() {
        let resolver = resolver(&[("app.layers.Layer", "Layer")]);
        let uuid = Uuid::new_v4();
        let mut layer = Sample {
            paths: LAYER,
            uuid: Some(uuid),
            uid: Some("uid-1".to_string()),
            id: Some(3),
            ..Default::default()
        };

        let id = |s: &Sample| resolver.resolve(s).unwrap().id;
        assert_eq!(id(&layer), Some(ResourceId::Text(uuid.to_string())));

        layer.uuid = None;
        assert_eq!(id(&layer), Some(ResourceId::Text("uid-1".to_string())));

        layer.uid = None;
        assert_eq!(id(&layer), Some(ResourceId::Integer(3)));

        layer.id = None;
        assert_eq!(id(&layer), None);
    }

    #[test]
    fn test_owner_priority() {
        let resolver = resolver(&[("app.layers.Layer", "Layer")]);
        let mut layer = Sample {
            paths: LAYER,
            user: Some(OwnerRef::named("alice")),
            owner: Some(OwnerRef::named("bob")),
            ..Default::default()
        };

        let username = |s: &Sample| resolver.resolve(s).unwrap().username;
        assert_eq!(username(&layer).as_deref(), Some("alice"));

        layer.user = None;
        assert_eq!(username(&layer).as_deref(), Some("bob"));

        layer.owner = Some(OwnerRef::default());
        assert_eq!(username(&layer), None);
    }

    #[test]
    fn test_malformed_spec_rejected() {
        let err = ResourceResolver::new(vec![AuditModelSpec::new("Layer", "Layer")]);
        assert!(err.is_err());
    }

    #[test]
    fn test_descriptor_serialization_sorted() {
        let descriptor = ResourceDescriptor {
            id: Some(ResourceId::Integer(1)),
            resource_type: "Layer".to_string(),
            username: None,
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, r#"{"id":1,"type":"Layer","username":null}"#);
    }

    #[test]
    fn test_resource_id_display() {
        assert_eq!(ResourceId::from(42_i64).to_string(), "42");
        assert_eq!(ResourceId::from("/tmp/x").to_string(), "/tmp/x");
        assert_eq!(
            ResourceId::from(Path::new("/var/data.csv")),
            ResourceId::Text("/var/data.csv".to_string())
        );
    }
}
