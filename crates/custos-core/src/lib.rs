//! # Custos Core
//!
//! Core types for the Custos audit trail.
//!
//! This crate provides the pieces every interception point shares:
//!
//! - [`ActorIdentity`] / [`UserAccount`] - who performed an action
//! - [`context`] - per-thread storage of the current actor
//! - [`Auditable`] / [`ResourceResolver`] - which domain objects are audited
//!   and how they are summarized as a [`ResourceDescriptor`]
//! - [`AuditSettings`] - configuration loaded from YAML or JSON
//!
//! ## Example
//!
//! ```rust
//! use custos_core::{context, ActorIdentity, AuditSettings, ResourceResolver};
//!
//! let settings = AuditSettings::new().with_model("geonode.layers.models.Layer", "Layer");
//! let resolver = ResourceResolver::new(settings.audit_models.clone()).unwrap();
//!
//! context::set_current_actor(Some(ActorIdentity::new("admin").superuser()));
//! assert_eq!(context::current_actor().unwrap().username, "admin");
//! # let _ = resolver;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod config;
pub mod context;
pub mod error;
pub mod resource;


pub use actor::{ActorIdentity, UserAccount};
pub use config::{AuditModelSpec, AuditSettings};
pub use context::{current_actor, set_current_actor};
pub use error::{ConfigError, Result};
pub use resource::{
    Auditable, OwnerRef, RegistryEntry, ResourceDescriptor, ResourceId, ResourceRegistry,
    ResourceResolver,
};
