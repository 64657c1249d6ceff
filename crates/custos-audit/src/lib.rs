//! Audit recording for Custos.
//!
//! This crate turns the interception points of an application into audit
//! records:
//! - File access through [`FileAuditor`] / [`AuditedFile`]
//! - Object lifecycle (create, update, delete) through [`AuditHooks`]
//! - Authentication (login, logout, failed login) through [`AuditHooks`]
//!
//! The actor for each record comes from the per-thread identity context,
//! populated by [`UserDetailsMiddleware`] for requests and by [`ActorTask`]
//! for deferred jobs.
//!
//! # Stores
//!
//! - [`SqliteStore`] - the `audit_logging_auditevent` table
//! - [`JsonLinesStore`] - one JSON object per line, keys sorted
//! - [`TracingStore`] / [`InMemoryStore`] - logging and tests
//!
//! # Example
//!
//! ```rust
//! use custos_audit::{AuditRecorder, EventKind, InMemoryStore};
//! use custos_core::{ActorIdentity, ResourceId};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let recorder = AuditRecorder::builder()
//!     .with_store(store.clone())
//!     .build();
//!
//! let actor = ActorIdentity::new("admin").superuser();
//! recorder.record(EventKind::Delete, "Layer", Some(ResourceId::Integer(7)), Some(&actor));
//! assert_eq!(store.count(&EventKind::Delete), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event;
mod file;
mod hooks;
mod jsonl;
mod middleware;
mod recorder;
mod sqlite;
mod store;
mod task;

pub use event::{
    AuditRecord, EventKind, LoginDetails, FILE_RESOURCE_TYPE, GMT_FORMAT, USER_RESOURCE_TYPE,
};
pub use file::{AuditedFile, FileAuditor};
pub use hooks::{AuditHooks, AuthListener, LifecycleListener};
pub use jsonl::JsonLinesStore;
pub use middleware::{client_ip, set_actor_from_request, Request, UserDetailsMiddleware};
pub use recorder::{AuditRecorder, AuditRecorderBuilder};
pub use sqlite::{SqliteStore, StoredEvent, AUDIT_TABLE};
pub use store::{AuditStore, InMemoryStore, StoreError, TracingStore};
pub use task::{spawn_blocking_with_actor, spawn_with_actor, ActorTask};
