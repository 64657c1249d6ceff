//! # Custos Test
//!
//! Test support for the Custos audit trail.
//!
//! - [`MockUser`] - mock accounts and actors
//! - [`fixtures`] - auditable fixture models, a listener-notifying
//!   repository and a store that always fails
//! - [`AuditHarness`] and assertion helpers
//!
//! ## Example
//!
//! ```rust
//! use custos_audit::EventKind;
//! use custos_test::{
//!     assert_single_event, sample_settings, AuditHarness, InMemoryRepository, TestModel,
//! };
//!
//! let harness = AuditHarness::new(&sample_settings());
//! let repo = InMemoryRepository::new().with_listener(harness.hooks.clone());
//!
//! repo.save(TestModel::new(1));
//! assert_single_event(&harness.store, &EventKind::Create);
//! ```

pub mod fixtures;
pub mod mock_identity;
pub mod test_utils;

pub use fixtures::{
    sample_settings, Comment, FailingStore, InMemoryRepository, Layer, Map, TestModel,
};
pub use mock_identity::MockUser;
pub use test_utils::{assert_no_events, assert_single_event, read_trail, AuditHarness};
