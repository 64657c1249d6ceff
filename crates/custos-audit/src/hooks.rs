//! Lifecycle and authentication hooks.
//!
//! A persistence layer notifies a [`LifecycleListener`] after saving or
//! deleting an object; an authentication layer notifies an [`AuthListener`]
//! on login, logout and failed login. [`AuditHooks`] implements both and
//! turns the notifications into audit records.

use crate::event::{EventKind, LoginDetails};
use crate::middleware::{client_ip, Request};
use crate::recorder::AuditRecorder;
use custos_core::{context, Auditable, ResourceResolver, UserAccount};
use std::sync::Arc;

/// Receives object lifecycle notifications.
pub trait LifecycleListener: Send + Sync {
    /// Called after an object was saved. `created` is `true` for inserts.
    fn post_save(&self, instance: &dyn Auditable, created: bool);

    /// Called after an object was deleted.
    fn post_delete(&self, instance: &dyn Auditable);
}

/// Receives authentication notifications.
pub trait AuthListener: Send + Sync {
    /// Called after a successful login.
    fn user_logged_in(&self, request: &Request, user: &UserAccount);

    /// Called after a logout. `user` is `None` if nobody was logged in.
    fn user_logged_out(&self, request: &Request, user: Option<&UserAccount>);

    /// Called after a failed login with the submitted username, if any.
    fn user_login_failed(&self, request: &Request, username: Option<&str>);
}

/// Records lifecycle and authentication events.
#[derive(Debug, Clone)]
pub struct AuditHooks {
    resolver: Arc<ResourceResolver>,
    recorder: Arc<AuditRecorder>,
}

impl AuditHooks {
    /// Creates hooks recording through `recorder`.
    #[must_use]
    pub const fn new(resolver: Arc<ResourceResolver>, recorder: Arc<AuditRecorder>) -> Self {
        Self { resolver, recorder }
    }

    /// Returns the resolver used for object events.
    #[must_use]
    pub fn resolver(&self) -> &ResourceResolver {
        &self.resolver
    }

    /// Records `create` for `instance` if its type is audited.
    pub fn on_created(&self, instance: &dyn Auditable) {
        self.record_lifecycle(EventKind::Create, instance);
    }

    /// Records `update` for `instance` if its type is audited.
    pub fn on_updated(&self, instance: &dyn Auditable) {
        self.record_lifecycle(EventKind::Update, instance);
    }

    /// Records `delete` for `instance` if its type is audited.
    pub fn on_deleted(&self, instance: &dyn Auditable) {
        self.record_lifecycle(EventKind::Delete, instance);
    }

    fn record_lifecycle(&self, kind: EventKind, instance: &dyn Auditable) {
        if let Some(resource) = self.resolver.resolve(instance) {
            self.recorder
                .record_resource(kind, &resource, context::current_actor().as_ref());
        }
    }
}

impl LifecycleListener for AuditHooks {
    fn post_save(&self, instance: &dyn Auditable, created: bool) {
        if created {
            self.on_created(instance);
        } else {
            self.on_updated(instance);
        }
    }

    fn post_delete(&self, instance: &dyn Auditable) {
        self.on_deleted(instance);
    }
}

impl AuthListener for AuditHooks {
    fn user_logged_in(&self, request: &Request, user: &UserAccount) {
        let details = LoginDetails::from_account(user, client_ip(request));
        self.recorder.record_login(EventKind::Login, details);
    }

    fn user_logged_out(&self, request: &Request, user: Option<&UserAccount>) {
        let ip = client_ip(request);
        let details = match user {
            Some(user) => LoginDetails::from_account(user, ip),
            None => LoginDetails::anonymous(None, ip),
        };
        self.recorder.record_login(EventKind::Logout, details);
    }

    fn user_login_failed(&self, request: &Request, username: Option<&str>) {
        let details = LoginDetails::anonymous(username, client_ip(request));
        self.recorder.record_login(EventKind::FailedLogin, details);
    }
}
