//! Audit record definitions.

use chrono::{DateTime, Utc};
use custos_core::{ActorIdentity, ResourceDescriptor, ResourceId, UserAccount};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Resource type recorded for file events.
pub const FILE_RESOURCE_TYPE: &str = "file";

/// Resource type recorded for authentication events.
pub const USER_RESOURCE_TYPE: &str = "user";

/// Format of `event_time_gmt` in the JSON trail.
pub const GMT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of audited event.
///
/// Stored as free text; the well-known kinds have dedicated variants and
/// anything else round-trips through [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A file was created by opening it.
    FileCreate,
    /// A file was read.
    FileRead,
    /// A file was written or truncated.
    FileWrite,
    /// An audited object was created.
    Create,
    /// An audited object was updated.
    Update,
    /// An audited object was deleted.
    Delete,
    /// A user logged in.
    Login,
    /// A user logged out.
    Logout,
    /// A login attempt failed.
    FailedLogin,
    /// Any other event kind.
    Other(String),
}

impl EventKind {
    /// Returns the stored name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FileCreate => "FileCreate",
            Self::FileRead => "FileRead",
            Self::FileWrite => "FileWrite",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::FailedLogin => "failed_login",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "FileCreate" => Self::FileCreate,
            "FileRead" => Self::FileRead,
            "FileWrite" => Self::FileWrite,
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "login" => Self::Login,
            "logout" => Self::Logout,
            "failed_login" => Self::FailedLogin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Details of an authentication event, written to the JSON trail under
/// `user_details`.
///
/// Field order is alphabetical so serialized keys come out sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginDetails {
    /// E-mail address of the user.
    pub email: Option<String>,
    /// Display name of the user.
    pub fullname: Option<String>,
    /// Client IP address of the request.
    pub ip: Option<String>,
    /// Staff flag, unknown for failed logins.
    pub staff: Option<bool>,
    /// Superuser flag, unknown for failed logins.
    pub superuser: Option<bool>,
    /// Username, if known.
    pub username: Option<String>,
}

impl LoginDetails {
    /// Details for a known account.
    #[must_use]
    pub fn from_account(user: &UserAccount, ip: Option<String>) -> Self {
        Self {
            email: user.email.clone(),
            fullname: user.full_name.clone(),
            ip,
            staff: Some(user.is_staff),
            superuser: Some(user.is_superuser),
            username: Some(user.username.clone()),
        }
    }

    /// Details for an attempt where only the submitted username is known.
    #[must_use]
    pub fn anonymous(username: Option<&str>, ip: Option<String>) -> Self {
        Self {
            email: None,
            fullname: None,
            ip,
            staff: None,
            superuser: None,
            username: username.map(str::to_string),
        }
    }
}

/// One immutable audit record.
///
/// Every store receives the same record; the primary store keeps the flat
/// columns, the JSON trail renders [`AuditRecord::trail_entry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Event kind.
    pub event: EventKind,
    /// Resource type label (`file`, `user`, or a configured model label).
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: Option<ResourceId>,
    /// Acting username.
    pub username: Option<String>,
    /// Acting user's superuser flag.
    pub superuser: Option<bool>,
    /// Acting user's staff flag.
    pub staff: Option<bool>,
    /// Creation time.
    pub datetime: DateTime<Utc>,
    /// Username of the resource owner, from the resource descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_owner: Option<String>,
    /// Authentication details, for login/logout/failed-login records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginDetails>,
}

impl AuditRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        event: impl Into<EventKind>,
        resource_type: impl Into<String>,
        resource_id: Option<ResourceId>,
        actor: Option<&ActorIdentity>,
    ) -> Self {
        Self {
            event: event.into(),
            resource_type: resource_type.into(),
            resource_id,
            username: actor.map(|a| a.username.clone()),
            superuser: actor.map(|a| a.is_superuser),
            staff: actor.map(|a| a.is_staff),
            datetime: Utc::now(),
            resource_owner: None,
            login: None,
        }
    }

    /// Creates a record for a resolved domain object.
    #[must_use]
    pub fn for_resource(
        event: impl Into<EventKind>,
        resource: &ResourceDescriptor,
        actor: Option<&ActorIdentity>,
    ) -> Self {
        Self {
            resource_owner: resource.username.clone(),
            ..Self::new(
                event,
                resource.resource_type.clone(),
                resource.id.clone(),
                actor,
            )
        }
    }

    /// Creates an authentication record. The acting user is the one in
    /// `details`, not the identity context.
    #[must_use]
    pub fn for_login(event: impl Into<EventKind>, details: LoginDetails) -> Self {
        Self {
            event: event.into(),
            resource_type: USER_RESOURCE_TYPE.to_string(),
            resource_id: details.username.clone().map(ResourceId::Text),
            username: details.username.clone(),
            superuser: details.superuser,
            staff: details.staff,
            datetime: Utc::now(),
            resource_owner: None,
            login: Some(details),
        }
    }

    /// Returns the creation time formatted as `YYYY-MM-DD HH:MM:SS` (GMT).
    #[must_use]
    pub fn event_time_gmt(&self) -> String {
        self.datetime.format(GMT_FORMAT).to_string()
    }

    /// Builds the JSON trail entry for this record.
    ///
    /// `serde_json::Map` is ordered by key, so the rendered line has sorted
    /// keys at every level.
    #[must_use]
    pub fn trail_entry(&self) -> Value {
        match &self.login {
            Some(details) => json!({
                "event": self.event.as_str(),
                "event_time_gmt": self.event_time_gmt(),
                "user_details": details,
            }),
            None => json!({
                "event": self.event.as_str(),
                "event_time_gmt": self.event_time_gmt(),
                "resource": {
                    "id": self.resource_id,
                    "type": self.resource_type,
                    "username": self.resource_owner,
                },
            }),
        }
    }
}
