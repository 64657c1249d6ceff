//! Actor identity types.
//!
//! An actor is the user on whose behalf an audited action runs. Two shapes
//! exist:
//!
//! - [`ActorIdentity`] - the minimal identity kept in the identity context and
//!   stamped onto every audit record
//! - [`UserAccount`] - the richer account view handed over by the
//!   authentication layer, used for login/logout entries

use serde::{Deserialize, Serialize};

/// Identity of the acting user, attached to every audit record.
///
/// # Examples
///
/// ```rust
/// use custos_core::ActorIdentity;
///
/// let admin = ActorIdentity::new("admin").superuser().staff();
/// assert!(admin.is_superuser);
/// assert!(admin.is_staff);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorIdentity {
    /// Login name of the actor.
    pub username: String,
    /// Whether the actor has superuser rights.
    pub is_superuser: bool,
    /// Whether the actor is a staff member.
    pub is_staff: bool,
}

impl ActorIdentity {
    /// Creates an identity for a regular (non-staff, non-superuser) user.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_superuser: false,
            is_staff: false,
        }
    }

    /// Marks the identity as a superuser.
    #[must_use]
    pub const fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    /// Marks the identity as staff.
    #[must_use]
    pub const fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }
}

/// An authenticated user account as seen by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Login name.
    pub username: String,
    /// Whether the user has superuser rights.
    pub is_superuser: bool,
    /// Whether the user is a staff member.
    pub is_staff: bool,
    /// Display name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// E-mail address, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserAccount {
    /// Creates a regular account with no name or e-mail.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_superuser: false,
            is_staff: false,
            full_name: None,
            email: None,
        }
    }

    /// Sets the superuser flag.
    #[must_use]
    pub const fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    /// Sets the staff flag.
    #[must_use]
    pub const fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    /// Sets the display name. Empty names are stored as absent.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into()).filter(|n| !n.is_empty());
        self
    }

    /// Sets the e-mail address. Empty addresses are stored as absent.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into()).filter(|e| !e.is_empty());
        self
    }

    /// Returns the identity to store in the identity context.
    #[must_use]
    pub fn identity(&self) -> ActorIdentity {
        ActorIdentity {
            username: self.username.clone(),
            is_superuser: self.is_superuser,
            is_staff: self.is_staff,
        }
    }
}

impl From<&UserAccount> for ActorIdentity {
    fn from(account: &UserAccount) -> Self {
        account.identity()
    }
}
