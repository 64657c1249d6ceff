//! Mock actors for audit tests.
//!
//! [`MockUser`] builds [`UserAccount`] values for authentication hooks and
//! request middleware, and [`ActorIdentity`] values for the identity context.
//!
//! # Examples
//!
//! ```rust
//! use custos_test::MockUser;
//!
//! let admin = MockUser::admin();
//! assert!(admin.is_superuser);
//!
//! let editor = MockUser::new("editor")
//!     .with_staff(true)
//!     .with_email("editor@example.com")
//!     .build();
//! assert_eq!(editor.email.as_deref(), Some("editor@example.com"));
//! ```

use custos_core::{ActorIdentity, UserAccount};

/// Builder for mock user accounts.
#[derive(Debug, Clone)]
pub struct MockUser {
    username: String,
    is_superuser: bool,
    is_staff: bool,
    full_name: Option<String>,
    email: Option<String>,
}

impl MockUser {
    /// Creates a builder for a regular user.
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

    /// A superuser named "mock-admin".
    #[must_use]
    pub fn admin() -> UserAccount {
        Self::new("mock-admin")
            .with_superuser(true)
            .with_staff(true)
            .with_full_name("Mock Admin")
            .with_email("admin@example.com")
            .build()
    }

    /// A staff user named "mock-staff".
    #[must_use]
    pub fn staff() -> UserAccount {
        Self::new("mock-staff").with_staff(true).build()
    }

    /// A regular user named "mock-user".
    #[must_use]
    pub fn regular() -> UserAccount {
        Self::new("mock-user").build()
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

    /// Sets the full name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Sets the e-mail address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builds the [`UserAccount`].
    #[must_use]
    pub fn build(self) -> UserAccount {
        let mut account = UserAccount::new(self.username)
            .with_superuser(self.is_superuser)
            .with_staff(self.is_staff);
        if let Some(full_name) = self.full_name {
            account = account.with_full_name(full_name);
        }
        if let Some(email) = self.email {
            account = account.with_email(email);
        }
        account
    }

    /// Builds the [`ActorIdentity`] stored in the identity context.
    #[must_use]
    pub fn actor(self) -> ActorIdentity {
        self.build().identity()
    }
}
