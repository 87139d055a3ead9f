//! Read-only view of the session handed to guards and views

use storefront_core::{AuthError, Role, SessionUser};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Restoration has not settled yet
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Session state data
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
    pub loading: bool,
    pub error: Option<AuthError>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
            loading: true, // Start with loading until restore settles
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn is_logged_in(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Role of the visitor; guests when nobody is logged in
    pub fn role(&self) -> Role {
        match (&self.user, self.is_logged_in()) {
            (Some(user), true) => user.role,
            _ => Role::Guest,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn is_supplier(&self, approved_only: bool) -> bool {
        self.is_logged_in()
            && self
                .user
                .as_ref()
                .is_some_and(|user| user.is_supplier(approved_only))
    }
}
