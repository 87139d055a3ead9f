//! Roles, session users and the credential forms that open a session

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{AuthError, ValidationErrors};
use crate::validation::{validate_email_address, validate_phone_number};

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Privilege level of the current visitor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    User,
    Supplier,
    Admin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Guest, Self::User, Self::Supplier, Self::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "user" | "customer" => Ok(Self::User),
            "supplier" => Ok(Self::Supplier),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Supplier onboarding state, tracked separately from the role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown approval status: {other}")),
        }
    }
}

/// Identity of the logged-in user as persisted under `userData`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Supplier check; with `approved_only` the account must also be approved
    pub fn is_supplier(&self, approved_only: bool) -> bool {
        self.role == Role::Supplier
            && (!approved_only || self.approval_status == Some(ApprovalStatus::Approved))
    }
}

/// Authenticated identity plus the bearer token backing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
    /// Token expiry as epoch milliseconds
    pub expires_at_ms: i64,
}

impl Session {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

/// Email/password login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Shape check only; the backend decides whether the pair is correct
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::Validation(ValidationErrors::message(
                "Email and password are required",
            )));
        }
        Ok(())
    }
}

/// Sign-up form for customers and suppliers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub role: Role,
    pub terms_accepted: bool,
}

impl Registration {
    /// Run every form check and report all failing fields at once
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut errors = ValidationErrors::default();

        if !self.terms_accepted {
            errors.add(
                "terms",
                "You must accept the Terms & Conditions to continue.",
            );
        }
        if self.name.trim().is_empty() {
            errors.add("name", "Please enter your name.");
        }
        if !validate_email_address(&self.email) {
            errors.add("email", "Please enter a valid email address.");
        }
        if self.password.chars().count() < 8 {
            errors.add("password", "Password must be at least 8 characters long.");
        }
        if !validate_phone_number(&self.phone_number) {
            errors.add(
                "phoneNumber",
                "Please enter a valid phone number (10-15 digits).",
            );
        }
        if !matches!(self.role, Role::User | Role::Supplier) {
            errors.add("role", "Accounts can only register as customer or supplier.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(status: Option<ApprovalStatus>) -> SessionUser {
        SessionUser {
            user_id: "s-1".into(),
            display_name: "Acme".into(),
            email: "acme@example.com".into(),
            role: Role::Supplier,
            approval_status: status,
        }
    }

    #[test]
    fn role_parses_backend_spellings() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("customer".parse::<Role>(), Ok(Role::User));
        assert_eq!(" supplier ".parse::<Role>(), Ok(Role::Supplier));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn supplier_approval_gate() {
        assert!(supplier(Some(ApprovalStatus::Approved)).is_supplier(true));
        assert!(supplier(Some(ApprovalStatus::Pending)).is_supplier(false));
        assert!(!supplier(Some(ApprovalStatus::Pending)).is_supplier(true));
        assert!(!supplier(None).is_supplier(true));
    }

    #[test]
    fn session_user_uses_camel_case_keys() {
        let json = serde_json::to_value(supplier(Some(ApprovalStatus::Pending))).unwrap();
        assert_eq!(json["userId"], "s-1");
        assert_eq!(json["approvalStatus"], "pending");
        assert_eq!(json["role"], "supplier");
    }

    #[test]
    fn session_expiry_is_inclusive() {
        let session = Session {
            user: supplier(None),
            token: "t".into(),
            expires_at_ms: 1_000,
        };
        assert!(!session.is_expired_at(999));
        assert!(session.is_expired_at(1_000));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let err = Credentials::new("  ", "secret").validate().unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
        assert!(Credentials::new("a@b.com", "short").validate().is_ok());
    }

    #[test]
    fn registration_reports_every_failing_field() {
        let registration = Registration {
            name: "Jane".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            phone_number: "(555) 123".into(),
            role: Role::User,
            terms_accepted: true,
        };

        let Err(AuthError::Validation(errors)) = registration.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.field("email").is_some());
        assert!(errors.field("password").is_some());
        assert!(errors.field("phoneNumber").is_some());
        assert!(errors.field("terms").is_none());
    }

    #[test]
    fn valid_registration_passes() {
        let registration = Registration {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            password: "long-enough".into(),
            phone_number: "+1 (555) 123-4567".into(),
            role: Role::Supplier,
            terms_accepted: true,
        };
        assert!(registration.validate().is_ok());
    }
}
