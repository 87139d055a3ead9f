//! Authentication error taxonomy and backend error normalization

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error;

/// Fallback shown when the backend gives no usable message
const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";

/// Closed set of failures surfaced to login and registration forms.
///
/// The `Display` output is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No account found with this email")]
    UserNotFound,

    #[error("Your account is pending approval")]
    AccountNotApproved,

    #[error("This account has been suspended")]
    AccountSuspended,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    NetworkOrServer(String),

    #[error("Login popup was closed - please try again")]
    ProviderAuthCancelled,
}

impl AuthError {
    /// Map a backend error response onto the taxonomy.
    ///
    /// Field-level errors win over the error code, matching what the login
    /// and registration forms display.
    pub fn from_api(status: u16, body: &ApiErrorBody) -> Self {
        let fields = body.field_errors();
        if !fields.is_empty() {
            return Self::Validation(fields);
        }

        match body.code.as_deref() {
            Some("INVALID_CREDENTIALS") => Self::InvalidCredentials,
            Some("USER_NOT_FOUND") => Self::UserNotFound,
            Some("ACCOUNT_NOT_APPROVED") => Self::AccountNotApproved,
            Some("ACCOUNT_SUSPENDED") => Self::AccountSuspended,
            Some("CREDENTIALS_REQUIRED") => Self::Validation(ValidationErrors::message(
                "Email and password are required",
            )),
            _ => {
                let message = body
                    .error
                    .clone()
                    .or_else(|| body.message.clone())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| {
                        if status >= 500 {
                            format!("Server error ({status}). Please try again later.")
                        } else {
                            GENERIC_LOGIN_FAILURE.to_string()
                        }
                    });
                Self::NetworkOrServer(message)
            }
        }
    }

    /// Message for inline display on a form
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Field-level validation failures, keyed by form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Form-wide message used when no single field is at fault
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.fields.is_empty()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str(self.message.as_deref().unwrap_or("Validation failed"));
        }
        let joined = self
            .fields
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// Error payload as the backend sends it.
///
/// Every field is optional; different endpoints fill different ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, alias = "validationErrors")]
    pub errors: Option<JsonValue>,
}

impl ApiErrorBody {
    /// Parse a response body, falling back to treating it as plain text
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(body) => body,
            Err(_) => Self {
                message: Some(raw.trim().to_string()).filter(|m| !m.is_empty()),
                ..Self::default()
            },
        }
    }

    /// Flatten `errors` into field messages.
    ///
    /// Accepts `{field: "msg"}`, `{field: {msg}}` and `[{path|param, msg}]`.
    pub fn field_errors(&self) -> ValidationErrors {
        let mut out = ValidationErrors::default();
        match &self.errors {
            Some(JsonValue::Object(map)) => {
                for (field, value) in map {
                    if let Some(msg) = message_of(value) {
                        out.add(field.clone(), msg);
                    }
                }
            }
            Some(JsonValue::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let field = item
                        .get("path")
                        .or_else(|| item.get("param"))
                        .and_then(JsonValue::as_str)
                        .map_or_else(|| index.to_string(), str::to_string);
                    if let Some(msg) = message_of(item) {
                        out.add(field, msg);
                    }
                }
            }
            _ => {}
        }
        out
    }
}

fn message_of(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(obj) => obj
            .get("msg")
            .or_else(|| obj.get("message"))
            .and_then(JsonValue::as_str)
            .map(str::to_string),
        _ => None,
    }
}
