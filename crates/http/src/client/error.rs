//! Client error types

use storefront_core::{ApiErrorBody, AuthError};
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Server error {status}: {}", summary(.body))]
    Api { status: u16, body: ApiErrorBody },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and raw response body
    pub fn from_status(status: reqwest::StatusCode, raw_body: &str) -> Self {
        Self::Api {
            status: status.as_u16(),
            body: ApiErrorBody::parse(raw_body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 401: the bearer token was rejected
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

fn summary(body: &ApiErrorBody) -> &str {
    body.error
        .as_deref()
        .or(body.message.as_deref())
        .unwrap_or("no details")
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, body } => Self::from_api(status, &body),
            ClientError::Request(err) => {
                tracing::debug!("Auth request did not reach the backend: {err}");
                Self::NetworkOrServer("Unable to reach the server. Please try again.".into())
            }
            ClientError::Serialization(_) => {
                Self::NetworkOrServer("Unexpected response from the server.".into())
            }
            ClientError::Configuration(message) => Self::NetworkOrServer(message),
        }
    }
}
