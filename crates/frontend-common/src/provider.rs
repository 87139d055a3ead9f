//! External identity providers (Google sign-in and friends)

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The user closed the sign-in popup
    #[error("Sign-in was cancelled")]
    Cancelled,

    #[error("Identity provider failed: {0}")]
    Failed(String),
}

/// Yields an identity token that the backend can exchange for a session
#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn sign_in(&self) -> Result<String, ProviderError>;
}

/// Provider that already holds a token, e.g. one pasted into the console
#[derive(Debug, Clone)]
pub struct TokenProvider(pub String);

#[async_trait(?Send)]
impl IdentityProvider for TokenProvider {
    async fn sign_in(&self) -> Result<String, ProviderError> {
        if self.0.trim().is_empty() {
            return Err(ProviderError::Failed("identity token is empty".into()));
        }
        Ok(self.0.clone())
    }
}
