//! Authentication API client methods

use super::{ClientError, StorefrontClient};
use crate::types::{
    AuthResponse, LoginRequest, ProviderTokenRequest, RefreshTokenResponse, RegisterRequest,
    VerifyTokenResponse,
};
use reqwest::Method;

impl StorefrontClient {
    /// Exchange email and password for a session token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(Method::POST, "/users/login", None)
            .json(request);
        self.execute(req).await
    }

    /// Create an account; the backend opens a session for it
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(Method::POST, "/users/signup", None)
            .json(request);
        self.execute(req).await
    }

    /// Exchange an identity-provider token for a session token
    pub async fn exchange_provider_token(
        &self,
        request: &ProviderTokenRequest,
    ) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(Method::POST, "/users/google-auth", None)
            .json(request);
        self.execute(req).await
    }

    /// Invalidate the token server-side
    pub async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/users/logout", Some(token));
        let _: serde_json::Value = self.execute(req).await?;
        Ok(())
    }

    /// Ask the backend whether a stored token is still good
    pub async fn verify_token(&self, token: &str) -> Result<VerifyTokenResponse, ClientError> {
        let req = self.request(Method::GET, "/users/verify-token", Some(token));
        self.execute(req).await
    }

    /// Trade the current (possibly rejected) token for a new one
    pub async fn refresh_token(
        &self,
        token: Option<&str>,
    ) -> Result<RefreshTokenResponse, ClientError> {
        let req = self.request(Method::POST, "/users/refresh-token", token);
        self.execute(req).await
    }
}
