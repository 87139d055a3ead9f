//! Authorized client that refreshes an expired token once and retries

use serde::de::DeserializeOwned;
use storefront_http::client::{ClientError, PendingRequest};
use storefront_http::types::{
    Category, CategoryInput, DashboardStats, Order, OrderStatusUpdate, Product, ProductInput,
    Supplier, UserPayload, UserUpdate,
};
use tracing::{debug, warn};

use crate::session::SessionStore;

/// Result of a request sent through [`AuthorizedClient::send`]
#[derive(Debug)]
pub enum RequestOutcome<T> {
    Success(T),
    /// Succeeded after one token refresh
    RetriedSuccess(T),
    /// Failed without touching the token
    Failed(ClientError),
    /// Failed during or after the refresh-and-retry round
    FailedAfterRetry(ClientError),
}

impl<T> RequestOutcome<T> {
    pub fn was_retried(&self) -> bool {
        matches!(self, Self::RetriedSuccess(_) | Self::FailedAfterRetry(_))
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Self::Success(value) | Self::RetriedSuccess(value) => Ok(value),
            Self::Failed(err) | Self::FailedAfterRetry(err) => Err(err),
        }
    }
}

/// Wrapper around the session's client that attaches the bearer token and
/// handles a rejected token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizedClient {
    session: SessionStore,
}

impl AuthorizedClient {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send with the current token. On a 401 the token is refreshed exactly
    /// once and the request re-issued; a failed refresh or a second 401 logs
    /// the session out.
    ///
    /// A session that changes while the request is in flight is never
    /// overwritten: after a logout the request fails without a retry, and
    /// after a concurrent refresh it is re-sent with the rotated token.
    pub async fn send<T: DeserializeOwned>(&self, request: &PendingRequest) -> RequestOutcome<T> {
        let client = self.session.client();
        let generation = self.session.generation();
        let token = self.session.token();

        let error = match client.send(request, token.as_deref()).await {
            Ok(value) => return RequestOutcome::Success(value),
            Err(err) if !err.is_unauthorized() => return RequestOutcome::Failed(err),
            Err(err) => err,
        };

        if self.session.generation() != generation {
            return self.resend_with_current(request, error).await;
        }

        debug!(path = %request.path, "Token rejected, refreshing");
        let refreshed = match client.refresh_token(token.as_deref()).await {
            Ok(response) => match response.token.filter(|t| !t.is_empty()) {
                Some(new_token) => {
                    if !self.session.apply_refreshed_token(
                        new_token.clone(),
                        response.expires_in,
                        generation,
                    ) {
                        return self.resend_with_current(request, error).await;
                    }
                    new_token
                }
                None => {
                    if self.session.generation() != generation {
                        return self.resend_with_current(request, error).await;
                    }
                    warn!("Refresh response carried no token, logging out");
                    self.session.force_logout();
                    return RequestOutcome::FailedAfterRetry(error);
                }
            },
            Err(refresh_error) => {
                if self.session.generation() != generation {
                    return self.resend_with_current(request, refresh_error).await;
                }
                warn!("Token refresh failed, logging out: {refresh_error}");
                self.session.force_logout();
                return RequestOutcome::FailedAfterRetry(refresh_error);
            }
        };

        self.resend(request, &refreshed).await
    }

    /// The session moved on while this request was in flight. Re-send once
    /// with whatever token it holds now, or give up if it has ended.
    async fn resend_with_current<T: DeserializeOwned>(
        &self,
        request: &PendingRequest,
        error: ClientError,
    ) -> RequestOutcome<T> {
        match self.session.token() {
            Some(token) if self.session.is_logged_in() => {
                debug!(path = %request.path, "Token rotated elsewhere, retrying with it");
                self.resend(request, &token).await
            }
            _ => {
                debug!(path = %request.path, "Session ended while the request was in flight");
                RequestOutcome::FailedAfterRetry(error)
            }
        }
    }

    async fn resend<T: DeserializeOwned>(
        &self,
        request: &PendingRequest,
        token: &str,
    ) -> RequestOutcome<T> {
        match self.session.client().send(request, Some(token)).await {
            Ok(value) => RequestOutcome::RetriedSuccess(value),
            Err(err) if err.is_unauthorized() => {
                warn!(path = %request.path, "Refreshed token was rejected too, logging out");
                self.session.force_logout();
                RequestOutcome::FailedAfterRetry(err)
            }
            Err(err) => RequestOutcome::FailedAfterRetry(err),
        }
    }

    async fn call<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ClientError> {
        self.send(&request).await.into_result()
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        self.call(PendingRequest::get("/products")).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        self.call(PendingRequest::get(format!("/products/{id}"))).await
    }

    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ClientError> {
        self.call(PendingRequest::get("/search").query("query", query))
            .await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        self.call(PendingRequest::post("/products").json(input)?)
            .await
    }

    pub async fn update_product(
        &self,
        id: &str,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        self.call(PendingRequest::put(format!("/products/{id}")).json(input)?)
            .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>(PendingRequest::delete(format!("/products/{id}")))
            .await
            .map(|_| ())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.call(PendingRequest::get("/categories")).await
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, ClientError> {
        self.call(PendingRequest::get(format!("/categories/{id}")))
            .await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        self.call(PendingRequest::post("/categories").json(input)?)
            .await
    }

    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<Category, ClientError> {
        self.call(PendingRequest::put(format!("/categories/{id}")).json(input)?)
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>(PendingRequest::delete(format!("/categories/{id}")))
            .await
            .map(|_| ())
    }

    pub async fn list_users(&self) -> Result<Vec<UserPayload>, ClientError> {
        self.call(PendingRequest::get("/users")).await
    }

    pub async fn get_user(&self, id: &str) -> Result<UserPayload, ClientError> {
        self.call(PendingRequest::get(format!("/users/{id}"))).await
    }

    pub async fn update_user(
        &self,
        id: &str,
        update: &UserUpdate,
    ) -> Result<UserPayload, ClientError> {
        self.call(PendingRequest::put(format!("/users/{id}")).json(update)?)
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>(PendingRequest::delete(format!("/users/{id}")))
            .await
            .map(|_| ())
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, ClientError> {
        self.call(PendingRequest::get("/suppliers")).await
    }

    pub async fn get_supplier(&self, id: &str) -> Result<Supplier, ClientError> {
        self.call(PendingRequest::get(format!("/suppliers/{id}")))
            .await
    }

    pub async fn approve_supplier(&self, id: &str) -> Result<Supplier, ClientError> {
        self.call(PendingRequest::put(format!("/suppliers/{id}/approve")))
            .await
    }

    pub async fn reject_supplier(&self, id: &str) -> Result<Supplier, ClientError> {
        self.call(PendingRequest::put(format!("/suppliers/{id}/reject")))
            .await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        self.call(PendingRequest::get("/orders")).await
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, ClientError> {
        self.call(PendingRequest::get(format!("/orders/{id}"))).await
    }

    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<Order, ClientError> {
        let update = OrderStatusUpdate {
            status: status.to_string(),
        };
        self.call(PendingRequest::put(format!("/orders/{id}/status")).json(&update)?)
            .await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.call(PendingRequest::get("/analytics/dashboard")).await
    }
}
