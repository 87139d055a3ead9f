//! Session store: the single owner of the token and the logged-in user

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use storefront_core::{
    AuthError, Credentials, Registration, Session, SessionUser, StorefrontConfig, now_millis,
};
use storefront_http::StorefrontClient;
use storefront_http::types::{AuthResponse, LoginRequest, ProviderTokenRequest, RegisterRequest};
use tracing::{debug, info, warn};

use super::state::{SessionSnapshot, SessionStatus};
use crate::navigation::RouteNavigator;
use crate::provider::{IdentityProvider, ProviderError};
use crate::routes::AppRoute;
use crate::storage::{self, SessionStorage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Default)]
struct State {
    snapshot: SessionSnapshot,
    token: Option<String>,
    expires_at_ms: Option<i64>,
    /// Bumped on every session transition; lets an in-flight restore notice
    /// that it has been overtaken
    generation: u64,
}

struct Inner {
    client: StorefrontClient,
    storage: Rc<dyn SessionStorage>,
    navigator: RefCell<Option<Rc<dyn RouteNavigator>>>,
    token_ttl_ms: i64,
    state: RefCell<State>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

/// Cheaply cloneable handle to the session.
///
/// Single-threaded: no `RefCell` borrow is held across an `.await`, and
/// listeners run after the state borrow is released.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("base_url", &self.inner.client.base_url())
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(
        client: StorefrontClient,
        storage: Rc<dyn SessionStorage>,
        config: &StorefrontConfig,
    ) -> Self {
        let token_ttl_ms = i64::try_from(config.token_ttl().as_millis()).unwrap_or(i64::MAX);
        Self {
            inner: Rc::new(Inner {
                client,
                storage,
                navigator: RefCell::new(None),
                token_ttl_ms,
                state: RefCell::new(State::default()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    pub fn with_navigator(self, navigator: Rc<dyn RouteNavigator>) -> Self {
        self.attach_navigator(navigator);
        self
    }

    pub fn attach_navigator(&self, navigator: Rc<dyn RouteNavigator>) {
        *self.inner.navigator.borrow_mut() = Some(navigator);
    }

    pub fn client(&self) -> &StorefrontClient {
        &self.inner.client
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().snapshot.clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Drop every subscriber and the navigator
    pub fn teardown(&self) {
        self.inner.listeners.borrow_mut().clear();
        self.inner.navigator.borrow_mut().take();
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    /// Expiry of the in-memory token, epoch milliseconds
    pub fn token_expires_at(&self) -> Option<i64> {
        self.inner.state.borrow().expires_at_ms
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner.state.borrow().snapshot.user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().snapshot.is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().snapshot.is_admin()
    }

    pub fn is_supplier(&self, approved_only: bool) -> bool {
        self.inner.state.borrow().snapshot.is_supplier(approved_only)
    }

    /// Checks durable storage only: a token with an expiry still in the future
    pub fn is_authenticated(&self) -> bool {
        storage::has_unexpired_token(self.inner.storage.as_ref(), now_millis())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if let Err(err) = credentials.validate() {
            return Err(self.record_error(err));
        }

        debug!(email = %credentials.email, "Logging in");
        let request = LoginRequest {
            email: credentials.email.trim().to_string(),
            password: credentials.password.clone(),
        };

        match self.inner.client.login(&request).await {
            Ok(response) => self.open_session(response),
            Err(err) => Err(self.record_error(err.into())),
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session, AuthError> {
        if let Err(err) = registration.validate() {
            return Err(self.record_error(err));
        }

        debug!(email = %registration.email, role = %registration.role, "Registering");
        let request = RegisterRequest {
            name: registration.name.trim().to_string(),
            email: registration.email.trim().to_string(),
            password: registration.password.clone(),
            phone_number: registration.phone_number.clone(),
            role: registration.role.as_str().to_string(),
        };

        match self.inner.client.register(&request).await {
            Ok(response) => self.open_session(response),
            Err(err) => Err(self.record_error(err.into())),
        }
    }

    pub async fn login_with_provider(
        &self,
        provider: &dyn IdentityProvider,
    ) -> Result<Session, AuthError> {
        let token = match provider.sign_in().await {
            Ok(token) => token,
            Err(ProviderError::Cancelled) => {
                return Err(self.record_error(AuthError::ProviderAuthCancelled));
            }
            Err(ProviderError::Failed(message)) => {
                warn!("Identity provider sign-in failed: {message}");
                return Err(self.record_error(AuthError::NetworkOrServer(message)));
            }
        };

        match self
            .inner
            .client
            .exchange_provider_token(&ProviderTokenRequest { token })
            .await
        {
            Ok(response) => self.open_session(response),
            Err(err) => Err(self.record_error(err.into())),
        }
    }

    /// Best-effort server logout, then local cleanup regardless of the outcome
    pub async fn logout(&self) {
        let token = self.token().or_else(|| {
            storage::load_session(self.inner.storage.as_ref()).map(|persisted| persisted.token)
        });
        if let Some(token) = token
            && let Err(e) = self.inner.client.logout(&token).await
        {
            warn!("Server logout failed, clearing local session anyway: {e}");
        }
        self.end_session("logout");
    }

    /// Local cleanup without contacting the server
    pub fn force_logout(&self) {
        self.end_session("forced logout");
    }

    /// Re-establish the session from durable storage.
    ///
    /// Fails closed: anything other than a positive verification leaves the
    /// visitor logged out with storage cleared.
    pub async fn restore_session(&self) -> SessionStatus {
        let persisted = storage::load_session(self.inner.storage.as_ref());
        let now = now_millis();

        let (persisted, user) = match persisted {
            Some(persisted) if !persisted.is_expired_at(now) => match persisted.user.clone() {
                Some(user) => (persisted, user),
                None => {
                    debug!("Stored token has no user attached");
                    return self.restore_failed();
                }
            },
            Some(_) => {
                debug!("Stored token has expired");
                return self.restore_failed();
            }
            None => return self.restore_failed(),
        };

        let generation = self.inner.state.borrow().generation;
        let verified = self.inner.client.verify_token(&persisted.token).await;

        if self.inner.state.borrow().generation != generation {
            debug!("Session changed while verifying the stored token, dropping result");
            return self.inner.state.borrow().snapshot.status;
        }

        match verified {
            Ok(response) if response.valid => {
                let (token, expires_at_ms) = match response.new_token {
                    Some(new_token) => {
                        let expires_at_ms = now_millis() + self.inner.token_ttl_ms;
                        if let Err(e) = storage::persist_token(
                            self.inner.storage.as_ref(),
                            &new_token,
                            expires_at_ms,
                        ) {
                            warn!("Failed to persist rotated token: {e}");
                        }
                        (new_token, expires_at_ms)
                    }
                    // load_session only yields an unexpired entry when the expiry is set
                    None => (persisted.token, persisted.expires_at_ms.unwrap_or(now)),
                };

                info!(user_id = %user.user_id, role = %user.role, "Session restored");
                self.transition(|state| {
                    state.token = Some(token);
                    state.expires_at_ms = Some(expires_at_ms);
                    state.snapshot = SessionSnapshot {
                        status: SessionStatus::Authenticated,
                        user: Some(user),
                        loading: false,
                        error: None,
                    };
                });
                SessionStatus::Authenticated
            }
            Ok(_) => {
                info!("Stored token was rejected by the server");
                self.restore_failed()
            }
            Err(e) => {
                warn!("Token verification failed: {e}");
                self.restore_failed()
            }
        }
    }

    /// Counter bumped on every session transition, including token refreshes
    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    /// Adopt a token handed out by the refresh endpoint.
    ///
    /// `generation` is the value read before the refresh started. The token is
    /// dropped, and `false` returned, when the session has moved on since then
    /// or is no longer authenticated.
    pub fn apply_refreshed_token(
        &self,
        token: String,
        expires_in_secs: Option<u64>,
        generation: u64,
    ) -> bool {
        {
            let state = self.inner.state.borrow();
            if state.generation != generation
                || state.snapshot.status != SessionStatus::Authenticated
            {
                debug!("Session changed during token refresh, discarding new token");
                return false;
            }
        }

        let expires_at_ms = self.expiry_from(expires_in_secs);
        if let Err(e) =
            storage::persist_token(self.inner.storage.as_ref(), &token, expires_at_ms)
        {
            warn!("Failed to persist refreshed token: {e}");
        }

        let mut state = self.inner.state.borrow_mut();
        state.token = Some(token);
        state.expires_at_ms = Some(expires_at_ms);
        state.generation += 1;
        debug!("Adopted refreshed token");
        true
    }

    fn open_session(&self, response: AuthResponse) -> Result<Session, AuthError> {
        let Some(token) = response.token.filter(|t| !t.is_empty()) else {
            return Err(self.record_error(AuthError::NetworkOrServer(
                "The server did not return a session token.".into(),
            )));
        };
        let Some(user) = response.user else {
            return Err(self.record_error(AuthError::NetworkOrServer(
                "The server did not return the user profile.".into(),
            )));
        };

        let session = Session {
            user: user.into_session_user(),
            token,
            expires_at_ms: self.expiry_from(response.expires_in),
        };

        if let Err(e) = storage::persist_session(self.inner.storage.as_ref(), &session) {
            warn!("Failed to persist session: {e}");
        }

        info!(
            user_id = %session.user.user_id,
            role = %session.user.role,
            "Logged in"
        );
        self.transition(|state| {
            state.token = Some(session.token.clone());
            state.expires_at_ms = Some(session.expires_at_ms);
            state.snapshot = SessionSnapshot {
                status: SessionStatus::Authenticated,
                user: Some(session.user.clone()),
                loading: false,
                error: None,
            };
        });

        Ok(session)
    }

    fn end_session(&self, reason: &str) {
        storage::clear_session(self.inner.storage.as_ref());
        self.set_unauthenticated();
        info!(reason, "Session ended");
        self.navigate(&AppRoute::Login);
    }

    fn restore_failed(&self) -> SessionStatus {
        storage::clear_session(self.inner.storage.as_ref());
        self.set_unauthenticated();
        SessionStatus::Unauthenticated
    }

    fn set_unauthenticated(&self) {
        self.transition(|state| {
            state.token = None;
            state.expires_at_ms = None;
            state.snapshot = SessionSnapshot {
                status: SessionStatus::Unauthenticated,
                user: None,
                loading: false,
                error: None,
            };
        });
    }

    fn expiry_from(&self, expires_in_secs: Option<u64>) -> i64 {
        let lifetime_ms = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map_or(self.inner.token_ttl_ms, |secs| secs.saturating_mul(1000));
        now_millis().saturating_add(lifetime_ms)
    }

    /// Store the error on the snapshot without touching the session itself
    fn record_error(&self, err: AuthError) -> AuthError {
        debug!("Authentication failed: {err}");
        self.inner.state.borrow_mut().snapshot.error = Some(err.clone());
        self.notify();
        err
    }

    fn transition(&self, apply: impl FnOnce(&mut State)) {
        {
            let mut state = self.inner.state.borrow_mut();
            apply(&mut state);
            state.generation += 1;
        }
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn navigate(&self, route: &AppRoute) {
        let navigator = self.inner.navigator.borrow().clone();
        match navigator {
            Some(navigator) => navigator.navigate(route),
            None => debug!(to = %route, "No navigator attached, skipping navigation"),
        }
    }
}
