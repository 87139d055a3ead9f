pub mod client_wrapper;
pub mod components;
pub mod config;
pub mod guard;
pub mod navigation;
pub mod provider;
pub mod routes;
pub mod session;
pub mod storage;

pub use client_wrapper::{AuthorizedClient, RequestOutcome};
pub use components::{ProtectedRoute, SessionContext, SessionProvider, Spinner, use_session};
pub use config::{AuthConfig, build_config};
pub use guard::{GuardDecision, RouteGuardConfig, evaluate};
pub use navigation::{ReturnTo, RouteNavigator};
pub use provider::{IdentityProvider, ProviderError, TokenProvider};
pub use routes::{AppRoute, landing_route};
pub use session::{ListenerId, SessionSnapshot, SessionStatus, SessionStore};
pub use storage::{BrowserStorage, MemoryStorage, SessionStorage, StorageError};
