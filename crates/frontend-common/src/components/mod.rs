mod protected_route;
mod session_provider;
mod spinner;

pub use protected_route::{ProtectedRoute, ProtectedRouteProps};
pub use session_provider::{SessionContext, SessionProvider, SessionProviderProps, use_session};
pub use spinner::LoadingSpinner as Spinner;
