//! Storefront core types and utilities

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::StorefrontConfig;
pub use error::{ApiErrorBody, AuthError, ValidationErrors};
pub use types::{
    ApprovalStatus, Credentials, Registration, Role, Session, SessionUser, now_millis,
};
pub use validation::ValidateConfig;
