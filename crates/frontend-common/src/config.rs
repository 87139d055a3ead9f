//! Frontend configuration

use storefront_core::StorefrontConfig;
use storefront_core::config::DEFAULT_API_BASE_URL;

/// Durable storage layout for the session
pub struct AuthConfig;

impl AuthConfig {
    /// Bearer token
    pub const TOKEN_KEY: &'static str = "token";

    /// Token expiry as an epoch-millisecond string
    pub const TOKEN_EXPIRATION_KEY: &'static str = "tokenExpiration";

    /// Serialized session user
    pub const USER_DATA_KEY: &'static str = "userData";

    /// Older builds stored the user under this key; read as a fallback
    pub const LEGACY_USER_KEY: &'static str = "user";

    pub const ROLE_KEY: &'static str = "role";

    pub const ALL_KEYS: [&'static str; 5] = [
        Self::TOKEN_KEY,
        Self::TOKEN_EXPIRATION_KEY,
        Self::USER_DATA_KEY,
        Self::LEGACY_USER_KEY,
        Self::ROLE_KEY,
    ];
}

/// Configuration baked in at build time for the browser bundle
pub fn build_config() -> StorefrontConfig {
    StorefrontConfig::with_base_url(option_env!("STOREFRONT_API_URL").unwrap_or(DEFAULT_API_BASE_URL))
}
