//! Durable key/value storage for the session

use std::cell::RefCell;
use std::collections::HashMap;
use storefront_core::{Session, SessionUser};
use thiserror::Error;
use tracing::warn;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write '{key}': {message}")]
    Write { key: String, message: String },
}

/// String-keyed store that survives a reload
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// In-process storage, for tests and hosts without a browser
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `window.localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("localStorage is not accessible".into()))
    }
}

impl SessionStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::local_storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                message: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) {
        if let Ok(storage) = Self::local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Session fields as read back from storage; any of them may be missing
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PersistedSession {
    pub token: String,
    pub expires_at_ms: Option<i64>,
    pub user: Option<SessionUser>,
}

impl PersistedSession {
    /// A missing expiry counts as expired
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_none_or(|expiry| now_ms >= expiry)
    }
}

pub(crate) fn persist_session(
    storage: &dyn SessionStorage,
    session: &Session,
) -> Result<(), StorageError> {
    let user = serde_json::to_string(&session.user).map_err(|e| StorageError::Write {
        key: AuthConfig::USER_DATA_KEY.to_string(),
        message: e.to_string(),
    })?;

    persist_token(storage, &session.token, session.expires_at_ms)?;
    storage.set(AuthConfig::USER_DATA_KEY, &user)?;
    storage.set(AuthConfig::ROLE_KEY, session.user.role.as_str())?;
    Ok(())
}

pub(crate) fn persist_token(
    storage: &dyn SessionStorage,
    token: &str,
    expires_at_ms: i64,
) -> Result<(), StorageError> {
    storage.set(AuthConfig::TOKEN_KEY, token)?;
    storage.set(AuthConfig::TOKEN_EXPIRATION_KEY, &expires_at_ms.to_string())
}

pub(crate) fn load_session(storage: &dyn SessionStorage) -> Option<PersistedSession> {
    let token = storage
        .get(AuthConfig::TOKEN_KEY)
        .filter(|t| !t.is_empty())?;
    let expires_at_ms = storage
        .get(AuthConfig::TOKEN_EXPIRATION_KEY)
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    let user = storage
        .get(AuthConfig::USER_DATA_KEY)
        .or_else(|| storage.get(AuthConfig::LEGACY_USER_KEY))
        .and_then(|raw| match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Failed to parse stored user data: {e}");
                None
            }
        });

    Some(PersistedSession {
        token,
        expires_at_ms,
        user,
    })
}

pub(crate) fn clear_session(storage: &dyn SessionStorage) {
    for key in AuthConfig::ALL_KEYS {
        storage.remove(key);
    }
}

/// Token and a future expiry are both present; no network involved
pub fn has_unexpired_token(storage: &dyn SessionStorage, now_ms: i64) -> bool {
    load_session(storage).is_some_and(|persisted| !persisted.is_expired_at(now_ms))
}
