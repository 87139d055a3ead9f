//! File-backed session storage for the console

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use storefront_frontend_common::{SessionStorage, StorageError};
use tracing::warn;

pub const SESSION_FILE_NAME: &str = "session.json";

/// Flat JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// An unreadable or corrupt file starts an empty session
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt session file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read session file {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            path,
            items: RefCell::new(items),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let write_error = |message: String| StorageError::Write {
            key: self.path.display().to_string(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&*self.items.borrow())
            .map_err(|e| write_error(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| write_error(e.to_string()))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) {
        let removed = self.items.borrow_mut().remove(key).is_some();
        if removed && let Err(e) = self.flush() {
            warn!("Failed to update session file: {e}");
        }
    }
}
