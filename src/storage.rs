//! Storage Backends
//!
//! String key-value storage behind a small trait so the progress store can
//! run against `window.localStorage` in the browser and an in-memory map in
//! tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};

use crate::error::StorageError;

/// Synchronous string key-value store (the `Storage` web API shape)
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ========================
// In-memory backend
// ========================

/// Shared in-memory storage.
///
/// Clones see the same entries, which models two page loads over one
/// browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        let entries = self.entries.borrow();
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_bytes_with(key, value) > quota {
                return Err(StorageError::QuotaExceeded { key: key.to_string() });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ========================
// Browser backend
// ========================

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Fails when there is no window or storage is disabled (e.g. blocked cookies)
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        match window.local_storage() {
            Ok(Some(inner)) => Ok(Self { inner }),
            Ok(None) => Err(StorageError::Unavailable("localStorage is null".to_string())),
            Err(err) => Err(StorageError::Unavailable(js_error_message(&err))),
        }
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|err| StorageError::Backend(js_error_message(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|err| write_error(key, &err))
    }
}

fn write_error(key: &str, err: &JsValue) -> StorageError {
    if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
        if exception.name() == "QuotaExceededError" {
            return StorageError::QuotaExceeded { key: key.to_string() };
        }
    }
    StorageError::Backend(js_error_message(err))
}

/// Best-effort text for a thrown JS value
pub(crate) fn js_error_message(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), Some("v".to_string()));

        storage.set_item("k", "w").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), Some("w".to_string()));
    }

    #[test]
    fn test_clones_share_entries() {
        let first = MemoryStorage::new();
        let second = first.clone();
        first.set_item("shared", "1").unwrap();
        assert_eq!(second.get_item("shared").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let storage = MemoryStorage::with_quota(8);
        storage.set_item("k", "1234").unwrap();

        let err = storage.set_item("k", "123456789").unwrap_err();
        assert_eq!(err, StorageError::QuotaExceeded { key: "k".to_string() });
        // Previous value survives
        assert_eq!(storage.get_item("k").unwrap(), Some("1234".to_string()));
    }
}
