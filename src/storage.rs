//! Origin-scoped key-value persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! Theme preference lives in `localStorage`; developer settings and the
//! long-poll fallback marker live in `sessionStorage`. Both are reached through
//! [`KeyValueStore`] so callers can degrade to in-session behavior when the
//! browser blocks storage.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort: [`read_best_effort`] and [`write_best_effort`]
//! swallow failures after logging them at debug level.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::BootError;

/// Single-key atomic string storage.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Fails when the store is unavailable or the read is rejected.
    fn get(&self, key: &str) -> Result<Option<String>, BootError>;

    /// # Errors
    ///
    /// Fails when the store is unavailable or the write is rejected.
    fn set(&self, key: &str, value: &str) -> Result<(), BootError>;

    /// # Errors
    ///
    /// Fails when the store is unavailable.
    fn remove(&self, key: &str) -> Result<(), BootError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, BootError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BootError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BootError> {
        (**self).remove(key)
    }
}

/// Read `key`, treating any failure as "unset".
pub fn read_best_effort<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("storage read of {key} skipped: {e}");
            None
        }
    }
}

/// Write `key`, dropping the write on failure. Returns whether it persisted.
pub fn write_best_effort<S: KeyValueStore + ?Sized>(store: &S, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("storage write of {key} dropped: {e}");
            false
        }
    }
}

/// Remove `key`, ignoring failures. Returns whether the store accepted it.
pub fn remove_best_effort<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("storage removal of {key} dropped: {e}");
            false
        }
    }
}

/// Process-local store used by tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with one entry.
    #[must_use]
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, BootError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BootError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BootError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// A store that behaves like storage disabled by browser policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, BootError> {
        Err(BootError::StorageUnavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), BootError> {
        Err(BootError::StorageUnavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), BootError> {
        Err(BootError::StorageUnavailable)
    }
}

/// Which browser storage area a [`WebStorage`] targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageArea {
    /// Survives reloads and browser restarts.
    Local,
    /// Lives for the browser tab's session.
    Session,
}

/// `window.localStorage` / `window.sessionStorage`.
///
/// The storage object is resolved on every call; accessing it throws when
/// the user has disabled site data, which maps to `StorageUnavailable`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug)]
pub struct WebStorage {
    area: StorageArea,
}

#[cfg(feature = "hydrate")]
impl WebStorage {
    #[must_use]
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    fn storage(&self) -> Result<web_sys::Storage, BootError> {
        let window = web_sys::window().ok_or(BootError::NoWindow)?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        match storage {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) | Err(_) => Err(BootError::StorageUnavailable),
        }
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, BootError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| BootError::Storage(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BootError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| BootError::Storage(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), BootError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| BootError::Storage(format!("{e:?}")))
    }
}
