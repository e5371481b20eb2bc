//! Theme preference: persisted dark/light flag reflected as a root class.
//!
//! The `<html>` element's `dark` class is the source of truth during a
//! session; `localStorage` only seeds it at startup and records toggles.
//!
//! TRADE-OFFS
//! ==========
//! Any stored value other than the literal `"false"` resolves to dark,
//! including corrupted data. Dark is the default experience, so unreadable
//! state lands on it.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use crate::consts::{DARK_CLASS, THEME_STORAGE_KEY};
use crate::dom::Document;
use crate::error::BootError;
use crate::storage::{KeyValueStore, read_best_effort, write_best_effort};

/// What the store holds for the theme key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredTheme {
    Unset,
    Dark,
    Light,
    /// Something other than `"true"`/`"false"`.
    Unrecognized(String),
}

impl StoredTheme {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unset,
            Some("true") => Self::Dark,
            Some("false") => Self::Light,
            Some(other) => Self::Unrecognized(other.to_owned()),
        }
    }

    /// Whether the dark theme should be applied.
    #[must_use]
    pub fn resolve(&self) -> bool {
        match self {
            Self::Light => false,
            Self::Unset | Self::Dark => true,
            Self::Unrecognized(raw) => {
                log::debug!("unrecognized theme value {raw:?}, using dark");
                true
            }
        }
    }
}

/// Serialized form written back to the store.
#[must_use]
pub fn encode(dark: bool) -> &'static str {
    if dark { "true" } else { "false" }
}

/// Typed read of the persisted flag. Unavailable storage reads as unset.
pub fn read_stored<S: KeyValueStore + ?Sized>(store: &S) -> StoredTheme {
    StoredTheme::parse(read_best_effort(store, THEME_STORAGE_KEY).as_deref())
}

/// Apply the persisted preference to the root element.
///
/// Returns the applied state.
///
/// # Errors
///
/// Returns [`BootError::MissingElement`] when the document has no root.
pub fn initialize<D, S>(doc: &D, store: &S) -> Result<bool, BootError>
where
    D: Document,
    S: KeyValueStore + ?Sized,
{
    let dark = read_stored(store).resolve();
    apply(doc, dark)?;
    Ok(dark)
}

/// Whether the root element currently carries the dark class.
pub fn is_applied<D: Document>(doc: &D) -> bool {
    doc.root().is_some_and(|root| doc.has_class(&root, DARK_CLASS))
}

/// Set or clear the dark class on the root element.
///
/// # Errors
///
/// Returns [`BootError::MissingElement`] when the document has no root.
pub fn apply<D: Document>(doc: &D, dark: bool) -> Result<(), BootError> {
    let root = doc.root().ok_or_else(|| BootError::MissingElement("html".to_owned()))?;
    doc.set_class(&root, DARK_CLASS, dark)
}

/// Flip the theme and persist the new value.
///
/// Reads the current state from the DOM, not from storage. A failed write
/// leaves the session toggled but not persisted. Returns the new state.
///
/// # Errors
///
/// Returns [`BootError::MissingElement`] when the document has no root.
pub fn toggle<D, S>(doc: &D, store: &S) -> Result<bool, BootError>
where
    D: Document,
    S: KeyValueStore + ?Sized,
{
    let next = !is_applied(doc);
    apply(doc, next)?;
    if !write_best_effort(store, THEME_STORAGE_KEY, encode(next)) {
        log::info!("theme preference not persisted; change applies to this session only");
    }
    Ok(next)
}
