use super::*;
use crate::dom::MemoryDocument;
use crate::storage::{MemoryStore, UnavailableStore};

// =============================================================
// StoredTheme
// =============================================================

#[test]
fn parse_distinguishes_unset_from_values() {
    assert_eq!(StoredTheme::parse(None), StoredTheme::Unset);
    assert_eq!(StoredTheme::parse(Some("true")), StoredTheme::Dark);
    assert_eq!(StoredTheme::parse(Some("false")), StoredTheme::Light);
    assert_eq!(
        StoredTheme::parse(Some("FALSE")),
        StoredTheme::Unrecognized("FALSE".to_owned())
    );
}

#[test]
fn only_explicit_false_resolves_light() {
    assert!(StoredTheme::Unset.resolve());
    assert!(StoredTheme::Dark.resolve());
    assert!(!StoredTheme::Light.resolve());
    assert!(StoredTheme::Unrecognized("garbage".to_owned()).resolve());
    assert!(StoredTheme::Unrecognized(String::new()).resolve());
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_defaults_to_dark_without_stored_value() {
    let doc = MemoryDocument::new();
    let store = MemoryStore::new();
    assert_eq!(initialize(&doc, &store), Ok(true));
    assert!(is_applied(&doc));
}

#[test]
fn initialize_honors_stored_light() {
    let doc = MemoryDocument::new();
    doc.add_class(doc.html(), "dark");
    let store = MemoryStore::with("darkMode", "false");
    assert_eq!(initialize(&doc, &store), Ok(false));
    assert!(!is_applied(&doc));
}

#[test]
fn initialize_with_corrupt_value_lands_on_dark() {
    let doc = MemoryDocument::new();
    let store = MemoryStore::with("darkMode", "{\"dark\":0}");
    assert_eq!(initialize(&doc, &store), Ok(true));
    assert!(is_applied(&doc));
}

#[test]
fn initialize_with_unavailable_store_defaults_to_dark() {
    let doc = MemoryDocument::new();
    assert_eq!(initialize(&doc, &UnavailableStore), Ok(true));
    assert!(is_applied(&doc));
}

// =============================================================
// toggle
// =============================================================

#[test]
fn toggle_flips_class_and_persists() {
    let doc = MemoryDocument::new();
    let store = MemoryStore::new();
    assert_eq!(initialize(&doc, &store), Ok(true));

    assert_eq!(toggle(&doc, &store), Ok(false));
    assert!(!is_applied(&doc));
    assert_eq!(read_stored(&store), StoredTheme::Light);

    assert_eq!(toggle(&doc, &store), Ok(true));
    assert!(is_applied(&doc));
    assert_eq!(read_stored(&store), StoredTheme::Dark);
}

#[test]
fn toggle_twice_restores_original_state() {
    for start in ["true", "false"] {
        let doc = MemoryDocument::new();
        let store = MemoryStore::with("darkMode", start);
        let Ok(initial) = initialize(&doc, &store) else {
            panic!("root exists");
        };

        assert!(toggle(&doc, &store).is_ok());
        assert!(toggle(&doc, &store).is_ok());

        assert_eq!(is_applied(&doc), initial);
        assert_eq!(read_best_effort(&store, "darkMode").as_deref(), Some(start));
    }
}

#[test]
fn toggle_reads_dom_not_storage() {
    let doc = MemoryDocument::new();
    let store = MemoryStore::with("darkMode", "true");
    // Root has no class even though storage says dark.
    assert_eq!(toggle(&doc, &store), Ok(true));
    assert!(is_applied(&doc));
}

#[test]
fn toggle_without_storage_still_updates_session() {
    let doc = MemoryDocument::new();
    let store = UnavailableStore;
    assert_eq!(initialize(&doc, &store), Ok(true));
    assert_eq!(toggle(&doc, &store), Ok(false));
    assert!(!is_applied(&doc));
    assert_eq!(toggle(&doc, &store), Ok(true));
    assert!(is_applied(&doc));
}

#[test]
fn encode_writes_literal_booleans() {
    assert_eq!(encode(true), "true");
    assert_eq!(encode(false), "false");
}
