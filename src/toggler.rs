//! Preference toggler: theme and mobile-menu routes on one delegated listener.
//!
//! Routes are registered theme first, then menu. Markers are disjoint in
//! practice; when a click sits inside both, only the theme route runs.

#[cfg(test)]
#[path = "toggler_test.rs"]
mod toggler_test;

use std::rc::Rc;

use crate::consts::{MENU_TOGGLE_MARKER, THEME_TOGGLE_MARKER};
use crate::delegate::{Delegator, Dispatch};
use crate::dom::{Document, Selector};
use crate::menu::{self, MenuState};
use crate::storage::KeyValueStore;
use crate::theme;

/// State change produced by a click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    /// Theme flipped; `true` means dark is now applied.
    Theme(bool),
    Menu(MenuState),
}

/// Owns the document handle, the preference store, and the click routes.
pub struct PreferenceToggler<D: Document, S: KeyValueStore + ?Sized> {
    doc: D,
    store: Rc<S>,
    routes: Delegator<D, ToggleAction>,
}

impl<D, S> PreferenceToggler<D, S>
where
    D: Document + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    pub fn new(doc: D, store: Rc<S>) -> Self {
        let mut routes: Delegator<D, ToggleAction> = Delegator::new();
        let theme_store = Rc::clone(&store);
        routes.register(Selector::Attr(THEME_TOGGLE_MARKER), move |doc: &D, _| {
            theme::toggle(doc, &*theme_store).map(ToggleAction::Theme)
        });
        routes.register(Selector::Attr(MENU_TOGGLE_MARKER), |doc: &D, _| {
            menu::toggle(doc).map(ToggleAction::Menu)
        });
        Self { doc, store, routes }
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Apply the persisted theme to the root element. Returns whether dark
    /// is applied; a document without a root logs and reports `false`.
    pub fn initialize_theme(&self) -> bool {
        match theme::initialize(&self.doc, &*self.store) {
            Ok(dark) => dark,
            Err(e) => {
                log::error!("theme initialization failed: {e}");
                false
            }
        }
    }

    /// Handle one click anywhere in the document.
    ///
    /// Handler failures are integration defects in the page markup; they are
    /// logged and returned, never raised to the user.
    pub fn on_click(&self, target: &D::Element) -> Dispatch<ToggleAction> {
        let outcome = self.routes.dispatch(&self.doc, target);
        match &outcome {
            Dispatch::Handled(action) => log::debug!("click handled: {action:?}"),
            Dispatch::Failed(e) => log::error!("click handler failed: {e}"),
            Dispatch::Unmatched => {}
        }
        outcome
    }
}

/// Register the document-level click listener for `toggler`.
///
/// The listener lives for the rest of the page.
///
/// # Errors
///
/// Returns [`crate::error::BootError::NoWindow`] outside a browser.
#[cfg(feature = "hydrate")]
pub fn install_click_listener<S>(
    toggler: Rc<PreferenceToggler<crate::dom::WebDocument, S>>,
) -> Result<(), crate::error::BootError>
where
    S: KeyValueStore + ?Sized + 'static,
{
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::Closure;

    use crate::error::BootError;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(BootError::NoWindow)?;
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
        let Some(target) = event.target() else {
            return;
        };
        let Some(element) = target.dyn_ref::<web_sys::Element>() else {
            return;
        };
        toggler.on_click(element);
    });
    document
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| BootError::Dom(format!("click listener: {e:?}")))?;
    closure.forget();
    Ok(())
}
