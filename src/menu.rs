//! Mobile navigation menu: ephemeral open/closed state held in the DOM.
//!
//! Three elements move together: the menu container and the two icons that
//! indicate which state the toggle button will switch to. All three are
//! looked up before any class changes so a missing element never leaves the
//! menu half-toggled.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use crate::consts::{HIDDEN_CLASS, MENU_CLOSED_ICON_CLASS, MENU_CONTAINER_CLASS, MENU_OPEN_ICON_CLASS};
use crate::dom::{Document, Selector};
use crate::error::BootError;

/// Menu visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// The three elements that make up the menu's visible state.
pub struct MenuElements<E> {
    pub container: E,
    pub open_icon: E,
    pub closed_icon: E,
}

impl<E: Clone> MenuElements<E> {
    /// Locate all menu elements.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::MissingElement`] naming the first absent element.
    pub fn locate<D: Document<Element = E>>(doc: &D) -> Result<Self, BootError> {
        Ok(Self {
            container: find(doc, MENU_CONTAINER_CLASS)?,
            open_icon: find(doc, MENU_OPEN_ICON_CLASS)?,
            closed_icon: find(doc, MENU_CLOSED_ICON_CLASS)?,
        })
    }

    /// Current state, read from the container.
    pub fn state<D: Document<Element = E>>(&self, doc: &D) -> MenuState {
        if doc.has_class(&self.container, HIDDEN_CLASS) {
            MenuState::Closed
        } else {
            MenuState::Open
        }
    }

    /// Write `state` to all three elements.
    ///
    /// # Errors
    ///
    /// Propagates class-list failures from the document.
    pub fn show<D: Document<Element = E>>(&self, doc: &D, state: MenuState) -> Result<(), BootError> {
        let open = state == MenuState::Open;
        doc.set_class(&self.container, HIDDEN_CLASS, !open)?;
        doc.set_class(&self.open_icon, HIDDEN_CLASS, !open)?;
        doc.set_class(&self.closed_icon, HIDDEN_CLASS, open)?;
        Ok(())
    }
}

fn find<D: Document>(doc: &D, class: &str) -> Result<D::Element, BootError> {
    doc.query(&Selector::Class(class))
        .ok_or_else(|| BootError::MissingElement(Selector::Class(class).to_css()))
}

/// Flip the menu. Returns the new state.
///
/// # Errors
///
/// Returns [`BootError::MissingElement`] when any menu element is absent;
/// nothing is modified in that case.
pub fn toggle<D: Document>(doc: &D) -> Result<MenuState, BootError> {
    let elements = MenuElements::locate(doc)?;
    let next = elements.state(doc).flipped();
    elements.show(doc, next)?;
    log::debug!("mobile menu {next:?}");
    Ok(next)
}
