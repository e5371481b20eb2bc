use super::*;
use crate::dom::{MemoryDocument, NodeId};

struct Page {
    doc: MemoryDocument,
    menu: NodeId,
    open_icon: NodeId,
    closed_icon: NodeId,
}

/// Closed menu as rendered by the server.
fn page() -> Page {
    let doc = MemoryDocument::new();
    let body = doc.append(doc.html(), "body");
    let button = doc.append(body, "button");
    doc.set_attribute(button, "data-toggle-mobile-menu", "");
    let open_icon = doc.append(button, "svg");
    doc.add_class(open_icon, "mobile-menu-open");
    doc.add_class(open_icon, "hidden");
    let closed_icon = doc.append(button, "svg");
    doc.add_class(closed_icon, "mobile-menu-closed");
    let menu = doc.append(body, "nav");
    doc.add_class(menu, "mobile-menu");
    doc.add_class(menu, "hidden");
    Page {
        doc,
        menu,
        open_icon,
        closed_icon,
    }
}

fn consistent(p: &Page) -> bool {
    let menu_hidden = p.doc.has_class(&p.menu, "hidden");
    let open_hidden = p.doc.has_class(&p.open_icon, "hidden");
    let closed_hidden = p.doc.has_class(&p.closed_icon, "hidden");
    menu_hidden == open_hidden && open_hidden != closed_hidden
}

#[test]
fn menu_state_default_is_closed() {
    assert_eq!(MenuState::default(), MenuState::Closed);
    assert_eq!(MenuState::Closed.flipped(), MenuState::Open);
    assert_eq!(MenuState::Open.flipped(), MenuState::Closed);
}

#[test]
fn toggle_opens_then_closes_all_three() {
    let p = page();
    assert!(consistent(&p));

    assert_eq!(toggle(&p.doc), Ok(MenuState::Open));
    assert!(!p.doc.has_class(&p.menu, "hidden"));
    assert!(!p.doc.has_class(&p.open_icon, "hidden"));
    assert!(p.doc.has_class(&p.closed_icon, "hidden"));
    assert!(consistent(&p));

    assert_eq!(toggle(&p.doc), Ok(MenuState::Closed));
    assert!(p.doc.has_class(&p.menu, "hidden"));
    assert!(p.doc.has_class(&p.open_icon, "hidden"));
    assert!(!p.doc.has_class(&p.closed_icon, "hidden"));
    assert!(consistent(&p));
}

#[test]
fn toggle_repairs_inconsistent_icons_from_container_state() {
    let p = page();
    // Icons out of sync with a closed container.
    p.doc.add_class(p.closed_icon, "hidden");
    assert_eq!(toggle(&p.doc), Ok(MenuState::Open));
    assert!(consistent(&p));
}

#[test]
fn missing_icon_fails_without_partial_update() {
    let doc = MemoryDocument::new();
    let menu = doc.append(doc.html(), "nav");
    doc.add_class(menu, "mobile-menu");
    doc.add_class(menu, "hidden");
    let open_icon = doc.append(doc.html(), "svg");
    doc.add_class(open_icon, "mobile-menu-open");
    doc.add_class(open_icon, "hidden");

    assert_eq!(
        toggle(&doc),
        Err(BootError::MissingElement(".mobile-menu-closed".to_owned()))
    );
    assert!(doc.has_class(&menu, "hidden"));
    assert!(doc.has_class(&open_icon, "hidden"));
}

#[test]
fn missing_container_is_reported_first() {
    let doc = MemoryDocument::new();
    assert_eq!(toggle(&doc), Err(BootError::MissingElement(".mobile-menu".to_owned())));
}
