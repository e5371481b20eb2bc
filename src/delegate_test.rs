use super::*;
use crate::dom::{MemoryDocument, NodeId};

fn tree() -> (MemoryDocument, NodeId, NodeId, NodeId) {
    let doc = MemoryDocument::new();
    let outer = doc.append(doc.html(), "div");
    doc.set_attribute(outer, "data-b", "");
    let inner = doc.append(outer, "button");
    doc.set_attribute(inner, "data-a", "");
    let leaf = doc.append(inner, "span");
    (doc, outer, inner, leaf)
}

#[test]
fn empty_delegator_never_matches() {
    let (doc, _, _, leaf) = tree();
    let delegator: Delegator<MemoryDocument, &str> = Delegator::new();
    assert!(delegator.is_empty());
    assert_eq!(delegator.dispatch(&doc, &leaf), Dispatch::Unmatched);
}

#[test]
fn descendant_click_reaches_marked_ancestor() {
    let (doc, _, inner, leaf) = tree();
    let mut delegator: Delegator<MemoryDocument, NodeId> = Delegator::new();
    delegator.register(Selector::Attr("data-a"), |_, el| Ok(*el));
    assert_eq!(delegator.dispatch(&doc, &leaf), Dispatch::Handled(inner));
    assert_eq!(delegator.dispatch(&doc, &inner), Dispatch::Handled(inner));
}

#[test]
fn unmarked_click_is_unmatched() {
    let (doc, outer, _, _) = tree();
    let mut delegator: Delegator<MemoryDocument, &str> = Delegator::new();
    delegator.register(Selector::Attr("data-a"), |_, _| Ok("a"));
    assert_eq!(delegator.dispatch(&doc, &outer), Dispatch::Unmatched);
    assert_eq!(delegator.dispatch(&doc, &doc.html()), Dispatch::Unmatched);
}

#[test]
fn first_registered_route_wins_when_both_markers_match() {
    let (doc, _, _, leaf) = tree();

    let mut b_first: Delegator<MemoryDocument, &str> = Delegator::new();
    b_first.register(Selector::Attr("data-b"), |_, _| Ok("b"));
    b_first.register(Selector::Attr("data-a"), |_, _| Ok("a"));
    assert_eq!(b_first.dispatch(&doc, &leaf), Dispatch::Handled("b"));

    let mut a_first: Delegator<MemoryDocument, &str> = Delegator::new();
    a_first.register(Selector::Attr("data-a"), |_, _| Ok("a"));
    a_first.register(Selector::Attr("data-b"), |_, _| Ok("b"));
    assert_eq!(a_first.len(), 2);
    assert_eq!(a_first.dispatch(&doc, &leaf), Dispatch::Handled("a"));
}

#[test]
fn handler_failure_stops_dispatch() {
    let (doc, _, _, leaf) = tree();
    let mut delegator: Delegator<MemoryDocument, &str> = Delegator::new();
    delegator.register(Selector::Attr("data-a"), |_, _| {
        Err(BootError::MissingElement(".x".to_owned()))
    });
    delegator.register(Selector::Attr("data-b"), |_, _| Ok("b"));
    assert_eq!(
        delegator.dispatch(&doc, &leaf),
        Dispatch::Failed(BootError::MissingElement(".x".to_owned()))
    );
}
