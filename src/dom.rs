//! The small slice of the DOM the bootstrap touches.
//!
//! DESIGN
//! ======
//! Handlers are written against the [`Document`] trait so they run unchanged
//! on the real page ([`WebDocument`], hydrate only) and on [`MemoryDocument`],
//! an in-process element tree used by tests and native hosts. Selectors are a
//! closed enum rather than free-form CSS so both backends agree on meaning.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::BootError;

/// Selector forms used by the bootstrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector<'a> {
    /// `.name`
    Class(&'a str),
    /// `[name]`
    Attr(&'a str),
    /// `meta[name='value']`
    MetaName(&'a str),
}

impl Selector<'_> {
    /// CSS text for `querySelector` / `closest`.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Class(name) => format!(".{name}"),
            Self::Attr(name) => format!("[{name}]"),
            Self::MetaName(name) => format!("meta[name='{name}']"),
        }
    }
}

/// DOM operations needed by the preference toggler and token discovery.
///
/// Mutation goes through `&self`: like the browser DOM, the document is a
/// shared handle and all writes happen on the single event-loop thread.
pub trait Document {
    type Element: Clone;

    /// The `<html>` element.
    fn root(&self) -> Option<Self::Element>;

    /// First element in document order matching `selector`.
    fn query(&self, selector: &Selector<'_>) -> Option<Self::Element>;

    /// `from` itself or its nearest ancestor matching `selector`.
    fn closest(&self, from: &Self::Element, selector: &Selector<'_>) -> Option<Self::Element>;

    fn attribute(&self, el: &Self::Element, name: &str) -> Option<String>;

    fn has_class(&self, el: &Self::Element, class: &str) -> bool;

    /// Add (`present == true`) or remove `class`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::MissingElement`] when the element handle is stale.
    fn set_class(&self, el: &Self::Element, class: &str, present: bool) -> Result<(), BootError>;
}

/// Handle to a node of a [`MemoryDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

/// In-memory element tree.
///
/// Document order is creation order, which matches source order for trees
/// built top-down.
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: RefCell<Vec<Node>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A document containing only the `<html>` root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![Node {
                tag: "html".to_owned(),
                ..Node::default()
            }]),
        }
    }

    /// The root element handle.
    #[must_use]
    pub fn html(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child element and return its handle.
    pub fn append(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_owned(),
            parent: Some(parent),
            ..Node::default()
        });
        NodeId(nodes.len() - 1)
    }

    pub fn set_attribute(&self, el: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(el.0) {
            node.attrs.insert(name.to_owned(), value.to_owned());
        }
    }

    pub fn add_class(&self, el: NodeId, class: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(el.0) {
            node.classes.insert(class.to_owned());
        }
    }

    fn matches(node: &Node, selector: &Selector<'_>) -> bool {
        match selector {
            Selector::Class(name) => node.classes.contains(*name),
            Selector::Attr(name) => node.attrs.contains_key(*name),
            Selector::MetaName(name) => {
                node.tag == "meta" && node.attrs.get("name").is_some_and(|v| v.as_str() == *name)
            }
        }
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(self.html())
    }

    fn query(&self, selector: &Selector<'_>) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| Self::matches(node, selector))
            .map(NodeId)
    }

    fn closest(&self, from: &NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let mut cursor = Some(*from);
        while let Some(id) = cursor {
            let node = nodes.get(id.0)?;
            if Self::matches(node, selector) {
                return Some(id);
            }
            cursor = node.parent;
        }
        None
    }

    fn attribute(&self, el: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow().get(el.0)?.attrs.get(name).cloned()
    }

    fn has_class(&self, el: &NodeId, class: &str) -> bool {
        self.nodes
            .borrow()
            .get(el.0)
            .is_some_and(|node| node.classes.contains(class))
    }

    fn set_class(&self, el: &NodeId, class: &str, present: bool) -> Result<(), BootError> {
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes
            .get_mut(el.0)
            .ok_or_else(|| BootError::MissingElement(format!("node #{}", el.0)))?;
        if present {
            node.classes.insert(class.to_owned());
        } else {
            node.classes.remove(class);
        }
        Ok(())
    }
}

/// The live browser document.
#[cfg(feature = "hydrate")]
#[derive(Clone, Debug)]
pub struct WebDocument {
    inner: web_sys::Document,
}

#[cfg(feature = "hydrate")]
impl WebDocument {
    /// Wrap the current page's document.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::NoWindow`] outside a browser context.
    pub fn current() -> Result<Self, BootError> {
        let inner = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(BootError::NoWindow)?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "hydrate")]
impl Document for WebDocument {
    type Element = web_sys::Element;

    fn root(&self) -> Option<web_sys::Element> {
        self.inner.document_element()
    }

    fn query(&self, selector: &Selector<'_>) -> Option<web_sys::Element> {
        match self.inner.query_selector(&selector.to_css()) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("querySelector({}) failed: {e:?}", selector.to_css());
                None
            }
        }
    }

    fn closest(&self, from: &web_sys::Element, selector: &Selector<'_>) -> Option<web_sys::Element> {
        match from.closest(&selector.to_css()) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("closest({}) failed: {e:?}", selector.to_css());
                None
            }
        }
    }

    fn attribute(&self, el: &web_sys::Element, name: &str) -> Option<String> {
        el.get_attribute(name)
    }

    fn has_class(&self, el: &web_sys::Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    fn set_class(&self, el: &web_sys::Element, class: &str, present: bool) -> Result<(), BootError> {
        let list = el.class_list();
        let result = if present { list.add_1(class) } else { list.remove_1(class) };
        result.map_err(|e| BootError::Dom(format!("{class}: {e:?}")))
    }
}
