//! Delegated event dispatch.
//!
//! One listener on the document receives every click. Routes pair a marker
//! selector with a handler and are tried in registration order against the
//! click target's ancestor chain; the first route whose marker matches runs
//! and dispatch stops there.

#[cfg(test)]
#[path = "delegate_test.rs"]
mod delegate_test;

use crate::dom::{Document, Selector};
use crate::error::BootError;

type Handler<D, O> = Box<dyn Fn(&D, &<D as Document>::Element) -> Result<O, BootError>>;

struct Route<D: Document, O> {
    marker: Selector<'static>,
    handler: Handler<D, O>,
}

/// Result of dispatching one event.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<O> {
    /// No route's marker is on the target or its ancestors.
    Unmatched,
    Handled(O),
    /// A route matched but its handler failed.
    Failed(BootError),
}

/// Ordered marker routes for one delegated listener.
pub struct Delegator<D: Document, O> {
    routes: Vec<Route<D, O>>,
}

impl<D: Document, O> Default for Delegator<D, O> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<D: Document, O> Delegator<D, O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Earlier routes take precedence.
    pub fn register<F>(&mut self, marker: Selector<'static>, handler: F)
    where
        F: Fn(&D, &D::Element) -> Result<O, BootError> + 'static,
    {
        self.routes.push(Route {
            marker,
            handler: Box::new(handler),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the first route whose marker is on `target` or an ancestor.
    ///
    /// The handler receives the marked element, not the raw target.
    pub fn dispatch(&self, doc: &D, target: &D::Element) -> Dispatch<O> {
        for route in &self.routes {
            let Some(marked) = doc.closest(target, &route.marker) else {
                continue;
            };
            return match (route.handler)(doc, &marked) {
                Ok(outcome) => Dispatch::Handled(outcome),
                Err(e) => Dispatch::Failed(e),
            };
        }
        Dispatch::Unmatched
    }
}
