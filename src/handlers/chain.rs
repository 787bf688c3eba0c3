//! # Multicast handler chains.
//!
//! [`HandlerChain`] is an ordered list of elementary [`Handler`]s passed to a single
//! subscribe or unsubscribe call. The event source always applies the chain element by
//! element, in order, as one batch under its registry lock.
//!
//! Anything that converts into a chain is accepted: a single `Handler`, a `Vec<Handler>`,
//! an iterator of handlers, or a chain built with [`Handler::then`].

use std::fmt;

use crate::handlers::handler::Handler;

/// Ordered list of elementary handlers.
pub struct HandlerChain<A> {
    handlers: Vec<Handler<A>>,
}

impl<A> HandlerChain<A> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends `next` to the end of the chain.
    #[must_use]
    pub fn then(mut self, next: Handler<A>) -> Self {
        self.handlers.push(next);
        self
    }

    /// Number of elementary handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the chain holds no handler.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates over the elementary handlers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Handler<A>> {
        self.handlers.iter()
    }

    pub(crate) fn as_slice(&self) -> &[Handler<A>] {
        &self.handlers
    }
}

impl<A> Default for HandlerChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for HandlerChain<A> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<A> fmt::Debug for HandlerChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.iter()).finish()
    }
}

impl<A> From<Handler<A>> for HandlerChain<A> {
    fn from(handler: Handler<A>) -> Self {
        Self {
            handlers: vec![handler],
        }
    }
}

impl<A> From<Vec<Handler<A>>> for HandlerChain<A> {
    fn from(handlers: Vec<Handler<A>>) -> Self {
        Self { handlers }
    }
}

impl<A> FromIterator<Handler<A>> for HandlerChain<A> {
    fn from_iter<I: IntoIterator<Item = Handler<A>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

impl<A> IntoIterator for HandlerChain<A> {
    type Item = Handler<A>;
    type IntoIter = std::vec::IntoIter<Handler<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

impl<'a, A> IntoIterator for &'a HandlerChain<A> {
    type Item = &'a Handler<A>;
    type IntoIter = std::slice::Iter<'a, Handler<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.iter()
    }
}
