//! # Materialized handlers.
//!
//! A [`StrongHandler`] is the invocable form of a registry entry for a single dispatch pass:
//! the resolved target (if any) plus the open invoker. It holds a strong reference to its
//! target, so the target cannot disappear mid-invocation, and is dropped once the pass ends.

use std::fmt;

use crate::error::HandlerResult;
use crate::handlers::handler::{Invoker, MethodId, Sender, Target};

/// Handler resolved for one dispatch pass.
pub struct StrongHandler<A> {
    target: Option<Target>,
    invoker: Invoker<A>,
    method: MethodId,
    owner: &'static str,
}

impl<A> StrongHandler<A> {
    pub(crate) fn new(
        target: Option<Target>,
        invoker: Invoker<A>,
        method: MethodId,
        owner: &'static str,
    ) -> Self {
        Self {
            target,
            invoker,
            method,
            owner,
        }
    }

    /// Invokes the handler directly.
    pub fn invoke(&self, sender: Sender<'_>, args: &A) -> HandlerResult {
        self.invoker.call(self.target.as_deref(), sender, args)
    }

    /// Method identity of the handler.
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Owner module name of the handler.
    pub fn owner(&self) -> &'static str {
        self.owner
    }
}

impl<A> fmt::Debug for StrongHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrongHandler")
            .field("method", &self.method)
            .field("owner", &self.owner)
            .field("bound", &self.target.is_some())
            .finish()
    }
}
