//! # Handlers and their weak registry form.
//!
//! This module provides the subscription-side types:
//! - [`Handler`] - one elementary handler (free callable or bound method)
//! - [`HandlerChain`] - ordered multicast list of elementary handlers
//! - [`MethodId`] - identity of a handler's callable
//! - [`StrongHandler`] - a handler materialized for one dispatch pass
//!
//! Internally, each subscribed handler is stored as a `WeakHandlerEntry` that holds only a
//! weak reference to the handler's target.
//!
//! ## Lifecycle
//! ```text
//! Handler ──► subscribe ──► WeakHandlerEntry (Weak<target>)
//!                                 │
//!                  raise ─────────┤
//!                                 ├─ target alive ──► StrongHandler ──► invoke
//!                                 └─ target gone  ──► invalidated ──► compacted away
//! ```

mod chain;
mod entry;
mod handler;
mod strong;

pub use chain::HandlerChain;
pub use handler::{Handler, MethodId, Sender};
pub use strong::StrongHandler;

pub(crate) use entry::WeakHandlerEntry;
pub(crate) use handler::Target;
