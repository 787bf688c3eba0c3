//! Weak handler storage and dispatch snapshots.
//!
//! ## Contents
//! - `HandlerRegistry` ordered weak entries with tombstones and compaction
//! - `valid_handlers` the per-raise snapshot taken under the registry lock
//!
//! Both are internal; the public surface is [`WeakEventSource`](crate::WeakEventSource).

mod dispatch;
#[allow(clippy::module_inception)]
mod registry;

pub(crate) use dispatch::valid_handlers;
pub(crate) use registry::HandlerRegistry;
