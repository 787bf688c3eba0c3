//! # Weak event source.
//!
//! [`WeakEventSource`] is an event whose subscriptions do not keep subscribers alive.
//!
//! ## Architecture
//! ```text
//! subscribe(chain) ──► lock ──► HandlerRegistry::add(h1..hn)        ──► unlock
//! unsubscribe(chain) ► lock ──► HandlerRegistry::remove(h1..hn)     ──► compact ──► unlock
//! raise(sender, args)
//!     ├─► lock ──► snapshot live handlers, purge dead, compact ──► unlock
//!     └─► for each handler, in subscription order:
//!             redirect(owner, || handler.invoke(sender, args))
//!                 ├─ Ok  ──► next
//!                 └─ Err ──► return EventError::HandlerInvocation (rest skipped)
//! ```
//!
//! ## Rules
//! - **Weak**: only a `Weak` to each handler's target is stored.
//! - **Ordered**: handlers run in subscription order, one after the other, on the caller's thread.
//! - **Snapshot**: a raise sees the registry as it was when the raise started; concurrent
//!   subscribe/unsubscribe affect later raises only.
//! - **Re-entrant**: no lock is held while handlers run, so a handler may subscribe,
//!   unsubscribe or raise on the same source.
//! - **Fail-fast**: without an exception handler, the first failure aborts the pass.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use weak_event::{Handler, HandlerResult, Sender, WeakEventSource};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl Counter {
//!     fn on_tick(&self, _sender: Sender<'_>, step: &usize) -> HandlerResult {
//!         self.0.fetch_add(*step, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let source = WeakEventSource::new();
//! let counter = Arc::new(Counter::default());
//! source.subscribe(Handler::bound(&counter, Counter::on_tick), false).unwrap();
//!
//! source.raise(None, &2).unwrap();
//! assert_eq!(counter.0.load(Ordering::SeqCst), 2);
//!
//! // Dropping the subscriber is enough; no unsubscribe needed.
//! drop(counter);
//! source.raise(None, &2).unwrap();
//! assert!(source.is_empty());
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{EventError, HandlerError, HandlerResult};
use crate::handlers::{Handler, HandlerChain, Sender, StrongHandler, Target};
use crate::redirect::{DirectInvoke, Redirect};
use crate::registry::{HandlerRegistry, valid_handlers};
use crate::source::{SourceConfig, WeakEventSourceBuilder};

/// Event with weak subscriptions.
///
/// `A` is the event argument type handed to every handler by reference.
pub struct WeakEventSource<A> {
    handlers: OnceLock<Mutex<HandlerRegistry<A>>>,
    config: SourceConfig,
    redirect: Arc<dyn Redirect>,
}

impl<A> WeakEventSource<A> {
    /// Creates a source with the default configuration and direct invocation.
    pub fn new() -> Self {
        Self::with_parts(SourceConfig::default(), Arc::new(DirectInvoke))
    }

    /// Returns a builder for a source with custom configuration or redirect hook.
    pub fn builder() -> WeakEventSourceBuilder<A> {
        WeakEventSourceBuilder::new()
    }

    pub(crate) fn with_parts(config: SourceConfig, redirect: Arc<dyn Redirect>) -> Self {
        Self {
            handlers: OnceLock::new(),
            config,
            redirect,
        }
    }

    /// Adds a handler (or a chain of handlers).
    ///
    /// Only a weak reference to each handler's target is kept. With `unique_registration`,
    /// an existing registration of the same (target, method) is replaced instead of
    /// duplicated.
    ///
    /// # Errors
    /// [`EventError::InvalidArgument`] if the chain is empty.
    pub fn subscribe(
        &self,
        handler: impl Into<HandlerChain<A>>,
        unique_registration: bool,
    ) -> Result<(), EventError> {
        self.add(None, handler.into(), unique_registration)
    }

    /// Adds a handler that stays alive at least as long as `lifetime`.
    ///
    /// While `lifetime` is alive the source pins each handler's target, so the handler is
    /// invoked even if nothing else references its target. This is useful for targets
    /// created only to be subscribed (adapters, closures' state). `lifetime` itself is held
    /// weakly and is never kept alive by the source.
    ///
    /// A target that needs its lifetime object must hold it through a [`Weak`](std::sync::Weak):
    /// a strong reference keeps the lifetime object alive through the pinned target until the
    /// handler is unsubscribed. A target passed as its own lifetime object is not pinned. For
    /// per-subscriber state, binding a capturing closure to the lifetime object
    /// (`Handler::bound(&owner, move |owner, sender, args| ..)`) needs no anchor at all.
    ///
    /// # Errors
    /// [`EventError::InvalidArgument`] if the chain is empty.
    pub fn subscribe_with_lifetime<L>(
        &self,
        lifetime: &Arc<L>,
        handler: impl Into<HandlerChain<A>>,
        unique_registration: bool,
    ) -> Result<(), EventError>
    where
        L: Any + Send + Sync,
    {
        let lifetime: Target = lifetime.clone();
        self.add(Some(&lifetime), handler.into(), unique_registration)
    }

    /// Removes the most recent registration of each handler in the chain.
    ///
    /// Only the last matching registration is removed; if a handler was never subscribed
    /// nothing happens.
    ///
    /// # Errors
    /// [`EventError::InvalidArgument`] if the chain is empty.
    pub fn unsubscribe(&self, handler: impl Into<HandlerChain<A>>) -> Result<(), EventError> {
        let chain = handler.into();
        if chain.is_empty() {
            return Err(EventError::empty_chain("handler"));
        }
        let Some(registry) = self.handlers.get() else {
            return Ok(());
        };

        let retired = {
            let mut reg = registry.lock();
            let removed = reg.remove(chain.as_slice());
            reg.compact_handler_list();
            tracing::trace!(handlers = chain.len(), removed, "unsubscribed");
            reg.take_retired()
        };
        drop(retired);
        Ok(())
    }

    /// Raises the event, invoking each live handler in subscription order.
    ///
    /// # Errors
    /// [`EventError::HandlerInvocation`] for the first handler that fails; the remaining
    /// handlers of this raise are not invoked.
    pub fn raise(&self, sender: Sender<'_>, args: &A) -> Result<(), EventError> {
        self.raise_excluding(sender, args, &[])
    }

    /// Raises the event, skipping handlers matching any of `excluded` for this call only.
    ///
    /// # Errors
    /// As [`WeakEventSource::raise`].
    pub fn raise_excluding(
        &self,
        sender: Sender<'_>,
        args: &A,
        excluded: &[Handler<A>],
    ) -> Result<(), EventError> {
        let handlers = valid_handlers(self.handlers.get(), excluded);
        for (position, handler) in handlers.iter().enumerate() {
            self.invoke(handler, sender, args)
                .map_err(|source| invocation_error(handler, position, source))?;
        }
        Ok(())
    }

    /// Raises the event, offering each handler failure to `exception_handler`.
    ///
    /// Returning `true` marks the failure as handled and dispatch continues with the next
    /// handler. Returning `false` aborts the raise with that failure.
    ///
    /// # Errors
    /// [`EventError::HandlerInvocation`] for the first failure `exception_handler` declines.
    pub fn raise_with<F>(
        &self,
        sender: Sender<'_>,
        args: &A,
        mut exception_handler: F,
    ) -> Result<(), EventError>
    where
        F: FnMut(&HandlerError) -> bool,
    {
        let handlers = valid_handlers(self.handlers.get(), &[]);
        for (position, handler) in handlers.iter().enumerate() {
            let Err(source) = self.invoke(handler, sender, args) else {
                continue;
            };
            if exception_handler(&source) {
                tracing::warn!(
                    handler = handler.method().name(),
                    position,
                    label = source.as_label(),
                    "handler failure suppressed"
                );
                continue;
            }
            return Err(invocation_error(handler, position, source));
        }
        Ok(())
    }

    /// Removes all handlers.
    pub fn clear(&self) {
        let Some(registry) = self.handlers.get() else {
            return;
        };
        let retired = {
            let mut reg = registry.lock();
            reg.clear();
            reg.take_retired()
        };
        drop(retired);
    }

    /// Number of registrations currently held, including ones whose target is gone but
    /// has not been purged yet. Every raise purges dead registrations.
    pub fn len(&self) -> usize {
        self.handlers.get().map_or(0, |registry| registry.lock().len())
    }

    /// Returns `true` if no registration is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of storage slots, including emptied ones awaiting compaction.
    pub fn slot_count(&self) -> usize {
        self.handlers
            .get()
            .map_or(0, |registry| registry.lock().slot_count())
    }

    /// Returns the configuration of this source.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn add(
        &self,
        lifetime: Option<&Target>,
        chain: HandlerChain<A>,
        unique: bool,
    ) -> Result<(), EventError> {
        if chain.is_empty() {
            return Err(EventError::empty_chain("handler"));
        }

        let registry = self
            .handlers
            .get_or_init(|| Mutex::new(HandlerRegistry::new(self.config.clone())));
        let retired = {
            let mut reg = registry.lock();
            reg.add(lifetime, chain.as_slice(), unique);
            tracing::trace!(
                handlers = chain.len(),
                unique,
                anchored = lifetime.is_some(),
                "subscribed"
            );
            reg.take_retired()
        };
        drop(retired);
        Ok(())
    }

    fn invoke(&self, handler: &StrongHandler<A>, sender: Sender<'_>, args: &A) -> HandlerResult {
        let mut call = || handler.invoke(sender, args);
        if !self.config.catch_panics {
            return self.redirect.redirect(handler.owner(), &mut call);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| {
            self.redirect.redirect(handler.owner(), &mut call)
        })) {
            Ok(res) => res,
            Err(payload) => Err(HandlerError::from_panic(&*payload)),
        }
    }
}

fn invocation_error<A>(handler: &StrongHandler<A>, position: usize, source: HandlerError) -> EventError {
    EventError::HandlerInvocation {
        handler: handler.method().name(),
        position,
        source,
    }
}

impl<A> Default for WeakEventSource<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for WeakEventSource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventSource")
            .field("len", &self.len())
            .field("config", &self.config)
            .field("redirect", &self.redirect.name())
            .finish()
    }
}
