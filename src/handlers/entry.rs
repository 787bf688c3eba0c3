//! # Weak registry entries.
//!
//! [`WeakHandlerEntry`] is what an event source actually stores per subscription: a
//! [`Weak`] to the handler's target (nothing for free handlers), the target's address for
//! identity checks, the method id, the open invoker and an optional keepalive anchor.
//!
//! ## Liveness
//! ```text
//! no target           ──► always alive
//! Weak upgrades       ──► alive   ──► try_materialize() = Some(StrongHandler)
//! Weak does not       ──► dead    ──► try_materialize() = None  (caller invalidates)
//! ```
//! `Weak::upgrade` is atomic against the strong count: it yields the target or nothing,
//! never a half-dropped value.
//!
//! ## Keepalive anchors
//! An entry subscribed with a lifetime object pins its target with a strong reference for
//! as long as the lifetime object is alive. The anchor itself is held weakly. Once it is
//! gone, [`WeakHandlerEntry::release_expired_anchor`] hands the pin back to the caller, and
//! liveness falls back to the target's own reachability.
//!
//! A target that is its own lifetime object gets no pin: its liveness already is the
//! lifetime object's. A target holding a strong reference to its lifetime object forms an
//! ownership cycle through the pin (pin ─► target ─► lifetime) that lasts until the entry is
//! unsubscribed or cleared; such targets must reach their lifetime object through a `Weak`.

use std::sync::{Arc, Weak};

use crate::handlers::handler::{Handler, Invoker, MethodId, Target, addr_of};
use crate::handlers::strong::StrongHandler;

/// Lifetime object and the target pin it keeps.
struct Anchor {
    lifetime: Weak<dyn std::any::Any + Send + Sync>,
    pin: Target,
}

/// One registered handler, held weakly.
pub(crate) struct WeakHandlerEntry<A> {
    target: Option<Weak<dyn std::any::Any + Send + Sync>>,
    target_addr: Option<usize>,
    method: MethodId,
    instance: Option<usize>,
    invoker: Invoker<A>,
    owner: &'static str,
    anchor: Option<Anchor>,
}

impl<A> WeakHandlerEntry<A> {
    /// Builds an entry from `handler`, optionally anchored to `lifetime`.
    ///
    /// The anchor only matters for bound handlers whose target is not the lifetime object
    /// itself; free handlers are always alive.
    pub(crate) fn new(handler: &Handler<A>, lifetime: Option<&Target>) -> Self {
        let anchor = match (&handler.target, lifetime) {
            (Some(target), Some(lifetime)) if addr_of(target) != addr_of(lifetime) => Some(Anchor {
                lifetime: Arc::downgrade(lifetime),
                pin: Arc::clone(target),
            }),
            _ => None,
        };

        Self {
            target: handler.target.as_ref().map(Arc::downgrade),
            target_addr: handler.target.as_ref().map(addr_of),
            method: handler.method,
            instance: handler.instance,
            invoker: handler.invoker.clone(),
            owner: handler.owner,
            anchor,
        }
    }

    /// `true` if the entry has no target or its target is still reachable.
    pub(crate) fn is_alive(&self) -> bool {
        match &self.target {
            None => true,
            Some(weak) => weak.strong_count() > 0,
        }
    }

    /// Resolves the entry into an invocable handler, or `None` if its target is gone.
    pub(crate) fn try_materialize(&self) -> Option<StrongHandler<A>> {
        let target = match &self.target {
            None => None,
            Some(weak) => Some(weak.upgrade()?),
        };
        Some(StrongHandler::new(
            target,
            self.invoker.clone(),
            self.method,
            self.owner,
        ))
    }

    /// `true` if `candidate` has the same target allocation and the same method.
    ///
    /// A target-less candidate matches a free entry or an entry whose target was dropped,
    /// never an entry with a live target. Stateful callables must also share the
    /// allocation; the entry's invoker keeps that address reserved.
    pub(crate) fn is_match(&self, candidate: &Handler<A>) -> bool {
        if self.method != candidate.method || self.instance != candidate.instance {
            return false;
        }
        match (candidate.target_addr(), &self.target) {
            (None, None) => true,
            (None, Some(weak)) => weak.strong_count() == 0,
            // Our `Weak` keeps the allocation reserved, so an equal address is the same live target.
            (Some(addr), Some(_)) => self.target_addr == Some(addr),
            (Some(_), None) => false,
        }
    }

    /// Drops the keepalive anchor once its lifetime object is gone, returning the pin.
    ///
    /// The pin is returned instead of dropped so the caller can release it outside its lock.
    pub(crate) fn release_expired_anchor(&mut self) -> Option<Target> {
        let expired = self
            .anchor
            .as_ref()
            .is_some_and(|anchor| anchor.lifetime.strong_count() == 0);
        if expired {
            self.anchor.take().map(|anchor| anchor.pin)
        } else {
            None
        }
    }

    /// Consumes the entry, returning its pin (if any) for release outside the lock.
    pub(crate) fn into_pin(self) -> Option<Target> {
        self.anchor.map(|anchor| anchor.pin)
    }

    #[cfg(test)]
    pub(crate) fn method(&self) -> MethodId {
        self.method
    }
}
