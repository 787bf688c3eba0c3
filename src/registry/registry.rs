//! # Handler registry - ordered weak subscription store.
//!
//! The registry keeps subscriptions as a `Vec<Option<WeakHandlerEntry>>`:
//! - append-only growth (amortized O(1) subscribe);
//! - `None` slots are tombstones, so indices stay stable while a scan is in progress;
//! - compaction drops tombstones without reordering survivors.
//!
//! ## Architecture
//! ```text
//! add(h1..hn)     ──► [e1][e2][  ][e4][e5] ◄── push
//! remove(h)       ──► scan from the end, empty the last match, compact
//! dispatch scan   ──► invalidate dead slots, compact, reset countdown
//! add countdown=0 ──► invalidate dead slots, compact, reset countdown
//! ```
//!
//! ## Rules
//! - All methods run under the owning source's lock.
//! - Dropping an entry may release a keepalive pin; such pins are parked in `retired` and
//!   must be taken with [`HandlerRegistry::take_retired`] and dropped after the lock is
//!   released, since dropping a target may run arbitrary code.

use std::sync::Arc;

use crate::handlers::{Handler, Target, WeakHandlerEntry};
use crate::source::SourceConfig;

/// Ordered store of weak handler entries for one event source.
pub(crate) struct HandlerRegistry<A> {
    slots: Vec<Option<WeakHandlerEntry<A>>>,
    countdown: usize,
    retired: Vec<Target>,
    config: SourceConfig,
}

impl<A> HandlerRegistry<A> {
    /// Creates an empty registry.
    pub(crate) fn new(config: SourceConfig) -> Self {
        let mut registry = Self {
            slots: Vec::new(),
            countdown: 0,
            retired: Vec::new(),
            config,
        };
        registry.reset_dead_handler_scan_countdown();
        registry
    }

    /// Appends one entry per handler.
    ///
    /// With `unique`, every existing entry matching a handler is removed first, so
    /// re-subscribing replaces instead of duplicating. With `lifetime`, each bound entry
    /// pins its target while the lifetime object is alive.
    pub(crate) fn add(&mut self, lifetime: Option<&Target>, handlers: &[Handler<A>], unique: bool) {
        for handler in handlers {
            if unique {
                self.remove_all_matching(handler);
            }
            self.slots
                .push(Some(WeakHandlerEntry::new(handler, lifetime)));
            self.tick_dead_handler_scan();
        }
        if unique {
            self.compact_handler_list();
        }
    }

    /// Empties the most recently added slot matching each handler.
    ///
    /// Handlers without a match are ignored. Callers compact afterwards.
    pub(crate) fn remove(&mut self, handlers: &[Handler<A>]) -> usize {
        let mut removed = 0;
        for handler in handlers {
            let last = self
                .slots
                .iter()
                .rposition(|slot| slot.as_ref().is_some_and(|entry| entry.is_match(handler)));
            if let Some(index) = last {
                self.invalidate(index);
                removed += 1;
            }
        }
        removed
    }

    /// Empties slot `index`.
    pub(crate) fn invalidate(&mut self, index: usize) {
        if let Some(entry) = self.slots.get_mut(index).and_then(Option::take) {
            self.retired.extend(entry.into_pin());
        }
    }

    /// Drops tombstones, preserving the order of surviving entries.
    pub(crate) fn compact_handler_list(&mut self) {
        self.slots.retain(Option::is_some);
        if self.config.should_shrink(self.slots.len(), self.slots.capacity()) {
            self.slots.shrink_to(self.slots.len() * 2);
        }
    }

    /// Reinitializes the subscribe countdown to the next dead-handler scan.
    pub(crate) fn reset_dead_handler_scan_countdown(&mut self) {
        self.countdown = self.config.dead_scan_period().unwrap_or(0);
    }

    /// Invalidates every entry whose target is gone. Returns how many were purged.
    pub(crate) fn purge_dead(&mut self) -> usize {
        let mut purged = 0;
        for index in 0..self.slots.len() {
            let orphaned = self.release_expired_anchor(index);
            let dead = orphaned
                || self.slots[index]
                    .as_ref()
                    .is_some_and(|entry| !entry.is_alive());
            if dead {
                self.invalidate(index);
                purged += 1;
            }
        }
        purged
    }

    /// Releases the keepalive pin of slot `index` if its lifetime object is gone.
    ///
    /// Returns `true` if the pin was the target's last strong reference, i.e. the entry
    /// is dead as soon as the retired pin is dropped.
    pub(crate) fn release_expired_anchor(&mut self, index: usize) -> bool {
        let Some(entry) = self.slots.get_mut(index).and_then(Option::as_mut) else {
            return false;
        };
        match entry.release_expired_anchor() {
            Some(pin) => {
                let orphaned = Arc::strong_count(&pin) == 1;
                self.retired.push(pin);
                orphaned
            }
            None => false,
        }
    }

    /// Drops every registration.
    pub(crate) fn clear(&mut self) {
        for entry in self.slots.drain(..).flatten() {
            self.retired.extend(entry.into_pin());
        }
        self.reset_dead_handler_scan_countdown();
    }

    /// Takes the pins released since the last call; drop them outside the lock.
    #[must_use]
    pub(crate) fn take_retired(&mut self) -> Vec<Target> {
        std::mem::take(&mut self.retired)
    }

    /// Entry at `index`, `None` for tombstones and out-of-range indices.
    pub(crate) fn entry(&self, index: usize) -> Option<&WeakHandlerEntry<A>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of slots, tombstones included.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots (live or not yet found dead).
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn remove_all_matching(&mut self, handler: &Handler<A>) {
        for index in 0..self.slots.len() {
            if self.entry(index).is_some_and(|entry| entry.is_match(handler)) {
                self.invalidate(index);
            }
        }
    }

    fn tick_dead_handler_scan(&mut self) {
        if self.countdown == 0 {
            return;
        }
        self.countdown -= 1;
        if self.countdown == 0 {
            let purged = self.purge_dead();
            if purged > 0 {
                tracing::debug!(purged, "dead handler scan purged entries");
            }
            self.compact_handler_list();
            self.reset_dead_handler_scan_countdown();
        }
    }
}
