//! # Dispatch snapshot.
//!
//! [`valid_handlers`] turns a registry into the ordered list of handlers one raise will
//! invoke. It is the only place where a raise touches the registry lock.
//!
//! ## Flow
//! ```text
//! lock ─► for each slot in order:
//!           empty            ─► skip
//!           matches excluded ─► skip (slot untouched)
//!           try_materialize  ─► Some ─► push to snapshot
//!                            └► None ─► invalidate slot
//!       ─► compact, reset countdown
//! unlock ─► drop retired pins ─► return snapshot
//! ```
//!
//! The snapshot owns strong references to its targets and is independent of the registry,
//! so handlers run without the lock and may re-enter the source freely.

use parking_lot::Mutex;

use crate::handlers::{Handler, StrongHandler};
use crate::registry::HandlerRegistry;

/// Takes a point-in-time snapshot of the live handlers of `registry`, purging dead ones.
///
/// An absent registry (nothing ever subscribed) yields an empty snapshot.
pub(crate) fn valid_handlers<A>(
    registry: Option<&Mutex<HandlerRegistry<A>>>,
    excluded: &[Handler<A>],
) -> Vec<StrongHandler<A>> {
    let Some(registry) = registry else {
        return Vec::new();
    };

    let (valid, retired) = {
        let mut reg = registry.lock();
        let mut valid = Vec::with_capacity(reg.slot_count());
        let mut purged = 0usize;

        for index in 0..reg.slot_count() {
            let Some(entry) = reg.entry(index) else {
                continue;
            };
            if excluded.iter().any(|handler| entry.is_match(handler)) {
                continue;
            }

            let orphaned = reg.release_expired_anchor(index);
            match reg
                .entry(index)
                .filter(|_| !orphaned)
                .and_then(|entry| entry.try_materialize())
            {
                Some(handler) => valid.push(handler),
                None => {
                    reg.invalidate(index);
                    purged += 1;
                }
            }
        }

        reg.compact_handler_list();
        reg.reset_dead_handler_scan_countdown();
        if purged > 0 {
            tracing::debug!(purged, live = valid.len(), "dispatch scan purged dead handlers");
        }
        (valid, reg.take_retired())
    };

    drop(retired);
    valid
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::HandlerResult;
    use crate::handlers::{Sender, Target};
    use crate::source::SourceConfig;

    #[derive(Default)]
    struct Hits(AtomicUsize);

    impl Hits {
        fn on_event(&self, _s: Sender<'_>, _a: &()) -> HandlerResult {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn registry_with(handlers: &[Handler<()>]) -> Mutex<HandlerRegistry<()>> {
        let mut reg = HandlerRegistry::new(SourceConfig::default());
        reg.add(None, handlers, false);
        Mutex::new(reg)
    }

    #[test]
    fn test_absent_registry_is_empty() {
        assert!(valid_handlers::<()>(None, &[]).is_empty());
    }

    #[test]
    fn test_snapshot_skips_and_purges_dead() {
        let alive = Arc::new(Hits::default());
        let doomed = Arc::new(Hits::default());
        let reg = registry_with(&[
            Handler::bound(&alive, Hits::on_event),
            Handler::bound(&doomed, Hits::on_event),
            Handler::bound(&alive, Hits::on_event),
        ]);
        drop(doomed);

        let snapshot = valid_handlers(Some(&reg), &[]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(reg.lock().slot_count(), 2, "dead slot compacted away");

        for h in &snapshot {
            h.invoke(None, &()).unwrap();
        }
        assert_eq!(alive.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exclusion_is_local_to_the_call() {
        let a = Arc::new(Hits::default());
        let b = Arc::new(Hits::default());
        let reg = registry_with(&[
            Handler::bound(&a, Hits::on_event),
            Handler::bound(&b, Hits::on_event),
        ]);

        let excluded = [Handler::bound(&a, Hits::on_event)];
        assert_eq!(valid_handlers(Some(&reg), &excluded).len(), 1);
        assert_eq!(reg.lock().len(), 2, "excluded entry not invalidated");
        assert_eq!(valid_handlers(Some(&reg), &[]).len(), 2);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let a = Arc::new(Hits::default());
        let reg = registry_with(&[Handler::bound(&a, Hits::on_event)]);

        let snapshot = valid_handlers(Some(&reg), &[]);
        reg.lock().clear();

        assert_eq!(snapshot.len(), 1);
        snapshot[0].invoke(None, &()).unwrap();
        assert_eq!(a.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_anchor_released_during_scan() {
        let lifetime: Target = Arc::new(());
        let target = Arc::new(Hits::default());
        let weak = Arc::downgrade(&target);

        let mut reg = HandlerRegistry::new(SourceConfig::default());
        reg.add(Some(&lifetime), &[Handler::bound(&target, Hits::on_event)], false);
        let reg = Mutex::new(reg);
        drop(target);

        assert_eq!(valid_handlers(Some(&reg), &[]).len(), 1, "anchored");

        drop(lifetime);
        assert!(valid_handlers(Some(&reg), &[]).is_empty());
        assert!(weak.upgrade().is_none());
        assert_eq!(reg.lock().len(), 0);
    }

    #[test]
    fn test_self_anchored_target_purged_with_it() {
        let target = Arc::new(Hits::default());
        let lifetime: Target = target.clone();

        let mut reg = HandlerRegistry::new(SourceConfig::default());
        reg.add(Some(&lifetime), &[Handler::bound(&target, Hits::on_event)], false);
        let reg = Mutex::new(reg);
        drop(lifetime);

        assert_eq!(valid_handlers(Some(&reg), &[]).len(), 1);
        drop(target);
        assert!(valid_handlers(Some(&reg), &[]).is_empty());
        assert_eq!(reg.lock().len(), 0);
    }

    #[test]
    fn test_target_owning_its_lifetime_stays_until_cleared() {
        struct Forwarder {
            owner: Target,
        }

        impl Forwarder {
            fn on_event(&self, _s: Sender<'_>, _a: &()) -> HandlerResult {
                assert!(self.owner.is::<String>());
                Ok(())
            }
        }

        let owner: Target = Arc::new(String::from("owner"));
        let weak_owner = Arc::downgrade(&owner);
        let forwarder = Arc::new(Forwarder {
            owner: Arc::clone(&owner),
        });

        let mut reg = HandlerRegistry::new(SourceConfig::default());
        reg.add(Some(&owner), &[Handler::bound(&forwarder, Forwarder::on_event)], false);
        let reg = Mutex::new(reg);
        drop(owner);
        drop(forwarder);

        let snapshot = valid_handlers(Some(&reg), &[]);
        assert_eq!(snapshot.len(), 1, "pin -> forwarder -> owner");
        snapshot[0].invoke(None, &()).unwrap();
        drop(snapshot);

        let retired = {
            let mut reg = reg.lock();
            reg.clear();
            reg.take_retired()
        };
        assert!(weak_owner.upgrade().is_some());
        drop(retired);
        assert!(weak_owner.upgrade().is_none());
    }
}
