//! Concurrency tests for weak-event.
//!
//! These tests hammer one source from many threads and check that registrations are
//! neither lost nor duplicated, and that dead subscribers are eventually purged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use weak_event::{Handler, HandlerError, HandlerResult, Sender, SourceConfig, WeakEventSource};

#[derive(Default)]
struct Counter {
    hits: AtomicUsize,
}

impl Counter {
    fn on_event(&self, _sender: Sender<'_>, step: &usize) -> HandlerResult {
        self.hits.fetch_add(*step, Ordering::SeqCst);
        Ok(())
    }

    fn on_fail(&self, _sender: Sender<'_>, _step: &usize) -> HandlerResult {
        Err(HandlerError::fail("always"))
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Every concurrent subscribe lands exactly once.
#[test]
fn test_parallel_subscribe_keeps_every_registration() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 200;

    let source = Arc::new(WeakEventSource::<usize>::new());
    let counter = Arc::new(Counter::default());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let source = Arc::clone(&source);
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..PER_THREAD {
                    source
                        .subscribe(Handler::bound(&counter, Counter::on_event), false)
                        .unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(source.len(), THREADS * PER_THREAD);
    source.raise(None, &1).unwrap();
    assert_eq!(counter.hits(), THREADS * PER_THREAD);
}

/// Unique subscribes from many threads converge to a single registration.
#[test]
fn test_parallel_unique_subscribe_converges() {
    let source = Arc::new(WeakEventSource::<usize>::new());
    let counter = Arc::new(Counter::default());

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    source
                        .subscribe(Handler::bound(&counter, Counter::on_event), true)
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(source.len(), 1);
    source.raise(None, &1).unwrap();
    assert_eq!(counter.hits(), 1);
}

/// Raising while other threads subscribe and unsubscribe never fails or deadlocks.
#[test]
fn test_raise_during_churn() {
    let source = Arc::new(WeakEventSource::<usize>::new());
    let stable = Arc::new(Counter::default());
    source
        .subscribe(Handler::bound(&stable, Counter::on_event), false)
        .unwrap();

    let raises = 500;
    thread::scope(|s| {
        for seed in 0..4u64 {
            let source = Arc::clone(&source);
            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut owned: Vec<Arc<Counter>> = Vec::new();
                for _ in 0..1_000 {
                    match rng.random_range(0..3) {
                        0 => {
                            let c = Arc::new(Counter::default());
                            source
                                .subscribe(Handler::bound(&c, Counter::on_event), false)
                                .unwrap();
                            owned.push(c);
                        }
                        1 if !owned.is_empty() => {
                            let c = owned.swap_remove(rng.random_range(0..owned.len()));
                            source
                                .unsubscribe(Handler::bound(&c, Counter::on_event))
                                .unwrap();
                        }
                        _ => {
                            // Drop without unsubscribing; the source must cope.
                            if !owned.is_empty() && rng.random_bool(0.5) {
                                owned.swap_remove(rng.random_range(0..owned.len()));
                            }
                        }
                    }
                }
            });
        }

        s.spawn(|| {
            for _ in 0..raises {
                source.raise(None, &1).unwrap();
            }
        });
    });

    assert_eq!(stable.hits(), raises);

    // All churn targets are gone: the next raise leaves only the stable subscriber.
    source.raise(None, &1).unwrap();
    assert_eq!(source.len(), 1);
    assert_eq!(stable.hits(), raises + 1);
}

/// Subscribers dropped without unsubscribing are purged by subscribe scans alone.
#[test]
fn test_subscribe_scan_bounds_dead_entries() {
    let source = WeakEventSource::<usize>::builder()
        .with_config(SourceConfig {
            dead_scan_interval: 16,
            ..SourceConfig::default()
        })
        .build();

    for _ in 0..10_000 {
        let transient = Arc::new(Counter::default());
        source
            .subscribe(Handler::bound(&transient, Counter::on_event), false)
            .unwrap();
    }

    assert!(source.len() <= 16, "dead entries accumulate: {}", source.len());
}

/// Exception handling works across threads raising the same source.
#[test]
fn test_parallel_raise_with_suppressed_failures() {
    let source = Arc::new(WeakEventSource::<usize>::new());
    let failing = Arc::new(Counter::default());
    let counter = Arc::new(Counter::default());
    source
        .subscribe(Handler::bound(&failing, Counter::on_fail), false)
        .unwrap();
    source
        .subscribe(Handler::bound(&counter, Counter::on_event), false)
        .unwrap();

    let suppressed = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..250 {
                    source
                        .raise_with(None, &1, |_| {
                            suppressed.fetch_add(1, Ordering::SeqCst);
                            true
                        })
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(suppressed.load(Ordering::SeqCst), 1_000);
    assert_eq!(counter.hits(), 1_000);
}

/// A source shared with async tasks on a multi-threaded runtime.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_across_tokio_tasks() {
    let source = Arc::new(WeakEventSource::<usize>::new());
    let counter = Arc::new(Counter::default());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let source = Arc::clone(&source);
        let counter = Arc::clone(&counter);
        tasks.push(tokio::spawn(async move {
            source
                .subscribe(Handler::bound(&counter, Counter::on_event), false)
                .unwrap();
            tokio::task::yield_now().await;
            source.raise(None, &0).unwrap();
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(source.len(), 8);
    source.raise(None, &1).unwrap();
    assert_eq!(counter.hits(), 8);

    drop(counter);
    source.raise(None, &1).unwrap();
    assert!(source.is_empty());
}
