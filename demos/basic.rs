//! # Example: basic
//!
//! Minimal publisher/subscriber pair over a [`WeakEventSource`].
//!
//! Demonstrates how to:
//! - Expose an event from a publisher.
//! - Subscribe a bound method and a free closure.
//! - Observe that dropping a subscriber is enough to stop its notifications.
//!
//! ## Flow
//! ```text
//! Button::click() ──► clicked.raise(Some(&button), &ClickArgs)
//!     ├─► Logger::on_click   (bound, weak)
//!     └─► |sender, args| ..  (free, always alive)
//! drop(logger) ──► next raise purges Logger's registration
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use weak_event::{EventError, Handler, HandlerResult, Sender, WeakEventSource};

#[derive(Debug)]
struct ClickArgs {
    x: i32,
    y: i32,
}

struct Button {
    label: &'static str,
    clicked: WeakEventSource<ClickArgs>,
}

impl Button {
    fn click(&self, x: i32, y: i32) -> Result<(), EventError> {
        self.clicked.raise(Some(&self.label), &ClickArgs { x, y })
    }
}

#[derive(Default)]
struct Logger {
    seen: AtomicUsize,
}

impl Logger {
    fn on_click(&self, sender: Sender<'_>, args: &ClickArgs) -> HandlerResult {
        let label = sender
            .and_then(|s| s.downcast_ref::<&'static str>())
            .copied()
            .unwrap_or("<unknown>");
        let n = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[logger] click #{n} on {label} at ({}, {})", args.x, args.y);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let button = Button {
        label: "ok",
        clicked: WeakEventSource::new(),
    };

    // 1. A bound subscriber: only a weak reference is kept by the button
    let logger = Arc::new(Logger::default());
    button
        .clicked
        .subscribe(Handler::bound(&logger, Logger::on_click), false)?;

    // 2. A free subscriber: no target, lives as long as the registration
    button.clicked.subscribe(
        Handler::free(|_sender, args: &ClickArgs| {
            println!("[free]   {args:?}");
            Ok(())
        }),
        false,
    )?;

    button.click(10, 20)?;
    println!("registrations: {}", button.clicked.len());

    // 3. Drop the logger without unsubscribing
    drop(logger);
    button.click(30, 40)?;
    println!("registrations after drop: {}", button.clicked.len());

    Ok(())
}
