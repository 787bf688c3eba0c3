//! # Example: lifetime_anchor
//!
//! Keeps a throwaway adapter subscribed for as long as its owner lives.
//!
//! Demonstrates how to:
//! - Subscribe an adapter nobody else references via
//!   [`WeakEventSource::subscribe_with_lifetime`].
//! - Let the registration expire together with its owner.
//! - Run several handlers with an exception handler via [`WeakEventSource::raise_with`].
//!
//! ## Flow
//! ```text
//! View (owner) ──► subscribe_with_lifetime(&view, Adapter::on_tick)
//!     ├─► Adapter pinned while View is alive
//!     └─► drop(view) ──► pin released on the next raise ──► Adapter dropped
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example lifetime_anchor
//! ```

use std::sync::Arc;

use weak_event::{Handler, HandlerError, HandlerResult, Sender, WeakEventSource};

struct View {
    name: &'static str,
}

/// Adapter translating ticks for a view; only the event source references it.
struct Adapter {
    view: &'static str,
    every: u64,
}

impl Adapter {
    fn on_tick(&self, _sender: Sender<'_>, tick: &u64) -> HandlerResult {
        if *tick % self.every == 0 {
            println!("[{}] refresh at tick {tick}", self.view);
        }
        Ok(())
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        println!("[{}] adapter dropped", self.view);
    }
}

fn flaky(_sender: Sender<'_>, tick: &u64) -> HandlerResult {
    if *tick == 3 {
        return Err(HandlerError::fail("tick 3 is unlucky"));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ticks = WeakEventSource::<u64>::new();
    let view = Arc::new(View { name: "dashboard" });

    // 1. The adapter is created for the subscription only
    ticks.subscribe_with_lifetime(
        &view,
        Handler::bound(
            &Arc::new(Adapter {
                view: view.name,
                every: 2,
            }),
            Adapter::on_tick,
        ),
        false,
    )?;
    ticks.subscribe(Handler::free(flaky), false)?;

    // 2. Failures are reported and dispatch continues
    for tick in 1..=4 {
        ticks.raise_with(None, &tick, |err| {
            println!("[ticks] suppressed: {err}");
            true
        })?;
    }

    // 3. The owner goes away; its adapter goes with it on the next raise
    drop(view);
    ticks.raise_with(None, &6, |_| true)?;
    println!("registrations left: {}", ticks.len());

    Ok(())
}
