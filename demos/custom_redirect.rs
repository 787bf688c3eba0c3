//! # Example: custom_redirect
//!
//! Routes every handler invocation through a redirect hook.
//!
//! Demonstrates how to:
//! - Trace invocations with the built-in [`LogRedirect`].
//! - Write a custom [`Redirect`] that counts invocations per owner module.
//! - Install hooks with [`WeakEventSource::builder`].
//!
//! ## Run
//! Requires the `logging` feature to export [`LogRedirect`].
//! ```bash
//! RUST_LOG=trace cargo run --example custom_redirect --features logging
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use weak_event::{
    Handler, HandlerError, HandlerResult, LogRedirect, Redirect, Sender, SourceConfig,
    WeakEventSource,
};

/// Counts invocations per owner before delegating to an inner hook.
struct Census<R> {
    inner: R,
    calls: Mutex<HashMap<String, usize>>,
}

impl<R: Redirect> Redirect for Census<R> {
    fn redirect(&self, owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(owner.to_string()).or_default() += 1;
        }
        self.inner.redirect(owner, invoke)
    }

    fn name(&self) -> &'static str {
        "census"
    }
}

struct Inventory;

impl Inventory {
    fn on_order(&self, _sender: Sender<'_>, qty: &u32) -> HandlerResult {
        if *qty > 10 {
            return Err(HandlerError::fail(format!("only 10 in stock, {qty} ordered")));
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let census = Arc::new(Census {
        inner: LogRedirect,
        calls: Mutex::new(HashMap::new()),
    });
    let orders: WeakEventSource<u32> = WeakEventSource::builder()
        .with_config(SourceConfig {
            dead_scan_interval: 8,
            ..SourceConfig::default()
        })
        .with_redirect(census.clone())
        .build();

    let inventory = Arc::new(Inventory);
    orders.subscribe(Handler::bound(&inventory, Inventory::on_order), true)?;

    orders.raise(None, &3)?;
    if let Err(e) = orders.raise(None, &42) {
        println!("[orders] {}: {}", e.as_label(), e.as_message());
    }

    if let Ok(calls) = census.calls.lock() {
        for (owner, n) in calls.iter() {
            println!("[census] {owner}: {n} invocation(s)");
        }
    }
    Ok(())
}
