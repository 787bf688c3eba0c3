//! # weak-event
//!
//! **weak-event** is an event source whose subscriptions do not keep subscribers alive.
//!
//! A publisher exposing a [`WeakEventSource`] can be subscribed to by any number of
//! handlers. The source stores only weak references to the handlers' targets: a subscriber
//! that is otherwise unreachable is dropped normally, and its handler silently stops being
//! invoked. Dead registrations are purged lazily, during dispatch and periodically while
//! subscribing.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Handler::bound(&obj, T::method)     Handler::free(f)
//!                 │                            │
//!                 └──────────┬─────────────────┘
//!                            ▼
//!                     HandlerChain (multicast, ordered)
//!                            │ subscribe / unsubscribe
//!                            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  WeakEventSource<A>                                               │
//! │  - SourceConfig (scan interval, panic policy, shrink threshold)   │
//! │  - Redirect (hook wrapping every invocation)                      │
//! │  - Mutex<HandlerRegistry> (created on first subscribe)            │
//! │        [WeakHandlerEntry][WeakHandlerEntry][ tombstone ][...]     │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ raise(sender, &args)
//!                                ▼
//!                  snapshot under lock: Vec<StrongHandler>
//!                                │ (lock released)
//!                                ▼
//!           redirect(owner, || handler.invoke(sender, &args)), in order
//! ```
//!
//! ### Liveness
//! ```text
//! subscribe ──► entry keeps Weak<target>
//!
//! raise:
//!   ├─► upgrade Weak ── Some ──► invoke
//!   └─► upgrade Weak ── None ──► invalidate, compact
//!
//! subscribe_with_lifetime(owner, ..):
//!   └─► target pinned while `owner` is alive, then back to plain weak
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------|--------------------------------------------|
//! | **Source**        | Subscribe, unsubscribe, raise, clear.                       | [`WeakEventSource`]                        |
//! | **Handlers**      | Free callables, bound methods and multicast chains.         | [`Handler`], [`HandlerChain`]              |
//! | **Errors**        | Typed errors for argument checks and handler failures.      | [`EventError`], [`HandlerError`]           |
//! | **Redirection**   | Wrap every handler invocation (context, tracing, auditing). | [`Redirect`], [`RedirectFn`]               |
//! | **Configuration** | Scan cadence, panic policy, storage shrinking.              | [`SourceConfig`], [`WeakEventSourceBuilder`] |
//!
//! ## Optional features
//! - `logging`: exports [`LogRedirect`], a redirect hook that traces every invocation.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use weak_event::{Handler, HandlerResult, Sender, WeakEventSource};
//!
//! struct Thermometer {
//!     changed: WeakEventSource<f64>,
//! }
//!
//! #[derive(Default)]
//! struct Display {
//!     last: AtomicU64,
//! }
//!
//! impl Display {
//!     fn on_changed(&self, _sender: Sender<'_>, celsius: &f64) -> HandlerResult {
//!         self.last.store(celsius.to_bits(), Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), weak_event::EventError> {
//!     let thermometer = Thermometer { changed: WeakEventSource::new() };
//!     let display = Arc::new(Display::default());
//!
//!     thermometer
//!         .changed
//!         .subscribe(Handler::bound(&display, Display::on_changed), false)?;
//!     thermometer.changed.raise(Some(&"sensor-1"), &21.5)?;
//!     assert_eq!(f64::from_bits(display.last.load(Ordering::SeqCst)), 21.5);
//!
//!     // The display goes away; the thermometer does not keep it alive.
//!     drop(display);
//!     thermometer.changed.raise(None, &22.0)?;
//!     assert!(thermometer.changed.is_empty());
//!     Ok(())
//! }
//! ```
mod error;
mod handlers;
mod redirect;
mod registry;
mod source;

// ---- Public re-exports ----

pub use error::{EventError, HandlerError, HandlerResult};
pub use handlers::{Handler, HandlerChain, MethodId, Sender, StrongHandler};
pub use redirect::{DirectInvoke, Redirect, RedirectFn};
pub use source::{SourceConfig, WeakEventSource, WeakEventSourceBuilder};

// Optional: expose a tracing redirect hook.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use redirect::LogRedirect;
