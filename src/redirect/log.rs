//! # Tracing redirect hook for debugging and demos.
//!
//! [`LogRedirect`] runs every handler invocation inside a `tracing` span named after the
//! handler's owner module and records the outcome.
//!
//! ## Output (with a `fmt` subscriber at `trace` level)
//! ```text
//! TRACE handler{owner="my_app"}: weak_event::redirect::log: handler completed
//! DEBUG handler{owner="my_app"}: weak_event::redirect::log: handler failed label="handler_failed" error=...
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use weak_event::{LogRedirect, WeakEventSource};
//! let source: WeakEventSource<String> = WeakEventSource::builder()
//!     .with_redirect(Arc::new(LogRedirect))
//!     .build();
//! ```

use crate::error::HandlerResult;
use crate::redirect::Redirect;

/// Redirect hook that traces each handler invocation.
///
/// Enabled via the `logging` feature. Not intended as a production audit trail -
/// implement a custom [`Redirect`] for that.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRedirect;

impl Redirect for LogRedirect {
    fn redirect(&self, owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult {
        let span = tracing::trace_span!("handler", owner);
        let _entered = span.enter();

        let res = invoke();
        match &res {
            Ok(()) => tracing::trace!("handler completed"),
            Err(e) => tracing::debug!(label = e.as_label(), error = %e, "handler failed"),
        }
        res
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;

    #[test]
    fn test_passes_result_through() {
        assert_eq!(LogRedirect.redirect("owner", &mut || Ok(())), Ok(()));
        assert_eq!(
            LogRedirect.redirect("owner", &mut || Err(HandlerError::fail("x"))),
            Err(HandlerError::fail("x"))
        );
    }
}
