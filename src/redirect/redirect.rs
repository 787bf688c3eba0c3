//! # Dispatch redirection hook.
//!
//! Provides [`Redirect`], an extension point that wraps every handler invocation of a
//! [`WeakEventSource`](crate::WeakEventSource). Typical uses are running handlers inside a
//! per-module context (tracing span, thread-local scope, privilege elevation) or observing
//! dispatch.
//!
//! ## Architecture
//! ```text
//! raise ──► snapshot ──► for each handler:
//!                          redirect.redirect(owner, &mut || handler.invoke(sender, args))
//!                                   │
//!                                   └─► must call `invoke` at most once and return its result
//! ```
//!
//! The hook is injected once at construction through
//! [`WeakEventSourceBuilder::with_redirect`](crate::WeakEventSourceBuilder::with_redirect).
//! Without one, [`DirectInvoke`] calls the handler directly.
//!
//! ## Example
//! ```rust
//! use weak_event::{HandlerResult, Redirect};
//!
//! struct Audit;
//!
//! impl Redirect for Audit {
//!     fn redirect(&self, owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult {
//!         println!("dispatching into {owner}");
//!         invoke()
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::HandlerResult;

/// Wraps each handler invocation of an event source.
pub trait Redirect: Send + Sync + 'static {
    /// Runs `invoke` on behalf of a handler owned by module `owner`.
    ///
    /// Implementations should call `invoke` exactly once and return its result. Skipping it
    /// silently drops the invocation; returning an error reports it as the handler's failure.
    fn redirect(&self, owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult;

    /// Returns the hook name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Default hook: invokes handlers directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectInvoke;

impl Redirect for DirectInvoke {
    #[inline]
    fn redirect(&self, _owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult {
        invoke()
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Function-backed redirect hook.
///
/// Wraps a closure `F: Fn(&str, &mut dyn FnMut() -> HandlerResult) -> HandlerResult`.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use weak_event::{Redirect, RedirectFn};
///
/// let hook: Arc<dyn Redirect> = RedirectFn::arc("passthrough", |_owner, invoke| invoke());
/// assert_eq!(hook.name(), "passthrough");
/// ```
pub struct RedirectFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> RedirectFn<F>
where
    F: Fn(&str, &mut dyn FnMut() -> HandlerResult) -> HandlerResult + Send + Sync + 'static,
{
    /// Creates a new function-backed hook.
    ///
    /// Prefer [`RedirectFn::arc`] when you immediately need an `Arc<dyn Redirect>`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the hook and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Redirect for RedirectFn<F>
where
    F: Fn(&str, &mut dyn FnMut() -> HandlerResult) -> HandlerResult + Send + Sync + 'static,
{
    fn redirect(&self, owner: &str, invoke: &mut dyn FnMut() -> HandlerResult) -> HandlerResult {
        (self.f)(owner, invoke)
    }

    fn name(&self) -> &'static str {
        match &self.name {
            Cow::Borrowed(name) => name,
            Cow::Owned(_) => "redirect_fn",
        }
    }
}

impl<F> fmt::Debug for RedirectFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectFn").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::HandlerError;

    #[test]
    fn test_direct_invoke_returns_handler_result() {
        let mut calls = 0;
        let res = DirectInvoke.redirect("owner", &mut || {
            calls += 1;
            Err(HandlerError::fail("boom"))
        });
        assert_eq!(calls, 1);
        assert_eq!(res, Err(HandlerError::fail("boom")));
    }

    #[test]
    fn test_redirect_fn_sees_owner() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = Arc::clone(&seen);
        let hook = RedirectFn::arc("recorder", move |owner, invoke| {
            seen_in_hook.lock().unwrap().push(owner.to_string());
            invoke()
        });

        assert_eq!(hook.redirect("module_a", &mut || Ok(())), Ok(()));
        assert_eq!(hook.name(), "recorder");
        assert_eq!(*seen.lock().unwrap(), vec!["module_a".to_string()]);
    }

    #[test]
    fn test_owned_name_falls_back() {
        let hook = RedirectFn::new(String::from("dynamic"), |_owner, invoke| invoke());
        assert_eq!(hook.name(), "redirect_fn");
    }
}
