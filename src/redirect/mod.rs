//! # Invocation redirection.
//!
//! This module provides the [`Redirect`] hook that wraps each handler invocation, and
//! built-in implementations:
//! - [`DirectInvoke`] - default, calls the handler directly
//! - [`RedirectFn`] - closure-backed hook
//! - `LogRedirect` - traces each invocation (feature `logging`)

#[cfg(feature = "logging")]
mod log;
#[allow(clippy::module_inception)]
mod redirect;

#[cfg(feature = "logging")]
pub use log::LogRedirect;
pub use redirect::{DirectInvoke, Redirect, RedirectFn};
