//! Error types used by event sources and their handlers.
//!
//! This module defines two main error enums:
//!
//! - [`EventError`] - errors returned by [`WeakEventSource`](crate::WeakEventSource) operations.
//! - [`HandlerError`] - errors raised by individual subscriber callbacks.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// Result type returned by subscriber callbacks.
pub type HandlerResult = Result<(), HandlerError>;

/// # Errors produced by event source operations.
///
/// Argument errors surface synchronously and are never recovered internally.
/// Handler failures are reported one at a time: a raise never combines several
/// failures into one value.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EventError {
    /// A required argument was missing or empty (e.g. an empty handler chain).
    #[error("invalid argument `{param}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        param: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A subscriber failed while the event was being raised.
    #[error("handler `{handler}` at position {position} failed: {source}")]
    HandlerInvocation {
        /// Method name of the failing handler.
        handler: &'static str,
        /// Position of the handler in the dispatch snapshot.
        position: usize,
        /// The error raised by the handler.
        #[source]
        source: HandlerError,
    },
}

impl EventError {
    pub(crate) fn empty_chain(param: &'static str) -> Self {
        EventError::InvalidArgument {
            param,
            reason: "handler chain is empty",
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use weak_event::EventError;
    ///
    /// let err = EventError::InvalidArgument { param: "handler", reason: "empty" };
    /// assert_eq!(err.as_label(), "event_invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventError::InvalidArgument { .. } => "event_invalid_argument",
            EventError::HandlerInvocation { .. } => "event_handler_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EventError::InvalidArgument { param, reason } => {
                format!("invalid argument {param}: {reason}")
            }
            EventError::HandlerInvocation {
                handler,
                position,
                source,
            } => format!("handler {handler} (#{position}): {}", source.as_message()),
        }
    }

    /// Returns the underlying handler error, if this is a handler failure.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            EventError::HandlerInvocation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// # Errors produced by subscriber callbacks.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler reported a failure.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The handler panicked; the panic was caught at the dispatch boundary.
    #[error("handler panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

impl HandlerError {
    /// Builds a [`HandlerError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use weak_event::HandlerError;
    ///
    /// let err = HandlerError::fail("disk full");
    /// assert_eq!(err.to_string(), "handler failed: disk full");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        HandlerError::Failed {
            error: error.to_string(),
        }
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { message }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::Panicked { message } => format!("panic: {message}"),
        }
    }

    /// Indicates whether the handler unwound instead of returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}
