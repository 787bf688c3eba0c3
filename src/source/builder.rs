use std::marker::PhantomData;
use std::sync::Arc;

use crate::redirect::{DirectInvoke, Redirect};

use super::{SourceConfig, WeakEventSource};

/// Builder for constructing a [`WeakEventSource`] with optional features.
pub struct WeakEventSourceBuilder<A> {
    cfg: SourceConfig,
    redirect: Arc<dyn Redirect>,
    _args: PhantomData<fn(&A)>,
}

impl<A> WeakEventSourceBuilder<A> {
    /// Creates a builder with the default configuration and direct invocation.
    pub fn new() -> Self {
        Self {
            cfg: SourceConfig::default(),
            redirect: Arc::new(DirectInvoke),
            _args: PhantomData,
        }
    }

    /// Sets the source configuration.
    pub fn with_config(mut self, cfg: SourceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the hook every handler invocation is routed through.
    ///
    /// The hook receives the owning module of each handler and must call the invocation
    /// it is given. See [`Redirect`].
    pub fn with_redirect(mut self, redirect: Arc<dyn Redirect>) -> Self {
        self.redirect = redirect;
        self
    }

    /// Builds the source. Storage is allocated on the first subscribe.
    pub fn build(self) -> WeakEventSource<A> {
        tracing::trace!(redirect = self.redirect.name(), config = ?self.cfg, "building event source");
        WeakEventSource::with_parts(self.cfg, self.redirect)
    }
}

impl<A> Default for WeakEventSourceBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
