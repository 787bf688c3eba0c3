//! Public event source facade: [`WeakEventSource`], its builder and configuration.

mod builder;
mod config;
#[allow(clippy::module_inception)]
mod source;

pub use builder::WeakEventSourceBuilder;
pub use config::SourceConfig;
pub use source::WeakEventSource;
