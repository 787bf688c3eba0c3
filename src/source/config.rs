//! # Event source configuration.
//!
//! Provides [`SourceConfig`], the settings a [`WeakEventSource`](crate::WeakEventSource) is
//! built with.
//!
//! ## Sentinel values
//! - `dead_scan_interval = 0` → subscribing never scans for dead handlers
//!   (dispatch and unsubscribe still compact)
//! - `shrink_threshold = 0` → storage is shrunk whenever it is mostly empty

/// Configuration for a weak event source.
///
/// ## Field semantics
/// - `dead_scan_interval`: subscribes between opportunistic dead-handler scans (`0` = never)
/// - `catch_panics`: turn handler panics into [`HandlerError::Panicked`](crate::HandlerError::Panicked)
/// - `shrink_threshold`: minimum slot capacity before compaction releases memory
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to checking sentinels by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Number of subscribe calls between dead-handler scans.
    ///
    /// Sources that are subscribed to often but rarely raised would otherwise keep dead
    /// entries until the next raise. Every raise resets the countdown, since the dispatch
    /// scan already purges dead entries.
    pub dead_scan_interval: usize,

    /// Whether a panicking handler is caught and reported as an error.
    ///
    /// When `false`, the panic unwinds through `raise`. The registry stays consistent
    /// either way because handlers never run under the registry lock.
    pub catch_panics: bool,

    /// Slot capacity under which compaction never shrinks storage.
    pub shrink_threshold: usize,
}

impl SourceConfig {
    /// Returns the dead-handler scan interval as an `Option`.
    ///
    /// - `None` → subscribe never triggers a scan
    /// - `Some(n)` → every `n`-th subscribe scans
    #[inline]
    pub fn dead_scan_period(&self) -> Option<usize> {
        if self.dead_scan_interval == 0 {
            None
        } else {
            Some(self.dead_scan_interval)
        }
    }

    /// Returns `true` if storage of `capacity` slots holding `len` entries should shrink.
    #[inline]
    pub(crate) fn should_shrink(&self, len: usize, capacity: usize) -> bool {
        capacity > self.shrink_threshold && len < capacity / 4
    }
}

impl Default for SourceConfig {
    /// Default configuration:
    ///
    /// - `dead_scan_interval = 32`
    /// - `catch_panics = true`
    /// - `shrink_threshold = 64`
    fn default() -> Self {
        Self {
            dead_scan_interval: 32,
            catch_panics: true,
            shrink_threshold: 64,
        }
    }
}
