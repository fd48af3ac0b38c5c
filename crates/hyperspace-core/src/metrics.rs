//! Global atomic counters for config resolution.
//!
//! Counters are incremented silently by the engines. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. after a task has been resolved and built).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations, no locking.
pub struct Metrics {
    defaults_inserted: AtomicU64,
    overrides_merged: AtomicU64,
    components_built: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            defaults_inserted: AtomicU64::new(0),
            overrides_merged: AtomicU64::new(0),
            components_built: AtomicU64::new(0),
        }
    }

    /// Increment the defaults-inserted counter by one.
    pub fn inc_defaults_inserted(&self) {
        self.defaults_inserted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "defaults_inserted", "counter incremented");
    }

    /// Increment the overrides-merged counter by one.
    pub fn inc_overrides_merged(&self) {
        self.overrides_merged.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "overrides_merged", "counter incremented");
    }

    /// Increment the components-built counter by one.
    pub fn inc_components_built(&self) {
        self.components_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "components_built", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            defaults_inserted = self.defaults_inserted(),
            overrides_merged = self.overrides_merged(),
            components_built = self.components_built(),
        );
    }

    pub fn defaults_inserted(&self) -> u64 {
        self.defaults_inserted.load(Ordering::Relaxed)
    }

    pub fn overrides_merged(&self) -> u64 {
        self.overrides_merged.load(Ordering::Relaxed)
    }

    pub fn components_built(&self) -> u64 {
        self.components_built.load(Ordering::Relaxed)
    }
}
