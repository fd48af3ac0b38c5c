//! Structured observability hooks for config resolution.
//!
//! This module provides:
//! - Task-scoped tracing spans via the `ResolveSpan` RAII guard
//! - Emission functions for engine events: defaults filled, override merged,
//!   subtree replaced, component built
//!
//! Verbosity follows `HYPERSPACE_LOG` (see [`crate::telemetry`]).

use tracing::{debug, info};

/// RAII guard that enters a task-scoped tracing span while a task's config
/// is resolved and built.
///
/// # Example
///
/// ```ignore
/// let _span = ResolveSpan::enter("sweep-042");
/// // every engine event is now tagged with task = "sweep-042"
/// ```
pub struct ResolveSpan {
    _span: tracing::span::EnteredSpan,
}

impl ResolveSpan {
    /// Create and enter a span tagged with the task name.
    pub fn enter(task: &str) -> Self {
        let span = tracing::info_span!("hyperspace.resolve", task = %task);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a document was filled with defaults.
pub fn emit_defaults_filled(kind: Option<&str>, inserted: usize) {
    debug!(
        event = "defaults.filled",
        kind = kind.unwrap_or("<document>"),
        inserted = inserted,
    );
}

/// Emit event: an override document was merged onto a base.
pub fn emit_override_merged(override_keys: usize) {
    debug!(event = "override.merged", override_keys = override_keys);
}

/// Emit event: an override switched implementations and replaced a subtree.
pub fn emit_subtree_replaced(path: &str, from: &str, to: &str) {
    info!(event = "override.subtree_replaced", path = %path, from = %from, to = %to);
}

/// Emit event: a component was constructed.
pub fn emit_component_built(kind: &str, implementation: &str) {
    debug!(event = "component.built", kind = %kind, implementation = %implementation);
}
