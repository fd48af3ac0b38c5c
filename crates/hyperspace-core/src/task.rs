//! Task preparation: the resolve-then-build cycle for one unit of work.
//!
//! A task source hands over a [`Task`]; only its config document is used
//! here. [`prepare_run`] fills the config's defaults, reads the optional
//! seed and builds the root component, producing a [`PreparedRun`] for the
//! execution collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::fill_defaults;
use crate::document::{child_path, into_document, Document};
use crate::error::{ConfigError, Result};
use crate::merge::merge_override;
use crate::metrics::METRICS;
use crate::obs::ResolveSpan;
use crate::registry::Registry;
use crate::scenario::{RunOutcome, Scenario};

/// One unit of work as supplied by a task source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub config: Document,
    /// Opaque resource attached by the task source; never interpreted here.
    #[serde(default)]
    pub resource: Option<Value>,
}

impl Task {
    pub fn new(name: &str, config: Document) -> Self {
        Self {
            name: name.to_string(),
            config,
            resource: None,
        }
    }
}

/// Where the runnable component and the seed live in a task config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Top-level key, and kind, of the root component.
    pub root_kind: String,
    /// Top-level key of the optional random seed.
    pub seed_key: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            root_kind: "Scenario".to_string(),
            seed_key: "seed".to_string(),
        }
    }
}

/// A task whose config is fully resolved and whose root component is built.
pub struct PreparedRun<S> {
    pub task_name: String,
    pub config: Document,
    pub seed: Option<u64>,
    pub scenario: S,
}

impl<S> fmt::Debug for PreparedRun<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRun")
            .field("task_name", &self.task_name)
            .field("config", &self.config)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl<S: Scenario> PreparedRun<S> {
    /// Run the scenario once against the resolved config.
    pub fn run(&mut self) -> anyhow::Result<RunOutcome> {
        let _span = ResolveSpan::enter(&self.task_name);
        self.scenario.single_run(&self.config)
    }
}

/// Merge `overrides` (if any) onto `base`, then fill defaults.
///
/// `kind` is the kind context of `base`, `None` for a whole document.
pub fn resolve(
    registry: &Registry,
    base: &Document,
    overrides: Option<&Document>,
    kind: Option<&str>,
) -> Result<Document> {
    match overrides {
        Some(overrides) => fill_defaults(registry, &merge_override(base, overrides)?, kind),
        None => fill_defaults(registry, base, kind),
    }
}

/// Resolve `task`'s config and build its root component.
pub fn prepare_run<S: 'static>(
    registry: &Registry,
    task: &Task,
    settings: &RunSettings,
) -> Result<PreparedRun<S>> {
    let _span = ResolveSpan::enter(&task.name);

    let config = resolve(registry, &task.config, None, None)?;

    let seed = match config.get(&settings.seed_key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_u64().ok_or_else(|| {
            ConfigError::malformed(
                child_path("", &settings.seed_key),
                format!("seed must be a non-negative integer, found {value}"),
            )
        })?),
    };

    let root_path = child_path("", &settings.root_kind);
    let root = config
        .get(&settings.root_kind)
        .cloned()
        .ok_or_else(|| ConfigError::malformed("", format!("task has no {} component", settings.root_kind)))
        .and_then(|value| into_document(value, &root_path))?;
    let scenario = registry.build_at(&root, &settings.root_kind, root_path)?;

    tracing::info!(task = %task.name, seed = ?seed, "task prepared");
    METRICS.flush();

    Ok(PreparedRun {
        task_name: task.name.clone(),
        config,
        seed,
        scenario,
    })
}
