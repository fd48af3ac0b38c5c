//! Contract between built components and the execution collaborator.
//!
//! A [`Scenario`] is the runnable root of a resolved task. The collaborator
//! calls [`Scenario::single_run`] with the resolved config and records the
//! returned [`RunOutcome`]. Scenarios keep intermediate metrics in a
//! [`ScalarLog`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// Result of a single scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The scalar the run is judged by.
    pub result: f64,
    /// Free-form diagnostic info recorded alongside the result.
    #[serde(default)]
    pub diagnostics: Document,
}

impl RunOutcome {
    pub fn new(result: f64) -> Self {
        Self {
            result,
            diagnostics: Document::new(),
        }
    }

    /// Attach a diagnostic value (builder pattern).
    pub fn with_diagnostic(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.diagnostics.insert(key.to_string(), value.into());
        self
    }
}

/// A runnable component built from a task's config.
pub trait Scenario: Send {
    fn single_run(&mut self, params: &Document) -> anyhow::Result<RunOutcome>;
}

impl<S: Scenario + ?Sized> Scenario for Box<S> {
    fn single_run(&mut self, params: &Document) -> anyhow::Result<RunOutcome> {
        (**self).single_run(params)
    }
}

/// Named series of scalar metrics, keyed by step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarLog {
    series: BTreeMap<String, BTreeMap<u64, f64>>,
}

impl ScalarLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for metric `name` at `step`, or at the step after the
    /// highest one recorded so far (0 for a new metric). Returns the step.
    ///
    /// Returns `None` and records nothing when no step is given and the
    /// series already holds `u64::MAX`.
    pub fn log_scalar(&mut self, name: &str, value: f64, step: Option<u64>) -> Option<u64> {
        let series = self.series.entry(name.to_string()).or_default();
        let step = match step {
            Some(step) => step,
            None => match series.last_key_value() {
                Some((last, _)) => last.checked_add(1)?,
                None => 0,
            },
        };
        series.insert(step, value);
        tracing::trace!(metric = %name, step = step, value = value, "scalar logged");
        Some(step)
    }

    pub fn series(&self, name: &str) -> Option<&BTreeMap<u64, f64>> {
        self.series.get(name)
    }

    /// Value at the highest recorded step of `name`.
    pub fn last(&self, name: &str) -> Option<(u64, f64)> {
        self.series
            .get(name)?
            .last_key_value()
            .map(|(step, value)| (*step, *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
