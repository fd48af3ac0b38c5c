//! Hyperspace Core Library
//!
//! Registry-driven resolution of polymorphic component configs:
//! - `Registry`: kinds and their named implementations, with constructors
//!   and default-config suppliers
//! - `fill_defaults`: complete a partial config from declared defaults
//! - `merge_override`: apply a partial override onto a base config
//! - `Registry::build`: construct a component tree from a resolved config

pub mod construct;
pub mod defaults;
pub mod document;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod obs;
pub mod registry;
pub mod scenario;
pub mod task;
pub mod telemetry;

pub use construct::Params;
pub use defaults::fill_defaults;
pub use document::{
    child_path, discriminator, into_document, is_discriminated, require_discriminator, Document,
    DISCRIMINATOR_FIELD,
};
pub use error::{ConfigError, Result};
pub use merge::merge_override;
pub use metrics::METRICS;
pub use obs::ResolveSpan;
pub use registry::{Constructor, DefaultSupplier, Registry, RegistryBuilder};
pub use scenario::{RunOutcome, ScalarLog, Scenario};
pub use task::{prepare_run, resolve, PreparedRun, RunSettings, Task};
pub use telemetry::{init_tracing, TelemetryConfig};

/// Hyperspace version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
