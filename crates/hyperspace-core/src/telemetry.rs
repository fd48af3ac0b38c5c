//! Centralised tracing initialisation for programs embedding the resolver.
//!
//! Call [`init_tracing`] once at program start to configure the global
//! subscriber with an `EnvFilter` and optional JSON formatting, or
//! [`TelemetryConfig::from_env`] followed by [`TelemetryConfig::init`] to
//! take both settings from the environment.
//!
//! Subsequent calls are silently ignored (the global subscriber can only be
//! set once per process).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "HYPERSPACE_LOG";
/// Environment variable selecting `json` or `text` output.
pub const LOG_FORMAT_ENV: &str = "HYPERSPACE_LOG_FORMAT";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub json: bool,
    pub level: Level,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
        }
    }
}

impl TelemetryConfig {
    /// Read [`LOG_LEVEL_ENV`] and [`LOG_FORMAT_ENV`]; unset or unparsable
    /// values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(LOG_LEVEL_ENV).ok().as_deref(),
            std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
        )
    }

    fn from_vars(level: Option<&str>, format: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            json: format.is_some_and(|f| f.eq_ignore_ascii_case("json")),
            level: level
                .and_then(|l| l.parse::<Level>().ok())
                .unwrap_or(defaults.level),
        }
    }

    pub fn init(&self) {
        init_tracing(self.json, self.level);
    }
}

/// Initialise the global tracing subscriber.
///
/// * `json`: when `true`, emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// Respects the `RUST_LOG` environment variable for fine-grained filtering.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
