//! Error taxonomy for config resolution and construction.

/// Errors produced by the registry, the resolution engines and the
/// construction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("kind already registered: {0}")]
    DuplicateKind(String),

    #[error("unknown kind: {0}")]
    UnknownKind(String),

    #[error("implementation {name} already registered under kind {kind}")]
    DuplicateImplementation { kind: String, name: String },

    #[error("unknown implementation {name} for kind {kind}")]
    UnknownImplementation { kind: String, name: String },

    #[error("no kind context for discriminated node at {path:?}")]
    MissingKindContext { path: String },

    #[error("missing discriminator field at {path:?}")]
    MissingDiscriminator { path: String },

    #[error("malformed config at {path:?}: {reason}")]
    MalformedConfig { path: String, reason: String },

    #[error("kind {kind} produces {expected}, requested {requested}")]
    KindTypeMismatch {
        kind: String,
        expected: &'static str,
        requested: &'static str,
    },

    #[error("constructor {kind}/{name} failed: {source}")]
    Constructor {
        kind: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
