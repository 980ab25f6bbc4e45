//! Error types for llmrec.
//!
//! The first four variants are the policy engine's own failures; callers match on
//! them to decide recoverability. The rest are ambient I/O and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecError {
    /// Caller-supplied input rejected synchronously (bad vector length, index, config).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A persisted snapshot is internally inconsistent.
    #[error("malformed policy state: {0}")]
    MalformedState(String),

    /// A design matrix failed to factor as positive-definite.
    #[error("numeric degeneracy: {0}")]
    NumericDegenerate(String),

    /// Unknown action identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// The in-memory update succeeded but the durable save did not.
    #[error("policy updated in memory but not persisted: {0}")]
    PersistFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RecError {
    /// Stable machine-readable code used in robot output and JSON-RPC error data.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::MalformedState(_) => "malformed_state",
            Self::NumericDegenerate(_) => "numeric_degenerate",
            Self::NotFound(_) => "not_found",
            Self::PersistFailed(_) => "persist_failed",
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
        }
    }
}

pub type Result<T> = std::result::Result<T, RecError>;
