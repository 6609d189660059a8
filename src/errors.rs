// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JunknetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Cycle detected in job graph: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A job was reported to an orderer that is not tracking it in the
    /// required state. This is a caller bug, never a retryable condition.
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    /// The connection to a daemon broke while a job was running.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JunknetError {
    /// Whether this error is an invariant violation in the scheduling core.
    pub fn is_unknown_job(&self) -> bool {
        matches!(self, JunknetError::UnknownJob(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JunknetError>;
