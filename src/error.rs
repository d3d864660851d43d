//! Error types shared by the aggregation and rendering pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, aggregating, or writing a profile graph
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unknown label renderer: {0} (expected one of: simple, table)")]
    UnknownRenderer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed invocation tree at serial {serial}: {reason}")]
    MalformedInput { serial: u64, reason: String },

    #[error("Failed to write graph to {}: {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfileError {
    pub(crate) fn malformed(serial: u64, reason: impl Into<String>) -> Self {
        ProfileError::MalformedInput {
            serial,
            reason: reason.into(),
        }
    }
}

/// Result type for profile graph operations
pub type Result<T> = std::result::Result<T, ProfileError>;
