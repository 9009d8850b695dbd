//! Error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::EntityId;

/// Failures talking to the external route solver.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("no API key configured for the route solver")]
    MissingApiKey,

    #[error("route solver request timed out")]
    Timeout,

    #[error("route solver transport error: {0}")]
    Transport(reqwest::Error),

    #[error("route solver returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not encode or decode solver payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("route solver response contained no route")]
    EmptyResponse,
}

impl From<reqwest::Error> for SolverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SolverError::Timeout
        } else {
            SolverError::Transport(err)
        }
    }
}

/// Failures reported by a repository adapter.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    #[error("repository backend error: {0}")]
    Backend(String),
}

/// Route state could not be fully written back.
///
/// Writes are independent; `written` entities keep their new state.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("{} of {} route writes failed", .failed.len(), .failed.len() + .written)]
    Partial {
        written: usize,
        failed: Vec<(EntityId, RepositoryError)>,
    },

    #[error("could not read route entities: {0}")]
    Read(#[from] RepositoryError),
}

/// Failures loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}
