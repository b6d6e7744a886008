//! CLI error types

use postsim_core::types::{ModelError, PosteriorError};
use postsim_engine::EngineError;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid input in {path}: {message}")]
    Input { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Posterior(#[from] PosteriorError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    pub(crate) fn input(path: &str, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
