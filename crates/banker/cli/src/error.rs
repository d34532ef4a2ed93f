//! CLI error types

use banker_core::{BankerError, ValidationError};
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Banker(#[from] BankerError),

    /// A request or release the engine refused; already reported on stdout.
    #[error("denied: {0}")]
    Denied(BankerError),

    #[error("unsupported file format: {0} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

impl CliError {
    /// Process exit status: 2 for a denial, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Denied(_) => 2,
            _ => 1,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
