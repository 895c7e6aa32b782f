use dsbench::{BenchError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Bench(#[from] BenchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File already exists: {path}")]
    AlreadyExists { path: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 1,
            CliError::Bench(BenchError::Config(_)) => 1,
            CliError::Io(_) => 2,
            CliError::Bench(BenchError::InvalidCount { .. }) => 3,
            CliError::Bench(_) => 4,
            CliError::Json(_) => 5,
            CliError::AlreadyExists { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Format error for user-friendly display
pub fn format_error(error: &CliError) -> String {
    match error {
        CliError::Config(e) | CliError::Bench(BenchError::Config(e)) => {
            format!(
                "Configuration Error: {}\n\nTry running 'dsbench config show' to check your configuration.",
                e
            )
        }
        CliError::Bench(BenchError::InvalidCount { count }) => {
            format!("invalid size {}\n\nThe element count must be a positive integer.", count)
        }
        CliError::AlreadyExists { path } => {
            format!("File Already Exists: {}\n\nPass --force to overwrite it.", path)
        }
        _ => error.to_string(),
    }
}
