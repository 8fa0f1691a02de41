// ABOUTME: Error types for the bitacora site
// ABOUTME: Provides structured error handling for data loading, serving and live sessions

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BitacoraError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("Malformed talk data: {0}")]
    DataError(#[from] serde_json::Error),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP server error: {0}")]
    ServerError(String),

    #[error("Live session error: {0}")]
    LiveError(#[from] tungstenite::Error),

    #[error("{0}")]
    CommandError(String),
}

// Failures wrapped with context by the CLI
impl From<anyhow::Error> for BitacoraError {
    fn from(err: anyhow::Error) -> Self {
        BitacoraError::CommandError(err.to_string())
    }
}

// Implement conversion from URL parse errors
impl From<url::ParseError> for BitacoraError {
    fn from(err: url::ParseError) -> Self {
        BitacoraError::InvalidResourcePath(format!("Invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, BitacoraError>;
