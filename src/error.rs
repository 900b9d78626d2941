//! Error types for retail-siting

use thiserror::Error;

/// Main error type for retail-siting operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Location is not eligible: {0}")]
    Ineligible(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type alias for retail-siting operations
pub type Result<T> = std::result::Result<T, Error>;
