use thiserror::Error;

/// Errors that can occur when talking to the OpenTok platform
#[derive(Error, Debug)]
pub enum OpenTokError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to sign API request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("OpenTok returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for OpenTok operations
pub type Result<T> = std::result::Result<T, OpenTokError>;
