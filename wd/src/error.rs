//! Error types for workspace deployment

use thiserror::Error;

/// Pre-flight configuration errors. Any of these stops the run before an
/// artifact is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors from a single remote call. Always recoverable at the artifact boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Check if the request never got a response in time
    pub fn is_timeout(&self) -> bool {
        match self {
            ApiError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status of the failed call, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
