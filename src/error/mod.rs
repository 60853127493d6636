// Error types for gemkit
// Author: kelexine (https://github.com/kelexine)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GemkitError {
    /// A required argument was absent or empty. Raised before any network call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not available with the configured credentials.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The server answered with a non-success status.
    #[error("Request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GemkitError {
    /// HTTP status carried by a [`GemkitError::RequestFailed`].
    pub fn status(&self) -> Option<u16> {
        match self {
            GemkitError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn missing(argument: &str) -> Self {
        GemkitError::InvalidArgument(format!("{} is required", argument))
    }
}

pub type Result<T> = std::result::Result<T, GemkitError>;
