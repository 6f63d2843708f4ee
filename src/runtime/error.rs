//! Error types surfaced to callers of generated bindings

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for runtime client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while calling a generated binding
#[derive(Error, Debug)]
pub enum ClientError {
    /// A generated method was called without one of its required arguments
    #[error("Missing required parameter '{parameter}' in call to {method}")]
    MissingParameter { parameter: String, method: String },

    /// The remote service answered with a non-success status
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Connection, TLS or protocol failure below the HTTP status level
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Client setup or token-refresh configuration problem
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A response body could not be decoded into the expected shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Build a status error with the default message, optionally extended with
    /// the first message of a structured error payload.
    pub fn from_status(status: StatusCode, detail: Option<&str>) -> Self {
        let mut message = format!("Request failed with status code {}", status.as_u16());
        if let Some(detail) = detail {
            message.push_str(": ");
            message.push_str(detail);
        }
        Self::Status { status, message }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the service rejected the session credential
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
