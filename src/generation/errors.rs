//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while discovering, compiling or emitting bindings
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(
        "Unsupported parameter location '{location}' for parameter '{parameter}' in {method} {path}"
    )]
    UnsupportedLocation {
        location: String,
        parameter: String,
        method: String,
        path: String,
    },

    #[error(
        "Operation {method} {path} declares more than one body parameter ('{first}' and '{second}')"
    )]
    DuplicateBody {
        method: String,
        path: String,
        first: String,
        second: String,
    },

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GenerationError {
    /// Structural errors abort the whole run; everything else is dropped locally
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLocation { .. } | Self::DuplicateBody { .. }
        )
    }
}
