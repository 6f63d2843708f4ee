//! Request and response types of the application use cases

use std::path::PathBuf;

use crate::config::Config;

/// Input of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateBindingsRequest {
    pub config: Config,
    /// Base URLs tried ahead of anything the configured sources yield
    pub base_urls: Vec<String>,
}

/// Outcome of a successful generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateBindingsResponse {
    /// Candidates that answered with usable metadata
    pub available: usize,
    /// Candidates tried
    pub total: usize,
    pub apis: usize,
    pub versions: usize,
    pub methods: usize,
    pub artifacts_count: usize,
    pub output_path: PathBuf,
}
