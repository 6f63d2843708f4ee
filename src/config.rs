//! Run configuration loaded from `apiweave.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::ApplicationError;
use crate::infrastructure::openapi::{EndpointSource, ExtractionRule};
use crate::runtime::AuthConfig;

pub const DEFAULT_CONFIG_FILE: &str = "apiweave.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub auth: AuthConfig,
    pub output: OutputConfig,
}

/// Where candidate APIs come from and how their documents are fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<EndpointSource>,
    /// Base URLs never fetched, compared after normalization
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,
    /// Per-version document path; `{version}` is replaced by the documented version
    #[serde(default = "default_document_path")]
    pub document_path: String,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_root_file")]
    pub root_file: String,
    /// Crate path the generated code imports its runtime from
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,
}

/// Community-maintained index of the public web APIs
const API_INDEX_URL: &str =
    "https://raw.githubusercontent.com/matthewdean/roblox-web-apis/main/README.md";

fn default_sources() -> Vec<EndpointSource> {
    vec![EndpointSource {
        url: API_INDEX_URL.to_string(),
        rule: ExtractionRule::Regex {
            pattern: r"(https://[a-z0-9-]+\.roblox\.com)/docs".to_string(),
        },
    }]
}

/// Hosts listed in the index without a usable metadata document
fn default_exclude() -> Vec<String> {
    [
        "https://api.roblox.com",
        "https://apis.roblox.com",
        "https://web.roblox.com",
        "https://www.roblox.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_metadata_path() -> String {
    "/docs/metadata".to_string()
}

fn default_document_path() -> String {
    "/docs/json/{version}".to_string()
}

fn default_max_concurrent_requests() -> usize {
    30
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_root_file() -> String {
    "mod.rs".to_string()
}

fn default_runtime_crate() -> String {
    "apiweave".to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            exclude: default_exclude(),
            metadata_path: default_metadata_path(),
            document_path: default_document_path(),
            max_concurrent_requests: default_max_concurrent_requests(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            root_file: default_root_file(),
            runtime_crate: default_runtime_crate(),
        }
    }
}

impl DiscoveryConfig {
    pub fn metadata_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.metadata_path)
    }

    pub fn document_url(&self, base_url: &str, version: &str) -> String {
        format!(
            "{}{}",
            base_url,
            self.document_path.replace("{version}", version)
        )
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApplicationError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ApplicationError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        toml::from_str(content).map_err(|e| ApplicationError::Config(e.to_string()))
    }

    /// Load `path` if given, else `apiweave.toml` when present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ApplicationError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
