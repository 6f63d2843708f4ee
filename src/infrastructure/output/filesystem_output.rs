//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::application::{ApplicationError, OutputService};
use crate::generation::Artifact;

const STAGING_SUFFIX: &str = ".apiweave-tmp";

/// Writes artifacts to disk in two phases.
///
/// Every artifact is first staged next to its destination; destinations are
/// only replaced once all of them staged cleanly, so a failed run leaves the
/// previous bindings in place.
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }

    async fn stage(&self, artifact: &Artifact) -> Result<PathBuf, ApplicationError> {
        if let Some(parent) = artifact.path.parent() {
            self.ensure_directory(parent).await?;
        }

        let staged = staging_path(&artifact.path);
        let io_error = |action: &str, e: std::io::Error| {
            ApplicationError::OutputError(format!(
                "Failed to {} {}: {}",
                action,
                staged.display(),
                e
            ))
        };

        let mut file = fs::File::create(&staged)
            .await
            .map_err(|e| io_error("create", e))?;
        file.write_all(artifact.content.as_bytes())
            .await
            .map_err(|e| io_error("write", e))?;
        file.sync_all().await.map_err(|e| io_error("sync", e))?;

        Ok(staged)
    }
}

/// `dir/Chat_1.rs` → `dir/Chat_1.rs.apiweave-tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

async fn discard(staged: &[PathBuf]) {
    for path in staged {
        match fs::remove_file(path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), error = %e, "Failed to remove staged file")
            }
            _ => {}
        }
    }
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
        let mut staged = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            match self.stage(artifact).await {
                Ok(path) => staged.push(path),
                Err(e) => {
                    // a partially written staging file may exist too
                    staged.push(staging_path(&artifact.path));
                    discard(&staged).await;
                    return Err(e);
                }
            }
        }

        for (artifact, staged_path) in artifacts.iter().zip(&staged) {
            fs::rename(staged_path, &artifact.path).await.map_err(|e| {
                ApplicationError::OutputError(format!(
                    "Failed to move {} into place: {}",
                    artifact.path.display(),
                    e
                ))
            })?;
            debug!(path = %artifact.path.display(), bytes = artifact.content.len(), "Wrote artifact");
        }

        Ok(())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), ApplicationError> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(path).await.map_err(|e| {
            ApplicationError::OutputError(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}
