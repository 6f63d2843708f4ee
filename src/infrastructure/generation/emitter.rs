//! Source emitter: one file per (API, version) plus the root aggregator

use std::path::PathBuf;
use tracing::debug;

use crate::generation::{ApiTree, Artifact, GenerationError};
use crate::infrastructure::generation::TeraTemplateRenderer;
use crate::infrastructure::generation::context::{build_aggregator_context, build_class_context};
use crate::runtime::AuthConfig;

/// Where and how sources are emitted
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub output_dir: PathBuf,
    /// Aggregator file name, normally `mod.rs`
    pub root_file: String,
    /// Crate path generated code imports the runtime from
    pub runtime_crate: String,
    /// Baked into the aggregator's `auth_config()`
    pub auth: AuthConfig,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            root_file: "mod.rs".to_string(),
            runtime_crate: "apiweave".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

/// Render the whole tree.
///
/// Versions without methods never reach the tree, so every class listed in
/// the aggregator has a file of its own. The aggregator is always last.
pub fn emit(tree: &ApiTree, options: &EmitOptions) -> Result<Vec<Artifact>, GenerationError> {
    let renderer = TeraTemplateRenderer::new()?;
    let mut artifacts = Vec::new();
    let mut apis = Vec::new();

    for api in tree.apis() {
        let mut classes = Vec::new();
        for (version_key, methods) in &api.versions {
            if methods.is_empty() {
                continue;
            }
            let class = build_class_context(api, version_key, methods, &options.runtime_crate);
            debug!(file = %class.file_name, methods = methods.len(), "Rendering class");
            artifacts.push(Artifact {
                path: options.output_dir.join(&class.file_name),
                content: renderer.render_class(&class)?,
            });
            classes.push(class);
        }
        if !classes.is_empty() {
            apis.push((api, classes));
        }
    }

    let aggregator = build_aggregator_context(&apis, &options.runtime_crate, &options.auth);
    artifacts.push(Artifact {
        path: options.output_dir.join(&options.root_file),
        content: renderer.render_aggregator(&aggregator)?,
    });

    Ok(artifacts)
}
