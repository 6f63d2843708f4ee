//! Document stage: fetch every (API, version) document and compile it

use futures::future::join_all;
use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::generation::{ApiTree, GenerationError, SchemaDocument, compile_document};
use crate::infrastructure::http::{Fetcher, fetch_json};
use crate::infrastructure::openapi::MetadataReport;

/// Build the API tree from the metadata report.
///
/// Documents that cannot be fetched or decoded are skipped. A document that
/// fails to compile aborts the whole build.
pub async fn build_tree<F>(
    fetcher: &F,
    report: &MetadataReport,
    config: &DiscoveryConfig,
) -> Result<ApiTree, GenerationError>
where
    F: Fetcher + ?Sized,
{
    let jobs = report.apis.values().flat_map(move |api| {
        api.versions.iter().map(move |version| async move {
            let url = config.document_url(&api.base_url, version);
            let document = match fetch_json::<SchemaDocument, F>(fetcher, &url).await {
                Ok(document) => document,
                Err(e) => {
                    debug!(api = %api.identifier, version = %version, error = %e, "Dropping version without document");
                    return Ok(None);
                }
            };
            let methods = compile_document(&api.identifier, &api.base_url, &document)?;
            Ok::<_, GenerationError>(Some((api, version, methods)))
        })
    });

    let mut tree = ApiTree::new();
    for result in join_all(jobs).await {
        if let Some((api, version, methods)) = result? {
            if !tree.insert_version(api, version, methods) {
                debug!(api = %api.identifier, version = %version, "Version contributes no methods");
            }
        }
    }

    info!(
        apis = tree.api_count(),
        versions = tree.version_count(),
        methods = tree.method_count(),
        "Compiled API documents"
    );
    Ok(tree)
}
