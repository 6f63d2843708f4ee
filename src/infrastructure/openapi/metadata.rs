//! Metadata stage: one metadata document per candidate base URL

use futures::future::join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::generation::ApiMetadata;
use crate::generation::utils::to_title_case;
use crate::infrastructure::http::{Fetcher, fetch_json};

/// Metadata document served by each API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetadataDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    pub versions: Vec<String>,
}

/// Usable APIs keyed by identifier, plus how many candidates produced one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataReport {
    pub apis: BTreeMap<String, ApiMetadata>,
    /// Candidates that yielded a usable metadata entry
    pub available: usize,
    /// Candidates tried
    pub total: usize,
}

/// Derive the API identifier from its base URL.
///
/// The host must have at least three labels and the first label may only
/// contain ASCII letters, digits and hyphens. Hyphenated parts are
/// title-cased and joined: `https://game-passes.example.com` → `GamePasses`.
pub fn derive_identifier(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 {
        return None;
    }

    let subdomain = labels[0];
    if subdomain.is_empty()
        || !subdomain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return None;
    }

    let identifier: String = subdomain
        .split('-')
        .filter(|part| !part.is_empty())
        .map(to_title_case)
        .collect();

    identifier
        .starts_with(|c: char| c.is_ascii_alphabetic())
        .then_some(identifier)
}

/// Fetch the metadata of every candidate concurrently.
///
/// Failures of any kind drop the candidate. When two candidates derive the
/// same identifier, the one listed first wins regardless of which request
/// completed first.
pub async fn fetch_all<F>(
    fetcher: &F,
    candidates: &[String],
    config: &DiscoveryConfig,
) -> MetadataReport
where
    F: Fetcher + ?Sized,
{
    let results = join_all(candidates.iter().map(|base_url| async move {
        let Some(identifier) = derive_identifier(base_url) else {
            debug!(url = %base_url, "Dropping candidate with unrecognized host");
            return None;
        };

        match fetch_json::<MetadataDocument, F>(fetcher, &config.metadata_url(base_url)).await {
            Ok(document) => Some(ApiMetadata {
                identifier,
                base_url: base_url.clone(),
                name: document.name,
                description: document.description,
                versions: document.versions,
            }),
            Err(e) => {
                debug!(url = %base_url, error = %e, "Dropping candidate without metadata");
                None
            }
        }
    }))
    .await;

    let mut report = MetadataReport {
        total: candidates.len(),
        ..MetadataReport::default()
    };

    for metadata in results.into_iter().flatten() {
        report.available += 1;
        if report.apis.contains_key(&metadata.identifier) {
            debug!(
                identifier = %metadata.identifier,
                url = %metadata.base_url,
                "Identifier already taken by an earlier candidate"
            );
            continue;
        }
        report.apis.insert(metadata.identifier.clone(), metadata);
    }

    info!(
        available = report.available,
        total = report.total,
        "Fetched API metadata"
    );
    report
}
