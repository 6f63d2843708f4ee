//! Endpoint discovery: candidate base URLs scraped from external sources

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::application::ApplicationError;
use crate::infrastructure::http::Fetcher;

static ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).expect("valid anchor regex")
});

/// How candidate URLs are pulled out of a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionRule {
    /// `href` values of anchor tags; the part matching `pattern` is kept
    AnchorLinks { pattern: String },
    /// One URL per non-empty line, `#` starts a comment line
    Lines,
    /// Every match of `pattern` anywhere in the document
    Regex { pattern: String },
}

impl ExtractionRule {
    /// Extract raw candidates from `content`.
    ///
    /// When the pattern has a capture group the first group is kept,
    /// otherwise the whole match. An invalid pattern extracts nothing.
    pub fn extract(&self, content: &str) -> Vec<String> {
        match self {
            ExtractionRule::Lines => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect(),
            ExtractionRule::AnchorLinks { pattern } => {
                let Some(regex) = compile(pattern) else {
                    return Vec::new();
                };
                ANCHOR_HREF
                    .captures_iter(content)
                    .filter_map(|caps| caps.get(1))
                    .filter_map(|href| first_match(&regex, href.as_str()))
                    .collect()
            }
            ExtractionRule::Regex { pattern } => {
                let Some(regex) = compile(pattern) else {
                    return Vec::new();
                };
                regex
                    .captures_iter(content)
                    .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
                    .map(|m| m.as_str().to_string())
                    .collect()
            }
        }
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Invalid extraction pattern");
            None
        }
    }
}

fn first_match(regex: &Regex, haystack: &str) -> Option<String> {
    let caps = regex.captures(haystack)?;
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// One external page listing API base URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSource {
    pub url: String,
    pub rule: ExtractionRule,
}

/// Trim surrounding whitespace and trailing slashes; non-HTTP values are rejected
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let is_http = trimmed.starts_with("https://") || trimmed.starts_with("http://");
    let has_host = trimmed.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
    (is_http && has_host).then(|| trimmed.to_string())
}

/// Normalize, deduplicate (first occurrence wins) and drop excluded URLs
pub fn merge_candidates<I>(candidates: I, exclude: &HashSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let exclude: HashSet<String> = exclude
        .iter()
        .filter_map(|url| normalize_base_url(url))
        .collect();
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .filter_map(|raw| normalize_base_url(&raw))
        .filter(|url| !exclude.contains(url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Gather candidate base URLs.
///
/// `seeds` come first, followed by every source in declaration order. A
/// source that cannot be fetched is logged and skipped; ending up with no
/// candidate at all is an error.
pub async fn discover<F>(
    fetcher: &F,
    sources: &[EndpointSource],
    seeds: &[String],
    exclude: &HashSet<String>,
) -> Result<Vec<String>, ApplicationError>
where
    F: Fetcher + ?Sized,
{
    let fetched = join_all(sources.iter().map(|source| async move {
        match fetcher.fetch_text(&source.url).await {
            Ok(content) => {
                let found = source.rule.extract(&content);
                debug!(source = %source.url, count = found.len(), "Extracted candidates");
                found
            }
            Err(e) => {
                warn!(source = %source.url, error = %e, "Discovery source failed");
                Vec::new()
            }
        }
    }))
    .await;

    let candidates = merge_candidates(
        seeds.iter().cloned().chain(fetched.into_iter().flatten()),
        exclude,
    );

    if candidates.is_empty() {
        return Err(ApplicationError::NoCandidates);
    }

    info!(count = candidates.len(), "Discovered candidate APIs");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::testing::StaticFetcher;
    use tracing_test::traced_test;

    const PAGE: &str = r#"
        <ul>
          <li><a href="https://friends.example.com/docs/index.html">Friends</a></li>
          <li><a class="x" href='https://chat.example.com/docs'>Chat</a></li>
          <li><a href="/about">About</a></li>
        </ul>
    "#;

    fn anchor_rule() -> ExtractionRule {
        ExtractionRule::AnchorLinks {
            pattern: r"https://[a-z0-9-]+\.example\.com".to_string(),
        }
    }

    fn exclude(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|url| url.to_string()).collect()
    }

    #[test]
    fn test_anchor_links_keep_matching_part() {
        assert_eq!(
            anchor_rule().extract(PAGE),
            vec!["https://friends.example.com", "https://chat.example.com"]
        );
    }

    #[test]
    fn test_lines_rule() {
        let rule = ExtractionRule::Lines;
        assert_eq!(
            rule.extract("https://a.example.com\n\n  # comment\n https://b.example.com/ \n"),
            vec!["https://a.example.com", "https://b.example.com/"]
        );
    }

    #[test]
    fn test_regex_rule_uses_first_group() {
        let rule = ExtractionRule::Regex {
            pattern: r#""baseUrl":\s*"([^"]+)""#.to_string(),
        };
        assert_eq!(
            rule.extract(r#"[{"baseUrl": "https://a.example.com"}, {"baseUrl": "https://b.example.com"}]"#),
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn test_invalid_pattern_extracts_nothing() {
        let rule = ExtractionRule::Regex {
            pattern: "(".to_string(),
        };
        assert!(rule.extract("anything").is_empty());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url(" https://x.example.com/ "),
            Some("https://x.example.com".to_string())
        );
        assert_eq!(normalize_base_url("ftp://x.example.com"), None);
        assert_eq!(normalize_base_url("https://"), None);
        assert_eq!(normalize_base_url(""), None);
    }

    #[test]
    fn test_merge_dedupes_and_excludes() {
        let merged = merge_candidates(
            vec![
                "https://b.example.com".to_string(),
                "https://a.example.com/".to_string(),
                "https://b.example.com/".to_string(),
                "https://gone.example.com".to_string(),
                "not a url".to_string(),
            ],
            &exclude(&["https://gone.example.com/"]),
        );
        assert_eq!(merged, vec!["https://b.example.com", "https://a.example.com"]);
    }

    #[tokio::test]
    async fn test_discover_merges_sources_in_order() {
        let fetcher = StaticFetcher::new()
            .with("https://example.com/apis", PAGE)
            .with("https://example.com/apis.txt", "https://chat.example.com\nhttps://games.example.com\n");
        let sources = vec![
            EndpointSource {
                url: "https://example.com/apis".to_string(),
                rule: anchor_rule(),
            },
            EndpointSource {
                url: "https://example.com/apis.txt".to_string(),
                rule: ExtractionRule::Lines,
            },
        ];

        let found = discover(
            &fetcher,
            &sources,
            &["https://seed.example.com".to_string()],
            &exclude(&["https://friends.example.com"]),
        )
        .await
        .unwrap();

        assert_eq!(
            found,
            vec![
                "https://seed.example.com",
                "https://chat.example.com",
                "https://games.example.com"
            ]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failing_source_is_skipped() {
        let fetcher = StaticFetcher::new().with("https://example.com/apis", PAGE);
        let sources = vec![
            EndpointSource {
                url: "https://down.example.com/list".to_string(),
                rule: ExtractionRule::Lines,
            },
            EndpointSource {
                url: "https://example.com/apis".to_string(),
                rule: anchor_rule(),
            },
        ];

        let found = discover(&fetcher, &sources, &[], &HashSet::new())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(logs_contain("Discovery source failed"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_an_error() {
        let fetcher = StaticFetcher::new();
        let sources = vec![EndpointSource {
            url: "https://down.example.com/list".to_string(),
            rule: ExtractionRule::Lines,
        }];

        let err = discover(&fetcher, &sources, &[], &HashSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NoCandidates));
    }
}
