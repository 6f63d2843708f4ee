//! HTTP fetcher shared by discovery, metadata and document stages

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::generation::GenerationError;
use crate::infrastructure::http::RequestLimiter;

/// Fetches text resources by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, GenerationError>;
}

/// Fetch and decode a JSON resource
pub async fn fetch_json<T, F>(fetcher: &F, url: &str) -> Result<T, GenerationError>
where
    T: DeserializeOwned,
    F: Fetcher + ?Sized,
{
    let content = fetcher.fetch_text(url).await?;
    Ok(serde_json::from_str(&content)?)
}

/// reqwest-backed [`Fetcher`] honoring a [`RequestLimiter`]
pub struct HttpFetcher {
    client: Client,
    limiter: RequestLimiter,
}

impl HttpFetcher {
    pub fn new(
        limiter: RequestLimiter,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| GenerationError::LoadError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, limiter })
    }

    /// Use a preconfigured client (custom resolvers, proxies)
    pub fn with_client(client: Client, limiter: RequestLimiter) -> Self {
        Self { client, limiter }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, GenerationError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(GenerationError::LoadError(format!(
                "Only HTTP(S) URLs can be fetched, got: {}",
                url
            )));
        }

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| GenerationError::LoadError(format!("Request limiter closed: {}", e)))?;

        debug!(url = %url, "Fetching");
        let response = self.client.get(url).send().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to fetch {}: {}", url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {} when fetching {}",
                status, url
            )));
        }

        response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read response body: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(RequestLimiter::new(4), "apiweave-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/metadata"))
            .and(header("user-agent", "apiweave-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"versions":["v1"]}"#))
            .mount(&mock_server)
            .await;

        let url = format!("{}/docs/metadata", mock_server.uri());
        let value: Value = fetch_json(&fetcher(), &url).await.unwrap();
        assert_eq!(value["versions"][0], "v1");
    }

    #[tokio::test]
    async fn test_error_status_is_load_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        match fetcher().fetch_text(&url).await.unwrap_err() {
            GenerationError::LoadError(msg) => assert!(msg.contains("HTTP 404")),
            other => panic!("Expected LoadError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let result: Result<Value, _> = fetch_json(&fetcher(), &mock_server.uri()).await;
        assert!(matches!(result, Err(GenerationError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_non_http_url() {
        let err = fetcher().fetch_text("file:///etc/hosts").await.unwrap_err();
        assert!(err.to_string().contains("Only HTTP(S)"));
    }
}
