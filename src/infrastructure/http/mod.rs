//! HTTP access for the fetch stages

pub mod fetcher;
pub mod limiter;

pub use fetcher::{Fetcher, HttpFetcher, fetch_json};
pub use limiter::RequestLimiter;

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::Fetcher;
    use crate::generation::GenerationError;

    /// In-memory fetcher; unknown URLs fail like a 404
    #[derive(Default)]
    pub struct StaticFetcher {
        responses: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
            self.responses.insert(url.to_string(), body.into());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().map(|urls| urls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, GenerationError> {
            if let Ok(mut requested) = self.requested.lock() {
                requested.push(url.to_string());
            }
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| GenerationError::LoadError(format!("HTTP 404 when fetching {}", url)))
        }
    }
}
