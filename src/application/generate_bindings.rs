//! Use case for generating API bindings from discovered endpoints

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::application::{
    ApplicationError, GenerateBindingsRequest, GenerateBindingsResponse, OutputService,
};
use crate::infrastructure::generation::{EmitOptions, emit};
use crate::infrastructure::http::Fetcher;
use crate::infrastructure::openapi::{build_tree, discover, fetch_all};

/// Discovery → metadata → documents → emit → write
pub struct GenerateBindingsUseCase {
    fetcher: Arc<dyn Fetcher>,
    output_service: Arc<dyn OutputService>,
}

impl GenerateBindingsUseCase {
    pub fn new(fetcher: Arc<dyn Fetcher>, output_service: Arc<dyn OutputService>) -> Self {
        Self {
            fetcher,
            output_service,
        }
    }

    /// Run the whole pipeline.
    ///
    /// Nothing is written unless every stage before emission succeeded.
    pub async fn execute(
        &self,
        request: GenerateBindingsRequest,
    ) -> Result<GenerateBindingsResponse, ApplicationError> {
        let config = &request.config;
        let fetcher = self.fetcher.as_ref();

        // 1. Candidate base URLs
        let exclude: HashSet<String> = config.discovery.exclude.iter().cloned().collect();
        let candidates = discover(
            fetcher,
            &config.discovery.sources,
            &request.base_urls,
            &exclude,
        )
        .await?;

        // 2. Metadata per candidate
        let report = fetch_all(fetcher, &candidates, &config.discovery).await;
        info!(
            "{} / {} endpoints available",
            report.available, report.total
        );

        // 3. Documents, compiled into the tree
        let tree = build_tree(fetcher, &report, &config.discovery).await?;

        // 4. Render
        let options = EmitOptions {
            output_dir: config.output.dir.clone(),
            root_file: config.output.root_file.clone(),
            runtime_crate: config.output.runtime_crate.clone(),
            auth: config.auth.clone(),
        };
        let artifacts = emit(&tree, &options)?;

        // 5. Write
        self.output_service
            .ensure_directory(&options.output_dir)
            .await?;
        self.output_service.write_artifacts(&artifacts).await?;

        Ok(GenerateBindingsResponse {
            available: report.available,
            total: report.total,
            apis: tree.api_count(),
            versions: tree.version_count(),
            methods: tree.method_count(),
            artifacts_count: artifacts.len(),
            output_path: options.output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::generation::{Artifact, GenerationError};
    use crate::infrastructure::http::testing::StaticFetcher;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingOutputService {
        written: Mutex<Vec<Artifact>>,
    }

    impl RecordingOutputService {
        fn paths(&self) -> Vec<PathBuf> {
            self.written
                .lock()
                .unwrap()
                .iter()
                .map(|a| a.path.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl OutputService for RecordingOutputService {
        async fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
            self.written.lock().unwrap().extend_from_slice(artifacts);
            Ok(())
        }

        async fn ensure_directory(&self, _path: &Path) -> Result<(), ApplicationError> {
            Ok(())
        }
    }

    fn request() -> GenerateBindingsRequest {
        let mut config = Config::default();
        config.output.dir = PathBuf::from("out");
        GenerateBindingsRequest {
            config,
            base_urls: vec![
                "https://friends.example.com".to_string(),
                "https://down.example.com".to_string(),
            ],
        }
    }

    fn friends_fetcher(v1: serde_json::Value) -> StaticFetcher {
        StaticFetcher::new()
            .with(
                "https://friends.example.com/docs/metadata",
                json!({"name": "Friends Api", "versions": ["v1"]}).to_string(),
            )
            .with("https://friends.example.com/docs/json/v1", v1.to_string())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_execute_success() {
        let fetcher = friends_fetcher(json!({
            "paths": {"/v1/users/{userId}/friends": {"get": {"parameters": [
                {"name": "userId", "in": "path", "required": true, "type": "integer"}
            ]}}}
        }));
        let output = Arc::new(RecordingOutputService::default());
        let use_case = GenerateBindingsUseCase::new(Arc::new(fetcher), output.clone());

        let response = use_case.execute(request()).await.unwrap();

        assert_eq!(response.available, 1);
        assert_eq!(response.total, 2);
        assert_eq!(response.apis, 1);
        assert_eq!(response.methods, 1);
        assert_eq!(response.artifacts_count, 2);
        assert_eq!(
            output.paths(),
            vec![PathBuf::from("out/Friends_1.rs"), PathBuf::from("out/mod.rs")]
        );
        assert!(logs_contain("1 / 2 endpoints available"));
    }

    #[tokio::test]
    async fn test_structural_error_writes_nothing() {
        let fetcher = friends_fetcher(json!({
            "paths": {"/v1/me": {"get": {"parameters": [{"name": "s", "in": "cookie"}]}}}
        }));
        let output = Arc::new(RecordingOutputService::default());
        let use_case = GenerateBindingsUseCase::new(Arc::new(fetcher), output.clone());

        let err = use_case.execute(request()).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::GenerationError(GenerationError::UnsupportedLocation { .. })
        ));
        assert!(output.paths().is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let output = Arc::new(RecordingOutputService::default());
        let use_case = GenerateBindingsUseCase::new(Arc::new(StaticFetcher::new()), output);

        let err = use_case
            .execute(GenerateBindingsRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NoCandidates));
    }
}
