//! apiweave CLI entrypoint
//! Parses command-line arguments and runs the binding generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use apiweave::application::{GenerateBindingsRequest, GenerateBindingsUseCase};
use apiweave::config::Config;
use apiweave::infrastructure::http::{HttpFetcher, RequestLimiter};
use apiweave::infrastructure::output::FileSystemOutputService;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use reqwest::Url;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apiweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Discover APIs and generate Rust bindings for every documented version
    Generate {
        /// Configuration file (defaults to ./apiweave.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for generated sources
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Extra API base URL to include; may be repeated
        #[arg(long = "base-url")]
        base_urls: Vec<Url>,
        /// Maximum number of concurrent HTTP requests
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output_dir,
            base_urls,
            max_concurrent,
        } => {
            let mut config =
                Config::load(config.as_deref()).context("Failed to load configuration")?;
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            if let Some(limit) = max_concurrent {
                config.discovery.max_concurrent_requests = limit;
            }

            let limiter = RequestLimiter::new(config.discovery.max_concurrent_requests);
            let fetcher = HttpFetcher::new(
                limiter,
                &config.discovery.user_agent,
                Duration::from_secs(config.discovery.timeout_secs),
            )
            .context("Failed to create HTTP client")?;

            let use_case = GenerateBindingsUseCase::new(
                Arc::new(fetcher),
                Arc::new(FileSystemOutputService::new()),
            );
            let request = GenerateBindingsRequest {
                config,
                base_urls: base_urls.into_iter().map(String::from).collect(),
            };

            match use_case.execute(request).await {
                Ok(response) => {
                    info!(
                        apis = response.apis,
                        versions = response.versions,
                        methods = response.methods,
                        files = response.artifacts_count,
                        "Generated bindings"
                    );
                    println!(
                        "✅ Bindings generated successfully in {}",
                        response.output_path.display()
                    );
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Generation failed");
                    Err(e).context("Generation failed")
                }
            }
        }
    }
}
