use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_insight::analyze::AnalysisPipeline;
use video_insight::{server, utils, Cli, Config, WhisperClient, YtDlpExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "video_insight=debug,insight_server=debug"
    } else {
        "video_insight=info,insight_server=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Check for required external dependencies (non-fatal; tools may still appear)
    let missing_deps = utils::check_dependencies().await;
    for dep in &missing_deps {
        tracing::warn!("Dependency check: missing {}", dep);
    }

    // Missing OPENAI_API_KEY is fatal here, before the server binds
    let config = Config::from_env().context("Failed to load configuration")?;
    config.log_summary();

    let extractor = Arc::new(YtDlpExtractor::new(&config.extractor));
    let transcriber = Arc::new(WhisperClient::new(&config.transcription)?);
    let pipeline = Arc::new(AnalysisPipeline::new(extractor, transcriber));

    let schema = server::build_schema(pipeline);
    let app = server::router(schema);

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {}", addr))?;
    tracing::info!("GraphQL endpoint listening at http://{}/graphql", addr);

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
