mod artifacts;
mod config;
mod errors;
mod recommendation;
mod render;
mod repo_search;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::repo_search::GithubClient;
use crate::routes::build_router;
use crate::session::pipeline::RecommendationPipeline;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coursepath v{}", env!("CARGO_PKG_VERSION"));

    // Artifacts are required: any failure here aborts startup.
    let artifacts = ArtifactStore::load(&config.artifact_paths())
        .context("Failed to load model artifacts")?;

    let github = GithubClient::new(
        &config.github_api_url,
        config.repo_search_limit,
        Duration::from_secs(config.repo_search_timeout_secs),
    )
    .context("Failed to build GitHub client")?;
    info!("Repository search via {}", config.github_api_url);

    let pipeline = RecommendationPipeline::new(
        Arc::new(artifacts),
        Arc::new(github),
        config.recommendation_count,
    );

    let state = AppState::new(config.clone(), pipeline);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
