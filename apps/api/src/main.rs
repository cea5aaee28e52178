mod adapters;
mod analysis;
mod config;
mod errors;
mod format;
mod llm_client;
mod routes;
mod state;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::converter::PdftoppmConverter;
use crate::adapters::inference::LlmFeedbackService;
use crate::adapters::kv::RedisStore;
use crate::adapters::storage::S3Storage;
use crate::analysis::collaborators::{KeyValueStore, Storage};
use crate::analysis::orchestrator::ResumeAnalyzer;
use crate::config::Config;
use crate::format::UuidGenerator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::upload::selection::SelectionPolicy;
use crate::upload::session::InFlightSessions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumind API v{}", env!("CARGO_PKG_VERSION"));

    // Object storage (S3 / MinIO)
    let storage: Arc<dyn Storage> = Arc::new(S3Storage::from_config(&config).await);
    info!("S3 storage initialized (bucket: {})", config.s3_bucket);

    // Record store
    let kv: Arc<dyn KeyValueStore> = Arc::new(RedisStore::connect(&config.redis_url).await?);

    // PDF rendering
    let converter = Arc::new(PdftoppmConverter::new(
        config.pdftoppm_bin.clone(),
        config.render_dpi,
    ));
    info!(
        "PDF converter: {} at {} dpi",
        config.pdftoppm_bin, config.render_dpi
    );

    // Feedback via Claude
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    let inference = Arc::new(LlmFeedbackService::new(llm, storage.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let analyzer = ResumeAnalyzer::new(
        storage,
        converter,
        kv.clone(),
        inference,
        Arc::new(UuidGenerator),
    );

    let state = AppState {
        analyzer,
        kv,
        sessions: InFlightSessions::new(),
        selection_policy: SelectionPolicy::new(config.max_upload_bytes),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
