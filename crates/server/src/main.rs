use std::sync::Arc;

use server::clients::ProviderRegistry;
use server::config;
use server::pipeline::MovePipeline;
use server::session::GameSession;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    let registry = ProviderRegistry::from_config(&config);
    tracing::info!(
        gemini_model = %config.gemini_model,
        openai_model = %config.openai_model,
        timeout_secs = config.llm_timeout_secs,
        "Opponent providers registered"
    );

    let session = Arc::new(GameSession::new(MovePipeline::new(registry)));
    let app = server::router(session);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
