use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use wordsnap::{
    config::Config,
    routes::{router, AppState},
    DescriptionGenerator, GeminiClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let gemini = GeminiClient::new(config.api_key.clone(), config.api_base.clone(), config.model.clone());
    if gemini.is_demo() {
        tracing::warn!("GEMINI_API_KEY not configured, running in demo mode with fallback copy only");
    } else {
        tracing::info!("Gemini API key configured");
    }
    tracing::info!(model = %config.model, max_retries = config.generation.max_retries, "Generator configured");

    let state = AppState {
        generator: Arc::new(DescriptionGenerator::new(Arc::new(gemini), config.generation.clone())),
    };

    let app = router(state, cors_layer(&config.cors_origin)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin: HeaderValue = origin.parse().with_context(|| format!("invalid CORS_ORIGIN {origin}"))?;
    Ok(layer.allow_origin(origin))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
