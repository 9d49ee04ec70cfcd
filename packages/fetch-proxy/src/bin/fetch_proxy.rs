//! Fetch proxy server
//!
//! Serves `/api/fetch`, `/api/chat` and `/health` for the link checker.

use anyhow::{Context, Result};
use fetch_proxy::{build_app, AppState, ProxyConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fetch_proxy=debug,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ProxyConfig::from_env().context("Failed to load configuration")?;
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, /api/chat will answer 503");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config).context("Failed to create HTTP clients")?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Fetch proxy listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
