//! Credit Scoring Dashboard server

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scoring_dashboard::{config::Config, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scoring_dashboard=debug,tower_http=debug".into());
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Scoring dashboard starting ({})...", config.environment);
    tracing::info!("Scoring API: {}", config.api_url);
    tracing::info!(
        "Distribution source: {:?}, dataset at {}",
        config.distribution_source,
        config.dataset_path.display()
    );
    if config.is_production() && config.api_url.starts_with("http://") {
        tracing::warn!("Scoring API is reached over plain HTTP");
    }

    let state = AppState::new(config.clone()).context("Failed to create scoring API client")?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
