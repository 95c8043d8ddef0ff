//! Credit Scoring Dashboard
//!
//! Browser-facing proxy in front of the scoring API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐      ┌──────────────────────────────┐      ┌─────────────┐
//! │ Browser  │ ───▶ │  Dashboard (Axum)            │ ───▶ │ Scoring API │
//! └──────────┘      │  proxy · decision · charts   │      └─────────────┘
//!                   └──────────────┬───────────────┘
//!                                  ▼
//!                         uploaded dataset (CSV)
//! ```
//!
//! Each request makes one upstream call (plus a bounded retry) and, for the
//! chart routes, renders a PNG returned as base64 inside JSON.

pub mod config;
pub mod upstream;
pub mod models;
pub mod dataset;
pub mod charts;
pub mod handlers;
pub mod middleware;
pub mod error;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use config::Config;
use upstream::{ScoringClient, UpstreamError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: ScoringClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let upstream = ScoringClient::new(&config)?;
        Ok(Self { config, upstream })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Dashboard page + dataset upload
        .route("/", get(handlers::home::index).post(handlers::home::upload))
        .route("/health", get(handlers::health::check))

        // Upstream pass-through
        .route("/clients", get(handlers::clients::list))
        .route("/client/:id", get(handlers::clients::get))
        .route("/analyze/:id", get(handlers::clients::analyze))
        .route("/predict/:id", get(handlers::clients::predict))

        // Charts
        .route("/global-importance", get(handlers::plots::global_importance))
        .route("/local-importance/:id", get(handlers::plots::local_importance))
        .route("/distribution/:variable", get(handlers::plots::distribution))

        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
