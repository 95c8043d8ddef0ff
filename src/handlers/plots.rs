//! Chart handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppError, AppResult};
use crate::middleware::path::ApiPath;
use crate::charts::{self, ChartError};
use crate::config::DistributionSource;
use crate::dataset::{self, ClassSplit};
use crate::models::{ImportanceReport, ImportanceScope};

const IMPORTANCE_UNAVAILABLE: &str = "Unable to load feature importance";

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    /// Base64-encoded PNG
    pub image: String,
    pub title: String,
}

/// Dataset-wide feature importance
pub async fn global_importance(State(state): State<AppState>) -> AppResult<Json<ChartResponse>> {
    let report = fetch_report(&state, state.config.reference_client_id, ImportanceScope::Global).await?;
    let image = render(move || charts::importance_bars(&report)).await?;

    Ok(Json(ChartResponse {
        image,
        title: "Global feature importance".to_string(),
    }))
}

/// Feature contributions to one client's score
pub async fn local_importance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> AppResult<Json<ChartResponse>> {
    let report = fetch_report(&state, id, ImportanceScope::Local).await?;
    let image = render(move || charts::importance_bars(&report)).await?;

    Ok(Json(ChartResponse {
        image,
        title: format!("Local feature importance for client {}", id),
    }))
}

/// Density of one variable, accepted vs rejected
pub async fn distribution(
    State(state): State<AppState>,
    ApiPath(variable): ApiPath<String>,
) -> AppResult<Json<ChartResponse>> {
    let split = match state.config.distribution_source {
        DistributionSource::Synthetic => ClassSplit::synthetic(),
        DistributionSource::Dataset => {
            let path = state.config.dataset_path.clone();
            let target = state.config.target_column.clone();
            let column = variable.clone();
            tokio::task::spawn_blocking(move || dataset::load_split(&path, &column, &target)).await??
        }
    };

    let image = render(move || split.render()).await?;

    Ok(Json(ChartResponse {
        image,
        title: format!("Distribution of {} by decision", variable),
    }))
}

async fn fetch_report(
    state: &AppState,
    client_id: u64,
    scope: ImportanceScope,
) -> AppResult<ImportanceReport> {
    let analysis = state.upstream
        .analyze(client_id)
        .await
        .map_err(|e| AppError::unavailable(IMPORTANCE_UNAVAILABLE, e))?;

    ImportanceReport::from_analysis(&analysis, scope)
        .map_err(|e| AppError::unavailable(IMPORTANCE_UNAVAILABLE, e))
}

/// Rasterize off the async workers and base64 the PNG
async fn render<F>(draw: F) -> AppResult<String>
where
    F: FnOnce() -> Result<Vec<u8>, ChartError> + Send + 'static,
{
    let png = tokio::task::spawn_blocking(draw).await??;
    Ok(charts::encode_base64(&png))
}
