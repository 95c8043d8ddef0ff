//! Client handlers
//!
//! `/clients`, `/client/:id` and `/analyze/:id` hand the upstream JSON back
//! untouched; `/predict/:id` reduces the client record to a decision.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{AppState, AppError, AppResult};
use crate::middleware::path::ApiPath;
use crate::models::Prediction;

/// List all clients
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let clients = state.upstream
        .list_clients()
        .await
        .map_err(|e| AppError::from_upstream(e, "Unable to load clients"))?;

    Ok(Json(clients))
}

/// Get single client
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> AppResult<Json<Value>> {
    let client = state.upstream
        .client(id)
        .await
        .map_err(|e| AppError::from_upstream(e, "Client not found"))?;

    Ok(Json(client))
}

/// Full analysis of a client, importance reports included
pub async fn analyze(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> AppResult<Json<Value>> {
    let analysis = state.upstream
        .analyze(id)
        .await
        .map_err(|e| AppError::from_upstream(e, "Analysis unavailable"))?;

    Ok(Json(analysis))
}

/// Score and decision for a client
pub async fn predict(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> AppResult<Json<Prediction>> {
    const UNAVAILABLE: &str = "Prediction unavailable";

    let client = state.upstream
        .client(id)
        .await
        .map_err(|e| AppError::unavailable(UNAVAILABLE, e))?;

    let prediction = Prediction::from_client(&client)
        .map_err(|e| AppError::unavailable(UNAVAILABLE, e))?;

    tracing::info!("Client {} scored {}: {:?}", id, prediction.score, prediction.decision);

    Ok(Json(prediction))
}
