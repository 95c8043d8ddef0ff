//! Home page and dataset upload

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{AppState, AppError, AppResult};
use crate::dataset;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Dashboard page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Accept a `.csv` in the `file` field as the new training dataset.
///
/// Anything else falls through to the dashboard page.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.ends_with(".csv") {
            tracing::info!("Ignoring upload '{}': not a CSV file", file_name);
            break;
        }

        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload(e.to_string()))?;

        dataset::replace(&state.config.dataset_path, contents.clone())
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to save dataset: {}", e)))?;

        tracing::info!(
            "Dataset '{}' saved to {} ({} bytes)",
            file_name, state.config.dataset_path.display(), contents.len()
        );

        return Ok(Json(json!({ "message": "File uploaded successfully" })).into_response());
    }

    Ok(index().await.into_response())
}
