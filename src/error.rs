//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::charts::ChartError;
use crate::dataset::DatasetError;
use crate::upstream::UpstreamError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Upstream errors
    #[error("upstream answered {status}: {message}")]
    UpstreamStatus { status: u16, message: &'static str },

    #[error("upstream unreachable ({detail}): {message}")]
    UpstreamUnreachable { message: &'static str, detail: String },

    #[error("upstream payload malformed: {0}")]
    UpstreamMalformed(String),

    // Local resource errors
    #[error("{0}")]
    LocalResourceMissing(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("invalid path parameter: {0}")]
    InvalidPath(String),

    // Rendering errors
    #[error("chart rendering failed: {0}")]
    RenderingFailure(String),

    // Generic errors, `message` is what the caller sees
    #[error("{message}: {detail}")]
    Unavailable { message: &'static str, detail: String },

    #[error("internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Pass-through routes: keep the upstream status, hide its body
    pub fn from_upstream(err: UpstreamError, message: &'static str) -> Self {
        match err {
            UpstreamError::ServerError(status) => AppError::UpstreamStatus { status, message },
            UpstreamError::ParseError(detail) => AppError::UpstreamMalformed(detail),
            UpstreamError::NetworkError(detail) => AppError::UpstreamUnreachable { message, detail },
        }
    }

    /// Any failure collapsed into a 500 with a fixed message
    pub fn unavailable(message: &'static str, detail: impl std::fmt::Display) -> Self {
        AppError::Unavailable {
            message,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::UpstreamStatus { status, message } => {
                tracing::warn!("Upstream returned {}: {}", status, message);
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, message.to_string())
            }
            AppError::UpstreamUnreachable { message, detail } => {
                tracing::error!("Upstream unreachable: {}", detail);
                (StatusCode::BAD_GATEWAY, message.to_string())
            }
            AppError::UpstreamMalformed(msg) => {
                tracing::error!("Malformed upstream payload: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected response from scoring service".to_string())
            }
            AppError::LocalResourceMissing(msg) => {
                tracing::warn!("Local resource missing: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::InvalidUpload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidPath(msg) => {
                tracing::debug!("Rejected path parameter: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::RenderingFailure(msg) => {
                tracing::error!("Chart rendering failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Unable to render chart".to_string())
            }
            AppError::Unavailable { message, detail } => {
                tracing::error!("{}: {}", message, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        if err.is_missing_resource() {
            AppError::LocalResourceMissing(err.to_string())
        } else {
            AppError::InternalError(err.to_string())
        }
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        AppError::RenderingFailure(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upstream_status_is_passed_through() {
        let err = AppError::from_upstream(UpstreamError::ServerError(404), "Client not found");
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Client not found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_network_failure_is_bad_gateway() {
        let err = AppError::from_upstream(
            UpstreamError::NetworkError("connection refused".into()),
            "Unable to load clients",
        );
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Unable to load clients");
    }

    #[tokio::test]
    async fn test_missing_dataset_is_bad_request() {
        let err: AppError = DatasetError::MissingTarget("TARGET".into()).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("TARGET"));
    }

    #[tokio::test]
    async fn test_rendering_failure_hides_detail() {
        let (status, body) = body_of(ChartError::NoData.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Unable to render chart");
    }
}
