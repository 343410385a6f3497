//! Mapping of library errors onto `{success: false, error}` responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use resolvekit_shared::{ApiEnvelope, ResolveKitError};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] ResolveKitError),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Body(_) | ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                ResolveKitError::Validation { .. } => StatusCode::BAD_REQUEST,
                ResolveKitError::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ResolveKitError::Network(_) => StatusCode::BAD_GATEWAY,
                ResolveKitError::Config { .. }
                | ResolveKitError::Storage(_)
                | ResolveKitError::Persistence(_)
                | ResolveKitError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ApiEnvelope::<Value>::failure(self.to_string());
        (status, Json(body)).into_response()
    }
}
