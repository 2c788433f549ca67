use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatkit_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// Failures raised by [`crate::ChatServer::process`] before any streaming starts.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ThreadNotFound(id) => Self::ThreadNotFound(id),
            StoreError::ItemNotFound(id) => Self::ItemNotFound(id),
            StoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Store(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Validation(msg) => Self::BadRequest(msg),
            ServerError::ThreadNotFound(id) => Self::ThreadNotFound(id),
            ServerError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ThreadNotFound(_) | ApiError::ItemNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Internal(ref detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
