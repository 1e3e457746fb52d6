use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::users::{repo::StoreError, validation::FieldError};

/// Every failure a handler can return. All client-facing categories answer
/// 400; anything unexpected is logged and answers a bare 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    #[error("User do not exists")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
    #[error("No User is present in the database")]
    Empty,
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::AlreadyExists,
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::NotFound | ApiError::AlreadyExists | ApiError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": self.to_string() }] })),
            )
                .into_response(),
            ApiError::Empty => {
                (StatusCode::BAD_REQUEST, Json(json!({ "msg": self.to_string() }))).into_response()
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "unhandled error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}
