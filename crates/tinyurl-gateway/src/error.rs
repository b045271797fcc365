use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tinyurl_core::{CoreError, ShortenerError};
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("short code not found")]
    NotFound,
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl From<CoreError> for AppError {
    fn from(error: CoreError) -> Self {
        AppError::Shortener(error.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "short code not found".to_string()),
            AppError::Shortener(
                source @ (ShortenerError::InvalidInput(_) | ShortenerError::InvalidCodeFormat(_)),
            ) => (StatusCode::BAD_REQUEST, source.to_string()),
            AppError::Shortener(ShortenerError::Storage(source)) => {
                error!(error = %source, "storage failure while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
