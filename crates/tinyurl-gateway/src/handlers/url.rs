use crate::error::{AppError, Result};
use crate::model::{AnalyticsResponse, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use crate::validate::validate_url;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tinyurl_core::ShortCode;
use tracing::debug;

pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = request?;
    let original_url = request
        .original_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("originalUrl is required".to_string()))?;
    validate_url(&original_url)?;

    let code = state.shortener().create_short_url(&original_url).await?;
    debug!(code = %code, "shortened URL");

    Ok(Json(ShortenResponse {
        short_url: code.to_url(state.base_url()),
        short_code: code.into(),
    }))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = ShortCode::new(short_code)?;
    let original_url = state
        .shortener()
        .get_original_url(&code)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response())
}

pub async fn analytics_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>> {
    let code = ShortCode::new(short_code)?;
    let click_count = state.shortener().get_click_count(&code).await?;

    Ok(Json(AnalyticsResponse {
        short_code: code.into(),
        click_count,
    }))
}
