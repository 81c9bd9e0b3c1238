use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ShortenerError};
use crate::models::{CreateShortUrlForm, ShortUrlRecord};
use crate::service::ShortenerService;

pub struct AppState {
    pub service: ShortenerService,
    pub static_dir: Option<String>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Shorten the URL submitted in the `url` form field
pub async fn create_short_url(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateShortUrlForm>,
) -> Result<Json<ShortUrlRecord>, ApiError> {
    let url = form.url.trim();

    match state.service.create(url).await {
        Ok(record) => Ok(Json(record)),
        Err(ShortenerError::Validation(err)) => {
            tracing::info!(url, reason = %err, "rejected url");
            Err(ApiError::InvalidUrl)
        }
        Err(err) => {
            tracing::error!(url, error = %err, "failed to create short url");
            Err(ApiError::InvalidUrl)
        }
    }
}

/// Redirect to the URL stored under `code`
pub async fn redirect_short_url(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(code) = code.parse::<i64>() else {
        tracing::debug!(code = %code, "short code is not a number");
        return Err(ApiError::NotFound);
    };

    match state.service.resolve(code).await {
        Ok(url) => match HeaderValue::try_from(url) {
            Ok(location) => {
                Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
            }
            Err(err) => {
                tracing::error!(
                    short_code = code,
                    error = %err,
                    "stored url is not a valid location header"
                );
                Err(ApiError::NotFound)
            }
        },
        Err(ShortenerError::NotFound(_)) => Err(ApiError::NotFound),
        Err(err) => {
            tracing::error!(short_code = code, error = %err, "failed to resolve short url");
            Err(ApiError::NotFound)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
