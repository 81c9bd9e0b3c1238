use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;
use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("no short url with code {0}")]
    NotFound(i64),
}

impl From<anyhow::Error> for ShortenerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(StorageError::Other(err))
    }
}

/// Error kinds visible to HTTP clients.
///
/// Every failure on the create path is reported as `InvalidUrl` and every
/// failure on the lookup path as `NotFound`. Both are sent with status 200 and
/// the message in the JSON body, which is what existing clients expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url")]
    InvalidUrl,
    #[error("No short URL found for the given input")]
    NotFound,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Json(ErrorResponse {
            error: self.to_string(),
        })
        .into_response()
    }
}
