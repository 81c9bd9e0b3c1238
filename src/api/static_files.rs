use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mime_guess::from_path;
use rust_embed::RustEmbed;
use std::path::PathBuf;
use std::sync::Arc;

use super::handlers::AppState;

const INDEX_PAGE: &str = "index.html";

#[derive(RustEmbed)]
#[folder = "views"]
pub struct Views;

/// Serve the landing page, preferring an override directory when configured
pub async fn landing_page(State(state): State<Arc<AppState>>) -> Response {
    if let Some(ref dir) = state.static_dir {
        let file_path = PathBuf::from(dir).join(INDEX_PAGE);
        match tokio::fs::read(&file_path).await {
            Ok(content) => return page(INDEX_PAGE, content),
            Err(err) => {
                tracing::warn!(
                    path = %file_path.display(),
                    error = %err,
                    "landing page override unreadable, using embedded page"
                );
            }
        }
    }

    match Views::get(INDEX_PAGE) {
        Some(content) => page(INDEX_PAGE, content.data.into_owned()),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

fn page(name: &str, content: Vec<u8>) -> Response {
    let mime = from_path(name).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.as_ref().to_string())], Body::from(content)).into_response()
}
