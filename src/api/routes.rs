use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::FrontendConfig;
use crate::service::ShortenerService;

use super::handlers::{create_short_url, health_check, redirect_short_url, AppState};
use super::static_files::landing_page;

pub fn create_router(service: ShortenerService, frontend: FrontendConfig) -> Router {
    let state = Arc::new(AppState {
        service,
        static_dir: frontend.static_dir,
    });

    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route("/api/shorturl", post(create_short_url))
        // Path used by older clients
        .route("/api/shorturl/new", post(create_short_url))
        .route("/api/shorturl/{code}", get(redirect_short_url))
        .nest_service("/public", ServeDir::new(frontend.public_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
