use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shorturl::api;
use shorturl::config::Config;
use shorturl::service::ShortenerService;
use shorturl::storage;
use shorturl::validator::Validator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let storage = storage::open(&config.database, &config.cache).await?;
    info!("Storage initialized successfully");

    let service = ShortenerService::new(storage, Validator::default());

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving landing page from directory: {}", static_dir);
    } else {
        info!("🎨 Serving embedded landing page");
    }

    let router = api::create_router(service, config.frontend.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Shorten with POST http://{}/api/shorturl", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
