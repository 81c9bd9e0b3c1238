pub mod cached;
pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::{CacheConfig, DatabaseBackend, DatabaseConfig};

/// Connect to the configured backend, create its schema and wrap it in the
/// lookup cache when enabled.
pub async fn open(
    database: &DatabaseConfig,
    cache: &CacheConfig,
) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", database.url);
            Arc::new(
                SqliteStorage::new(&database.url, database.max_connections)
                    .await
                    .context("failed to open SQLite database")?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage");
            Arc::new(
                PostgresStorage::new(&database.url, database.max_connections)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            )
        }
        DatabaseBackend::Memory => {
            info!("Using in-memory storage; records are lost on exit");
            Arc::new(MemoryStorage::new())
        }
    };

    storage
        .init()
        .await
        .context("failed to initialize storage schema")?;

    if cache.enabled() {
        info!(
            max_entries = cache.max_entries,
            ttl_secs = cache.ttl_secs,
            "Lookup cache enabled"
        );
        Ok(Arc::new(CachedStorage::new(
            storage,
            cache.max_entries,
            cache.ttl_secs,
        )))
    } else {
        Ok(storage)
    }
}
