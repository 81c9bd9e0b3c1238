use crate::models::ShortUrlRecord;
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cached storage wrapper that serves code lookups from memory.
///
/// Records never change once written, so a cached hit can't go stale. Misses
/// are not cached: a code that is absent now may be allocated a moment later.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn Storage>,
    /// Read cache for code lookups (Moka cache)
    read_cache: Cache<i64, ShortUrlRecord>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn Storage>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let read_cache = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, read_cache }
    }
}

#[async_trait]
impl Storage for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn allocate(&self, original_url: &str) -> StorageResult<ShortUrlRecord> {
        let record = self.inner.allocate(original_url).await?;
        self.read_cache
            .insert(record.short_code, record.clone())
            .await;
        Ok(record)
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        self.inner.find_by_url(original_url).await
    }

    async fn find_by_code(&self, short_code: i64) -> Result<Option<ShortUrlRecord>> {
        if let Some(record) = self.read_cache.get(&short_code).await {
            tracing::debug!(short_code, "cache hit");
            return Ok(Some(record));
        }

        let record = self.inner.find_by_code(short_code).await?;
        if let Some(ref record) = record {
            self.read_cache.insert(short_code, record.clone()).await;
        }

        Ok(record)
    }

    async fn count(&self) -> Result<i64> {
        self.inner.count().await
    }
}
