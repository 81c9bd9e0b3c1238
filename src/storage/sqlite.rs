use crate::models::ShortUrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    /// Serializes allocations from this process so pooled connections don't
    /// contend for SQLite's write lock.
    allocation_lock: Mutex<()>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
            allocation_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_urls (
                short_code INTEGER PRIMARY KEY,
                original_url TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn allocate(&self, original_url: &str) -> StorageResult<ShortUrlRecord> {
        let _guard = self.allocation_lock.lock().await;

        // One statement: the MAX read and the insert happen under the same
        // write lock, so no other connection can take the code in between.
        // `WHERE true` keeps SQLite from parsing ON CONFLICT as a join clause.
        let inserted = sqlx::query_as::<_, ShortUrlRecord>(
            r#"
            INSERT INTO short_urls (short_code, original_url)
            SELECT COALESCE(MAX(short_code), 0) + 1, ? FROM short_urls WHERE true
            ON CONFLICT DO NOTHING
            RETURNING original_url, short_code
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        match inserted {
            Some(record) => Ok(record),
            None => self
                .find_by_url(original_url)
                .await?
                .ok_or(StorageError::Conflict),
        }
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        let record = sqlx::query_as::<_, ShortUrlRecord>(
            r#"
            SELECT original_url, short_code
            FROM short_urls
            WHERE original_url = ?
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_code(&self, short_code: i64) -> Result<Option<ShortUrlRecord>> {
        let record = sqlx::query_as::<_, ShortUrlRecord>(
            r#"
            SELECT original_url, short_code
            FROM short_urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
