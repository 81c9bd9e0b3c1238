use crate::models::ShortUrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_urls (
                short_code BIGINT PRIMARY KEY,
                original_url TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn allocate(&self, original_url: &str) -> StorageResult<ShortUrlRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        // Self-conflicting lock: concurrent allocations queue here while plain
        // reads carry on. Released on commit or rollback.
        sqlx::query("LOCK TABLE short_urls IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        let inserted = sqlx::query_as::<_, ShortUrlRecord>(
            r#"
            INSERT INTO short_urls (short_code, original_url)
            SELECT COALESCE(MAX(short_code), 0) + 1, $1::TEXT FROM short_urls
            ON CONFLICT DO NOTHING
            RETURNING original_url, short_code
            "#,
        )
        .bind(original_url)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        let record = match inserted {
            Some(record) => record,
            None => sqlx::query_as::<_, ShortUrlRecord>(
                r#"
                SELECT original_url, short_code
                FROM short_urls
                WHERE original_url = $1
                "#,
            )
            .bind(original_url)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StorageError::Other(e.into()))?
            .ok_or(StorageError::Conflict)?,
        };

        tx.commit()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        Ok(record)
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        let record = sqlx::query_as::<_, ShortUrlRecord>(
            r#"
            SELECT original_url, short_code
            FROM short_urls
            WHERE original_url = $1
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
            WHERE short_code = $1
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
