use crate::models::ShortUrlRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A concurrent writer outside this process won the allocation; retrying is safe.
    #[error("short code allocation conflicted")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, indexes)
    async fn init(&self) -> Result<()>;

    /// Store `original_url` under the next free short code, atomically.
    ///
    /// The code is one past the current highest code (equal to `count + 1`,
    /// since records are never deleted). If the URL is already stored, its
    /// existing record is returned and nothing is written.
    async fn allocate(&self, original_url: &str) -> StorageResult<ShortUrlRecord>;

    /// Find the record stored for an exact original URL
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>>;

    /// Find the record for a short code
    async fn find_by_code(&self, short_code: i64) -> Result<Option<ShortUrlRecord>>;

    /// Total number of stored records
    async fn count(&self) -> Result<i64>;
}
