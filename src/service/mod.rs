use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ShortenerError;
use crate::models::ShortUrlRecord;
use crate::storage::{Storage, StorageError};
use crate::validator::Validator;

/// Attempts before `create` gives up on a conflicted allocation.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 8;

const INITIAL_BACKOFF: Duration = Duration::from_millis(2);

/// Issues short codes for validated URLs and maps codes back to URLs.
///
/// Holds no mutable state of its own; the storage backend is the only shared
/// resource.
#[derive(Clone)]
pub struct ShortenerService {
    storage: Arc<dyn Storage>,
    validator: Validator,
}

impl ShortenerService {
    pub fn new(storage: Arc<dyn Storage>, validator: Validator) -> Self {
        Self { storage, validator }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Return the record for `raw_url`, allocating the next code if it is new.
    ///
    /// Code assignment happens inside the storage backend in one atomic step,
    /// so concurrent creates never share a code. A `Conflict` only surfaces
    /// when another process raced the backend's own serialization; those are
    /// retried with exponential backoff.
    pub async fn create(&self, raw_url: &str) -> Result<ShortUrlRecord, ShortenerError> {
        let url = self.validator.validate(raw_url).await?.into_inner();

        if let Some(existing) = self.storage.find_by_url(&url).await? {
            debug!(short_code = existing.short_code, url = %url, "reusing existing short url");
            return Ok(existing);
        }

        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.storage.allocate(&url).await {
                Ok(record) => {
                    info!(short_code = record.short_code, url = %url, "stored short url");
                    return Ok(record);
                }
                Err(StorageError::Conflict) if attempt < MAX_ALLOCATION_ATTEMPTS => {
                    debug!(attempt, ?backoff, "short code allocation conflicted, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(url = %url, attempt, error = %err, "short code allocation failed");
                    return Err(err.into());
                }
            }
        }
    }

    /// Look up the URL a short code points to.
    pub async fn resolve(&self, code: i64) -> Result<String, ShortenerError> {
        match self.storage.find_by_code(code).await? {
            Some(record) => Ok(record.original_url),
            None => Err(ShortenerError::NotFound(code)),
        }
    }
}
