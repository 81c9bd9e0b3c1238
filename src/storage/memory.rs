use crate::models::ShortUrlRecord;
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Indexes {
    by_code: HashMap<i64, String>,
    by_url: HashMap<String, i64>,
}

/// Process-local storage backend.
///
/// Both indexes sit behind one lock, so [`Storage::allocate`] reads the next
/// code and inserts under the same guard.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    indexes: RwLock<Indexes>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn allocate(&self, original_url: &str) -> StorageResult<ShortUrlRecord> {
        let mut indexes = self.indexes.write().await;

        if let Some(&short_code) = indexes.by_url.get(original_url) {
            return Ok(ShortUrlRecord {
                original_url: original_url.to_string(),
                short_code,
            });
        }

        let short_code = indexes.by_code.len() as i64 + 1;
        indexes
            .by_code
            .insert(short_code, original_url.to_string());
        indexes
            .by_url
            .insert(original_url.to_string(), short_code);

        Ok(ShortUrlRecord {
            original_url: original_url.to_string(),
            short_code,
        })
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        let indexes = self.indexes.read().await;
        Ok(indexes
            .by_url
            .get(original_url)
            .map(|&short_code| ShortUrlRecord {
                original_url: original_url.to_string(),
                short_code,
            }))
    }

    async fn find_by_code(&self, short_code: i64) -> Result<Option<ShortUrlRecord>> {
        let indexes = self.indexes.read().await;
        Ok(indexes
            .by_code
            .get(&short_code)
            .map(|original_url| ShortUrlRecord {
                original_url: original_url.clone(),
                short_code,
            }))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.indexes.read().await.by_code.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_allocate_reuses_stored_url() {
        let storage = MemoryStorage::new();

        let first = storage.allocate("https://a.com").await.unwrap();
        let second = storage.allocate("https://b.com").await.unwrap();
        let again = storage.allocate("https://a.com").await.unwrap();

        assert_eq!(first.short_code, 1);
        assert_eq!(second.short_code, 2);
        assert_eq!(again, first);
        assert_eq!(storage.count().await.unwrap(), 2);
        assert_eq!(storage.find_by_code(2).await.unwrap(), Some(second));
        assert_eq!(
            storage.find_by_url("https://a.com").await.unwrap(),
            Some(first)
        );
        assert!(storage.find_by_url("https://c.com").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_allocations_are_dense() {
        let storage = Arc::new(MemoryStorage::new());

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move { storage.allocate(&format!("https://h{i}.com")).await })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap().short_code);
        }
        codes.sort_unstable();

        assert_eq!(codes, (1..=100).collect::<Vec<i64>>());
    }
}
