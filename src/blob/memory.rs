use super::{BlobError, BlobStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// An object held by the in-memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store that keeps objects in a map
///
/// Keys containing any configured failure pattern are rejected with a
/// permanent error.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail_patterns: Vec<String>,
    puts: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every key containing `pattern`
    pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_patterns.push(pattern.into());
        self
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Stored keys in `bucket`, sorted
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of accepted puts, including overwrites
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        if self.fail_patterns.iter().any(|p| key.contains(p.as_str())) {
            return Err(BlobError::permanent(format!("rejected {}", key)));
        }

        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        self.puts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
