//! Cover image cache
//!
//! Two tiers keyed by normalized identifier:
//! - memory: fixed capacity, evicts the oldest-inserted entry
//! - disk: unbounded, one file per identifier under the covers folder
//!
//! The memory tier sits behind a `tokio::sync::Mutex`, so one cache can be
//! shared across concurrent lookups.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use shelf_common::isbn::normalize_identifier;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::SourceError;
use crate::types::CandidateBook;

/// Cover cache errors
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("Cover download failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("Cover storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),
}

/// Upper bound on slots reserved up front; the tier grows past it on demand
const MEMORY_PREALLOC_LIMIT: usize = 64;

/// Insertion-ordered bounded map
#[derive(Debug)]
struct MemoryTier {
    capacity: usize,
    entries: HashMap<String, Vec<u8>>,
    order: VecDeque<String>,
}

impl MemoryTier {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(MEMORY_PREALLOC_LIMIT)),
            order: VecDeque::with_capacity(capacity.min(MEMORY_PREALLOC_LIMIT)),
        }
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    /// Insert; replacing a value keeps its insertion slot
    fn insert(&mut self, key: String, bytes: Vec<u8>) {
        if self.capacity == 0 {
            return;
        }
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = bytes;
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                tracing::debug!(key = %oldest, "Evicting cover from memory tier");
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, bytes);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Memory + disk cover cache
pub struct CoverCache {
    memory: Mutex<MemoryTier>,
    disk_dir: PathBuf,
}

impl CoverCache {
    pub fn new(disk_dir: impl Into<PathBuf>, memory_capacity: usize) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::new(memory_capacity)),
            disk_dir: disk_dir.into(),
        }
    }

    pub fn disk_dir(&self) -> &Path {
        &self.disk_dir
    }

    fn cache_key(identifier: &str) -> Result<String, CoverError> {
        let key = normalize_identifier(identifier);
        if key.is_empty() {
            return Err(CoverError::InvalidKey(identifier.to_string()));
        }
        Ok(key)
    }

    fn disk_path(&self, key: &str) -> PathBuf {
        self.disk_dir.join(format!("{}.img", key))
    }

    /// Cached bytes for an identifier; a disk hit is promoted to memory
    pub async fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>, CoverError> {
        let key = Self::cache_key(identifier)?;

        if let Some(bytes) = self.memory.lock().await.get(&key) {
            tracing::debug!(key = %key, "Cover memory hit");
            return Ok(Some(bytes));
        }

        match tokio::fs::read(self.disk_path(&key)).await {
            Ok(bytes) => {
                tracing::debug!(key = %key, "Cover disk hit");
                self.memory.lock().await.insert(key, bytes.clone());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store bytes in both tiers
    pub async fn put(&self, identifier: &str, bytes: Vec<u8>) -> Result<(), CoverError> {
        let key = Self::cache_key(identifier)?;

        tokio::fs::create_dir_all(&self.disk_dir).await?;
        tokio::fs::write(self.disk_path(&key), &bytes).await?;
        self.memory.lock().await.insert(key, bytes);
        Ok(())
    }

    /// Entries currently held in memory
    pub async fn memory_len(&self) -> usize {
        self.memory.lock().await.len()
    }

    /// Cover for a candidate: cache first, then download and store
    ///
    /// `Ok(None)` when the candidate has no cover reference.
    pub async fn fetch_cover(
        &self,
        http_client: &reqwest::Client,
        candidate: &CandidateBook,
    ) -> Result<Option<Vec<u8>>, CoverError> {
        let Some(url) = candidate.cover_image_url.as_deref() else {
            return Ok(None);
        };

        if let Some(bytes) = self.get(&candidate.identifier).await? {
            return Ok(Some(bytes));
        }

        tracing::debug!(identifier = %candidate.identifier, url = %url, "Downloading cover");

        let response = http_client.get(url).send().await.map_err(SourceError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16(), format!("cover {}", url)).into());
        }
        let bytes = response.bytes().await.map_err(SourceError::from)?.to_vec();

        self.put(&candidate.identifier, bytes.clone()).await?;

        tracing::info!(
            identifier = %candidate.identifier,
            size = bytes.len(),
            "Cover cached"
        );

        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tier_evicts_oldest_inserted() {
        let mut tier = MemoryTier::new(2);
        tier.insert("a".into(), vec![1]);
        tier.insert("b".into(), vec![2]);
        // reading does not refresh insertion order
        assert!(tier.get("a").is_some());
        tier.insert("c".into(), vec![3]);

        assert_eq!(tier.len(), 2);
        assert!(tier.get("a").is_none());
        assert_eq!(tier.get("b"), Some(vec![2]));
        assert_eq!(tier.get("c"), Some(vec![3]));
    }

    #[test]
    fn test_huge_capacity_reserves_little() {
        let mut tier = MemoryTier::new(usize::MAX);
        assert!(tier.order.capacity() < 1024);
        for i in 0..100 {
            tier.insert(format!("k{}", i), vec![i as u8]);
        }
        assert_eq!(tier.len(), 100);
        assert_eq!(tier.get("k0"), Some(vec![0]));
    }

    #[test]
    fn test_memory_tier_replace_keeps_slot() {
        let mut tier = MemoryTier::new(2);
        tier.insert("a".into(), vec![1]);
        tier.insert("b".into(), vec![2]);
        tier.insert("a".into(), vec![9]);
        tier.insert("c".into(), vec![3]);

        assert!(tier.get("a").is_none());
        assert_eq!(tier.get("b"), Some(vec![2]));
    }

    #[test]
    fn test_zero_capacity_disables_memory() {
        let mut tier = MemoryTier::new(0);
        tier.insert("a".into(), vec![1]);
        assert_eq!(tier.len(), 0);
    }

    #[tokio::test]
    async fn test_put_then_get_across_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CoverCache::new(dir.path().join("covers"), 1);

        cache.put("978-0-06-231611-0", vec![1, 2, 3]).await.unwrap();
        cache.put("9780306406157", vec![4, 5]).await.unwrap();
        assert_eq!(cache.memory_len().await, 1);

        // first key was evicted from memory but is still on disk
        assert_eq!(cache.get("9780062316110").await.unwrap(), Some(vec![1, 2, 3]));
        assert!(dir.path().join("covers").join("9780062316110.img").exists());
    }

    #[tokio::test]
    async fn test_miss_and_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CoverCache::new(dir.path(), 4);
        assert_eq!(cache.get("9780000000000").await.unwrap(), None);
        assert!(matches!(cache.get("--").await, Err(CoverError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_fetch_cover_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CoverCache::new(dir.path(), 4);
        let candidate = CandidateBook::new(
            "9780062316110",
            "Sapiens",
            crate::types::CatalogSourceKind::GoogleBooks,
        );
        let client = reqwest::Client::new();
        assert_eq!(cache.fetch_cover(&client, &candidate).await.unwrap(), None);
    }
}
