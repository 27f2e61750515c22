//! Persistent TTL cache backed by an embedded fjall keyspace.
//!
//! Values are `postcard` encoded together with their expiry time.

use fjall::Keyspace;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::{Result, WeatherCardError};

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn cache_error(e: impl Display) -> WeatherCardError {
    WeatherCardError::cache(e.to_string())
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> fjall::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open().map_err(cache_error)?;
        let items = db
            .keyspace("cache", fjall::KeyspaceCreateOptions::default)
            .map_err(cache_error)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| WeatherCardError::cache("TTL overflow"))?
            .duration_since(UNIX_EPOCH)
            .map_err(cache_error)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry).map_err(cache_error)?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(cache_error)?
            .map_err(cache_error)
    }

    /// Stores a value with its TTL scaled by a random factor in [0.9, 1.1)
    /// so entries written together do not all expire together.
    pub async fn put_with_jitter<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        self.put(key, value, ttl.mul_f64(jitter)).await
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes))
            .await
            .map_err(cache_error)?
            .map_err(cache_error)?;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes).map_err(cache_error)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(cache_error)?
            .as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(cache_error)?
            .map_err(cache_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("weather:recife", 27.5f32, Duration::from_secs(60))
            .await
            .unwrap();

        let cached: Option<f32> = cache.get("weather:recife").await.unwrap();
        assert_eq!(cached, Some(27.5));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        let cached: Option<String> = cache.get("nothing").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("stale", "old".to_string(), Duration::ZERO)
            .await
            .unwrap();

        let cached: Option<String> = cache.get("stale").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("reading", "not a number".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let err = cache.get::<Vec<f64>>("reading").await.unwrap_err();
        assert!(matches!(err, WeatherCardError::Cache { .. }));
        assert!(err.user_message().contains("Cache operation failed"));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put_with_jitter("key", 1u32, Duration::from_secs(600))
            .await
            .unwrap();
        cache.remove("key").await.unwrap();

        let cached: Option<u32> = cache.get("key").await.unwrap();
        assert!(cached.is_none());
    }
}
