//! Cache adapters for raw rate snapshots.
//!
//! Three interchangeable strategies share one capability set (`build_key`,
//! `get`, `set`): a no-op cache, an in-process cache bound to an explicit
//! scope, and a pluggable cache delegating to an externally supplied client.

use crate::core::error::{RatesError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const KEY_PREFIX: &str = "open-exchange-rates";

/// Request parameters that take part in the cache key.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyOptions<'a> {
    pub on: Option<&'a str>,
    pub from: Option<&'a str>,
}

/// Joins the prefix, `on` and `from` with `:`, omitting absent parts.
pub fn build_key(options: &KeyOptions<'_>) -> String {
    [Some(KEY_PREFIX), options.on, options.from]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(":")
}

/// Backing client for the pluggable cache. Implementations own their concurrency.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Stores `value` under `key` and hands it back.
    async fn set(&self, key: &str, value: Vec<u8>) -> anyhow::Result<Vec<u8>>;
}

/// In-process cache. Every clone shares the same scope; a fresh `new()` starts
/// an empty one, so each execution context that wants isolation creates its own.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let cache = self.inner.lock().await;
        cache.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: Vec<u8>) -> Vec<u8> {
        let mut cache = self.inner.lock().await;
        cache.insert(key.to_string(), value.clone());
        value
    }
}

/// The cache strategy an engine was built with.
#[derive(Clone, Default)]
pub enum RateCache {
    /// Never stores anything.
    #[default]
    Null,
    Memory(MemoryCache),
    Custom(Arc<dyn CacheClient>),
}

impl fmt::Debug for RateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RateCache {
    pub fn name(&self) -> &'static str {
        match self {
            RateCache::Null => "null",
            RateCache::Memory(_) => "memory",
            RateCache::Custom(_) => "custom",
        }
    }

    pub fn build_key(&self, options: &KeyOptions<'_>) -> String {
        build_key(options)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = match self {
            RateCache::Null => None,
            RateCache::Memory(cache) => cache.get(key).await,
            RateCache::Custom(client) => client.get(key).await.map_err(RatesError::Cache)?,
        };
        if value.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>> {
        let value = match self {
            RateCache::Null => return Ok(value),
            RateCache::Memory(cache) => cache.set(key, value).await,
            RateCache::Custom(client) => client.set(key, value).await.map_err(RatesError::Cache)?,
        };
        debug!("Cache PUT for key: {}", key);
        Ok(value)
    }
}

/// Cache selection as it arrives from configuration: a type name plus an
/// optional client for the pluggable adapter and an optional scope for the
/// in-process one.
#[derive(Clone)]
pub struct CacheConfig {
    pub kind: String,
    pub client: Option<Arc<dyn CacheClient>>,
    /// Engines resolved with the same scope share cached entries. Without
    /// one, each engine gets a scope of its own.
    pub scope: Option<MemoryCache>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new("null")
    }
}

impl CacheConfig {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            client: None,
            scope: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn CacheClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_scope(mut self, scope: MemoryCache) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Maps the type name onto a cache strategy. Names are case-insensitive.
    pub fn resolve(&self) -> Result<RateCache> {
        match self.kind.trim().to_ascii_lowercase().as_str() {
            "" | "null" => Ok(RateCache::Null),
            "memory" => Ok(RateCache::Memory(self.scope.clone().unwrap_or_default())),
            "custom" => self
                .client
                .clone()
                .map(RateCache::Custom)
                .ok_or_else(|| RatesError::MissingRequiredOption(vec!["client".to_string()])),
            _ => Err(RatesError::MissingCacheAdapter(self.kind.clone())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that records how often it is used.
    #[derive(Default)]
    pub(crate) struct CountingClient {
        pub store: std::sync::Mutex<HashMap<String, Vec<u8>>>,
        pub gets: AtomicUsize,
        pub sets: AtomicUsize,
        pub keys: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CacheClient for CountingClient {
        async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.store.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> anyhow::Result<Vec<u8>> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.keys.lock().unwrap().push(key.to_string());
            self.store
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            Ok(value)
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CacheClient for FailingClient {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            anyhow::bail!("connection refused")
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_build_key() {
        let key = build_key(&KeyOptions {
            on: Some("2015-12-27"),
            from: Some("USD"),
        });
        assert_eq!(key, "open-exchange-rates:2015-12-27:USD");

        let key = build_key(&KeyOptions {
            on: Some("2012-05-10"),
            from: None,
        });
        assert_eq!(key, "open-exchange-rates:2012-05-10");

        let key = build_key(&KeyOptions {
            on: None,
            from: Some("EUR"),
        });
        assert_eq!(key, "open-exchange-rates:EUR");

        assert_eq!(build_key(&KeyOptions::default()), "open-exchange-rates");
    }

    #[tokio::test]
    async fn test_null_cache() {
        let cache = RateCache::Null;
        assert_eq!(cache.set("key", b"value".to_vec()).await.unwrap(), b"value");
        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_get_set() {
        let cache = RateCache::Memory(MemoryCache::new());

        assert!(cache.get("key").await.unwrap().is_none());
        assert_eq!(cache.set("key", b"value".to_vec()).await.unwrap(), b"value");
        assert_eq!(cache.get("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_cache_scope() {
        let scope = MemoryCache::new();
        let shared = scope.clone();
        scope.set("key", b"value".to_vec()).await;

        assert_eq!(shared.get("key").await, Some(b"value".to_vec()));
        assert!(MemoryCache::new().get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_custom_cache_delegates() {
        let client = Arc::new(CountingClient::default());
        let cache = CacheConfig::new("custom")
            .with_client(client.clone())
            .resolve()
            .unwrap();

        assert!(cache.get("key").await.unwrap().is_none());
        cache.set("key", b"value".to_vec()).await.unwrap();
        assert_eq!(cache.get("key").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(client.gets.load(Ordering::SeqCst), 2);
        assert_eq!(client.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_cache_errors_surface() {
        let cache = RateCache::Custom(Arc::new(FailingClient));
        let err = cache.get("key").await.unwrap_err();
        assert!(matches!(err, RatesError::Cache(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_resolve_cache_config() {
        assert!(matches!(
            CacheConfig::default().resolve().unwrap(),
            RateCache::Null
        ));
        assert!(matches!(
            CacheConfig::new("Memory").resolve().unwrap(),
            RateCache::Memory(_)
        ));

        let scope = MemoryCache::new();
        let config = CacheConfig::new("memory").with_scope(scope.clone());
        match config.resolve().unwrap() {
            RateCache::Memory(cache) => assert!(Arc::ptr_eq(&cache.inner, &scope.inner)),
            other => panic!("unexpected cache: {:?}", other),
        }

        match CacheConfig::new("custom").resolve() {
            Err(RatesError::MissingRequiredOption(keys)) => assert_eq!(keys, vec!["client"]),
            other => panic!("unexpected result: {:?}", other),
        }

        match CacheConfig::new("redis").resolve() {
            Err(RatesError::MissingCacheAdapter(name)) => assert_eq!(name, "redis"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
