pub mod disk;

pub use disk::DiskStore;

use crate::core::cache::CacheConfig;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;

/// Cache selection for `config`. The `custom` adapter is backed by a
/// [`DiskStore`] under [`AppConfig::cache_path`]; other types need no client.
pub fn cache_config(config: &AppConfig) -> Result<CacheConfig> {
    let cache = CacheConfig::from(&config.cache);
    if cache.kind.trim().eq_ignore_ascii_case("custom") {
        let store = DiskStore::open(&config.cache_path()?)?;
        return Ok(cache.with_client(Arc::new(store)));
    }
    Ok(cache)
}
