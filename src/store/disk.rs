use crate::core::cache::CacheClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "rates";

/// Cache client persisting raw snapshots in a fjall keyspace. Entries never expire.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache at {}", path.display()))?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened disk cache at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl CacheClient for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.partition.get(key)?.map(|value| value.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<Vec<u8>> {
        self.partition.insert(key, value.as_slice())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_store_get_set() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        // Initially, cache is empty
        assert!(store.get("open-exchange-rates:2012-05-10").await.unwrap().is_none());

        let value = store
            .set("open-exchange-rates:2012-05-10", b"{}".to_vec())
            .await
            .unwrap();
        assert_eq!(value, b"{}");

        assert_eq!(
            store.get("open-exchange-rates:2012-05-10").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert!(store.get("open-exchange-rates:2012-05-11").await.unwrap().is_none());
    }
}
