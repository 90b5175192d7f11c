use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::time::Duration;

use crate::{Cache, CoreError};

/// In-memory implementation of the Cache port using Moka. Stands in for the
/// durable local storage that holds the dataset mirror and the tenant-config
/// fallback in a deployed build.
#[derive(Clone, Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, Vec<u8>>,
}

impl InMemoryCache {
    /// Creates a new InMemoryCache with specific capacity and TTL settings.
    pub fn new(max_capacity: u64, default_ttl_seconds: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(default_ttl_seconds))
            .build();
        Self { cache }
    }
}

impl Default for InMemoryCache {
    /// Defaults sized for a single client: 1,000 entries, 24h TTL. The
    /// dataset mirror only needs to outlive a backend outage, not forever.
    fn default() -> Self {
        Self::new(1_000, 24 * 3600)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        _ttl_seconds: Option<u64>, // Moka sets TTL at build time; ignored here.
    ) -> Result<(), CoreError> {
        self.cache.insert(key.to_string(), value.to_vec()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
