//! Snapshot builder.
//!
//! Materializes one configuration domain into an ordered list of plain
//! records and keeps the most recent materialization in the builder cache,
//! tagged with the domain name. Rebuilds are a pure function of the entity
//! store's current state; concurrent rebuilds of the same domain are
//! tolerated and the last write wins.

use crate::backend::CacheBackend;
use crate::store::EntityStore;
use mosaic_core::{ConfigDomain, ConfigError, ConfigQuery, ConfigResult};
use serde_json::Value;
use std::sync::Arc;

/// Point-in-time materialization of one domain's entities.
///
/// Immutable once built. Queries are applied in step registration order;
/// every step is a pure intersection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    domain: ConfigDomain,
    rows: Arc<Vec<Value>>,
}

impl Snapshot {
    fn new(domain: ConfigDomain, rows: Vec<Value>) -> Self {
        Self {
            domain,
            rows: Arc::new(rows),
        }
    }

    pub fn domain(&self) -> ConfigDomain {
        self.domain
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All records, in store order.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Records matching every filter step of the query, in store order.
    pub fn filter<'a, Q: ConfigQuery>(
        &'a self,
        query: &'a Q,
    ) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().filter(move |record| query.matches(record))
    }
}

fn snapshot_key(domain: ConfigDomain) -> String {
    format!("configuration.{}", domain)
}

/// Read-through materializer over the builder cache.
pub struct SnapshotBuilder {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn CacheBackend>,
}

impl SnapshotBuilder {
    pub fn new(store: Arc<dyn EntityStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self { store, cache }
    }

    /// Load the snapshot for a domain.
    ///
    /// With `force` the domain's cache entry is removed first, so the store
    /// is always re-read. On a cache hit the snapshot is decoded from the
    /// cached bytes without touching the store.
    pub async fn load(&self, domain: ConfigDomain, force: bool) -> ConfigResult<Snapshot> {
        let key = snapshot_key(domain);

        if force {
            self.cache.remove(&key).await?;
        } else if let Some(bytes) = self.cache.load(&key).await? {
            let rows: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
                ConfigError::invalid_state("Cached snapshot could not be decoded", e)
            })?;
            tracing::trace!(domain = %domain, rows = rows.len(), "snapshot served from cache");
            return Ok(Snapshot::new(domain, rows));
        }

        let rows = self.store.fetch_all(domain).await?;
        let bytes = serde_json::to_vec(&rows)
            .map_err(|e| ConfigError::invalid_state("Snapshot could not be encoded", e))?;
        self.cache
            .save(&key, &bytes, &[domain.as_str().to_string()])
            .await?;

        tracing::debug!(domain = %domain, rows = rows.len(), "snapshot rebuilt from entity store");
        Ok(Snapshot::new(domain, rows))
    }
}
