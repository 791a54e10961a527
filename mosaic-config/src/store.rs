//! Entity store abstraction.
//!
//! The transactional store that owns dashboards, tabs, groups and widgets
//! lives outside this crate. The cache layer only needs to enumerate every
//! record of one domain; rows arrive as the store's own plain projections.

use async_trait::async_trait;
use mosaic_core::{ConfigDomain, StoreError};
use serde_json::Value;

/// Read-only access to the entity store backing the configuration cache.
///
/// `fetch_all` must be side-effect free: snapshot rebuilds may run
/// concurrently for the same domain and the last write to the cache wins.
///
/// Writes never pass through this trait. The external manager layer that
/// mutates entities must invalidate at least the domain cache tag (and
/// ideally the mutated document's id tag) before a write is considered
/// complete, or stale reads are possible without bound.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Enumerate all records of one configuration domain, in store order.
    async fn fetch_all(&self, domain: ConfigDomain) -> Result<Vec<Value>, StoreError>;
}
