//! Cache container.
//!
//! Holds the only two cache handles in the process: one for the snapshot
//! builder, one for the configuration repositories. Both are created once at
//! startup and threaded explicitly through constructors; no other component
//! constructs a cache of its own, so the backing store can be swapped here
//! without touching repository logic.

use crate::backend::{CacheBackend, MemoryCacheBackend};
use mosaic_core::error::document_ref;
use mosaic_core::{ConfigDomain, ConfigResult};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CacheContainer {
    builder: Arc<dyn CacheBackend>,
    repository: Arc<dyn CacheBackend>,
}

impl CacheContainer {
    pub fn new(builder: Arc<dyn CacheBackend>, repository: Arc<dyn CacheBackend>) -> Self {
        Self {
            builder,
            repository,
        }
    }

    /// Container over two process-local in-memory backends.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCacheBackend::new()),
            Arc::new(MemoryCacheBackend::new()),
        )
    }

    /// The cache handle used by the snapshot builder.
    pub fn builder_cache(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.builder)
    }

    /// The cache handle used by the configuration repositories.
    pub fn repository_cache(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.repository)
    }

    /// Evict everything cached for one domain from both caches.
    ///
    /// Entry point for the external write path after bulk mutations.
    /// Returns the number of evicted entries.
    pub async fn invalidate_domain(&self, domain: ConfigDomain) -> ConfigResult<u64> {
        let tags = vec![domain.as_str().to_string()];
        let evicted = self.builder.invalidate_tags(&tags).await?
            + self.repository.invalidate_tags(&tags).await?;
        tracing::debug!(domain = %domain, evicted, "domain cache invalidated");
        Ok(evicted)
    }

    /// Evict the domain snapshot plus every repository entry that returned
    /// the given document.
    ///
    /// Entry point for the external write path after a point mutation. The
    /// id tag reaches every cached query result containing the document,
    /// not just a single key; that is the invalidation granularity this
    /// design accepts.
    pub async fn invalidate_document(&self, domain: ConfigDomain, id: Uuid) -> ConfigResult<u64> {
        let domain_tags = vec![domain.as_str().to_string()];
        let id_tags = vec![id.to_string()];
        let evicted = self.builder.invalidate_tags(&domain_tags).await?
            + self.repository.invalidate_tags(&id_tags).await?;
        tracing::debug!(document = %document_ref(domain, id), evicted, "document cache invalidated");
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_domain_touches_both_caches() {
        let container = CacheContainer::in_memory();
        let domain_tag = ConfigDomain::Widgets.as_str().to_string();

        container
            .builder_cache()
            .save("configuration.widgets", b"[]", &[domain_tag.clone()])
            .await
            .unwrap();
        container
            .repository_cache()
            .save("widgets:id=x_one", b"null", &[domain_tag])
            .await
            .unwrap();

        let evicted = container
            .invalidate_domain(ConfigDomain::Widgets)
            .await
            .unwrap();
        assert_eq!(evicted, 2);
    }

    #[tokio::test]
    async fn test_invalidate_document_uses_id_tag_on_repository_cache() {
        let container = CacheContainer::in_memory();
        let id = Uuid::new_v4();
        let domain_tag = ConfigDomain::Widgets.as_str().to_string();

        container
            .builder_cache()
            .save("configuration.widgets", b"[]", &[domain_tag.clone()])
            .await
            .unwrap();
        container
            .repository_cache()
            .save("widgets:a_one", b"null", &[domain_tag.clone(), id.to_string()])
            .await
            .unwrap();
        container
            .repository_cache()
            .save("widgets:b_one", b"null", &[domain_tag])
            .await
            .unwrap();

        let evicted = container
            .invalidate_document(ConfigDomain::Widgets, id)
            .await
            .unwrap();
        // Snapshot entry plus the one query that returned the document.
        assert_eq!(evicted, 2);
        assert!(container
            .repository_cache()
            .load("widgets:b_one")
            .await
            .unwrap()
            .is_some());
    }
}
