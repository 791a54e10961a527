//! Mosaic Config - UI Configuration Read Layer
//!
//! Read-through, tag-invalidated caching of the dashboard entity graph. The
//! snapshot builder materializes each configuration domain from the entity
//! store into the builder cache; configuration repositories answer typed
//! document lookups through the repository cache. Writes stay with the
//! external store, which invalidates cache tags after each mutation.

pub mod backend;
pub mod builder;
pub mod container;
pub mod repository;
pub mod store;

pub use backend::{CacheBackend, CacheStats, MemoryCacheBackend};
pub use builder::{Snapshot, SnapshotBuilder};
pub use container::CacheContainer;
pub use repository::{
    CachedDocument, ConfigurationRepository, DashboardRepository, DashboardTabRepository,
    GroupRepository, WidgetDataSourceRepository, WidgetDisplayRepository, WidgetRepository,
};
pub use store::EntityStore;

use mosaic_core::{ConfigDomain, ConfigResult};
use std::sync::Arc;
use uuid::Uuid;

/// Wiring point bundling the six configuration repositories over one entity
/// store and one cache container.
///
/// Constructed once at startup; controllers and schemas read through the
/// repository accessors, the write path invalidates through the container
/// helpers.
pub struct UiConfiguration {
    container: CacheContainer,
    builder: Arc<SnapshotBuilder>,
    dashboards: DashboardRepository,
    tabs: DashboardTabRepository,
    groups: GroupRepository,
    widgets: WidgetRepository,
    displays: WidgetDisplayRepository,
    data_sources: WidgetDataSourceRepository,
}

impl UiConfiguration {
    pub fn new(store: Arc<dyn EntityStore>, container: CacheContainer) -> Self {
        let builder = Arc::new(SnapshotBuilder::new(store, container.builder_cache()));
        let cache = container.repository_cache();

        Self {
            dashboards: ConfigurationRepository::new(Arc::clone(&builder), Arc::clone(&cache)),
            tabs: ConfigurationRepository::new(Arc::clone(&builder), Arc::clone(&cache)),
            groups: ConfigurationRepository::new(Arc::clone(&builder), Arc::clone(&cache)),
            widgets: ConfigurationRepository::new(Arc::clone(&builder), Arc::clone(&cache)),
            displays: ConfigurationRepository::new(Arc::clone(&builder), Arc::clone(&cache)),
            data_sources: ConfigurationRepository::new(Arc::clone(&builder), cache),
            builder,
            container,
        }
    }

    pub fn dashboards(&self) -> &DashboardRepository {
        &self.dashboards
    }

    pub fn tabs(&self) -> &DashboardTabRepository {
        &self.tabs
    }

    pub fn groups(&self) -> &GroupRepository {
        &self.groups
    }

    pub fn widgets(&self) -> &WidgetRepository {
        &self.widgets
    }

    pub fn widget_displays(&self) -> &WidgetDisplayRepository {
        &self.displays
    }

    pub fn widget_data_sources(&self) -> &WidgetDataSourceRepository {
        &self.data_sources
    }

    pub fn container(&self) -> &CacheContainer {
        &self.container
    }

    /// Force-rebuild every domain snapshot from the entity store.
    ///
    /// Useful at startup to take the cold-miss cost before serving reads.
    pub async fn warm(&self) -> ConfigResult<()> {
        for domain in ConfigDomain::ALL {
            self.builder.load(domain, true).await?;
        }
        Ok(())
    }

    /// Invalidate everything cached for one domain.
    pub async fn invalidate_domain(&self, domain: ConfigDomain) -> ConfigResult<u64> {
        self.container.invalidate_domain(domain).await
    }

    /// Invalidate the snapshot of a domain plus every cached query result
    /// that returned the given document.
    pub async fn invalidate_document(&self, domain: ConfigDomain, id: Uuid) -> ConfigResult<u64> {
        self.container.invalidate_document(domain, id).await
    }
}
