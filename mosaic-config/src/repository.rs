//! Configuration repositories.
//!
//! A repository is a read-through cache sitting above the snapshot builder.
//! Cache entries hold the raw matched record(s); documents are rebuilt from
//! them through the factory on every read, so two reads can yield distinct
//! document instances for the same entity. Cached absence is an explicitly
//! stored `None`, which lets a query that matches nothing be answered warm
//! without re-touching the entity store.

use crate::backend::CacheBackend;
use crate::builder::SnapshotBuilder;
use mosaic_core::{
    ConfigDomain, ConfigError, ConfigQuery, ConfigResult, Dashboard, DashboardTab,
    FindDashboardTabs, FindDashboards, FindGroups, FindWidgetDataSources, FindWidgetDisplays,
    FindWidgets, Group, MappingError, Widget, WidgetDataSource, WidgetDisplay,
};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Marker trait tying a document type to its domain, query vocabulary and
/// record factory.
pub trait CachedDocument: Clone + Send + Sync + 'static {
    /// The query object type for this document's domain.
    type Query: ConfigQuery;

    /// The configuration domain this document belongs to.
    fn domain() -> ConfigDomain;

    /// Hydrate a document from one snapshot record.
    fn from_record(record: &Value) -> Result<Self, MappingError>;

    /// The document identity; its string form is the cache tag.
    fn id(&self) -> Uuid;
}

// ============================================================================
// IMPLEMENTATIONS FOR CONFIGURATION DOCUMENTS
// ============================================================================

impl CachedDocument for Dashboard {
    type Query = FindDashboards;

    fn domain() -> ConfigDomain {
        ConfigDomain::Dashboards
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        Dashboard::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl CachedDocument for DashboardTab {
    type Query = FindDashboardTabs;

    fn domain() -> ConfigDomain {
        ConfigDomain::DashboardTabs
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        DashboardTab::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl CachedDocument for Group {
    type Query = FindGroups;

    fn domain() -> ConfigDomain {
        ConfigDomain::Groups
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        Group::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl CachedDocument for Widget {
    type Query = FindWidgets;

    fn domain() -> ConfigDomain {
        ConfigDomain::Widgets
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        Widget::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl CachedDocument for WidgetDisplay {
    type Query = FindWidgetDisplays;

    fn domain() -> ConfigDomain {
        ConfigDomain::WidgetDisplays
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        WidgetDisplay::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl CachedDocument for WidgetDataSource {
    type Query = FindWidgetDataSources;

    fn domain() -> ConfigDomain {
        ConfigDomain::WidgetDataSources
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        WidgetDataSource::from_record(record)
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// GENERIC REPOSITORY
// ============================================================================

/// Read-through document repository for one configuration domain.
pub struct ConfigurationRepository<D: CachedDocument> {
    builder: Arc<SnapshotBuilder>,
    cache: Arc<dyn CacheBackend>,
    _document: PhantomData<D>,
}

impl<D: CachedDocument> ConfigurationRepository<D> {
    pub fn new(builder: Arc<SnapshotBuilder>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            builder,
            cache,
            _document: PhantomData,
        }
    }

    /// Look up a single document by id.
    pub async fn find(&self, id: Uuid) -> ConfigResult<Option<D>> {
        self.find_one_by(&D::Query::with_id(id)).await
    }

    /// Look up the first document matching a query.
    ///
    /// Returns `None` when nothing matches; never an error. The outcome,
    /// including absence, is cached under the query's key and tagged with
    /// the domain plus the returned document's id.
    pub async fn find_one_by(&self, query: &D::Query) -> ConfigResult<Option<D>> {
        let key = format!("{}:{}_one", D::domain(), query.cache_key());

        if let Some(bytes) = self.cache.load(&key).await? {
            let cached: Option<Value> = decode(&bytes)?;
            tracing::trace!(key = %key, found = cached.is_some(), "lookup served from cache");
            return cached.as_ref().map(D::from_record).transpose().map_err(Into::into);
        }

        let snapshot = self.builder.load(D::domain(), false).await?;
        let matched = snapshot.filter(query).next().cloned();
        let document = matched.as_ref().map(D::from_record).transpose()?;

        let mut tags = vec![D::domain().as_str().to_string()];
        if let Some(document) = &document {
            tags.push(document.id().to_string());
        }
        self.cache.save(&key, &encode(&matched)?, &tags).await?;

        Ok(document)
    }

    /// Look up every document matching a query.
    ///
    /// Returns an empty list when nothing matches. The result is cached
    /// under the query's key and tagged with the domain plus each returned
    /// document's id.
    pub async fn find_all_by(&self, query: &D::Query) -> ConfigResult<Vec<D>> {
        let key = format!("{}:{}_all", D::domain(), query.cache_key());

        if let Some(bytes) = self.cache.load(&key).await? {
            let cached: Vec<Value> = decode(&bytes)?;
            tracing::trace!(key = %key, count = cached.len(), "lookup served from cache");
            return cached.iter().map(D::from_record).collect::<Result<_, _>>().map_err(Into::into);
        }

        let snapshot = self.builder.load(D::domain(), false).await?;
        let matched: Vec<Value> = snapshot.filter(query).cloned().collect();
        let documents = matched
            .iter()
            .map(D::from_record)
            .collect::<Result<Vec<D>, _>>()?;

        let mut tags = vec![D::domain().as_str().to_string()];
        tags.extend(documents.iter().map(|document| document.id().to_string()));
        self.cache.save(&key, &encode(&matched)?, &tags).await?;

        Ok(documents)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> ConfigResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| ConfigError::invalid_state("Cached lookup could not be encoded", e))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> ConfigResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| ConfigError::invalid_state("Cached lookup could not be decoded", e))
}

pub type DashboardRepository = ConfigurationRepository<Dashboard>;
pub type DashboardTabRepository = ConfigurationRepository<DashboardTab>;
pub type GroupRepository = ConfigurationRepository<Group>;
pub type WidgetRepository = ConfigurationRepository<Widget>;
pub type WidgetDisplayRepository = ConfigurationRepository<WidgetDisplay>;
pub type WidgetDataSourceRepository = ConfigurationRepository<WidgetDataSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryCacheBackend;
    use crate::store::EntityStore;
    use async_trait::async_trait;
    use mosaic_core::StoreError;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MapStore {
        rows: HashMap<ConfigDomain, Vec<Value>>,
        calls: AtomicUsize,
    }

    impl MapStore {
        fn new(domain: ConfigDomain, rows: Vec<Value>) -> Self {
            let mut map = HashMap::new();
            map.insert(domain, rows);
            Self {
                rows: map,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntityStore for MapStore {
        async fn fetch_all(&self, domain: ConfigDomain) -> Result<Vec<Value>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.get(&domain).cloned().unwrap_or_default())
        }
    }

    fn dashboard_row(id: Uuid, identifier: &str, name: Option<&str>) -> Value {
        json!({
            "id": id.to_string(),
            "identifier": identifier,
            "name": name,
            "priority": 0,
            "tabs": [],
        })
    }

    fn repository(
        store: Arc<MapStore>,
    ) -> (DashboardRepository, Arc<MemoryCacheBackend>) {
        let repo_cache = Arc::new(MemoryCacheBackend::new());
        let builder = Arc::new(SnapshotBuilder::new(
            store,
            Arc::new(MemoryCacheBackend::new()),
        ));
        (
            ConfigurationRepository::new(builder, repo_cache.clone()),
            repo_cache,
        )
    }

    #[tokio::test]
    async fn test_find_by_identifier() {
        let id = Uuid::new_v4();
        let store = Arc::new(MapStore::new(
            ConfigDomain::Dashboards,
            vec![dashboard_row(id, "main-dashboard", Some("Main dashboard"))],
        ));
        let (repository, _) = repository(store);

        let query = FindDashboards::new().by_identifier("main-dashboard");
        let dashboard = repository.find_one_by(&query).await.unwrap().unwrap();
        assert_eq!(dashboard.id, id);
        assert_eq!(dashboard.name.as_deref(), Some("Main dashboard"));
    }

    #[tokio::test]
    async fn test_by_name_null_selects_unnamed_dashboard() {
        let named = Uuid::new_v4();
        let unnamed = Uuid::new_v4();
        let store = Arc::new(MapStore::new(
            ConfigDomain::Dashboards,
            vec![
                dashboard_row(named, "main-dashboard", Some("Main dashboard")),
                dashboard_row(unnamed, "first-floor", None),
            ],
        ));
        let (repository, _) = repository(store);

        let query = FindDashboards::new().by_name(None);
        let dashboard = repository.find_one_by(&query).await.unwrap().unwrap();
        assert_eq!(dashboard.id, unnamed);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let id = Uuid::new_v4();
        let store = Arc::new(MapStore::new(
            ConfigDomain::Dashboards,
            vec![dashboard_row(id, "main-dashboard", Some("Main dashboard"))],
        ));
        let (repository, _) = repository(store);

        let first = repository.find(id).await.unwrap().unwrap();
        let second = repository.find(id).await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_negative_result_cached() {
        let store = Arc::new(MapStore::new(ConfigDomain::Dashboards, vec![]));
        let (repository, _) = repository(store.clone());

        let query = FindDashboards::new().by_identifier("missing");
        assert!(repository.find_one_by(&query).await.unwrap().is_none());
        let cold_calls = store.calls();

        // Warm read answers from the cached absence without re-hitting the
        // entity store.
        assert!(repository.find_one_by(&query).await.unwrap().is_none());
        assert_eq!(store.calls(), cold_calls);
    }

    #[tokio::test]
    async fn test_find_all_returns_empty_not_error() {
        let store = Arc::new(MapStore::new(ConfigDomain::Dashboards, vec![]));
        let (repository, _) = repository(store);

        let all = repository.find_all_by(&FindDashboards::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_invalidating_one_document_tag_rebuilds_query() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let store = Arc::new(MapStore::new(
            ConfigDomain::Dashboards,
            vec![
                dashboard_row(a, "a", Some("A")),
                dashboard_row(b, "b", Some("B")),
            ],
        ));
        let (repository, repo_cache) = repository(store);

        let all = repository.find_all_by(&FindDashboards::new()).await.unwrap();
        assert_eq!(all.len(), 2);

        // Invalidating document A's tag evicts the cached result even
        // though B was unaffected.
        let evicted = repo_cache
            .invalidate_tags(&[a.to_string()])
            .await
            .unwrap();
        assert_eq!(evicted, 1);
        assert!(repo_cache
            .load(&format!("{}:_all", ConfigDomain::Dashboards))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_surfaces_invalid_state() {
        let store = Arc::new(MapStore::new(
            ConfigDomain::Dashboards,
            vec![json!({ "identifier": "no-id" })],
        ));
        let (repository, _) = repository(store);

        let err = repository
            .find_all_by(&FindDashboards::new())
            .await
            .unwrap_err();
        let ConfigError::InvalidState { source, .. } = err;
        assert!(source.is_some());
    }
}
