//! Mosaic Core - Configuration Data Types
//!
//! Pure data types for the UI configuration read layer: configuration
//! domains, typed documents with their record factory, query objects and the
//! error taxonomy. No I/O lives here; the cache machinery is in
//! `mosaic-config`.

pub mod documents;
pub mod enums;
pub mod error;
pub mod query;
pub mod record;

pub use documents::{
    Dashboard, DashboardTab, DataSourceParams, DisplayParams, Group, Timestamp, Widget,
    WidgetDataSource, WidgetDisplay,
};
pub use enums::{ConfigDomain, DataSourceKind, DisplayKind, WidgetKind};
pub use error::{CacheError, ConfigError, ConfigResult, MappingError, StoreError};
pub use query::{
    ConfigQuery, FilterStep, FindDashboardTabs, FindDashboards, FindGroups,
    FindWidgetDataSources, FindWidgetDisplays, FindWidgets,
};
