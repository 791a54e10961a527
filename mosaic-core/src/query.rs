//! Declarative query objects for snapshot filtering.
//!
//! A query accumulates an ordered list of [`FilterStep`] descriptors. Each
//! step is a pure intersection over snapshot records, and the ordered list
//! serializes to a stable string that repositories use verbatim inside cache
//! keys. Descriptors are plain values, never closures, so serializing a query
//! never executes anything.

use crate::{Dashboard, Widget};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// One filter predicate over a snapshot record.
///
/// Matching is exact equality throughout; id-valued fields compare through
/// UUID parsing, which makes them case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterStep {
    /// Match on the `id` field.
    Id(Uuid),
    /// Match on the `identifier` field.
    Identifier(String),
    /// Match on the `name` field; `None` matches records with a null or
    /// absent name.
    Name(Option<String>),
    /// Match on the `dashboard` foreign key.
    DashboardId(Uuid),
    /// Match on the `widget` foreign key.
    WidgetId(Uuid),
}

fn uuid_field_eq(record: &Value, field: &str, expected: Uuid) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(|id| id == expected)
        .unwrap_or(false)
}

fn str_field_eq(record: &Value, field: &str, expected: &str) -> bool {
    record.get(field).and_then(Value::as_str) == Some(expected)
}

impl FilterStep {
    /// Test whether a snapshot record satisfies this step.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            FilterStep::Id(id) => uuid_field_eq(record, "id", *id),
            FilterStep::Identifier(identifier) => str_field_eq(record, "identifier", identifier),
            FilterStep::Name(None) => matches!(record.get("name"), None | Some(Value::Null)),
            FilterStep::Name(Some(name)) => str_field_eq(record, "name", name),
            FilterStep::DashboardId(id) => uuid_field_eq(record, "dashboard", *id),
            FilterStep::WidgetId(id) => uuid_field_eq(record, "widget", *id),
        }
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // String parameters render in their quoted, escaped `Debug` form so
        // that a value containing the step separator cannot forge a step
        // boundary, and `name=null` stays distinct from `name="null"`.
        match self {
            FilterStep::Id(id) => write!(f, "id={}", id),
            FilterStep::Identifier(identifier) => write!(f, "identifier={:?}", identifier),
            FilterStep::Name(None) => write!(f, "name=null"),
            FilterStep::Name(Some(name)) => write!(f, "name={:?}", name),
            FilterStep::DashboardId(id) => write!(f, "dashboard={}", id),
            FilterStep::WidgetId(id) => write!(f, "widget={}", id),
        }
    }
}

fn fmt_steps(steps: &[FilterStep], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, step) in steps.iter().enumerate() {
        if index > 0 {
            write!(f, ";")?;
        }
        write!(f, "{}", step)?;
    }
    Ok(())
}

/// Common behavior of per-domain query objects.
pub trait ConfigQuery: Default + fmt::Display + Send + Sync {
    /// A query matching a single document by id.
    fn with_id(id: Uuid) -> Self;

    /// The ordered filter steps accumulated so far.
    fn steps(&self) -> &[FilterStep];

    /// Test whether a record satisfies every step.
    fn matches(&self, record: &Value) -> bool {
        self.steps().iter().all(|step| step.matches(record))
    }

    /// Stable serialization used as part of a cache key.
    ///
    /// Identical filter sequences produce identical keys; differing
    /// parameters produce differing keys.
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_query_plumbing {
    ($query:ident) => {
        impl $query {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn by_id(mut self, id: Uuid) -> Self {
                self.steps.push(FilterStep::Id(id));
                self
            }
        }

        impl ConfigQuery for $query {
            fn with_id(id: Uuid) -> Self {
                Self::new().by_id(id)
            }

            fn steps(&self) -> &[FilterStep] {
                &self.steps
            }
        }

        impl fmt::Display for $query {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_steps(&self.steps, f)
            }
        }
    };
}

/// Query over the dashboards domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindDashboards {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindDashboards);

impl FindDashboards {
    pub fn by_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.steps.push(FilterStep::Identifier(identifier.into()));
        self
    }

    pub fn by_name(mut self, name: Option<String>) -> Self {
        self.steps.push(FilterStep::Name(name));
        self
    }
}

/// Query over the dashboard tabs domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindDashboardTabs {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindDashboardTabs);

impl FindDashboardTabs {
    pub fn by_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.steps.push(FilterStep::Identifier(identifier.into()));
        self
    }

    pub fn by_name(mut self, name: Option<String>) -> Self {
        self.steps.push(FilterStep::Name(name));
        self
    }

    pub fn by_dashboard_id(mut self, id: Uuid) -> Self {
        self.steps.push(FilterStep::DashboardId(id));
        self
    }

    pub fn for_dashboard(self, dashboard: &Dashboard) -> Self {
        self.by_dashboard_id(dashboard.id)
    }
}

/// Query over the groups domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindGroups {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindGroups);

impl FindGroups {
    pub fn by_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.steps.push(FilterStep::Identifier(identifier.into()));
        self
    }

    pub fn by_name(mut self, name: Option<String>) -> Self {
        self.steps.push(FilterStep::Name(name));
        self
    }
}

/// Query over the widgets domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindWidgets {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindWidgets);

impl FindWidgets {
    pub fn by_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.steps.push(FilterStep::Identifier(identifier.into()));
        self
    }

    pub fn by_name(mut self, name: Option<String>) -> Self {
        self.steps.push(FilterStep::Name(name));
        self
    }
}

/// Query over the widget displays domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindWidgetDisplays {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindWidgetDisplays);

impl FindWidgetDisplays {
    pub fn by_widget_id(mut self, id: Uuid) -> Self {
        self.steps.push(FilterStep::WidgetId(id));
        self
    }

    pub fn for_widget(self, widget: &Widget) -> Self {
        self.by_widget_id(widget.id)
    }
}

/// Query over the widget data sources domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindWidgetDataSources {
    steps: Vec<FilterStep>,
}

impl_query_plumbing!(FindWidgetDataSources);

impl FindWidgetDataSources {
    pub fn by_widget_id(mut self, id: Uuid) -> Self {
        self.steps.push(FilterStep::WidgetId(id));
        self
    }

    pub fn for_widget(self, widget: &Widget) -> Self {
        self.by_widget_id(widget.id)
    }
}
