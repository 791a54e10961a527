//! Configuration documents.
//!
//! A document is a typed, read-only reconstruction of one entity from a
//! snapshot record. Documents are rebuilt from whatever record matched a
//! query on each read; they are never persisted between requests.
//!
//! Widget, display and data-source subtypes are closed tagged variants keyed
//! by the record's `type` discriminator rather than an inheritance tree.

use crate::record::{
    bool_or, int_or, opt_str, opt_timestamp, opt_uuid, require_f64, require_str, require_u16,
    require_uuid, uuid_list,
};
use crate::{ConfigDomain, DataSourceKind, DisplayKind, MappingError, WidgetKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Timestamp type used by all documents.
pub type Timestamp = DateTime<Utc>;

fn ts_value(ts: &Option<Timestamp>) -> Value {
    match ts {
        Some(ts) => Value::String(ts.to_rfc3339()),
        None => Value::Null,
    }
}

fn uuid_value(id: &Option<Uuid>) -> Value {
    match id {
        Some(id) => Value::String(id.to_string()),
        None => Value::Null,
    }
}

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

fn kind_of<K: std::str::FromStr>(
    record: &Value,
    domain: ConfigDomain,
) -> Result<K, MappingError> {
    let raw = require_str(record, "type")?;
    raw.parse().map_err(|_| MappingError::UnknownKind {
        domain,
        value: raw.to_string(),
    })
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Dashboard - top-level container of tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: Uuid,
    pub identifier: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub priority: i32,
    pub tabs: Vec<Uuid>,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Dashboard {
    /// Hydrate a dashboard from a snapshot record.
    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            identifier: require_str(record, "identifier")?.to_string(),
            name: opt_str(record, "name")?,
            comment: opt_str(record, "comment")?,
            priority: int_or(record, "priority", 0)?,
            tabs: uuid_list(record, "tabs")?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    /// Serialize back into the record shape the entity store emits.
    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "identifier": self.identifier,
            "name": self.name,
            "comment": self.comment,
            "priority": self.priority,
            "tabs": uuid_strings(&self.tabs),
            "owner": uuid_value(&self.owner),
            "created_at": ts_value(&self.created_at),
            "updated_at": ts_value(&self.updated_at),
        })
    }
}

// ============================================================================
// DASHBOARD TAB
// ============================================================================

/// Tab - ordered widget container within a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTab {
    pub id: Uuid,
    pub dashboard: Uuid,
    pub identifier: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub priority: i32,
    pub widgets: Vec<Uuid>,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl DashboardTab {
    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            dashboard: require_uuid(record, "dashboard")?,
            identifier: require_str(record, "identifier")?.to_string(),
            name: opt_str(record, "name")?,
            comment: opt_str(record, "comment")?,
            priority: int_or(record, "priority", 0)?,
            widgets: uuid_list(record, "widgets")?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "dashboard": self.dashboard.to_string(),
            "identifier": self.identifier,
            "name": self.name,
            "comment": self.comment,
            "priority": self.priority,
            "widgets": uuid_strings(&self.widgets),
            "owner": uuid_value(&self.owner),
            "created_at": ts_value(&self.created_at),
            "updated_at": ts_value(&self.updated_at),
        })
    }
}

// ============================================================================
// GROUP
// ============================================================================

/// Group - cross-dashboard widget grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub identifier: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub priority: i32,
    pub widgets: Vec<Uuid>,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Group {
    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            identifier: require_str(record, "identifier")?.to_string(),
            name: opt_str(record, "name")?,
            comment: opt_str(record, "comment")?,
            priority: int_or(record, "priority", 0)?,
            widgets: uuid_list(record, "widgets")?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "identifier": self.identifier,
            "name": self.name,
            "comment": self.comment,
            "priority": self.priority,
            "widgets": uuid_strings(&self.widgets),
            "owner": uuid_value(&self.owner),
            "created_at": ts_value(&self.created_at),
            "updated_at": ts_value(&self.updated_at),
        })
    }
}

// ============================================================================
// WIDGET
// ============================================================================

/// Widget - a sensor or actuator placed on tabs and in groups.
///
/// The concrete kind carries no extra parameters; subtype-specific behavior
/// lives on the attached display and data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub identifier: String,
    pub name: Option<String>,
    pub display: Uuid,
    pub data_sources: Vec<Uuid>,
    pub tabs: Vec<Uuid>,
    pub groups: Vec<Uuid>,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Widget {
    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            kind: kind_of(record, ConfigDomain::Widgets)?,
            identifier: require_str(record, "identifier")?.to_string(),
            name: opt_str(record, "name")?,
            display: require_uuid(record, "display")?,
            data_sources: uuid_list(record, "data_sources")?,
            tabs: uuid_list(record, "tabs")?,
            groups: uuid_list(record, "groups")?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "type": self.kind.as_str(),
            "identifier": self.identifier,
            "name": self.name,
            "display": self.display.to_string(),
            "data_sources": uuid_strings(&self.data_sources),
            "tabs": uuid_strings(&self.tabs),
            "groups": uuid_strings(&self.groups),
            "owner": uuid_value(&self.owner),
            "created_at": ts_value(&self.created_at),
            "updated_at": ts_value(&self.updated_at),
        })
    }
}

// ============================================================================
// WIDGET DISPLAY
// ============================================================================

/// Display parameters, one variant per concrete display kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DisplayParams {
    AnalogValue {
        precision: u16,
    },
    Button {
        icon: Option<String>,
    },
    ChartGraph {
        minimum_value: f64,
        maximum_value: f64,
        enable_min_max: bool,
    },
    DigitalValue,
    Gauge {
        precision: u16,
    },
    GroupedButton {
        icon: Option<String>,
    },
    Slider {
        minimum_value: f64,
        maximum_value: f64,
        step_value: f64,
        precision: u16,
    },
}

impl DisplayParams {
    pub fn kind(&self) -> DisplayKind {
        match self {
            DisplayParams::AnalogValue { .. } => DisplayKind::AnalogValue,
            DisplayParams::Button { .. } => DisplayKind::Button,
            DisplayParams::ChartGraph { .. } => DisplayKind::ChartGraph,
            DisplayParams::DigitalValue => DisplayKind::DigitalValue,
            DisplayParams::Gauge { .. } => DisplayKind::Gauge,
            DisplayParams::GroupedButton { .. } => DisplayKind::GroupedButton,
            DisplayParams::Slider { .. } => DisplayKind::Slider,
        }
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        let kind: DisplayKind = kind_of(record, ConfigDomain::WidgetDisplays)?;
        let params = match kind {
            DisplayKind::AnalogValue => DisplayParams::AnalogValue {
                precision: require_u16(record, "precision")?,
            },
            DisplayKind::Button => DisplayParams::Button {
                icon: opt_str(record, "icon")?,
            },
            DisplayKind::ChartGraph => DisplayParams::ChartGraph {
                minimum_value: require_f64(record, "minimum_value")?,
                maximum_value: require_f64(record, "maximum_value")?,
                enable_min_max: bool_or(record, "enable_min_max", false)?,
            },
            DisplayKind::DigitalValue => DisplayParams::DigitalValue,
            DisplayKind::Gauge => DisplayParams::Gauge {
                precision: require_u16(record, "precision")?,
            },
            DisplayKind::GroupedButton => DisplayParams::GroupedButton {
                icon: opt_str(record, "icon")?,
            },
            DisplayKind::Slider => DisplayParams::Slider {
                minimum_value: require_f64(record, "minimum_value")?,
                maximum_value: require_f64(record, "maximum_value")?,
                step_value: require_f64(record, "step_value")?,
                precision: require_u16(record, "precision")?,
            },
        };
        Ok(params)
    }

    fn write_into(&self, record: &mut serde_json::Map<String, Value>) {
        match self {
            DisplayParams::AnalogValue { precision } | DisplayParams::Gauge { precision } => {
                record.insert("precision".to_string(), json!(precision));
            }
            DisplayParams::Button { icon } | DisplayParams::GroupedButton { icon } => {
                record.insert("icon".to_string(), json!(icon));
            }
            DisplayParams::ChartGraph {
                minimum_value,
                maximum_value,
                enable_min_max,
            } => {
                record.insert("minimum_value".to_string(), json!(minimum_value));
                record.insert("maximum_value".to_string(), json!(maximum_value));
                record.insert("enable_min_max".to_string(), json!(enable_min_max));
            }
            DisplayParams::DigitalValue => {}
            DisplayParams::Slider {
                minimum_value,
                maximum_value,
                step_value,
                precision,
            } => {
                record.insert("minimum_value".to_string(), json!(minimum_value));
                record.insert("maximum_value".to_string(), json!(maximum_value));
                record.insert("step_value".to_string(), json!(step_value));
                record.insert("precision".to_string(), json!(precision));
            }
        }
    }
}

/// Widget display - how a widget's value is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDisplay {
    pub id: Uuid,
    pub widget: Uuid,
    pub params: DisplayParams,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl WidgetDisplay {
    pub fn kind(&self) -> DisplayKind {
        self.params.kind()
    }

    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            widget: require_uuid(record, "widget")?,
            params: DisplayParams::from_record(record)?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    pub fn to_record(&self) -> Value {
        let mut record = serde_json::Map::new();
        record.insert("id".to_string(), json!(self.id.to_string()));
        record.insert("type".to_string(), json!(self.kind().as_str()));
        record.insert("widget".to_string(), json!(self.widget.to_string()));
        self.params.write_into(&mut record);
        record.insert("owner".to_string(), uuid_value(&self.owner));
        record.insert("created_at".to_string(), ts_value(&self.created_at));
        record.insert("updated_at".to_string(), ts_value(&self.updated_at));
        Value::Object(record)
    }
}

// ============================================================================
// WIDGET DATA SOURCE
// ============================================================================

/// Data source parameters, one variant per concrete data source kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DataSourceParams {
    Generic,
    ChannelProperty { channel: String, property: String },
}

impl DataSourceParams {
    pub fn kind(&self) -> DataSourceKind {
        match self {
            DataSourceParams::Generic => DataSourceKind::Generic,
            DataSourceParams::ChannelProperty { .. } => DataSourceKind::ChannelProperty,
        }
    }

    fn from_record(record: &Value) -> Result<Self, MappingError> {
        let kind: DataSourceKind = kind_of(record, ConfigDomain::WidgetDataSources)?;
        let params = match kind {
            DataSourceKind::Generic => DataSourceParams::Generic,
            DataSourceKind::ChannelProperty => DataSourceParams::ChannelProperty {
                channel: require_str(record, "channel")?.to_string(),
                property: require_str(record, "property")?.to_string(),
            },
        };
        Ok(params)
    }
}

/// Widget data source - where a widget's value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDataSource {
    pub id: Uuid,
    pub widget: Uuid,
    pub params: DataSourceParams,
    pub owner: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl WidgetDataSource {
    pub fn kind(&self) -> DataSourceKind {
        self.params.kind()
    }

    pub fn from_record(record: &Value) -> Result<Self, MappingError> {
        Ok(Self {
            id: require_uuid(record, "id")?,
            widget: require_uuid(record, "widget")?,
            params: DataSourceParams::from_record(record)?,
            owner: opt_uuid(record, "owner")?,
            created_at: opt_timestamp(record, "created_at")?,
            updated_at: opt_timestamp(record, "updated_at")?,
        })
    }

    pub fn to_record(&self) -> Value {
        let mut record = serde_json::Map::new();
        record.insert("id".to_string(), json!(self.id.to_string()));
        record.insert("type".to_string(), json!(self.kind().as_str()));
        record.insert("widget".to_string(), json!(self.widget.to_string()));
        if let DataSourceParams::ChannelProperty { channel, property } = &self.params {
            record.insert("channel".to_string(), json!(channel));
            record.insert("property".to_string(), json!(property));
        }
        record.insert("owner".to_string(), uuid_value(&self.owner));
        record.insert("created_at".to_string(), ts_value(&self.created_at));
        record.insert("updated_at".to_string(), ts_value(&self.updated_at));
        Value::Object(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard_record(id: Uuid, identifier: &str, name: Option<&str>) -> Value {
        json!({
            "id": id.to_string(),
            "identifier": identifier,
            "name": name,
            "comment": null,
            "priority": 0,
            "tabs": [],
            "owner": null,
            "created_at": "2024-03-01T10:30:00+00:00",
            "updated_at": null,
        })
    }

    #[test]
    fn test_dashboard_from_record() {
        let id = Uuid::new_v4();
        let record = dashboard_record(id, "main-dashboard", Some("Main dashboard"));
        let dashboard = Dashboard::from_record(&record).unwrap();

        assert_eq!(dashboard.id, id);
        assert_eq!(dashboard.identifier, "main-dashboard");
        assert_eq!(dashboard.name.as_deref(), Some("Main dashboard"));
        assert_eq!(dashboard.priority, 0);
        assert!(dashboard.tabs.is_empty());
    }

    #[test]
    fn test_dashboard_record_roundtrip() {
        let id = Uuid::new_v4();
        let record = dashboard_record(id, "first-floor", None);
        let dashboard = Dashboard::from_record(&record).unwrap();
        let rebuilt = Dashboard::from_record(&dashboard.to_record()).unwrap();
        assert_eq!(dashboard, rebuilt);
    }

    #[test]
    fn test_widget_requires_display() {
        let record = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "analog-sensor",
            "identifier": "room-temperature",
            "name": "Room temperature",
            "data_sources": [],
            "tabs": [],
            "groups": [],
        });
        assert_eq!(
            Widget::from_record(&record),
            Err(MappingError::RequiredFieldMissing {
                field: "display".to_string()
            })
        );
    }

    #[test]
    fn test_widget_unknown_kind() {
        let record = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "quantum-sensor",
            "identifier": "x",
            "display": Uuid::new_v4().to_string(),
        });
        assert_eq!(
            Widget::from_record(&record),
            Err(MappingError::UnknownKind {
                domain: ConfigDomain::Widgets,
                value: "quantum-sensor".to_string()
            })
        );
    }

    #[test]
    fn test_display_slider_params() {
        let id = Uuid::new_v4();
        let widget = Uuid::new_v4();
        let record = json!({
            "id": id.to_string(),
            "type": "slider",
            "widget": widget.to_string(),
            "minimum_value": 10.0,
            "maximum_value": 30.0,
            "step_value": 0.5,
            "precision": 1,
        });
        let display = WidgetDisplay::from_record(&record).unwrap();

        assert_eq!(display.kind(), DisplayKind::Slider);
        assert_eq!(
            display.params,
            DisplayParams::Slider {
                minimum_value: 10.0,
                maximum_value: 30.0,
                step_value: 0.5,
                precision: 1,
            }
        );

        let rebuilt = WidgetDisplay::from_record(&display.to_record()).unwrap();
        assert_eq!(display, rebuilt);
    }

    #[test]
    fn test_display_chart_graph_defaults_min_max_toggle() {
        let record = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "chart-graph",
            "widget": Uuid::new_v4().to_string(),
            "minimum_value": 0.0,
            "maximum_value": 40.0,
        });
        let display = WidgetDisplay::from_record(&record).unwrap();
        assert_eq!(
            display.params,
            DisplayParams::ChartGraph {
                minimum_value: 0.0,
                maximum_value: 40.0,
                enable_min_max: false,
            }
        );
    }

    #[test]
    fn test_data_source_channel_property() {
        let record = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "channel-property",
            "widget": Uuid::new_v4().to_string(),
            "channel": "thermometer",
            "property": "temperature",
        });
        let source = WidgetDataSource::from_record(&record).unwrap();
        assert_eq!(source.kind(), DataSourceKind::ChannelProperty);

        let rebuilt = WidgetDataSource::from_record(&source.to_record()).unwrap();
        assert_eq!(source, rebuilt);
    }

    #[test]
    fn test_data_source_missing_property() {
        let record = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "channel-property",
            "widget": Uuid::new_v4().to_string(),
            "channel": "thermometer",
        });
        assert_eq!(
            WidgetDataSource::from_record(&record),
            Err(MappingError::RequiredFieldMissing {
                field: "property".to_string()
            })
        );
    }
}
