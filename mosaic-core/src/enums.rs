//! Enum types for UI configuration entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONFIGURATION DOMAINS
// ============================================================================

/// Configuration domain discriminator.
///
/// Identifies both which entity type a snapshot covers and the cache tag
/// namespace for that snapshot's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigDomain {
    Dashboards,
    DashboardTabs,
    Groups,
    Widgets,
    WidgetDataSources,
    WidgetDisplays,
}

impl ConfigDomain {
    /// All configuration domains, in snapshot rebuild order.
    pub const ALL: [ConfigDomain; 6] = [
        ConfigDomain::Dashboards,
        ConfigDomain::DashboardTabs,
        ConfigDomain::Groups,
        ConfigDomain::Widgets,
        ConfigDomain::WidgetDataSources,
        ConfigDomain::WidgetDisplays,
    ];

    /// Stable string form used for cache keys and cache tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigDomain::Dashboards => "dashboards",
            ConfigDomain::DashboardTabs => "dashboards-tabs",
            ConfigDomain::Groups => "groups",
            ConfigDomain::Widgets => "widgets",
            ConfigDomain::WidgetDataSources => "widgets-data-sources",
            ConfigDomain::WidgetDisplays => "widgets-display",
        }
    }
}

impl fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfigDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboards" => Ok(ConfigDomain::Dashboards),
            "dashboards-tabs" => Ok(ConfigDomain::DashboardTabs),
            "groups" => Ok(ConfigDomain::Groups),
            "widgets" => Ok(ConfigDomain::Widgets),
            "widgets-data-sources" => Ok(ConfigDomain::WidgetDataSources),
            "widgets-display" => Ok(ConfigDomain::WidgetDisplays),
            _ => Err(format!("Invalid ConfigDomain: {}", s)),
        }
    }
}

// ============================================================================
// SUBTYPE DISCRIMINATORS
// ============================================================================

/// Widget subtype, discriminated by the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    AnalogSensor,
    AnalogActuator,
    DigitalSensor,
    DigitalActuator,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::AnalogSensor => "analog-sensor",
            WidgetKind::AnalogActuator => "analog-actuator",
            WidgetKind::DigitalSensor => "digital-sensor",
            WidgetKind::DigitalActuator => "digital-actuator",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analog-sensor" => Ok(WidgetKind::AnalogSensor),
            "analog-actuator" => Ok(WidgetKind::AnalogActuator),
            "digital-sensor" => Ok(WidgetKind::DigitalSensor),
            "digital-actuator" => Ok(WidgetKind::DigitalActuator),
            _ => Err(format!("Invalid WidgetKind: {}", s)),
        }
    }
}

/// Widget display subtype, discriminated by the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayKind {
    AnalogValue,
    Button,
    ChartGraph,
    DigitalValue,
    Gauge,
    GroupedButton,
    Slider,
}

impl DisplayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayKind::AnalogValue => "analog-value",
            DisplayKind::Button => "button",
            DisplayKind::ChartGraph => "chart-graph",
            DisplayKind::DigitalValue => "digital-value",
            DisplayKind::Gauge => "gauge",
            DisplayKind::GroupedButton => "grouped-button",
            DisplayKind::Slider => "slider",
        }
    }
}

impl fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DisplayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analog-value" => Ok(DisplayKind::AnalogValue),
            "button" => Ok(DisplayKind::Button),
            "chart-graph" => Ok(DisplayKind::ChartGraph),
            "digital-value" => Ok(DisplayKind::DigitalValue),
            "gauge" => Ok(DisplayKind::Gauge),
            "grouped-button" => Ok(DisplayKind::GroupedButton),
            "slider" => Ok(DisplayKind::Slider),
            _ => Err(format!("Invalid DisplayKind: {}", s)),
        }
    }
}

/// Widget data source subtype, discriminated by the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSourceKind {
    Generic,
    ChannelProperty,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Generic => "generic",
            DataSourceKind::ChannelProperty => "channel-property",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(DataSourceKind::Generic),
            "channel-property" => Ok(DataSourceKind::ChannelProperty),
            _ => Err(format!("Invalid DataSourceKind: {}", s)),
        }
    }
}
