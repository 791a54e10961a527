//! Error types for the configuration cache layer

use crate::ConfigDomain;
use thiserror::Error;
use uuid::Uuid;

/// Document factory errors.
///
/// Raised when a snapshot record does not match the shape of the document
/// type it is being hydrated into.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown type discriminator for {domain}: {value}")]
    UnknownKind { domain: ConfigDomain, value: String },
}

/// Entity store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Query for {domain} failed: {reason}")]
    QueryFailed { domain: ConfigDomain, reason: String },

    #[error("Entity store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Cache backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Cache backend error: {reason}")]
    Backend { reason: String },
}

/// Master error type produced by the configuration read layer.
///
/// Builders and repositories never leak lower-layer errors untyped; store,
/// cache and mapping failures are rewrapped as [`ConfigError::InvalidState`]
/// with the original preserved as the source. "Not found" is not an error:
/// lookups return `None` or an empty list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration state: {reason}")]
    InvalidState {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Wrap a lower-layer failure, preserving it as the error source.
    pub fn invalid_state(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::InvalidState {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// An invalid state with no underlying cause.
    pub fn state(reason: impl Into<String>) -> Self {
        ConfigError::InvalidState {
            reason: reason.into(),
            source: None,
        }
    }
}

impl From<StoreError> for ConfigError {
    fn from(err: StoreError) -> Self {
        ConfigError::invalid_state("Entity store query failed", err)
    }
}

impl From<CacheError> for ConfigError {
    fn from(err: CacheError) -> Self {
        ConfigError::invalid_state("Cache backend failed", err)
    }
}

impl From<MappingError> for ConfigError {
    fn from(err: MappingError) -> Self {
        ConfigError::invalid_state("Document hydration failed", err)
    }
}

/// Result type alias for configuration read operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Helper for error messages that reference a document by domain and id.
pub fn document_ref(domain: ConfigDomain, id: Uuid) -> String {
    format!("{}/{}", domain, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_error_display() {
        let err = MappingError::RequiredFieldMissing {
            field: "display".to_string(),
        };
        assert!(format!("{}", err).contains("display"));
    }

    #[test]
    fn test_invalid_state_preserves_source() {
        let err: ConfigError = StoreError::QueryFailed {
            domain: ConfigDomain::Widgets,
            reason: "connection reset".to_string(),
        }
        .into();

        let ConfigError::InvalidState { source, .. } = &err;
        let source = source.as_ref().unwrap();
        assert!(format!("{}", source).contains("connection reset"));
    }

    #[test]
    fn test_unknown_kind_display() {
        let err = MappingError::UnknownKind {
            domain: ConfigDomain::WidgetDisplays,
            value: "hologram".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("widgets-display"));
        assert!(msg.contains("hologram"));
    }

    #[test]
    fn test_document_ref_format() {
        let id = Uuid::nil();
        assert_eq!(
            document_ref(ConfigDomain::Groups, id),
            format!("groups/{}", id)
        );
    }
}
