use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::content::{ContentId, ContentKind};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("recommendations from {from} to {to} are not supported")]
    UnsupportedPairing { from: ContentKind, to: ContentKind },
    #[error("unknown content kind `{0}` (expected lesson|tool)")]
    UnknownContentKind(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} catalog contains duplicate id `{id}`")]
    DuplicateId { kind: ContentKind, id: ContentId },
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::InvalidConfiguration { .. } => {
                "The configuration is invalid. Fix the reported setting and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The catalogs are temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::InvalidConfiguration { .. } => "config_validation",
            Self::ServiceUnavailable { .. } => "catalog_unavailable",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::InvalidConfiguration { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Catalog(error) => Self::ServiceUnavailable {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(error) => Self::InvalidConfiguration {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::ConfigError;
    use crate::domain::content::{ContentId, ContentKind};
    use crate::errors::{ApplicationError, CatalogError, DomainError, InterfaceError};

    #[test]
    fn unsupported_pairing_maps_to_bad_request() {
        let interface = ApplicationError::from(DomainError::UnsupportedPairing {
            from: ContentKind::Tool,
            to: ContentKind::Tool,
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("tool to tool")
        ));
        assert_eq!(interface.error_class(), "bad_request");
    }

    #[test]
    fn catalog_read_failure_maps_to_service_unavailable() {
        let interface = ApplicationError::from(CatalogError::ReadFile {
            path: PathBuf::from("data/lessons.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        })
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The catalogs are temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn duplicate_id_message_names_catalog_and_id() {
        let error = CatalogError::DuplicateId { kind: ContentKind::Lesson, id: ContentId::from("L1") };
        assert_eq!(error.to_string(), "lesson catalog contains duplicate id `L1`");
    }

    #[test]
    fn configuration_error_maps_to_config_validation() {
        let interface = ApplicationError::from(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_owned(),
        ))
        .into_interface("req-3");

        assert!(matches!(
            interface,
            InterfaceError::InvalidConfiguration { ref correlation_id, ref message }
                if correlation_id == "req-3" && message.contains("logging.level")
        ));
        assert_eq!(interface.error_class(), "config_validation");
    }
}
