// src/error.rs - Error taxonomy for catalog access, configuration and platform failures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::utils::Time;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The upstream answered with a non-success status, or could not be
    /// reached at all (`status_code: None`).
    Upstream {
        status_code: Option<u16>,
        endpoint: Option<String>,
    },
    /// The upstream answered, but the body had an unexpected shape.
    Decode {
        endpoint: Option<String>,
    },
    /// A single-item lookup found nothing.
    NotFound {
        resource: String,
        id: String,
    },
    Configuration {
        key: Option<String>,
        validation_errors: Vec<String>,
    },
    Validation {
        field: Option<String>,
        rules: Vec<String>,
    },
    Platform {
        platform: String,
        feature: String,
    },
    Application,
    Io,
    Serialization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub message: String,
    pub severity: ErrorSeverity,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: crate::types::Metadata,
    pub causes: Vec<String>,
}

impl Error {
    /// Creates a new error with the specified kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            severity: ErrorSeverity::Medium,
            source: "unknown".to_string(),
            timestamp: Time::now(),
            metadata: std::collections::HashMap::new(),
            causes: Vec::new(),
        }
    }

    /// Sets the error severity
    pub fn severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the error source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Adds metadata to the error
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Adds a cause to the error chain
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.causes.push(cause.to_string());
        self
    }

    /// Creates an upstream error for a non-success HTTP status
    pub fn upstream(status_code: u16, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self::new(
            ErrorKind::Upstream {
                status_code: Some(status_code),
                endpoint: Some(endpoint.clone()),
            },
            format!("Upstream returned HTTP {} for {}", status_code, endpoint),
        )
        .source("catalog")
    }

    /// Creates an upstream error for a request that never got a response
    pub fn unreachable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Upstream {
                status_code: None,
                endpoint: Some(endpoint.into()),
            },
            message,
        )
        .source("catalog")
    }

    /// Creates a decode error for a malformed response body
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Decode {
                endpoint: Some(endpoint.into()),
            },
            message,
        )
        .source("catalog")
    }

    /// Creates a not-found error for a single-item lookup
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        let resource = resource.into();
        let id = id.into();
        Self::new(
            ErrorKind::NotFound {
                resource: resource.clone(),
                id: id.clone(),
            },
            format!("{} '{}' was not found", resource, id),
        )
        .severity(ErrorSeverity::Low)
        .source("catalog")
    }

    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Configuration {
                key: None,
                validation_errors: Vec::new(),
            },
            message,
        )
        .severity(ErrorSeverity::High)
    }

    /// Creates a validation error for a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorKind::Validation {
                field: Some(field.into()),
                rules: vec![message.clone()],
            },
            message,
        )
        .severity(ErrorSeverity::Low)
    }

    /// Creates a platform-specific error
    pub fn platform(
        platform: impl Into<String>,
        feature: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Platform {
                platform: platform.into(),
                feature: feature.into(),
            },
            message,
        )
    }

    /// HTTP status carried by an upstream error, if any
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Upstream { status_code, .. } => *status_code,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self.kind, ErrorKind::Upstream { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ErrorKind::Decode { .. })
    }

    /// Message suitable for showing to a shopper
    pub fn user_message(&self) -> String {
        match &self.kind {
            ErrorKind::NotFound { .. } => "Product not found.".to_string(),
            ErrorKind::Upstream {
                status_code: Some(status),
                ..
            } => format!("Failed to load products (HTTP {}). Please try again.", status),
            ErrorKind::Upstream {
                status_code: None, ..
            } => "Could not reach the catalog. Please check your connection and try again."
                .to_string(),
            ErrorKind::Decode { .. } => {
                "The catalog sent an unexpected response. Please try again later.".to_string()
            }
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let mut error = Error::new(ErrorKind::Io, err.to_string());
        error.source = "std::io::Error".to_string();
        error.severity = ErrorSeverity::High;
        error
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Serialization, err.to_string()).source("serde_json")
    }
}

/// Extension trait for Results to add context
pub trait ResultExt<T> {
    /// Adds context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Sets the error source
    fn with_source(self, source: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::new(ErrorKind::Application, f()).caused_by(e))
    }

    fn with_source(self, source: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            Error::new(ErrorKind::Application, e.to_string())
                .source(source)
                .caused_by(e)
        })
    }
}
