//! Error types for VMF
//!
//! Provides the shared error taxonomy:
//! - Field-level request validation failures
//! - Unknown provider tags
//! - Unknown VM ids and action tokens
//! - Storage backend failures
//!
//! Reasons never embed raw parameter values, only the expectation that failed.

use crate::vm::VmId;
use serde::Serialize;

/// A single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `params.vpc`)
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl ValidationError {
    /// Create new validation error
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field is absent
    #[inline]
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "field is required")
    }

    /// Field is present but has the wrong JSON type
    #[inline]
    #[must_use]
    pub fn wrong_type(field: impl Into<String>, expected: &str) -> Self {
        Self::new(field, format!("expected {expected}"))
    }

    /// Field is not part of the shape
    #[inline]
    #[must_use]
    pub fn unknown(field: impl Into<String>) -> Self {
        Self::new(field, "unknown field")
    }

    /// Prefix the field path (`vpc` -> `params.vpc`)
    #[must_use]
    pub fn nested_in(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

/// Errors produced while turning raw input into typed requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Shape or field validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Provider tag is not a known provider
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

/// Storage backend errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entity stored under this id
    #[error("vm not found: {0}")]
    NotFound(VmId),

    /// Backend I/O failure
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Main provisioning error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
    /// Malformed or mismatched request shape
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Provider tag has no registered factory
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Unknown VM id
    #[error("vm not found: {0}")]
    NotFound(VmId),

    /// Unrecognized action token
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Repository failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RequestError> for ProvisioningError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Validation(e) => Self::Validation(e),
            RequestError::UnsupportedProvider(tag) => Self::UnsupportedProvider(tag),
        }
    }
}

impl From<StoreError> for ProvisioningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Backend(msg) => Self::Storage(msg),
        }
    }
}

/// Stable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Client sent a malformed request
    ValidationError,
    /// Client named an unknown provider
    UnsupportedProvider,
    /// Client named an unknown VM
    NotFound,
    /// Client named an unknown action
    InvalidAction,
    /// Server-side storage failure
    StorageError,
}

impl ErrorKind {
    /// Snake-case label used in audit details and error bodies
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::UnsupportedProvider => "unsupported_provider",
            Self::NotFound => "not_found",
            Self::InvalidAction => "invalid_action",
            Self::StorageError => "storage_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing error view: kind plus reason, nothing else
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable reason
    pub reason: String,
}

impl ProvisioningError {
    /// Classify error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::UnsupportedProvider(_) => ErrorKind::UnsupportedProvider,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidAction(_) => ErrorKind::InvalidAction,
            Self::Storage(_) => ErrorKind::StorageError,
        }
    }

    /// Check if the caller is at fault (4xx-equivalent)
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Render as an error body for adapters
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            reason: self.to_string(),
        }
    }
}

/// Result alias for service operations
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
