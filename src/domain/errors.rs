//! Domain error types
//!
//! This module defines the error hierarchy for the export-validate-upload pipeline.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main assetlift error type
///
/// Variants fall into two groups: errors that abort a whole batch before any unit
/// is attempted (see [`LiftError::aborts_batch`]) and per-unit errors that the
/// batch orchestrator records and then moves past.
#[derive(Debug, Error)]
pub enum LiftError {
    /// Nothing to process
    #[error("No objects selected")]
    EmptySelection,

    /// Pre-flight validation found blocking problems
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationBlocking(Vec<String>),

    /// The external encoder failed
    #[error("Encode error: {detail}")]
    Encode { detail: String },

    /// Connection failures, timeouts and 5xx responses
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected credentials (401/403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Size or rate quota exceeded on the remote side
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// The backend answered with something we cannot use
    #[error("Backend protocol error: {detail}")]
    BackendProtocol { detail: String },

    /// Missing endpoint, namespace or credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown object references or a cycle in the parent graph
    #[error("Scene graph error: {0}")]
    SceneGraph(String),

    /// The batch was cancelled before the unit started
    #[error("Cancelled before the unit started")]
    Cancelled,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Fieldless classification of a [`LiftError`], used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptySelection,
    ValidationBlocking,
    Encode,
    Network,
    Auth,
    Quota,
    BackendProtocol,
    Configuration,
    SceneGraph,
    Cancelled,
    Serialization,
    Io,
}

impl LiftError {
    /// Creates an encode error from any displayable detail
    pub fn encode(detail: impl Into<String>) -> Self {
        LiftError::Encode {
            detail: detail.into(),
        }
    }

    /// Creates a backend protocol error from any displayable detail
    pub fn protocol(detail: impl Into<String>) -> Self {
        LiftError::BackendProtocol {
            detail: detail.into(),
        }
    }

    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LiftError::EmptySelection => ErrorKind::EmptySelection,
            LiftError::ValidationBlocking(_) => ErrorKind::ValidationBlocking,
            LiftError::Encode { .. } => ErrorKind::Encode,
            LiftError::Network(_) => ErrorKind::Network,
            LiftError::Auth(_) => ErrorKind::Auth,
            LiftError::Quota(_) => ErrorKind::Quota,
            LiftError::BackendProtocol { .. } => ErrorKind::BackendProtocol,
            LiftError::Configuration(_) => ErrorKind::Configuration,
            LiftError::SceneGraph(_) => ErrorKind::SceneGraph,
            LiftError::Cancelled => ErrorKind::Cancelled,
            LiftError::Serialization(_) => ErrorKind::Serialization,
            LiftError::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error stops a batch before any unit is attempted
    ///
    /// Everything else is captured per unit and the batch proceeds.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            LiftError::Configuration(_) | LiftError::EmptySelection | LiftError::SceneGraph(_)
        )
    }

    /// Whether a caller-initiated retry of the same unit could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LiftError::Network(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for LiftError {
    fn from(err: std::io::Error) -> Self {
        LiftError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for LiftError {
    fn from(err: serde_json::Error) -> Self {
        LiftError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LiftError {
    fn from(err: toml::de::Error) -> Self {
        LiftError::Configuration(format!("TOML parse error: {err}"))
    }
}
