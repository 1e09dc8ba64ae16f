//! Error types for mesh construction.

use thiserror::Error;

/// Result type alias using MeshError.
pub type MeshResult<T> = Result<T, MeshError>;

/// Primary error type for mesh operations.
#[derive(Debug, Error)]
pub enum MeshError {
    // === Configuration Errors ===
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported shape type: expected Polygon or MultiPolygon, got {0}")]
    UnsupportedShape(String),

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    // === Graph Consistency Errors ===
    #[error("Node not found in neighbour graph: {0}")]
    UnknownNode(String),

    #[error("Node already present in neighbour graph: {0}")]
    DuplicateNode(String),

    #[error("Neighbour graph is inconsistent: {0}")]
    GraphInconsistent(String),

    // === Serialization Errors ===
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Broad error classes, used by callers deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    GraphConsistency,
    Serialization,
    Io,
}

impl MeshError {
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn unknown_node(id: impl ToString) -> Self {
        Self::UnknownNode(id.to_string())
    }

    pub fn duplicate_node(id: impl ToString) -> Self {
        Self::DuplicateNode(id.to_string())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Which class of failure this is.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MeshError::InvalidGeometry(_)
            | MeshError::UnsupportedShape(_)
            | MeshError::InvalidConfig { .. }
            | MeshError::InvalidTime(_)
            | MeshError::UnknownDataSource(_) => ErrorCategory::Configuration,

            MeshError::UnknownNode(_)
            | MeshError::DuplicateNode(_)
            | MeshError::GraphInconsistent(_) => ErrorCategory::GraphConsistency,

            MeshError::MissingField { .. }
            | MeshError::InvalidField { .. }
            | MeshError::Serialization(_) => ErrorCategory::Serialization,

            MeshError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl From<std::io::Error> for MeshError {
    fn from(err: std::io::Error) -> Self {
        MeshError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        MeshError::Serialization(format!("JSON error: {}", err))
    }
}
