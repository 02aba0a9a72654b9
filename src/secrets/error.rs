//! Error types for secret store operations.

use thiserror::Error;

/// Result type for secret store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while serving secret store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A search filter the backend cannot evaluate (tag-based search).
    #[error("{filter} are not supported")]
    UnsupportedFilter { filter: String },

    /// The requested property does not exist on the document.
    #[error("property {property} does not exist in secret")]
    MissingProperty { property: String },

    /// The request is malformed (e.g. a mutation without a property name).
    #[error("{message}")]
    InvalidRequest { message: String },

    /// A backend call failed; the backend's own detail is carried verbatim.
    #[error("backend {operation} failed for '{path}': {message}")]
    Backend { operation: &'static str, path: String, message: String },

    /// The name pattern could not be compiled.
    #[error("invalid name pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Recursive discovery went deeper than the configured bound.
    #[error("traversal of '{path}' exceeded maximum depth of {max_depth}")]
    TraversalTooDeep { path: String, max_depth: usize },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an unsupported filter error.
    pub fn unsupported_filter(filter: impl Into<String>) -> Self {
        Self::UnsupportedFilter { filter: filter.into() }
    }

    /// Create a missing property error.
    pub fn missing_property(property: impl Into<String>) -> Self {
        Self::MissingProperty { property: property.into() }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Create a backend error for the given operation and path.
    pub fn backend(
        operation: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend { operation, path: path.into(), message: message.into() }
    }

    /// Create a pattern error.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern { pattern: pattern.into(), message: message.into() }
    }

    /// Create a traversal depth error.
    pub fn traversal_too_deep(path: impl Into<String>, max_depth: usize) -> Self {
        Self::TraversalTooDeep { path: path.into(), max_depth }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether this error came from the backend rather than from the request.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
