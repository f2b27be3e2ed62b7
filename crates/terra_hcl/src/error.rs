//! Error types for HCL compilation.

use thiserror::Error;

/// Result type alias for compilation operations.
pub type HclResult<T> = Result<T, HclError>;

/// Errors that can occur while compiling a diagram.
///
/// Only [`HclError::InvalidSnapshot`] and I/O failures abort a whole
/// compilation. The per-resource variants are raised by generators and the
/// registry, then recorded by the compiler as findings.
#[derive(Error, Debug)]
pub enum HclError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Resource '{node}' is missing required property '{key}'")]
    MissingProperty { node: String, key: String },

    #[error("Resource '{node}' has invalid property '{key}': expected {expected}")]
    InvalidProperty {
        node: String,
        key: String,
        expected: String,
    },

    #[error("Generator failed for resource '{node}': {message}")]
    GeneratorFailed { node: String, message: String },

    #[error("Cannot resolve reference to resource '{0}': not found")]
    UnresolvedReference(String),

    #[error("Invalid diagram snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HclError {
    /// Shorthand for a generator failure tied to a resource.
    pub fn generator(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GeneratorFailed {
            node: node.into(),
            message: message.into(),
        }
    }
}
