//! Error types for template generation.
//!
//! Only input and construction failures are errors. Design-rule findings
//! travel in the returned warnings and never abort generation.

use boxjoint_core::JointError;
use thiserror::Error;

/// Errors that can occur while resolving parameters or generating a template.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The template identifier is not one of the known templates.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// A required value was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A parameter has the wrong type or an unusable value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Joint planning or panel assembly failed.
    #[error("Joint error: {0}")]
    Joint(#[from] JointError),

    /// Parameters or metadata could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenerateError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerateError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;
