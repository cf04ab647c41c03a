//! Build-time and field-access error types.

use ruleflow_syntax::SyntaxError;
use thiserror::Error;

/// Errors that can occur while building rule definitions into lifters.
///
/// Every variant is fatal to pipeline construction. Nothing here is ever
/// produced while events are being processed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A field path or helper expression failed to parse.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A regex pattern failed to compile.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// No builder is registered under this name.
    #[error("unknown builder '{0}'")]
    UnknownBuilder(String),

    /// A builder with this name is already registered.
    #[error("builder '{0}' is already registered")]
    DuplicateBuilder(String),

    /// The definition handed to a builder has the wrong shape.
    #[error("invalid definition for '{builder}': {reason}")]
    InvalidDefinition { builder: String, reason: String },

    /// A helper expression has the wrong number of slash-separated tokens.
    #[error("invalid number of parameters for '{helper}': expected {expected}, found {found}")]
    InvalidParameterCount {
        helper: String,
        expected: String,
        found: usize,
    },

    /// A helper parameter has an unacceptable value.
    #[error("invalid parameter for '{helper}': {reason}")]
    InvalidParameter { helper: String, reason: String },

    /// A literal divisor of zero in an integer calculation.
    #[error("division by zero in '{0}'")]
    DivisionByZero(String),

    /// A rule set document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    pub(crate) fn definition(builder: &str, reason: impl Into<String>) -> Self {
        BuildError::InvalidDefinition {
            builder: builder.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(helper: &str, reason: impl Into<String>) -> Self {
        BuildError::InvalidParameter {
            helper: helper.to_string(),
            reason: reason.into(),
        }
    }
}

/// Why a field could not be read from an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// Some segment of the path is absent.
    #[error("field '{0}' not found")]
    NotFound(String),

    /// The field exists but holds a value of another type.
    #[error("field '{path}' is not {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BuildError>;
