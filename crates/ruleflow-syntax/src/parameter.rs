//! Helper parameters: literal values and `$` field references.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SyntaxError};
use crate::path::FieldPath;

/// Sigil that marks a parameter as a reference to another event field.
pub const REFERENCE_ANCHOR: char = '$';

/// A single helper parameter.
///
/// Literals are fixed when the rule is built. References are resolved
/// against each event at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Parameter {
    /// Literal text, kept verbatim (may be empty).
    Value(String),
    /// A reference to another field of the same event.
    Reference(FieldPath),
}

impl Parameter {
    /// Classify a raw token.
    ///
    /// `$a.b` becomes `Reference(/a/b)`; a bare `$` is an error; any other
    /// token is a literal.
    pub fn parse(token: &str) -> Result<Self> {
        match token.strip_prefix(REFERENCE_ANCHOR) {
            Some("") => Err(SyntaxError::EmptyReference),
            Some(path) => Ok(Parameter::Reference(FieldPath::parse(path)?)),
            None => Ok(Parameter::Value(token.to_string())),
        }
    }

    /// Returns `true` for `$` references.
    pub fn is_reference(&self) -> bool {
        matches!(self, Parameter::Reference(_))
    }

    /// The literal text, if this is a literal.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Parameter::Value(v) => Some(v),
            Parameter::Reference(_) => None,
        }
    }

    /// The referenced path, if this is a reference.
    pub fn as_reference(&self) -> Option<&FieldPath> {
        match self {
            Parameter::Reference(p) => Some(p),
            Parameter::Value(_) => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Value(v) => f.write_str(v),
            Parameter::Reference(p) => write!(f, "{REFERENCE_ANCHOR}{p}"),
        }
    }
}
