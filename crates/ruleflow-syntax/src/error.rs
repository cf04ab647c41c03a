use thiserror::Error;

/// Errors that can occur while parsing field paths and helper expressions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Field path must not be empty")]
    EmptyPath,

    #[error("Reference '$' must name a field")]
    EmptyReference,

    #[error("Not a helper expression: '{0}'")]
    NotAHelper(String),

    #[error("Helper expression '{0}' has no helper name")]
    EmptyHelperName(String),

    #[error("Parameter {position} of helper '{helper}' is empty")]
    EmptyParameter { helper: String, position: usize },
}

pub type Result<T> = std::result::Result<T, SyntaxError>;
