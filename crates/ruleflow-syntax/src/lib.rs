//! # ruleflow-syntax
//!
//! Build-time syntax for ruleflow rule definitions.
//!
//! Rule definitions are JSON objects whose member names are target field
//! paths and whose member values are either literal JSON values or helper
//! expressions embedded in a string:
//!
//! ```text
//! "event.original": "+s_concat/$user.name/@/$host.name"
//! ```
//!
//! This crate parses the pieces of that micro-language once, before any
//! event is seen:
//!
//! - [`FieldPath`]: dotted paths normalized to JSON pointers
//! - [`Parameter`]: literal text vs `$`-prefixed field references
//! - [`HelperExpr`]: `+name/arg/arg` invocations
//!
//! ## Quick Start
//!
//! ```rust
//! use ruleflow_syntax::{HelperExpr, Parameter};
//!
//! let expr = HelperExpr::parse("+s_contains/$needle/literal").unwrap();
//! assert_eq!(expr.name, "s_contains");
//!
//! let params = expr.non_empty_parameters().unwrap();
//! assert!(params[0].is_reference());
//! assert_eq!(params[1], Parameter::Value("literal".to_string()));
//! ```

pub mod error;
pub mod expr;
pub mod parameter;
pub mod path;

pub use error::{Result, SyntaxError};
pub use expr::{
    HELPER_ANCHOR, HelperExpr, PARAMETER_SEPARATOR, is_helper_expr, is_reference_expr,
};
pub use parameter::{Parameter, REFERENCE_ANCHOR};
pub use path::{FieldPath, ROOT_PATH};
