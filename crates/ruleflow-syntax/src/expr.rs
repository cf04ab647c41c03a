//! Helper expression parsing.
//!
//! A member value of the form `+<name>/<p1>/<p2>/...` invokes a helper.
//! There is no escaping: every `/` delimits a token, and empty tokens are
//! kept so that each helper can decide whether they are acceptable.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SyntaxError};
use crate::parameter::Parameter;

/// Prefix that marks a string value as a helper invocation.
pub const HELPER_ANCHOR: char = '+';

/// Separator between the helper name and each parameter.
pub const PARAMETER_SEPARATOR: char = '/';

/// A parsed `+name/arg/arg` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelperExpr {
    /// Helper name without the anchor.
    pub name: String,
    /// Raw parameter tokens, in order.
    pub args: Vec<String>,
}

impl HelperExpr {
    /// Parse a helper expression.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = raw
            .strip_prefix(HELPER_ANCHOR)
            .ok_or_else(|| SyntaxError::NotAHelper(raw.to_string()))?;

        let mut tokens = body.split(PARAMETER_SEPARATOR);
        let name = tokens.next().unwrap_or_default();
        if name.is_empty() {
            return Err(SyntaxError::EmptyHelperName(raw.to_string()));
        }

        Ok(HelperExpr {
            name: name.to_string(),
            args: tokens.map(String::from).collect(),
        })
    }

    /// Number of slash-separated tokens, helper name included.
    pub fn token_count(&self) -> usize {
        self.args.len() + 1
    }

    /// Parse every argument as a [`Parameter`], rejecting empty tokens.
    pub fn non_empty_parameters(&self) -> Result<Vec<Parameter>> {
        self.args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                if arg.is_empty() {
                    Err(SyntaxError::EmptyParameter {
                        helper: self.name.clone(),
                        position: i + 1,
                    })
                } else {
                    Parameter::parse(arg)
                }
            })
            .collect()
    }
}

/// Returns `true` if a JSON member value is a helper invocation.
pub fn is_helper_expr(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.starts_with(HELPER_ANCHOR))
}

/// Returns `true` if a JSON member value is a bare `$reference` string.
pub fn is_reference_expr(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.starts_with(crate::parameter::REFERENCE_ANCHOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_only() {
        let e = HelperExpr::parse("+delete_field").unwrap();
        assert_eq!(e.name, "delete_field");
        assert!(e.args.is_empty());
        assert_eq!(e.token_count(), 1);
    }

    #[test]
    fn test_arguments_in_order() {
        let e = HelperExpr::parse("+i_calc/sum/$count").unwrap();
        assert_eq!(e.name, "i_calc");
        assert_eq!(e.args, vec!["sum", "$count"]);
        assert_eq!(e.token_count(), 3);
    }

    #[test]
    fn test_empty_tokens_are_preserved() {
        let e = HelperExpr::parse("+s_contains/First//Third").unwrap();
        assert_eq!(e.args, vec!["First", "", "Third"]);
        let err = e.non_empty_parameters().unwrap_err();
        assert_eq!(
            err,
            SyntaxError::EmptyParameter {
                helper: "s_contains".to_string(),
                position: 2
            }
        );
    }

    #[test]
    fn test_missing_anchor() {
        assert!(matches!(
            HelperExpr::parse("s_up/abc"),
            Err(SyntaxError::NotAHelper(_))
        ));
    }

    #[test]
    fn test_missing_name() {
        assert!(matches!(
            HelperExpr::parse("+/abc"),
            Err(SyntaxError::EmptyHelperName(_))
        ));
    }

    #[test]
    fn test_classification() {
        assert!(is_helper_expr(&json!("+s_up/x")));
        assert!(!is_helper_expr(&json!("plain")));
        assert!(!is_helper_expr(&json!(3)));
        assert!(is_reference_expr(&json!("$field")));
        assert!(!is_reference_expr(&json!("+s_up/$field")));
    }
}
