//! Helper operator library.
//!
//! Helpers are invoked from rule definitions with `+name/arg/arg`. Each one
//! is compiled from a single-member definition (`{"target": "+name/..."}`)
//! into a configuration struct, and wrapped into a [`Lifter`]:
//!
//! - **map helpers** (registered as `map.<name>`) mutate the event and always
//!   forward it; on any runtime precondition failure they leave it untouched.
//! - **check helpers** (registered as `check.<name>`) are predicates; an event
//!   that fails one is dropped.
//!
//! | Module       | Map helpers                                         | Check helpers |
//! |--------------|-----------------------------------------------------|---------------|
//! | [`string`]   | `s_up`, `s_lo`, `s_trim`, `s_concat`                | `s_eq`, `s_ne` |
//! | [`int`]      | `i_calc`                                            | `i_eq`, `i_ne`, `i_lt`, `i_le`, `i_gt`, `i_ge` |
//! | [`field`]    | `delete_field`, `json_delete_fields`, literal and `$ref` assignment | `exists`, `not_exists`, literal and `$ref` equality |
//! | [`pattern`]  | `r_ext`                                             | `r_match`, `r_not_match` |
//! | [`contains`] |                                                     | `s_contains`, `s_not_contains` |

pub mod contains;
pub mod field;
pub mod int;
pub mod pattern;
pub mod string;

use serde_json::{Map, Value};

use ruleflow_syntax::{FieldPath, HelperExpr, Parameter};

use crate::error::{BuildError, Result};
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::BuilderFn;
use crate::tracer::{TraceMessages, Tracer};

/// Registry namespace for map helpers.
pub const MAP_NAMESPACE: &str = "map";

/// Registry namespace for check helpers.
pub const CHECK_NAMESPACE: &str = "check";

/// Registry name of the map helper `helper`.
pub fn map_builder_name(helper: &str) -> String {
    format!("{MAP_NAMESPACE}.{helper}")
}

/// Registry name of the check helper `helper`.
pub fn check_builder_name(helper: &str) -> String {
    format!("{CHECK_NAMESPACE}.{helper}")
}

/// Every built-in helper builder, keyed by registry name.
pub(crate) const BUILDERS: &[(&str, BuilderFn)] = &[
    ("map.value", field::build_assign_value),
    ("map.reference", field::build_assign_reference),
    ("map.s_up", string::build_upper),
    ("map.s_lo", string::build_lower),
    ("map.s_trim", string::build_trim),
    ("map.s_concat", string::build_concat),
    ("map.i_calc", int::build_calc),
    ("map.r_ext", pattern::build_extract),
    ("map.delete_field", field::build_delete_field),
    ("map.json_delete_fields", field::build_delete_fields),
    ("check.value", field::build_value_equals),
    ("check.reference", field::build_reference_equals),
    ("check.exists", field::build_exists),
    ("check.not_exists", field::build_not_exists),
    ("check.s_eq", string::build_equals),
    ("check.s_ne", string::build_not_equals),
    ("check.s_contains", contains::build_contains),
    ("check.s_not_contains", contains::build_not_contains),
    ("check.i_eq", int::build_eq),
    ("check.i_ne", int::build_ne),
    ("check.i_lt", int::build_lt),
    ("check.i_le", int::build_le),
    ("check.i_gt", int::build_gt),
    ("check.i_ge", int::build_ge),
    ("check.r_match", pattern::build_match),
    ("check.r_not_match", pattern::build_not_match),
];

/// The single `target: value` member of a helper definition.
pub(crate) fn single_member<'a>(definition: &'a Value, builder: &str) -> Result<(&'a String, &'a Value)> {
    let object = definition
        .as_object()
        .ok_or_else(|| BuildError::definition(builder, "definition must be an object"))?;
    let mut members = object.iter();
    match (members.next(), members.next()) {
        (Some(member), None) => Ok(member),
        _ => Err(BuildError::definition(
            builder,
            format!("definition must have exactly one member, found {}", object.len()),
        )),
    }
}

/// Build a single-member definition object.
pub(crate) fn member(key: &str, value: &Value) -> Value {
    let mut object = Map::with_capacity(1);
    object.insert(key.to_string(), value.clone());
    Value::Object(object)
}

/// A `{"target": "+helper/arg/..."}` definition, parsed once.
#[derive(Debug, Clone)]
pub(crate) struct HelperDefinition {
    pub target: FieldPath,
    pub expr: HelperExpr,
    pub traces: TraceMessages,
}

impl HelperDefinition {
    pub(crate) fn parse(definition: &Value, helper: &str) -> Result<Self> {
        let (key, value) = single_member(definition, helper)?;
        let raw = value.as_str().ok_or_else(|| {
            BuildError::definition(helper, format!("invalid parameter type for {helper} (str expected)"))
        })?;
        let expr = HelperExpr::parse(raw)?;
        if expr.name != helper {
            return Err(BuildError::definition(
                helper,
                format!("expression invokes '{}'", expr.name),
            ));
        }
        Ok(HelperDefinition {
            target: FieldPath::parse(key)?,
            expr,
            traces: TraceMessages::new(definition, helper),
        })
    }

    /// Require exactly `expected` slash-separated tokens, helper name included.
    pub(crate) fn expect_tokens(&self, expected: usize) -> Result<()> {
        let found = self.expr.token_count();
        if found != expected {
            return Err(BuildError::InvalidParameterCount {
                helper: self.expr.name.clone(),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    /// Require at least `minimum` slash-separated tokens, helper name included.
    pub(crate) fn expect_min_tokens(&self, minimum: usize) -> Result<()> {
        let found = self.expr.token_count();
        if found < minimum {
            return Err(BuildError::InvalidParameterCount {
                helper: self.expr.name.clone(),
                expected: format!("at least {minimum}"),
                found,
            });
        }
        Ok(())
    }

    /// The `index`-th argument (0-based, after the helper name).
    pub(crate) fn arg(&self, index: usize) -> &str {
        self.expr.args.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// Resolve a string operand: literals as-is, references from the event.
///
/// A missing or non-string reference resolves to `None`.
pub(crate) fn resolve_str<'a>(parameter: &'a Parameter, event: &'a Event) -> Option<&'a str> {
    match parameter {
        Parameter::Value(v) => Some(v),
        Parameter::Reference(path) => event.get_str(path).ok(),
    }
}

/// Wrap a predicate as a check lifter that traces each outcome.
pub(crate) fn check_lifter<F>(predicate: F, traces: TraceMessages, tracer: &Tracer) -> Lifter
where
    F: Fn(&Event) -> bool + Send + Sync + 'static,
{
    let tracer = tracer.clone();
    Lifter::filter(move |e| {
        let ok = predicate(e);
        traces.outcome(&tracer, ok);
        ok
    })
}
