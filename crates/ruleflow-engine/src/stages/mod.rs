//! Stage builders.
//!
//! A stage document is a JSON object whose member names are stage builders,
//! applied in document order:
//!
//! ```json
//! {
//!     "check": {"event.module": "apache"},
//!     "normalize": [
//!         {"map": {"event.kind": "event"}},
//!         {"check": {"user.name": "+exists"}, "map": {"user.name": "+s_lo/$user.name"}}
//!     ]
//! }
//! ```
//!
//! - `check` filters on every condition it lists.
//! - `map` assigns every member it lists.
//! - `normalize` runs a list of `{check, map}` blocks.
//! - `combinator.chain` runs a list of stage documents.

pub mod chain;
pub mod check;
pub mod map;
pub mod normalize;

use serde_json::Value;

use ruleflow_syntax::{HelperExpr, is_helper_expr, is_reference_expr};

use crate::error::{BuildError, Result};
use crate::helpers::{CHECK_NAMESPACE, MAP_NAMESPACE, member};
use crate::lifter::Lifter;
use crate::registry::{BuilderFn, Registry};
use crate::tracer::Tracer;

/// Descriptive members of a stage document that build nothing.
pub const METADATA_KEYS: &[&str] = &["name", "description"];

/// Every built-in stage builder, keyed by registry name.
pub(crate) const BUILDERS: &[(&str, BuilderFn)] = &[
    ("check", check::build),
    ("map", map::build),
    ("normalize", normalize::build),
    ("combinator.chain", chain::build),
];

/// Build every stage of a stage document, in document order.
///
/// Returns each stage's name alongside its lifter.
pub fn build_stage_document(
    document: &Value,
    registry: &Registry,
    tracer: &Tracer,
) -> Result<Vec<(String, Lifter)>> {
    let object = document
        .as_object()
        .ok_or_else(|| BuildError::definition("stage", "stage document must be an object"))?;

    let mut stages = Vec::with_capacity(object.len());
    for (name, definition) in object {
        if METADATA_KEYS.contains(&name.as_str()) {
            continue;
        }
        if is_helper_name(name) {
            return Err(BuildError::definition(
                name,
                "helpers can only be used inside a map or check stage",
            ));
        }
        log::trace!("building stage '{name}'");
        stages.push((name.clone(), registry.build(name, definition, tracer)?));
    }
    Ok(stages)
}

fn is_helper_name(name: &str) -> bool {
    [MAP_NAMESPACE, CHECK_NAMESPACE].iter().any(|namespace| {
        name.strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Flatten a `map`/`check` body into its `(target, value)` members.
///
/// The body is either an object or an array of objects. Member order is
/// preserved across both.
pub(crate) fn members<'a>(body: &'a Value, stage: &str) -> Result<Vec<(&'a String, &'a Value)>> {
    let objects: Vec<&Value> = match body {
        Value::Object(_) => vec![body],
        Value::Array(items) => items.iter().collect(),
        _ => {
            return Err(BuildError::definition(
                stage,
                "expected an object or an array of objects",
            ));
        }
    };

    let mut members = Vec::new();
    for object in objects {
        let object = object.as_object().ok_or_else(|| {
            BuildError::definition(stage, "array entries must be objects")
        })?;
        members.extend(object.iter());
    }

    if members.is_empty() {
        return Err(BuildError::definition(stage, "no definitions"));
    }
    Ok(members)
}

/// Registry name of the builder for one member of a `map` or `check` body.
///
/// Helper invocations go to `<namespace>.<helper>`, bare references to
/// `<namespace>.reference` and anything else to `<namespace>.value`.
pub(crate) fn member_builder(namespace: &str, value: &Value) -> Result<String> {
    let kind = match value.as_str() {
        Some(raw) if is_helper_expr(value) => HelperExpr::parse(raw)?.name,
        Some(_) if is_reference_expr(value) => "reference".to_string(),
        _ => "value".to_string(),
    };
    Ok(format!("{namespace}.{kind}"))
}

/// Build every member of a `map` or `check` body in order.
pub(crate) fn build_members(
    body: &Value,
    namespace: &str,
    registry: &Registry,
    tracer: &Tracer,
) -> Result<Vec<Lifter>> {
    members(body, namespace)?
        .into_iter()
        .map(|(key, value)| {
            let builder = member_builder(namespace, value)?;
            registry.build(&builder, &member(key, value), tracer)
        })
        .collect()
}
