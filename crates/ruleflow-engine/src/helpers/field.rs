//! Field helpers: plain assignment, equality, presence and removal.

use std::collections::HashSet;

use serde_json::Value;

use ruleflow_syntax::{FieldPath, Parameter};

use super::{HelperDefinition, check_lifter, single_member};
use crate::error::{BuildError, Result};
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::{TraceMessages, Tracer};

/// Parse a `{"target": "$other"}` member.
fn reference_member(definition: &Value, builder: &str) -> Result<(FieldPath, FieldPath)> {
    let (key, value) = single_member(definition, builder)?;
    let raw = value
        .as_str()
        .ok_or_else(|| BuildError::definition(builder, "reference must be a string"))?;
    match Parameter::parse(raw)? {
        Parameter::Reference(source) => Ok((FieldPath::parse(key)?, source)),
        Parameter::Value(_) => Err(BuildError::definition(
            builder,
            format!("'{raw}' is not a field reference"),
        )),
    }
}

// =============================================================================
// Assignment
// =============================================================================

pub(crate) fn build_assign_value(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let (key, value) = single_member(definition, "map.value")?;
    let target = FieldPath::parse(key)?;
    let value = value.clone();
    Ok(Lifter::map(move |e| {
        e.set(&target, value.clone());
    }))
}

pub(crate) fn build_assign_reference(
    definition: &Value,
    _: &Registry,
    _: &Tracer,
) -> Result<Lifter> {
    let (target, source) = reference_member(definition, "map.reference")?;
    Ok(Lifter::map(move |e| {
        if let Ok(value) = e.get(&source) {
            let value = value.clone();
            e.set(&target, value);
        }
    }))
}

// =============================================================================
// Equality conditions
// =============================================================================

pub(crate) fn build_value_equals(
    definition: &Value,
    _: &Registry,
    tracer: &Tracer,
) -> Result<Lifter> {
    let (key, expected) = single_member(definition, "check.value")?;
    let field = FieldPath::parse(key)?;
    let expected = expected.clone();
    let traces = TraceMessages::new(definition, "value");
    Ok(check_lifter(
        move |e| e.get(&field).is_ok_and(|v| *v == expected),
        traces,
        tracer,
    ))
}

pub(crate) fn build_reference_equals(
    definition: &Value,
    _: &Registry,
    tracer: &Tracer,
) -> Result<Lifter> {
    let (field, other) = reference_member(definition, "check.reference")?;
    let traces = TraceMessages::new(definition, "reference");
    Ok(check_lifter(
        move |e| matches!((e.get(&field), e.get(&other)), (Ok(a), Ok(b)) if a == b),
        traces,
        tracer,
    ))
}

// =============================================================================
// exists / not_exists
// =============================================================================

fn build_presence(definition: &Value, helper: &str, present: bool, tracer: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_tokens(1)?;
    let field = def.target;
    Ok(check_lifter(
        move |e| e.contains(&field) == present,
        def.traces,
        tracer,
    ))
}

pub(crate) fn build_exists(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_presence(definition, "exists", true, tracer)
}

pub(crate) fn build_not_exists(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_presence(definition, "not_exists", false, tracer)
}

// =============================================================================
// delete_field
// =============================================================================

pub(crate) fn build_delete_field(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "delete_field")?;
    def.expect_tokens(1)?;

    let target = def.target;
    let traces = def.traces;
    let tracer = tracer.clone();
    Ok(Lifter::map(move |e| {
        let removed = e.erase(&target);
        traces.outcome(&tracer, removed);
    }))
}

// =============================================================================
// json_delete_fields
// =============================================================================

/// `target: +json_delete_fields/<field>|$<ref>/...`.
///
/// A literal names a field directly. A reference names a field holding the
/// path of the field to delete.
#[derive(Debug, Clone)]
pub struct DeleteFields {
    pub target: FieldPath,
    pub fields: Vec<FieldSelector>,
}

/// One `json_delete_fields` argument, resolved at build time where possible.
#[derive(Debug, Clone)]
pub enum FieldSelector {
    Path(FieldPath),
    Indirect(FieldPath),
}

impl FieldSelector {
    fn resolve(&self, event: &Event) -> Option<FieldPath> {
        match self {
            FieldSelector::Path(path) => Some(path.clone()),
            FieldSelector::Indirect(reference) => {
                let name = event.get_str(reference).ok()?;
                FieldPath::parse(name).ok()
            }
        }
    }
}

impl DeleteFields {
    /// Erase every distinct resolved field and write the number removed into
    /// the target. Returns `false` if the count could not be written.
    pub fn apply(&self, event: &mut Event) -> bool {
        let mut seen = HashSet::new();
        let paths: Vec<FieldPath> = self
            .fields
            .iter()
            .filter_map(|selector| selector.resolve(event))
            .filter(|path| seen.insert(path.as_pointer().to_string()))
            .collect();

        let removed = paths.iter().filter(|path| event.erase(path)).count();
        event.set(&self.target, Value::from(removed))
    }
}

pub(crate) fn build_delete_fields(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "json_delete_fields")?;
    def.expect_min_tokens(2)?;

    let fields = def
        .expr
        .non_empty_parameters()?
        .into_iter()
        .map(|parameter| match parameter {
            Parameter::Reference(path) => Ok(FieldSelector::Indirect(path)),
            Parameter::Value(name) => Ok(FieldSelector::Path(FieldPath::parse(&name)?)),
        })
        .collect::<Result<Vec<_>>>()?;

    let op = DeleteFields {
        target: def.target,
        fields,
    };
    let traces = def.traces;
    let tracer = tracer.clone();
    Ok(Lifter::map(move |e| {
        let ok = op.apply(e);
        traces.outcome(&tracer, ok);
    }))
}
