//! Substring containment checks.
//!
//! `s_contains` passes when the field contains every parameter. `s_not_contains`
//! passes when it contains none of them. Both are conjunctions over the
//! parameters, so neither is the negation of the other once there is more
//! than one parameter.
//!
//! A reference that is missing, not a string, or empty fails the whole
//! predicate. An empty needle is never treated as trivially contained.

use serde_json::Value;

use ruleflow_syntax::{FieldPath, Parameter};

use super::{HelperDefinition, check_lifter, resolve_str};
use crate::error::Result;
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// `field: +s_contains/<str>|$<ref>/...` and
/// `field: +s_not_contains/<str>|$<ref>/...`.
#[derive(Debug, Clone)]
pub struct Containment {
    pub field: FieldPath,
    pub needles: Vec<Parameter>,
    pub negate: bool,
}

impl Containment {
    /// False if the field is absent or not a string, whatever the polarity.
    /// Otherwise every needle must be present (or, negated, absent).
    pub fn matches(&self, event: &Event) -> bool {
        let Ok(haystack) = event.get_str(&self.field) else {
            return false;
        };
        self.needles.iter().all(|needle| match resolve_str(needle, event) {
            Some(n) if !n.is_empty() => haystack.contains(n) != self.negate,
            _ => false,
        })
    }
}

fn build_containment(
    definition: &Value,
    helper: &str,
    negate: bool,
    tracer: &Tracer,
) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_min_tokens(2)?;
    let op = Containment {
        needles: def.expr.non_empty_parameters()?,
        field: def.target,
        negate,
    };
    Ok(check_lifter(move |e| op.matches(e), def.traces, tracer))
}

pub(crate) fn build_contains(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_containment(definition, "s_contains", false, tracer)
}

pub(crate) fn build_not_contains(
    definition: &Value,
    _: &Registry,
    tracer: &Tracer,
) -> Result<Lifter> {
    build_containment(definition, "s_not_contains", true, tracer)
}
