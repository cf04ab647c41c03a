//! String helpers: case conversion, trimming, concatenation, equality.

use serde_json::Value;

use ruleflow_syntax::{FieldPath, Parameter};

use super::{HelperDefinition, check_lifter, resolve_str};
use crate::error::{BuildError, Result};
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

// =============================================================================
// s_up / s_lo
// =============================================================================

/// Case conversion applied by [`StringCase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOp {
    Upper,
    Lower,
}

/// `target: +s_up/<str>|$<ref>` and `target: +s_lo/<str>|$<ref>`.
#[derive(Debug, Clone)]
pub struct StringCase {
    pub target: FieldPath,
    pub source: Parameter,
    pub op: CaseOp,
}

impl StringCase {
    /// Write the converted source into the target. Only ASCII letters are
    /// mapped, so the byte length never changes. No-op if a referenced
    /// source is missing or not a string.
    pub fn apply(&self, event: &mut Event) {
        let Some(source) = resolve_str(&self.source, event) else {
            return;
        };
        let converted = match self.op {
            CaseOp::Upper => source.to_ascii_uppercase(),
            CaseOp::Lower => source.to_ascii_lowercase(),
        };
        event.set(&self.target, Value::String(converted));
    }
}

fn parse_case(definition: &Value, helper: &str, op: CaseOp) -> Result<StringCase> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_tokens(2)?;
    Ok(StringCase {
        source: Parameter::parse(def.arg(0))?,
        target: def.target,
        op,
    })
}

pub(crate) fn build_upper(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let op = parse_case(definition, "s_up", CaseOp::Upper)?;
    Ok(Lifter::map(move |e| op.apply(e)))
}

pub(crate) fn build_lower(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let op = parse_case(definition, "s_lo", CaseOp::Lower)?;
    Ok(Lifter::map(move |e| op.apply(e)))
}

// =============================================================================
// s_trim
// =============================================================================

/// Which end(s) [`Trim`] strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    Begin,
    End,
    Both,
}

impl TrimMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "begin" => Some(TrimMode::Begin),
            "end" => Some(TrimMode::End),
            "both" => Some(TrimMode::Both),
            _ => None,
        }
    }
}

/// `target: +s_trim/[begin|end|both]/<char>`.
#[derive(Debug, Clone)]
pub struct Trim {
    pub target: FieldPath,
    pub mode: TrimMode,
    pub ch: char,
}

impl Trim {
    /// Strip runs of `ch` from the target string. No-op if the target is
    /// absent or not a string.
    pub fn apply(&self, event: &mut Event) {
        let Ok(current) = event.get_str(&self.target) else {
            return;
        };
        let trimmed = match self.mode {
            TrimMode::Begin => current.trim_start_matches(self.ch),
            TrimMode::End => current.trim_end_matches(self.ch),
            TrimMode::Both => current.trim_matches(self.ch),
        };
        if trimmed.len() != current.len() {
            let trimmed = trimmed.to_string();
            event.set(&self.target, Value::String(trimmed));
        }
    }
}

pub(crate) fn build_trim(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "s_trim")?;
    def.expect_tokens(3)?;

    let mode = TrimMode::parse(def.arg(0)).ok_or_else(|| {
        BuildError::parameter("s_trim", format!("invalid trim type '{}'", def.arg(0)))
    })?;

    let mut chars = def.arg(1).chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(BuildError::parameter(
                "s_trim",
                format!("trim char must be a single character, got '{}'", def.arg(1)),
            ));
        }
    };

    let op = Trim {
        target: def.target,
        mode,
        ch,
    };
    Ok(Lifter::map(move |e| op.apply(e)))
}

// =============================================================================
// s_concat
// =============================================================================

/// `target: +s_concat/<str>|$<ref>/<str>|$<ref>/...`.
#[derive(Debug, Clone)]
pub struct Concat {
    pub target: FieldPath,
    pub segments: Vec<Parameter>,
}

impl Concat {
    /// Concatenate all segments into the target.
    ///
    /// Returns `false`, leaving the event untouched, if any referenced
    /// segment is missing or not a string.
    pub fn apply(&self, event: &mut Event) -> bool {
        let mut result = String::new();
        for segment in &self.segments {
            match resolve_str(segment, event) {
                Some(s) => result.push_str(s),
                None => return false,
            }
        }
        event.set(&self.target, Value::String(result))
    }
}

pub(crate) fn build_concat(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "s_concat")?;
    def.expect_min_tokens(3)?;
    let op = Concat {
        segments: def.expr.non_empty_parameters()?,
        target: def.target,
    };

    let traces = def.traces;
    let tracer = tracer.clone();
    Ok(Lifter::map(move |e| {
        let ok = op.apply(e);
        traces.outcome(&tracer, ok);
    }))
}

// =============================================================================
// s_eq / s_ne
// =============================================================================

/// `field: +s_eq/<str>|$<ref>` and `field: +s_ne/<str>|$<ref>`.
#[derive(Debug, Clone)]
pub struct StringEquals {
    pub field: FieldPath,
    pub operand: Parameter,
    pub negate: bool,
}

impl StringEquals {
    /// False whenever the field or a referenced operand is not a string.
    pub fn matches(&self, event: &Event) -> bool {
        let (Ok(value), Some(operand)) = (
            event.get_str(&self.field),
            resolve_str(&self.operand, event),
        ) else {
            return false;
        };
        (value == operand) != self.negate
    }
}

fn build_string_equals(
    definition: &Value,
    helper: &str,
    negate: bool,
    tracer: &Tracer,
) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_tokens(2)?;
    let op = StringEquals {
        operand: Parameter::parse(def.arg(0))?,
        field: def.target,
        negate,
    };
    Ok(check_lifter(move |e| op.matches(e), def.traces, tracer))
}

pub(crate) fn build_equals(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_string_equals(definition, "s_eq", false, tracer)
}

pub(crate) fn build_not_equals(
    definition: &Value,
    _: &Registry,
    tracer: &Tracer,
) -> Result<Lifter> {
    build_string_equals(definition, "s_ne", true, tracer)
}
