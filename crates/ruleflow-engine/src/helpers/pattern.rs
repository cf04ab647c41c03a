//! Regex helpers. Patterns compile once at build time and are shared by
//! every event the lifter sees.

use regex::Regex;
use serde_json::Value;

use ruleflow_syntax::{FieldPath, Parameter};

use super::{HelperDefinition, check_lifter};
use crate::error::Result;
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// `target: +r_ext/<source field>/<pattern>`.
#[derive(Debug, Clone)]
pub struct Extract {
    pub target: FieldPath,
    pub source: FieldPath,
    pub pattern: Regex,
}

impl Extract {
    /// Write the first capture group of an unanchored match into the target.
    ///
    /// No-op if the source is absent or not a string, on no match, or when
    /// the pattern has no capture group. An optional group that did not
    /// participate extracts as the empty string.
    pub fn apply(&self, event: &mut Event) {
        let Ok(text) = event.get_str(&self.source) else {
            return;
        };
        let Some(captures) = self.pattern.captures(text) else {
            return;
        };
        if captures.len() < 2 {
            return;
        }
        let extracted = captures.get(1).map_or("", |m| m.as_str()).to_string();
        event.set(&self.target, Value::String(extracted));
    }
}

pub(crate) fn build_extract(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "r_ext")?;
    def.expect_tokens(3)?;

    // The source is always a field; a leading `$` is accepted and ignored.
    let source = match Parameter::parse(def.arg(0))? {
        Parameter::Reference(path) => path,
        Parameter::Value(raw) => FieldPath::parse(&raw)?,
    };
    let op = Extract {
        pattern: Regex::new(def.arg(1))?,
        target: def.target,
        source,
    };
    Ok(Lifter::map(move |e| op.apply(e)))
}

/// `field: +r_match/<pattern>` and `field: +r_not_match/<pattern>`.
#[derive(Debug, Clone)]
pub struct Match {
    pub field: FieldPath,
    pub pattern: Regex,
    pub negate: bool,
}

impl Match {
    /// False if the field is absent or not a string, whatever the polarity.
    pub fn matches(&self, event: &Event) -> bool {
        event
            .get_str(&self.field)
            .is_ok_and(|text| self.pattern.is_match(text) != self.negate)
    }
}

fn build_pattern_check(
    definition: &Value,
    helper: &str,
    negate: bool,
    tracer: &Tracer,
) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_tokens(2)?;
    let op = Match {
        pattern: Regex::new(def.arg(0))?,
        field: def.target,
        negate,
    };
    Ok(check_lifter(move |e| op.matches(e), def.traces, tracer))
}

pub(crate) fn build_match(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_pattern_check(definition, "r_match", false, tracer)
}

pub(crate) fn build_not_match(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_pattern_check(definition, "r_not_match", true, tracer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::helpers::test_support::{build, passing, run};
    use serde_json::json;

    #[test]
    fn test_extract_first_group() {
        let l = build(build_extract, json!({"user": "+r_ext/message/user=(\\w+)"}));
        assert_eq!(
            run(&l, json!({"message": "login ok user=alice from=10.0.0.1"})),
            Some(json!({"message": "login ok user=alice from=10.0.0.1", "user": "alice"}))
        );
    }

    #[test]
    fn test_extract_source_may_be_referenced() {
        let l = build(build_extract, json!({"port": "+r_ext/$net.raw/:(\\d+)$"}));
        assert_eq!(
            run(&l, json!({"net": {"raw": "host:8080"}})),
            Some(json!({"net": {"raw": "host:8080"}, "port": "8080"}))
        );
    }

    #[test]
    fn test_extract_noops() {
        let grouped = build(build_extract, json!({"out": "+r_ext/src/(\\d+)"}));
        for event in [json!({"src": "no digits"}), json!({"src": 42}), json!({})] {
            assert_eq!(run(&grouped, event.clone()), Some(event));
        }

        let ungrouped = build(build_extract, json!({"out": "+r_ext/src/\\d+"}));
        let event = json!({"src": "123"});
        assert_eq!(run(&ungrouped, event.clone()), Some(event));
    }

    #[test]
    fn test_extract_unmatched_optional_group() {
        let l = build(build_extract, json!({"out": "+r_ext/src/a(b)?"}));
        assert_eq!(run(&l, json!({"src": "ac"})), Some(json!({"src": "ac", "out": ""})));
    }

    #[test]
    fn test_extract_writes_nested_target() {
        let l = build(build_extract, json!({"client.port": "+r_ext/addr/:(\\d+)"}));
        assert_eq!(
            run(&l, json!({"addr": "10.0.0.1:443"})),
            Some(json!({"addr": "10.0.0.1:443", "client": {"port": "443"}}))
        );
    }

    #[test]
    fn test_extract_build_errors() {
        let r = crate::registry::global();
        let err = build_extract(&json!({"o": "+r_ext/src/(unclosed"}), r, &Tracer::noop()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidRegex(_)));
        let err = build_extract(&json!({"o": "+r_ext/src"}), r, &Tracer::noop()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameterCount { .. }));
    }

    #[test]
    fn test_match_polarity() {
        let m = build(build_match, json!({"host": "+r_match/^web-\\d+$"}));
        let n = build(build_not_match, json!({"host": "+r_not_match/^web-\\d+$"}));
        let events = vec![json!({"host": "web-01"}), json!({"host": "db-01"}), json!({"host": 1})];
        assert_eq!(passing(&m, events.clone()), 1);
        assert_eq!(passing(&n, events), 1);
    }
}
