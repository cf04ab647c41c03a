use ruleflow_engine::{BuildError, Pipeline, Tracer, registry};
use serde_json::{Value, json};

fn build_err(rules: Value) -> BuildError {
    Pipeline::build(&rules, registry::global(), Tracer::noop()).unwrap_err()
}

#[test]
fn unknown_stage() {
    let err = build_err(json!({"decode": {}}));
    assert!(matches!(err, BuildError::UnknownBuilder(ref n) if n == "decode"), "{err}");
}

#[test]
fn unknown_helper() {
    let err = build_err(json!({"map": {"a": "+s_reverse/$b"}}));
    assert!(matches!(err, BuildError::UnknownBuilder(ref n) if n == "map.s_reverse"), "{err}");
}

#[test]
fn literal_division_by_zero() {
    let err = build_err(json!({"map": {"n": "+i_calc/div/0"}}));
    assert!(matches!(err, BuildError::DivisionByZero(_)), "{err}");
}

#[test]
fn malformed_regex() {
    let err = build_err(json!({"check": {"msg": "+r_match/[unclosed"}}));
    assert!(matches!(err, BuildError::InvalidRegex(_)), "{err}");
}

#[test]
fn wrong_parameter_counts() {
    for (stage, raw) in [
        ("map", "+s_up"),
        ("map", "+s_trim/both"),
        ("map", "+s_concat/only"),
        ("map", "+i_calc/sum"),
        ("map", "+r_ext/src"),
        ("map", "+delete_field/x"),
        ("map", "+json_delete_fields"),
        ("check", "+s_contains"),
        ("check", "+exists/x"),
    ] {
        let err = build_err(json!({stage: {"f": raw}}));
        assert!(
            matches!(err, BuildError::InvalidParameterCount { .. }),
            "{stage} {raw}: {err}"
        );
    }
}

#[test]
fn empty_parameters() {
    for (stage, raw) in [
        ("map", "+s_concat/a//b"),
        ("map", "+json_delete_fields//"),
        ("check", "+s_contains/First//Third"),
    ] {
        let err = build_err(json!({stage: {"f": raw}}));
        assert!(matches!(err, BuildError::Syntax(_)), "{stage} {raw}: {err}");
    }
}

#[test]
fn invalid_parameter_values() {
    for raw in ["+s_trim/middle/x", "+s_trim/both/xy", "+i_calc/pow/2", "+i_calc/sum/ten"] {
        let err = build_err(json!({"map": {"f": raw}}));
        assert!(matches!(err, BuildError::InvalidParameter { .. }), "{raw}: {err}");
    }
}

#[test]
fn helper_definition_must_be_a_string() {
    let err = registry::global()
        .build("map.s_up", &json!({"f": 1}), &Tracer::noop())
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidDefinition { .. }), "{err}");
}

#[test]
fn helpers_are_not_stages() {
    let err = build_err(json!({"map.value": {"a": 1}}));
    assert!(matches!(err, BuildError::InvalidDefinition { .. }), "{err}");
}

#[test]
fn late_failure_rejects_whole_rule_set() {
    let err = build_err(json!([
        {"map": {"a": 1}},
        {"normalize": [{"map": {"b": 2}}, {"check": {"c": "+i_eq/x"}}]}
    ]));
    assert!(matches!(err, BuildError::InvalidParameter { .. }), "{err}");
}
