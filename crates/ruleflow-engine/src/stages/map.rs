//! The `map` stage.

use serde_json::Value;

use super::build_members;
use crate::error::Result;
use crate::helpers::MAP_NAMESPACE;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// Build a `map` stage: each member is applied in order and the event is
/// always forwarded.
pub fn build(definition: &Value, registry: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let lifters = build_members(definition, MAP_NAMESPACE, registry, tracer)?;
    Ok(Lifter::chain(lifters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::event::Event;
    use serde_json::json;

    fn run(definition: Value, event: Value) -> Value {
        build(&definition, crate::registry::global(), &Tracer::noop())
            .unwrap()
            .apply(Event::new(event))
            .unwrap()
            .into_value()
    }

    #[test]
    fn test_members_apply_in_order() {
        let out = run(
            json!({
                "user.name": "$raw_user",
                "user.upper": "+s_up/$user.name",
                "event.kind": "event",
                "count": 3,
            }),
            json!({"raw_user": "root"}),
        );
        assert_eq!(
            out,
            json!({
                "raw_user": "root",
                "user": {"name": "root", "upper": "ROOT"},
                "event": {"kind": "event"},
                "count": 3,
            })
        );
    }

    #[test]
    fn test_array_form() {
        let out = run(json!([{"a": 1}, {"b": "+s_concat/$a/x/y"}]), json!({}));
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn test_unknown_helper_fails_build() {
        let err = build(&json!({"a": "+nope/1"}), crate::registry::global(), &Tracer::noop())
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownBuilder(ref n) if n == "map.nope"));
    }

    #[test]
    fn test_check_only_helper_is_unknown_in_map() {
        let err = build(&json!({"a": "+exists"}), crate::registry::global(), &Tracer::noop())
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownBuilder(ref n) if n == "map.exists"));
    }

    #[test]
    fn test_empty_map_fails_build() {
        assert!(build(&json!({}), crate::registry::global(), &Tracer::noop()).is_err());
    }
}
