//! The `check` stage: an ordered conjunction of conditions.

use serde_json::Value;

use super::build_members;
use crate::error::Result;
use crate::helpers::CHECK_NAMESPACE;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// Build a `check` stage. Conditions run in order and the first failure
/// drops the event.
pub fn build(definition: &Value, registry: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let conditions = build_members(definition, CHECK_NAMESPACE, registry, tracer)?;
    Ok(Lifter::chain(conditions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::event::Event;
    use std::sync::{Arc, Mutex};
    use serde_json::json;

    fn passing(definition: Value, events: Vec<Value>) -> usize {
        build(&definition, crate::registry::global(), &Tracer::noop())
            .unwrap()
            .lift(events.into_iter().map(Event::new))
            .count()
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let definition = json!({
            "event.module": "apache",
            "user.name": "+exists",
            "status": "+i_ge/400",
        });
        let events = vec![
            json!({"event": {"module": "apache"}, "user": {"name": "a"}, "status": 404}),
            json!({"event": {"module": "apache"}, "user": {"name": "a"}, "status": 200}),
            json!({"event": {"module": "nginx"}, "user": {"name": "a"}, "status": 500}),
            json!({"event": {"module": "apache"}, "status": 500}),
        ];
        assert_eq!(passing(definition, events), 1);
    }

    #[test]
    fn test_array_form_and_references() {
        let definition = json!([{"src": "$dst"}, {"src": "+s_ne/"}]);
        let events = vec![
            json!({"src": "a", "dst": "a"}),
            json!({"src": "", "dst": ""}),
            json!({"src": "a", "dst": "b"}),
        ];
        assert_eq!(passing(definition, events), 1);
    }

    #[test]
    fn test_short_circuits_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracer = Tracer::new(move |m| sink.lock().unwrap().push(m.to_string()));
        let lifter = build(
            &json!({"a": "+exists", "b": "+exists"}),
            crate::registry::global(),
            &tracer,
        )
        .unwrap();
        assert!(lifter.apply(Event::new(json!({"b": 1}))).is_none());
        assert_eq!(*seen.lock().unwrap(), vec![r#"{"a":"+exists"} exists Failure"#.to_string()]);
    }

    #[test]
    fn test_map_only_helper_is_unknown_in_check() {
        let err = build(&json!({"a": "+s_up/x"}), crate::registry::global(), &Tracer::noop())
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownBuilder(ref n) if n == "check.s_up"));
    }
}
