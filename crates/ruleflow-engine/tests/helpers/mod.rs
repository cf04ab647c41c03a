#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ruleflow_engine::{Event, Pipeline, Tracer, registry};
use serde_json::Value;

pub fn pipeline(rules: Value) -> Pipeline {
    Pipeline::build(&rules, registry::global(), Tracer::noop()).unwrap()
}

/// A pipeline whose tracer records every message.
pub fn traced_pipeline(rules: Value) -> (Pipeline, Arc<Mutex<Vec<String>>>) {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let tracer = Tracer::new(move |m| sink.lock().unwrap().push(m.to_string()));
    (Pipeline::build(&rules, registry::global(), tracer).unwrap(), messages)
}

pub fn process(rules: Value, event: Value) -> Option<Value> {
    pipeline(rules).process(Event::new(event)).map(Event::into_value)
}

/// Forwarded documents, in order.
pub fn run_all(pipeline: &Pipeline, events: Vec<Value>) -> Vec<Value> {
    pipeline
        .run(events.into_iter().map(Event::new))
        .map(Event::into_value)
        .collect()
}
