//! The mutable event every operator reads and writes.
//!
//! An [`Event`] owns its JSON document outright. Pipeline stages receive it
//! by value and hand it on, so a document is never visible to two stages at
//! once.

use serde_json::{Map, Value};

use ruleflow_syntax::FieldPath;

use crate::error::FieldError;

/// One structured record flowing through a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    document: Value,
    decoded: bool,
}

impl Event {
    /// Wrap a JSON document as a fresh, not yet decoded event.
    pub fn new(document: Value) -> Self {
        Event {
            document,
            decoded: false,
        }
    }

    /// Parse a JSON string into an event.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Event::new(serde_json::from_str(raw)?))
    }

    /// Access the underlying document.
    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Release the underlying document.
    pub fn into_value(self) -> Value {
        self.document
    }

    /// Get the value at `path`.
    pub fn get(&self, path: &FieldPath) -> Result<&Value, FieldError> {
        self.document
            .pointer(path.as_pointer())
            .ok_or_else(|| FieldError::NotFound(path.to_string()))
    }

    /// Get the string at `path`.
    pub fn get_str(&self, path: &FieldPath) -> Result<&str, FieldError> {
        self.get(path)?
            .as_str()
            .ok_or_else(|| FieldError::TypeMismatch {
                path: path.to_string(),
                expected: "a string",
            })
    }

    /// Get the integer at `path`.
    pub fn get_i64(&self, path: &FieldPath) -> Result<i64, FieldError> {
        self.get(path)?
            .as_i64()
            .ok_or_else(|| FieldError::TypeMismatch {
                path: path.to_string(),
                expected: "an integer",
            })
    }

    /// Returns `true` if something exists at `path`.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.document.pointer(path.as_pointer()).is_some()
    }

    /// Write `value` at `path`, creating intermediate objects as needed.
    ///
    /// Numeric segments index into existing arrays; an index equal to the
    /// array length appends. Returns `false` when the path runs through a
    /// scalar or past the end of an array, leaving the document untouched.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> bool {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            self.document = value;
            return true;
        };

        if !self.can_create(parents) {
            return false;
        }

        let mut current = &mut self.document;
        for segment in parents {
            current = match current {
                Value::Object(map) => map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                Value::Array(items) => match array_index(segment)
                    .and_then(|i| items.get_mut(i))
                {
                    Some(item) => item,
                    None => return false,
                },
                _ => return false,
            };
        }

        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
                true
            }
            Value::Array(items) => match array_index(last) {
                Some(i) if i < items.len() => {
                    items[i] = value;
                    true
                }
                Some(i) if i == items.len() => {
                    items.push(value);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Remove the value at `path`. Returns `true` iff something was removed.
    ///
    /// The document root itself cannot be erased.
    pub fn erase(&mut self, path: &FieldPath) -> bool {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut current = &mut self.document;
        for segment in parents {
            current = match current {
                Value::Object(map) => match map.get_mut(segment) {
                    Some(next) => next,
                    None => return false,
                },
                Value::Array(items) => match array_index(segment)
                    .and_then(|i| items.get_mut(i))
                {
                    Some(next) => next,
                    None => return false,
                },
                _ => return false,
            };
        }

        match current {
            Value::Object(map) => map.shift_remove(last).is_some(),
            Value::Array(items) => match array_index(last) {
                Some(i) if i < items.len() => {
                    items.remove(i);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Returns `true` once the event has left the decoding stage.
    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    /// Mark the event as decoded. There is no way back.
    pub fn set_decoded(&mut self) {
        self.decoded = true;
    }

    /// Dry-run the parent walk of `set` so a failed write leaves no
    /// half-created intermediate objects behind.
    fn can_create(&self, parents: &[String]) -> bool {
        let mut current = Some(&self.document);
        for segment in parents {
            current = match current {
                None => None,
                Some(Value::Object(map)) => map.get(segment),
                Some(Value::Array(items)) => match array_index(segment).and_then(|i| items.get(i))
                {
                    Some(next) => Some(next),
                    None => return false,
                },
                Some(_) => return false,
            };
        }
        true
    }
}

impl From<Value> for Event {
    fn from(document: Value) -> Self {
        Event::new(document)
    }
}

fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    #[test]
    fn test_get_flat_field() {
        let event = Event::new(json!({"user": "admin"}));
        assert_eq!(event.get(&path("user")), Ok(&json!("admin")));
    }

    #[test]
    fn test_get_nested_field() {
        let event = Event::new(json!({"process": {"parent": {"pid": 4}}}));
        assert_eq!(event.get_i64(&path("process.parent.pid")), Ok(4));
    }

    #[test]
    fn test_get_missing_field() {
        let event = Event::new(json!({"a": {"b": 1}}));
        assert_eq!(
            event.get(&path("a.c")),
            Err(FieldError::NotFound("a.c".to_string()))
        );
    }

    #[test]
    fn test_get_str_type_mismatch() {
        let event = Event::new(json!({"count": 3}));
        assert!(matches!(
            event.get_str(&path("count")),
            Err(FieldError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_array_element() {
        let event = Event::new(json!({"tags": ["a", "b"]}));
        assert_eq!(event.get_str(&path("tags.1")), Ok("b"));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut event = Event::new(json!({}));
        assert!(event.set(&path("a.b.c"), json!(1)));
        assert_eq!(event.as_value(), &json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_overwrites() {
        let mut event = Event::new(json!({"a": "old"}));
        assert!(event.set(&path("a"), json!("new")));
        assert_eq!(event.get_str(&path("a")), Ok("new"));
    }

    #[test]
    fn test_set_through_scalar_fails_cleanly() {
        let mut event = Event::new(json!({"a": 1}));
        assert!(!event.set(&path("a.b"), json!(2)));
        assert_eq!(event.as_value(), &json!({"a": 1}));
    }

    #[test]
    fn test_failed_set_leaves_no_partial_objects() {
        let mut event = Event::new(json!({"a": {"b": 1}}));
        assert!(!event.set(&path("a.b.c.d"), json!(2)));
        assert_eq!(event.as_value(), &json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_set_array_append_and_out_of_range() {
        let mut event = Event::new(json!({"tags": ["a"]}));
        assert!(event.set(&path("tags.1"), json!("b")));
        assert!(!event.set(&path("tags.5"), json!("z")));
        assert_eq!(event.as_value(), &json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_set_root_replaces_document() {
        let mut event = Event::new(json!({"a": 1}));
        assert!(event.set(&path("."), json!({"b": 2})));
        assert_eq!(event.as_value(), &json!({"b": 2}));
    }

    #[test]
    fn test_erase_present_and_absent() {
        let mut event = Event::new(json!({"a": {"b": 1, "c": 2}}));
        assert!(event.erase(&path("a.b")));
        assert!(!event.erase(&path("a.b")));
        assert!(!event.erase(&path("x.y")));
        assert_eq!(event.as_value(), &json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_erase_keeps_member_order() {
        let mut event = Event::new(json!({"first": 1, "second": 2, "third": 3}));
        assert!(event.erase(&path("first")));
        let keys: Vec<&String> = event.as_value().as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["second", "third"]);
    }

    #[test]
    fn test_erase_root_is_rejected() {
        let mut event = Event::new(json!({"a": 1}));
        assert!(!event.erase(&path(".")));
        assert_eq!(event.as_value(), &json!({"a": 1}));
    }

    #[test]
    fn test_decoded_flag_is_one_way() {
        let mut event = Event::new(json!({}));
        assert!(!event.is_decoded());
        event.set_decoded();
        event.set_decoded();
        assert!(event.is_decoded());
    }
}
