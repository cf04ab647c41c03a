//! Composable event operators.
//!
//! A [`Lifter`] is the runtime half of a built rule: one step applied to a
//! single event, yielding either the (possibly mutated) event or nothing
//! when the event is dropped. [`Lifter::lift`] turns that step into a
//! stream transform over any iterator of events.

use std::fmt;
use std::sync::Arc;

use crate::event::Event;

type Step = dyn Fn(Event) -> Option<Event> + Send + Sync;

/// An immutable, shareable per-event operator.
#[derive(Clone)]
pub struct Lifter {
    step: Arc<Step>,
}

impl Lifter {
    /// Wrap a raw step.
    pub fn new<F>(step: F) -> Self
    where
        F: Fn(Event) -> Option<Event> + Send + Sync + 'static,
    {
        Lifter {
            step: Arc::new(step),
        }
    }

    /// A map stage: mutates the event in place and always forwards it.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        Lifter::new(move |mut event| {
            f(&mut event);
            Some(event)
        })
    }

    /// A check stage: forwards the event iff the predicate holds.
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Lifter::new(move |event| predicate(&event).then_some(event))
    }

    /// Forwards every event unchanged.
    pub fn identity() -> Self {
        Lifter::new(Some)
    }

    /// Sequential composition: the output of each lifter feeds the next.
    ///
    /// A dropped event stops the chain; later lifters never see it.
    pub fn chain(lifters: Vec<Lifter>) -> Self {
        match lifters.len() {
            0 => Lifter::identity(),
            1 => lifters.into_iter().next().unwrap_or_else(Lifter::identity),
            _ => Lifter::new(move |event| {
                lifters
                    .iter()
                    .try_fold(event, |event, lifter| lifter.apply(event))
            }),
        }
    }

    /// Compose `self` followed by `next`.
    pub fn then(self, next: Lifter) -> Self {
        Lifter::chain(vec![self, next])
    }

    /// Apply to one event.
    pub fn apply(&self, event: Event) -> Option<Event> {
        (self.step)(event)
    }

    /// Apply to a stream of events, yielding only the forwarded ones.
    pub fn lift<I>(&self, input: I) -> Lifted<I::IntoIter>
    where
        I: IntoIterator<Item = Event>,
    {
        Lifted {
            lifter: self.clone(),
            input: input.into_iter(),
        }
    }
}

impl fmt::Debug for Lifter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifter").finish_non_exhaustive()
    }
}

/// Iterator returned by [`Lifter::lift`].
pub struct Lifted<I> {
    lifter: Lifter,
    input: I,
}

impl<I> Iterator for Lifted<I>
where
    I: Iterator<Item = Event>,
{
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let event = self.input.next()?;
            if let Some(out) = self.lifter.apply(event) {
                return Some(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleflow_syntax::FieldPath;
    use serde_json::json;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    fn events(values: Vec<serde_json::Value>) -> Vec<Event> {
        values.into_iter().map(Event::new).collect()
    }

    #[test]
    fn test_map_always_forwards() {
        let target = path("seen");
        let lifter = Lifter::map(move |e| {
            e.set(&target, json!(true));
        });
        let out = lifter.apply(Event::new(json!({}))).unwrap();
        assert_eq!(out.as_value(), &json!({"seen": true}));
    }

    #[test]
    fn test_filter_drops() {
        let field = path("keep");
        let lifter = Lifter::filter(move |e| e.contains(&field));
        let out: Vec<Event> = lifter
            .lift(events(vec![json!({"keep": 1}), json!({}), json!({"keep": 2})]))
            .collect();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_chain_runs_in_order() {
        let p = path("trail");
        let p2 = p.clone();
        let first = Lifter::map(move |e| {
            e.set(&p, json!("a"));
        });
        let second = Lifter::map(move |e| {
            let mut trail = e.get_str(&p2).unwrap_or_default().to_string();
            trail.push('b');
            e.set(&p2, json!(trail));
        });
        let out = Lifter::chain(vec![first, second])
            .apply(Event::new(json!({})))
            .unwrap();
        assert_eq!(out.as_value(), &json!({"trail": "ab"}));
    }

    #[test]
    fn test_chain_stops_after_drop() {
        let marker = path("after");
        let chained = Lifter::filter(|_| false).then(Lifter::map(move |e| {
            e.set(&marker, json!(1));
        }));
        assert!(chained.apply(Event::new(json!({}))).is_none());
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let e = Event::new(json!({"a": 1}));
        assert_eq!(Lifter::chain(Vec::new()).apply(e.clone()), Some(e));
    }
}
