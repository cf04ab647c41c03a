//! Built pipelines and event runs.
//!
//! A [`Pipeline`] is the product of building a whole rule set. Building
//! either succeeds completely or fails with the first [`BuildError`]. Once
//! built, a pipeline is immutable and can be shared across threads, each
//! thread driving its own [`PipelineRun`].

use serde::Serialize;
use serde_json::Value;

use crate::error::{BuildError, Result};
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::stages::build_stage_document;
use crate::tracer::Tracer;

/// A fully built rule set.
///
/// # Example
///
/// ```rust
/// use ruleflow_engine::{Event, Pipeline, Tracer, registry};
/// use serde_json::json;
///
/// let rules = json!({
///     "check": {"event.module": "sshd"},
///     "map": {"user.name": "+s_lo/$raw.user"}
/// });
/// let pipeline = Pipeline::build(&rules, registry::global(), Tracer::noop()).unwrap();
///
/// let event = Event::new(json!({"event": {"module": "sshd"}, "raw": {"user": "ROOT"}}));
/// let out = pipeline.process(event).unwrap();
/// assert_eq!(out.as_value()["user"]["name"], "root");
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<String>,
    lifter: Lifter,
    tracer: Tracer,
}

impl Pipeline {
    /// Build a rule set.
    ///
    /// An object is a stage document. An array is a list of stage documents
    /// run one after the other.
    pub fn build(rules: &Value, registry: &Registry, tracer: Tracer) -> Result<Self> {
        let documents: Vec<&Value> = match rules {
            Value::Object(_) => vec![rules],
            Value::Array(items) => items.iter().collect(),
            _ => {
                return Err(BuildError::definition(
                    "pipeline",
                    "rule set must be an object or an array of objects",
                ));
            }
        };

        let mut stages = Vec::new();
        let mut lifters = Vec::new();
        for document in documents {
            for (name, lifter) in build_stage_document(document, registry, &tracer)? {
                stages.push(name);
                lifters.push(lifter);
            }
        }

        log::debug!("built pipeline with {} stage(s): {}", stages.len(), stages.join(", "));
        Ok(Pipeline {
            stages,
            lifter: Lifter::chain(lifters),
            tracer,
        })
    }

    /// Parse and build a JSON rule set.
    pub fn from_json_str(raw: &str, registry: &Registry, tracer: Tracer) -> Result<Self> {
        let rules: Value = serde_json::from_str(raw)?;
        Pipeline::build(&rules, registry, tracer)
    }

    /// Number of top-level stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Names of the top-level stages, in run order.
    pub fn stage_names(&self) -> &[String] {
        &self.stages
    }

    /// The tracer operators report to.
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Run one event through every stage. `None` if a check dropped it.
    pub fn process(&self, event: Event) -> Option<Event> {
        let out = self.lifter.apply(event);
        if out.is_none() {
            log::trace!("event dropped");
        }
        out
    }

    /// Attach the pipeline to a stream of events.
    pub fn run<I>(&self, input: I) -> PipelineRun<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Event>,
    {
        PipelineRun {
            pipeline: self,
            input: input.into_iter(),
            stats: RunStats::default(),
            closed: false,
        }
    }
}

/// Event counts for one [`PipelineRun`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Events pulled from the input.
    pub received: u64,
    /// Events that made it through every stage.
    pub forwarded: u64,
    /// Events dropped by a check.
    pub dropped: u64,
}

/// A pipeline attached to an input stream.
///
/// Yields forwarded events. Once the input is exhausted the run is closed
/// and yields nothing more.
#[derive(Debug)]
pub struct PipelineRun<'p, I> {
    pipeline: &'p Pipeline,
    input: I,
    stats: RunStats,
    closed: bool,
}

impl<I> PipelineRun<'_, I> {
    /// Returns `true` once the input has signalled its end.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Counts so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }
}

impl<I> Iterator for PipelineRun<'_, I>
where
    I: Iterator<Item = Event>,
{
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.closed {
            return None;
        }
        loop {
            let Some(event) = self.input.next() else {
                self.closed = true;
                log::debug!(
                    "run closed: {} received, {} forwarded, {} dropped",
                    self.stats.received,
                    self.stats.forwarded,
                    self.stats.dropped
                );
                return None;
            };
            self.stats.received += 1;
            match self.pipeline.process(event) {
                Some(out) => {
                    self.stats.forwarded += 1;
                    return Some(out);
                }
                None => self.stats.dropped += 1,
            }
        }
    }
}
