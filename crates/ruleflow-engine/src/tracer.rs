//! Caller-supplied diagnostics callback.
//!
//! Operators report per-event success or failure through a [`Tracer`]. The
//! tracer is observational only: its return value does not exist and
//! nothing an operator does depends on it having been called.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Log target used by [`Tracer::log`].
pub const TRACE_TARGET: &str = "ruleflow::trace";

/// A cloneable handle to a `(message) -> ()` callback.
#[derive(Clone)]
pub struct Tracer {
    sink: Arc<dyn Fn(&str) + Send + Sync>,
}

impl Tracer {
    /// Wrap a callback.
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Tracer {
            sink: Arc::new(sink),
        }
    }

    /// A tracer that discards every message.
    pub fn noop() -> Self {
        Tracer::new(|_| {})
    }

    /// A tracer that forwards messages to the `log` facade at debug level.
    pub fn log() -> Self {
        Tracer::new(|msg| log::debug!(target: TRACE_TARGET, "{msg}"))
    }

    /// Deliver one message.
    pub fn trace(&self, message: &str) {
        (self.sink)(message)
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer::noop()
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Success and failure messages for one operator, rendered at build time.
///
/// Messages take the form `<definition> <helper> Success`, where the
/// definition is the compact JSON of the member that built the operator.
#[derive(Debug, Clone)]
pub(crate) struct TraceMessages {
    success: String,
    failure: String,
}

impl TraceMessages {
    pub(crate) fn new(definition: &Value, helper: &str) -> Self {
        TraceMessages {
            success: format!("{definition} {helper} Success"),
            failure: format!("{definition} {helper} Failure"),
        }
    }

    pub(crate) fn success(&self, tracer: &Tracer) {
        tracer.trace(&self.success);
    }

    pub(crate) fn failure(&self, tracer: &Tracer) {
        tracer.trace(&self.failure);
    }

    pub(crate) fn outcome(&self, tracer: &Tracer, ok: bool) {
        if ok {
            self.success(tracer);
        } else {
            self.failure(tracer);
        }
    }
}
