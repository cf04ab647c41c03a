//! # ruleflow-engine
//!
//! Compiles JSON rule definitions into composable event operators and runs
//! structured events through them.
//!
//! Rules are built once into [`Lifter`]s. Each lifter takes an [`Event`]
//! and either forwards it, possibly mutated, or drops it. Malformed rules
//! fail at build time with a [`BuildError`]. A built pipeline never fails
//! at runtime: missing or mistyped fields make an operator a no-op or fail
//! its check.
//!
//! ## Quick Start
//!
//! ```rust
//! use ruleflow_engine::{Event, Pipeline, Tracer, registry};
//! use serde_json::json;
//!
//! let rules = json!({
//!     "normalize": [
//!         {"map": {"source.ip": "+r_ext/message/from (\\S+)"}},
//!         {
//!             "check": {"source.ip": "+exists"},
//!             "map": {"event.outcome": "+s_lo/$status"}
//!         }
//!     ]
//! });
//! let pipeline = Pipeline::build(&rules, registry::global(), Tracer::noop()).unwrap();
//!
//! let event = Event::new(json!({"message": "accepted from 10.0.0.7 port 22", "status": "SUCCESS"}));
//! let out = pipeline.process(event).unwrap();
//! assert_eq!(out.as_value()["source"]["ip"], "10.0.0.7");
//! assert_eq!(out.as_value()["event"]["outcome"], "success");
//! ```
//!
//! ## Layout
//!
//! - [`event`]: the mutable document flowing through the pipeline
//! - [`lifter`]: the operator type and its combinators
//! - [`registry`]: builder lookup by name
//! - [`helpers`]: the `+name/...` operator library
//! - [`stages`]: `check`, `map`, `normalize`, `combinator.chain`
//! - [`pipeline`]: whole rule sets and event runs

pub mod error;
pub mod event;
pub mod helpers;
pub mod lifter;
pub mod pipeline;
pub mod registry;
pub mod stages;
pub mod tracer;

pub use error::{BuildError, FieldError, Result};
pub use event::Event;
pub use lifter::{Lifted, Lifter};
pub use pipeline::{Pipeline, PipelineRun, RunStats};
pub use registry::{BuilderFn, Registry};
pub use tracer::{TRACE_TARGET, Tracer};

pub use ruleflow_syntax::{FieldPath, HelperExpr, Parameter};
