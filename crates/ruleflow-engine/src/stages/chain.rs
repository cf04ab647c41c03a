//! The `combinator.chain` stage: sequential composition of stage documents.

use serde_json::Value;

use super::build_stage_document;
use crate::error::{BuildError, Result};
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// Build every stage document in the array and run them in order.
pub fn build(definition: &Value, registry: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let documents = definition.as_array().ok_or_else(|| {
        BuildError::definition("combinator.chain", "expected an array of stage documents")
    })?;

    let mut lifters = Vec::new();
    for document in documents {
        lifters.extend(
            build_stage_document(document, registry, tracer)?
                .into_iter()
                .map(|(_, lifter)| lifter),
        );
    }
    Ok(Lifter::chain(lifters))
}
