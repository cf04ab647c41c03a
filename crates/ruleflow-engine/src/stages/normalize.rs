//! The `normalize` stage: an ordered list of `{check, map}` blocks.
//!
//! Each block's `check` gates its own `map`. A block without a `check`
//! always maps. An event that fails a block's check is dropped and never
//! reaches the later blocks.

use serde_json::Value;

use super::{check, map};
use crate::error::{BuildError, Result};
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

const STAGE: &str = "normalize";

fn build_block(block: &Value, registry: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let object = block
        .as_object()
        .ok_or_else(|| BuildError::definition(STAGE, "each block must be an object"))?;

    if let Some(key) = object.keys().find(|k| !matches!(k.as_str(), "check" | "map")) {
        return Err(BuildError::definition(
            STAGE,
            format!("unexpected block member '{key}', expected 'check' or 'map'"),
        ));
    }

    let mut lifters = Vec::with_capacity(2);
    if let Some(conditions) = object.get("check") {
        lifters.push(check::build(conditions, registry, tracer)?);
    }
    if let Some(assignments) = object.get("map") {
        lifters.push(map::build(assignments, registry, tracer)?);
    }
    if lifters.is_empty() {
        return Err(BuildError::definition(STAGE, "block has neither 'check' nor 'map'"));
    }
    Ok(Lifter::chain(lifters))
}

/// Build a `normalize` stage from an array of blocks.
pub fn build(definition: &Value, registry: &Registry, tracer: &Tracer) -> Result<Lifter> {
    let blocks = definition
        .as_array()
        .ok_or_else(|| BuildError::definition(STAGE, "expected an array of blocks"))?;
    if blocks.is_empty() {
        return Err(BuildError::definition(STAGE, "no blocks"));
    }

    let lifters = blocks
        .iter()
        .map(|block| build_block(block, registry, tracer))
        .collect::<Result<Vec<_>>>()?;
    Ok(Lifter::chain(lifters))
}
