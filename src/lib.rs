//! # Proteus - schema-driven value generation
//!
//! Proteus turns JSON Schema / OpenAPI schema nodes into realistic synthetic
//! values for test fixtures and mock responses. Every value is resolved
//! through a seeded priority chain: path overrides, schema examples, named
//! generators (`x-faker`), property-name heuristics, composition
//! (`allOf`/`oneOf`/`anyOf`) and finally the declared type and constraints.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proteus::domain::{GenerationOptions, SchemaGraph};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let graph = SchemaGraph::from_value(&json!({
//!         "type": "object",
//!         "required": ["email"],
//!         "properties": { "email": { "type": "string" } }
//!     }))?;
//!
//!     let options = GenerationOptions::seeded(7).with_override("email", json!("ada@example.com"));
//!     let value = proteus::generate(&graph, &options)?;
//!     println!("{}", value);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema graph, nodes, options and errors
//! - **Adapters**: loader, provider, heuristics and the generation engine
//! - **Config**: settings file, environment and CLI layering

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use serde_json::Value;

use crate::adapters::engine::ValueGenerator;
use crate::domain::{GenerationError, GenerationOptions, SchemaGraph, SchemaId};

pub use crate::domain::{GenerationErrorKind, SchemaKind, SchemaNode};

/// Generate a value for the graph's root node.
///
/// After generation every override is deep-set into the result, so overrides
/// on paths the schema does not describe still appear.
pub fn generate(graph: &SchemaGraph, options: &GenerationOptions) -> Result<Value, GenerationError> {
    generate_node(graph, graph.root(), options)
}

/// Generate a value for an arbitrary node of the graph.
pub fn generate_node(
    graph: &SchemaGraph,
    id: SchemaId,
    options: &GenerationOptions,
) -> Result<Value, GenerationError> {
    let mut generator = ValueGenerator::new(graph, options);
    let mut value = generator.generate_from(id)?;
    generator.overrides().apply_to(&mut value);
    Ok(value)
}

/// Generate `count` values. One value is returned as-is; more are returned as
/// an array where item `i` uses `seed + i`.
pub fn generate_batch(
    graph: &SchemaGraph,
    options: &GenerationOptions,
    count: usize,
) -> Result<Value, GenerationError> {
    if count == 1 {
        return generate(graph, options);
    }

    let values = (0..count)
        .map(|i| {
            let item_options = GenerationOptions {
                seed: options.seed.map(|seed| seed.wrapping_add(i as u64)),
                ..options.clone()
            };
            generate(graph, &item_options)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(values))
}
