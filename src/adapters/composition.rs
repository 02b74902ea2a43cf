//! `oneOf` / `anyOf` branch selection
//!
//! Selection is separated from generation: these functions only decide which
//! branches to use (and which discriminator value to stamp); the engine
//! generates them.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use crate::domain::{SchemaGraph, SchemaId, SchemaNode};

/// Outcome of a `oneOf` draw.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfChoice {
    pub branch: SchemaId,
    /// Discriminator property and the value it must carry.
    pub discriminator: Option<(String, Value)>,
}

/// Pick one `oneOf` branch, guided by the discriminator when there is one.
///
/// With a mapping, the draw is over mapping entries and the entry's tag
/// becomes the discriminator value. A mapping entry that names no branch falls
/// back to a draw over the branch list. Without a usable mapping, the value is
/// read from the chosen branch's own property (first `enum` value, else
/// `const`).
pub fn select_one(graph: &SchemaGraph, node: &SchemaNode, rng: &mut StdRng) -> Option<OneOfChoice> {
    if node.one_of.is_empty() {
        return None;
    }

    let Some(discriminator) = &node.discriminator else {
        return Some(OneOfChoice {
            branch: draw(&node.one_of, rng),
            discriminator: None,
        });
    };

    if !discriminator.mapping.is_empty() {
        let index = rng.gen_range(0..discriminator.mapping.len());
        if let Some((tag, target)) = discriminator.mapping.get_index(index) {
            if node.one_of.contains(target) {
                return Some(OneOfChoice {
                    branch: *target,
                    discriminator: Some((
                        discriminator.property_name.clone(),
                        Value::String(tag.clone()),
                    )),
                });
            }
            debug!(
                "Discriminator mapping '{}' -> {} is not a oneOf branch; drawing from the list",
                tag, target
            );
        }
    }

    let branch = draw(&node.one_of, rng);
    let value = discriminator_value(graph, branch, &discriminator.property_name);
    Some(OneOfChoice {
        branch,
        discriminator: value.map(|v| (discriminator.property_name.clone(), v)),
    })
}

/// Pick a non-empty, shuffled subset of the `anyOf` branches.
pub fn select_any(node: &SchemaNode, rng: &mut StdRng) -> Vec<SchemaId> {
    let mut branches = node.any_of.clone();
    if branches.is_empty() {
        return branches;
    }
    let count = rng.gen_range(1..=branches.len());
    branches.shuffle(rng);
    branches.truncate(count);
    branches
}

/// Write the resolved discriminator value into a generated object.
pub fn stamp_discriminator(value: &mut Value, choice: &OneOfChoice) {
    if let (Value::Object(map), Some((property, tag))) = (value, &choice.discriminator) {
        map.insert(property.clone(), tag.clone());
    }
}

fn draw(branches: &[SchemaId], rng: &mut StdRng) -> SchemaId {
    branches[rng.gen_range(0..branches.len())]
}

/// The fixed value a branch declares for `property`, looking through its
/// `allOf` members as well.
fn discriminator_value(graph: &SchemaGraph, branch: SchemaId, property: &str) -> Option<Value> {
    let mut pending = vec![branch];
    let mut seen = HashSet::new();

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        let node = graph.node(id);
        if let Some(child) = node.properties.as_ref().and_then(|p| p.get(property)) {
            let child = graph.node(*child);
            let fixed = child
                .enum_values
                .as_ref()
                .and_then(|values| values.first())
                .or(child.const_value.as_ref());
            if let Some(fixed) = fixed {
                return Some(fixed.clone());
            }
        }
        pending.extend(node.all_of.iter().rev());
    }
    None
}
