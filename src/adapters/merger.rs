//! Folding `allOf` (and multi-pick `anyOf`) members into a single node

use std::collections::HashSet;

use crate::domain::{GenerationError, SchemaGraph, SchemaId, SchemaNode, TypeDecl};

/// Merge the nodes behind `ids`, in order.
pub fn merge_ids(graph: &SchemaGraph, ids: &[SchemaId]) -> Result<SchemaNode, GenerationError> {
    let nodes: Vec<&SchemaNode> = ids.iter().map(|id| graph.node(*id)).collect();
    merge(graph, &nodes)
}

/// Merge sub-schemas into one node without `allOf`.
///
/// Declared types must be absent or identical. Properties merge by name and
/// `required` is unioned; every other keyword is taken from the last
/// sub-schema declaring it. A member's own `allOf` is flattened in front of
/// the member itself.
pub fn merge(graph: &SchemaGraph, sub_schemas: &[&SchemaNode]) -> Result<SchemaNode, GenerationError> {
    let mut flat: Vec<&SchemaNode> = Vec::new();
    let mut seen = HashSet::new();
    for node in sub_schemas {
        flatten(graph, node, &mut seen, &mut flat);
    }

    let mut merged = SchemaNode::default();
    for node in flat {
        absorb(&mut merged, node)?;
    }
    merged.all_of.clear();
    Ok(merged)
}

fn flatten<'g>(
    graph: &'g SchemaGraph,
    node: &'g SchemaNode,
    seen: &mut HashSet<SchemaId>,
    out: &mut Vec<&'g SchemaNode>,
) {
    for id in &node.all_of {
        // allOf chains that loop back on themselves add nothing new
        if seen.insert(*id) {
            flatten(graph, graph.node(*id), seen, out);
        }
    }
    out.push(node);
}

macro_rules! take_declared {
    ($into:ident, $from:ident, $($field:ident),+ $(,)?) => {
        $(
            if $from.$field.is_some() {
                $into.$field = $from.$field.clone();
            }
        )+
    };
}

fn absorb(merged: &mut SchemaNode, node: &SchemaNode) -> Result<(), GenerationError> {
    if let Some(incoming) = &node.schema_type {
        match &merged.schema_type {
            Some(existing) if existing != incoming => {
                return Err(GenerationError::IncompatibleCompositionTypes {
                    first: type_name(existing),
                    second: type_name(incoming),
                });
            }
            _ => merged.schema_type = Some(incoming.clone()),
        }
    }

    take_declared!(
        merged,
        node,
        format,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of,
        min_length,
        max_length,
        pattern,
        min_items,
        max_items,
        items,
        enum_values,
        const_value,
        example,
        default,
        nullable,
        generator,
        discriminator,
    );

    if let Some(properties) = &node.properties {
        let target = merged.properties.get_or_insert_with(Default::default);
        for (name, id) in properties {
            target.insert(name.clone(), *id);
        }
    }

    for name in &node.required {
        merged.required.insert(name.clone());
    }

    if !node.one_of.is_empty() {
        merged.one_of = node.one_of.clone();
    }
    if !node.any_of.is_empty() {
        merged.any_of = node.any_of.clone();
    }

    Ok(())
}

fn type_name(decl: &TypeDecl) -> String {
    decl.to_string()
}
