//! Recursive value generation over a [`SchemaGraph`]
//!
//! Each node is resolved through a fixed priority chain, first match wins:
//!
//! 1. an override bound to the exact current path
//! 2. a seeded coin flip to `null` for nullable nodes
//! 3. `example`, then `default` (unless bypassed)
//! 4. the node's named generator (`x-faker`)
//! 5. a smart default chosen by property name
//! 6. composition (`allOf` merge, `oneOf` pick, `anyOf` subset)
//! 7. structural generation from the node's kind and constraints

use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::composition;
use super::fake_provider::FakeProvider;
use super::merger;
use super::overrides::{join_path, normalize_path, OverrideStore};
use super::smart_defaults;
use super::structural;
use crate::domain::{
    GenerationError, GenerationOptions, LengthRange, SchemaGraph, SchemaId, SchemaKind, SchemaNode,
};

/// Upper bound for arrays that declare no `maxItems`.
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// Wildcard marker scoping an array-length key to every element of an array.
const WILDCARD: &str = "[*]";

// ============================================================================
// Context
// ============================================================================

/// Per-call frame. Every recursive step derives a fresh frame, so sibling
/// properties and array items never observe each other's visited nodes.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub depth: usize,
    /// Override path of the value being generated; empty at the root.
    pub path: String,
    /// Name of the property being generated, cleared for array items.
    pub property_name: Option<String>,
    pub visited: HashSet<SchemaId>,
    /// Array-length overrides as seen from this frame (wildcards already
    /// de-scoped by enclosing arrays).
    pub array_lengths: IndexMap<String, LengthRange>,
}

impl GenerationContext {
    pub fn root(id: SchemaId, options: &GenerationOptions) -> Self {
        let array_lengths = options
            .array_lengths
            .iter()
            .map(|(key, range)| (normalize_path(key), *range))
            .collect();

        Self {
            depth: 0,
            path: String::new(),
            property_name: None,
            visited: HashSet::from([id]),
            array_lengths,
        }
    }

    fn with_visited(&self, ids: &[SchemaId]) -> HashSet<SchemaId> {
        let mut visited = self.visited.clone();
        visited.extend(ids.iter().copied());
        visited
    }

    fn property(&self, name: &str, path: String, id: SchemaId) -> Self {
        Self {
            depth: self.depth + 1,
            path,
            property_name: Some(name.to_string()),
            visited: self.with_visited(&[id]),
            array_lengths: self.array_lengths.clone(),
        }
    }

    fn item(&self, index: usize, id: Option<SchemaId>, array_lengths: IndexMap<String, LengthRange>) -> Self {
        let visited = match id {
            Some(id) => self.with_visited(&[id]),
            None => self.visited.clone(),
        };
        Self {
            depth: self.depth + 1,
            path: join_path(&self.path, &index.to_string()),
            property_name: None,
            visited,
            array_lengths,
        }
    }

    /// Same path and name, one level deeper, with the branches marked visited.
    fn branch(&self, ids: &[SchemaId]) -> Self {
        Self {
            depth: self.depth + 1,
            path: self.path.clone(),
            property_name: self.property_name.clone(),
            visited: self.with_visited(ids),
            array_lengths: self.array_lengths.clone(),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generation state for one top-level call.
pub struct ValueGenerator<'g> {
    graph: &'g SchemaGraph,
    options: &'g GenerationOptions,
    overrides: OverrideStore,
    provider: FakeProvider,
}

impl<'g> ValueGenerator<'g> {
    pub fn new(graph: &'g SchemaGraph, options: &'g GenerationOptions) -> Self {
        Self {
            graph,
            options,
            overrides: OverrideStore::new(&options.overrides),
            provider: FakeProvider::new(options.seed),
        }
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    /// Generate from the graph's root node.
    pub fn generate_root(&mut self) -> Result<Value, GenerationError> {
        self.generate_from(self.graph.root())
    }

    /// Generate from an arbitrary node, treated as the root of the value.
    pub fn generate_from(&mut self, id: SchemaId) -> Result<Value, GenerationError> {
        let graph = self.graph;
        let ctx = GenerationContext::root(id, self.options);
        self.generate(graph.node(id), &ctx)
    }

    /// Resolve one node through the priority chain.
    pub fn generate(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Result<Value, GenerationError> {
        trace!("Generating '{}' at depth {}", ctx.path, ctx.depth);

        if let Some(value) = self.overrides.get(&ctx.path) {
            return Ok(value.clone());
        }

        // Overrides below this path need a container to land in
        if node.is_nullable() && !self.has_overrides_within(&ctx.path) && self.provider.coin() {
            return Ok(Value::Null);
        }

        if !self.options.bypass_examples {
            if let Some(value) = node.example.as_ref().or(node.default.as_ref()) {
                return Ok(value.clone());
            }
        }

        if let Some(method) = &node.generator {
            return self.provider.invoke(method);
        }

        if let Some(value) = self.smart_default(node, ctx) {
            return Ok(value);
        }

        if !node.all_of.is_empty() {
            let mut merged = merger::merge(self.graph, &[node])?;
            // This node's own nullability has already been decided
            if node.nullable == Some(true) {
                merged.nullable = None;
            }
            return self.generate(&merged, ctx);
        }
        if !node.one_of.is_empty() {
            return self.generate_one_of(node, ctx);
        }
        if !node.any_of.is_empty() {
            return self.generate_any_of(node, ctx);
        }

        match node.kind() {
            SchemaKind::Object => self.generate_object(node, ctx),
            SchemaKind::Array => self.generate_array(node, ctx),
            SchemaKind::Null
            | SchemaKind::Boolean
            | SchemaKind::Number
            | SchemaKind::Integer
            | SchemaKind::String
            | SchemaKind::Unknown => Ok(structural::generate(node, self.provider.rng())),
        }
    }

    fn has_overrides_within(&self, path: &str) -> bool {
        if path.is_empty() {
            !self.overrides.is_empty()
        } else {
            self.overrides.has_at_or_below(path)
        }
    }

    // ------------------------------------------------------------------------
    // Smart defaults
    // ------------------------------------------------------------------------

    fn smart_default(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Option<Value> {
        let name = ctx.property_name.as_deref()?;

        // Shapes stricter than a name heuristic
        if node.enum_values.is_some()
            || node.const_value.is_some()
            || node.properties.is_some()
            || node.pattern.is_some()
            || node.has_composition()
        {
            return None;
        }

        let hit = smart_defaults::lookup_for(name, node)?;
        match self.provider.invoke(hit.method) {
            Ok(value) => Some(fit_to_schema(value, node)),
            Err(e) => {
                debug!("Smart default for '{}' failed: {}", name, e);
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------------

    fn generate_one_of(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Result<Value, GenerationError> {
        let graph = self.graph;
        let Some(mut choice) = composition::select_one(graph, node, self.provider.rng()) else {
            return Ok(Value::Null);
        };

        if self.is_exhausted(choice.branch, ctx) {
            match node.one_of.iter().find(|id| !ctx.visited.contains(*id)) {
                Some(open) => {
                    choice.branch = *open;
                    choice.discriminator = None;
                }
                None => return Ok(self.stub(node, &ctx.path)),
            }
        }

        let branch_ctx = ctx.branch(&[choice.branch]);
        let mut value = self.generate(graph.node(choice.branch), &branch_ctx)?;
        composition::stamp_discriminator(&mut value, &choice);
        Ok(value)
    }

    fn generate_any_of(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Result<Value, GenerationError> {
        let graph = self.graph;
        let selected = composition::select_any(node, self.provider.rng());

        if selected.iter().all(|id| self.is_exhausted(*id, ctx)) {
            return Ok(self.stub(node, &ctx.path));
        }

        let branch_ctx = ctx.branch(&selected);
        if let [single] = selected.as_slice() {
            return self.generate(graph.node(*single), &branch_ctx);
        }

        let merged = merger::merge_ids(graph, &selected)?;
        self.generate(&merged, &branch_ctx)
    }

    // ------------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------------

    fn generate_object(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Result<Value, GenerationError> {
        let graph = self.graph;
        let mut result = Map::new();

        if let Some(properties) = &node.properties {
            for (name, child_id) in properties {
                let child_path = join_path(&ctx.path, name);
                let required = node.is_required(name);

                let include =
                    required || self.overrides.has_at_or_below(&child_path) || self.provider.coin();
                if !include {
                    continue;
                }

                if let Some(value) = self.overrides.get(&child_path) {
                    result.insert(name.clone(), value.clone());
                    continue;
                }

                let child = graph.node(*child_id);
                if self.is_exhausted(*child_id, ctx) {
                    if required {
                        debug!("Circular reference at '{}' truncated to a stub", child_path);
                        result.insert(name.clone(), self.stub(child, &child_path));
                    }
                    continue;
                }

                let child_ctx = ctx.property(name, child_path, *child_id);
                let value = self.generate(child, &child_ctx)?;
                result.insert(name.clone(), value);
            }
        }

        for name in &node.required {
            if !result.contains_key(name) {
                let declared = node
                    .properties
                    .as_ref()
                    .map_or(false, |properties| properties.contains_key(name));
                if !declared {
                    result.insert(name.clone(), Value::Null);
                }
            }
        }

        for (segment, value) in self.overrides.direct_children(&ctx.path) {
            result.insert(segment.to_string(), value.clone());
        }

        Ok(Value::Object(result))
    }

    // ------------------------------------------------------------------------
    // Arrays
    // ------------------------------------------------------------------------

    fn generate_array(&mut self, node: &SchemaNode, ctx: &GenerationContext) -> Result<Value, GenerationError> {
        let graph = self.graph;
        let untyped = SchemaNode::default();
        let item_node = match node.items {
            Some(id) => {
                if self.is_exhausted(id, ctx) {
                    debug!("Circular array items at '{}' truncated to []", ctx.path);
                    return Ok(Value::Array(Vec::new()));
                }
                graph.node(id)
            }
            None => &untyped,
        };

        let (min, max) = length_range(node, ctx);
        let count = if min == max {
            min
        } else {
            self.provider.rng().gen_range(min..=max)
        };

        let item_lengths = descope_array_lengths(ctx);
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let item_ctx = ctx.item(index, node.items, item_lengths.clone());
            items.push(self.generate(item_node, &item_ctx)?);
        }

        Ok(Value::Array(items))
    }

    // ------------------------------------------------------------------------
    // Cycle containment
    // ------------------------------------------------------------------------

    /// Whether descending into `id` would re-enter a node past the depth limit.
    fn is_exhausted(&self, id: SchemaId, ctx: &GenerationContext) -> bool {
        ctx.visited.contains(&id) && ctx.depth >= self.options.max_depth
    }

    /// Minimal value for a truncated node at `path`.
    fn stub(&self, node: &SchemaNode, path: &str) -> Value {
        if let Some(value) = self.overrides.get(path) {
            return value.clone();
        }
        if node.is_nullable() {
            Value::Null
        } else {
            structural::empty_value(node.kind())
        }
    }
}

/// Adapt a provider value to the declared type: numbers are coerced and
/// clamped, structured values become JSON text for string schemas.
fn fit_to_schema(value: Value, node: &SchemaNode) -> Value {
    match (node.kind(), value) {
        (SchemaKind::Number | SchemaKind::Integer, Value::Number(n)) => match n.as_f64() {
            Some(f) => structural::conform_number(f, node),
            None => Value::Number(n),
        },
        (SchemaKind::String, structured @ (Value::Object(_) | Value::Array(_))) => {
            Value::String(structured.to_string())
        }
        (_, value) => value,
    }
}

/// Effective `[min, max]` item count.
///
/// An override matched by property name (else by path) narrows the declared
/// bounds; equal override bounds pin the count outright.
fn length_range(node: &SchemaNode, ctx: &GenerationContext) -> LengthRange {
    let by_name = ctx
        .property_name
        .as_deref()
        .and_then(|name| ctx.array_lengths.get(name));
    let by_path = || {
        if ctx.path.is_empty() {
            None
        } else {
            ctx.array_lengths.get(&ctx.path)
        }
    };

    let (low, high) = match by_name.or_else(by_path).copied() {
        Some((min, max)) if min == max => return (min, max),
        Some((min, max)) => (
            node.min_items.map_or(min, |declared| declared.max(min)),
            node.max_items.map_or(max, |declared| declared.min(max)),
        ),
        None => match (node.min_items, node.max_items) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, min.max(DEFAULT_MAX_ITEMS)),
            (None, Some(max)) => (0, max),
            (None, None) => (0, DEFAULT_MAX_ITEMS),
        },
    };

    if high < low {
        (low, low)
    } else {
        (low, high)
    }
}

/// Array-length overrides as seen by this array's items.
///
/// Keys of the form `<scope>[*].rest` lose their prefix, where the scope is the
/// property name when known and the current path otherwise. Rewritten keys win
/// over plain keys they collide with; everything else passes through.
fn descope_array_lengths(ctx: &GenerationContext) -> IndexMap<String, LengthRange> {
    let scope = ctx.property_name.as_deref().unwrap_or(&ctx.path);
    if scope.is_empty() {
        return ctx.array_lengths.clone();
    }
    let prefix = format!("{}{}.", scope, WILDCARD);

    let mut descoped: IndexMap<String, LengthRange> = ctx
        .array_lengths
        .iter()
        .filter(|(key, _)| !key.starts_with(&prefix))
        .map(|(key, range)| (key.clone(), *range))
        .collect();
    for (key, range) in &ctx.array_lengths {
        if let Some(rest) = key.strip_prefix(&prefix) {
            descoped.insert(rest.to_string(), *range);
        }
    }
    descoped
}
