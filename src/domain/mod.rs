//! Schema graph, node and option types shared by the generation engine.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

pub mod error;

pub use error::{GenerationError, GenerationErrorKind};

/// Default bound on recursive expansion of self-referential schemas.
pub const DEFAULT_MAX_DEPTH: usize = 3;

// ============================================================================
// Node identity
// ============================================================================

/// Identity of a node inside a [`SchemaGraph`].
///
/// Two `$ref`s pointing at the same definition resolve to the same id, which is
/// what makes a recursive definition recognisable as a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Schema kinds
// ============================================================================

/// Closed set of value kinds a schema node can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Boolean,
    Number,
    Integer,
    String,
    Array,
    Object,
    Unknown,
}

impl SchemaKind {
    /// Parse a JSON Schema `type` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "null" => SchemaKind::Null,
            "boolean" => SchemaKind::Boolean,
            "number" => SchemaKind::Number,
            "integer" => SchemaKind::Integer,
            "string" => SchemaKind::String,
            "array" => SchemaKind::Array,
            "object" => SchemaKind::Object,
            _ => SchemaKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::String => "string",
            SchemaKind::Array => "array",
            SchemaKind::Object => "object",
            SchemaKind::Unknown => "unknown",
        }
    }

    /// Effective kind of a node.
    ///
    /// A single declared kind is used as-is, a kind list yields its first
    /// non-null member, and an undeclared type is inferred from the shape
    /// keywords (`properties` before `items`).
    pub fn resolve(node: &SchemaNode) -> Self {
        match &node.schema_type {
            Some(TypeDecl::Single(kind)) => *kind,
            Some(TypeDecl::Union(kinds)) => kinds
                .iter()
                .copied()
                .find(|k| *k != SchemaKind::Null)
                .unwrap_or(SchemaKind::Null),
            None if node.properties.is_some() => SchemaKind::Object,
            None if node.items.is_some() => SchemaKind::Array,
            None => SchemaKind::Unknown,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared `type` keyword: one kind name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    Single(SchemaKind),
    Union(Vec<SchemaKind>),
}

impl TypeDecl {
    pub fn contains_null(&self) -> bool {
        match self {
            TypeDecl::Single(kind) => *kind == SchemaKind::Null,
            TypeDecl::Union(kinds) => kinds.contains(&SchemaKind::Null),
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Single(kind) => write!(f, "{}", kind),
            TypeDecl::Union(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// `exclusiveMinimum` / `exclusiveMaximum` in either OpenAPI 3.0 (flag) or
/// 3.1 (numeric bound) form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(f64),
}

/// Discriminator attached to a `oneOf`.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    pub property_name: String,
    /// Tag value -> node the tag selects.
    pub mapping: IndexMap<String, SchemaId>,
}

// ============================================================================
// Schema node
// ============================================================================

/// A single schema node with every `$ref` already resolved to a [`SchemaId`].
///
/// Every keyword is optional so that "declared" and "not declared" stay
/// distinguishable, which the merger relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub schema_type: Option<TypeDecl>,
    pub format: Option<String>,

    // Numbers
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<ExclusiveBound>,
    pub exclusive_maximum: Option<ExclusiveBound>,
    pub multiple_of: Option<f64>,

    // Strings
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,

    // Arrays
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub items: Option<SchemaId>,

    // Objects
    pub properties: Option<IndexMap<String, SchemaId>>,
    pub required: IndexSet<String>,

    // Values
    pub enum_values: Option<Vec<Value>>,
    pub const_value: Option<Value>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub nullable: Option<bool>,

    /// Named generator method (`x-faker`).
    pub generator: Option<String>,

    // Composition
    pub all_of: Vec<SchemaId>,
    pub one_of: Vec<SchemaId>,
    pub any_of: Vec<SchemaId>,
    pub discriminator: Option<Discriminator>,
}

impl SchemaNode {
    /// Legacy `nullable: true` or a type list containing `null`.
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
            || self
                .schema_type
                .as_ref()
                .map(TypeDecl::contains_null)
                .unwrap_or(false)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub fn has_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    pub fn kind(&self) -> SchemaKind {
        SchemaKind::resolve(self)
    }
}

// ============================================================================
// Schema graph
// ============================================================================

/// Arena owning every node of one resolved schema document.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    root: Option<SchemaId>,
}

fn untyped_node() -> &'static SchemaNode {
    static UNTYPED: OnceLock<SchemaNode> = OnceLock::new();
    UNTYPED.get_or_init(SchemaNode::default)
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id. The first inserted node becomes the root
    /// unless [`SchemaGraph::set_root`] says otherwise.
    pub fn insert(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len());
        self.nodes.push(node);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Replace a node in place; used to close cycles after reserving an id.
    pub fn replace(&mut self, id: SchemaId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }

    pub fn set_root(&mut self, id: SchemaId) {
        self.root = Some(id);
    }

    /// Root node id; `SchemaId(0)` for an empty graph.
    pub fn root(&self) -> SchemaId {
        self.root.unwrap_or(SchemaId(0))
    }

    /// Node for `id`. Ids outside the arena, such as the root of an empty
    /// graph, read as an untyped schema.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        self.nodes.get(id.0).unwrap_or_else(|| untyped_node())
    }

    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Generation options
// ============================================================================

/// Inclusive `[min, max]` bounds for an array-length override.
pub type LengthRange = (usize, usize);

/// Caller-facing knobs for one generation run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GenerationOptions {
    /// Seed for the random source; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Skip `example`/`default` values.
    #[serde(default)]
    pub bypass_examples: bool,
    /// Override path (`user.address.city`, `items.0.id`) -> literal value.
    #[serde(default)]
    pub overrides: IndexMap<String, Value>,
    /// Array path or property name (optionally `parent[*].child`) -> `[min, max]`.
    #[serde(default)]
    pub array_lengths: IndexMap<String, LengthRange>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            seed: None,
            bypass_examples: false,
            overrides: IndexMap::new(),
            array_lengths: IndexMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GenerationOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_override(mut self, path: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(path.into(), value);
        self
    }

    pub fn with_array_length(mut self, path: impl Into<String>, min: usize, max: usize) -> Self {
        self.array_lengths.insert(path.into(), (min, max));
        self
    }
}
