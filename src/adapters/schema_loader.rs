//! Schema document loading with local `$ref` resolution
//!
//! Builds a [`SchemaGraph`] arena out of a JSON/YAML document. Every distinct
//! `$ref` target is materialised exactly once, so recursive definitions end up
//! pointing back at the same [`SchemaId`].

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::domain::{
    Discriminator, ExclusiveBound, SchemaGraph, SchemaId, SchemaKind, SchemaNode, TypeDecl,
};

/// Errors that can occur while loading a schema document
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    /// `$ref` that is not a local `#/...` pointer
    #[error("Unsupported reference '{0}': only local '#/...' references are resolved")]
    UnsupportedReference(String),

    /// Local pointer that does not exist in the document
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Schema position that is not an object
    #[error("Invalid schema at '{pointer}': expected an object, found {found}")]
    InvalidSchema { pointer: String, found: String },

    #[error("Failed to read schema document: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Read a JSON or YAML document; the format is chosen by file extension.
pub fn load_document(path: &Path) -> Result<Value, SchemaLoadError> {
    let content = std::fs::read_to_string(path)?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(value)
}

impl SchemaGraph {
    /// Build a graph whose root is `document` itself.
    pub fn from_value(document: &Value) -> Result<Self, SchemaLoadError> {
        SchemaLoader::new(document).load("#")
    }

    /// Build a graph rooted at `pointer` (`#/components/schemas/User`) inside `document`.
    pub fn from_document(document: &Value, pointer: &str) -> Result<Self, SchemaLoadError> {
        SchemaLoader::new(document).load(pointer)
    }
}

/// Resolves schema values into graph nodes, memoising `$ref` targets.
pub struct SchemaLoader<'a> {
    document: &'a Value,
    graph: SchemaGraph,
    /// Ref pointer -> node already materialised for it
    resolved: HashMap<String, SchemaId>,
    /// Alias pointers currently being followed
    aliasing: HashSet<String>,
}

impl<'a> SchemaLoader<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            graph: SchemaGraph::new(),
            resolved: HashMap::new(),
            aliasing: HashSet::new(),
        }
    }

    /// Load the schema at `pointer` (`#` for the document root) as the graph root.
    pub fn load(mut self, pointer: &str) -> Result<SchemaGraph, SchemaLoadError> {
        let root = self.resolve_ref(pointer)?;
        self.graph.set_root(root);
        tracing::debug!(nodes = self.graph.len(), root = %pointer, "Loaded schema graph");
        Ok(self.graph)
    }

    fn lookup(&self, reference: &str) -> Result<&'a Value, SchemaLoadError> {
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| SchemaLoadError::UnsupportedReference(reference.to_string()))?;
        self.document
            .pointer(pointer)
            .ok_or_else(|| SchemaLoadError::UnresolvedReference(reference.to_string()))
    }

    /// Resolve a `$ref`, reusing the node when the target was seen before.
    fn resolve_ref(&mut self, reference: &str) -> Result<SchemaId, SchemaLoadError> {
        if let Some(id) = self.resolved.get(reference) {
            return Ok(*id);
        }

        let target = self.lookup(reference)?;

        // An alias shares its target's id, even while that target is being built
        if let Some(inner) = target.get("$ref").and_then(|v| v.as_str()) {
            if !self.aliasing.insert(reference.to_string()) {
                tracing::warn!("Reference cycle through '{}' resolved to an untyped schema", reference);
                let id = self.graph.insert(SchemaNode::default());
                self.resolved.insert(reference.to_string(), id);
                return Ok(id);
            }
            let id = self.resolve_ref(inner)?;
            self.aliasing.remove(reference);
            self.resolved.insert(reference.to_string(), id);
            return Ok(id);
        }

        // Register before descending so that a reference back to this target
        // from inside it finds the reserved id.
        let id = self.graph.insert(SchemaNode::default());
        self.resolved.insert(reference.to_string(), id);

        let node = self.build_node(target, reference)?;
        self.graph.replace(id, node);
        Ok(id)
    }

    /// Resolve an inline schema value into a node id.
    fn resolve(&mut self, schema: &'a Value, pointer: &str) -> Result<SchemaId, SchemaLoadError> {
        if let Some(reference) = schema.get("$ref").and_then(|v| v.as_str()) {
            return self.resolve_ref(reference);
        }

        let id = self.graph.insert(SchemaNode::default());
        let node = self.build_node(schema, pointer)?;
        self.graph.replace(id, node);
        Ok(id)
    }

    fn build_node(&mut self, schema: &'a Value, pointer: &str) -> Result<SchemaNode, SchemaLoadError> {
        let obj = match schema {
            Value::Object(obj) => obj,
            // `true` / `{}` style schemas accept anything
            Value::Bool(true) => return Ok(SchemaNode::default()),
            other => {
                return Err(SchemaLoadError::InvalidSchema {
                    pointer: pointer.to_string(),
                    found: value_kind(other).to_string(),
                })
            }
        };

        let mut node = extract_common_props(obj);

        if let Some(items) = obj.get("items") {
            node.items = Some(self.resolve(items, &format!("{}/items", pointer))?);
        }

        if let Some(props) = obj.get("properties").and_then(|v| v.as_object()) {
            let mut properties = IndexMap::with_capacity(props.len());
            for (name, prop_schema) in props {
                let child_pointer = format!("{}/properties/{}", pointer, escape_pointer(name));
                properties.insert(name.clone(), self.resolve(prop_schema, &child_pointer)?);
            }
            node.properties = Some(properties);
        }

        node.all_of = self.resolve_list(obj, "allOf", pointer)?;
        node.one_of = self.resolve_list(obj, "oneOf", pointer)?;
        node.any_of = self.resolve_list(obj, "anyOf", pointer)?;

        if let Some(disc) = obj.get("discriminator").and_then(|v| v.as_object()) {
            node.discriminator = self.resolve_discriminator(disc)?;
        }

        Ok(node)
    }

    fn resolve_list(
        &mut self,
        obj: &'a Map<String, Value>,
        keyword: &str,
        pointer: &str,
    ) -> Result<Vec<SchemaId>, SchemaLoadError> {
        let Some(list) = obj.get(keyword).and_then(|v| v.as_array()) else {
            return Ok(Vec::new());
        };
        list.iter()
            .enumerate()
            .map(|(i, sub)| self.resolve(sub, &format!("{}/{}/{}", pointer, keyword, i)))
            .collect()
    }

    fn resolve_discriminator(
        &mut self,
        disc: &'a Map<String, Value>,
    ) -> Result<Option<Discriminator>, SchemaLoadError> {
        let Some(property_name) = disc.get("propertyName").and_then(|v| v.as_str()) else {
            return Ok(None);
        };

        let mut mapping = IndexMap::new();
        if let Some(entries) = disc.get("mapping").and_then(|v| v.as_object()) {
            for (tag, target) in entries {
                let Some(target) = target.as_str() else {
                    continue;
                };
                // Bare names refer to components
                let reference = if target.starts_with('#') {
                    target.to_string()
                } else {
                    format!("#/components/schemas/{}", escape_pointer(target))
                };
                match self.resolve_ref(&reference) {
                    Ok(id) => {
                        mapping.insert(tag.clone(), id);
                    }
                    Err(e) => {
                        tracing::warn!("Dropping discriminator mapping '{}' -> '{}': {}", tag, target, e);
                    }
                }
            }
        }

        Ok(Some(Discriminator {
            property_name: property_name.to_string(),
            mapping,
        }))
    }
}

/// Extract the scalar keywords of a schema object.
fn extract_common_props(obj: &Map<String, Value>) -> SchemaNode {
    // `x-faker: "person.firstName"`, or the object form `{ "method": ... }`
    let generator = obj
        .get("x-faker")
        .or_else(|| obj.get("x-fake-strategy"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o
                .get("method")
                .or_else(|| o.get("type"))
                .and_then(|m| m.as_str())
                .map(String::from),
            _ => None,
        });

    let example = obj.get("example").cloned().or_else(|| {
        obj.get("examples")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first().cloned())
    });

    SchemaNode {
        schema_type: obj.get("type").and_then(parse_type),
        format: obj.get("format").and_then(|v| v.as_str()).map(String::from),
        minimum: obj.get("minimum").and_then(|v| v.as_f64()),
        maximum: obj.get("maximum").and_then(|v| v.as_f64()),
        exclusive_minimum: obj.get("exclusiveMinimum").and_then(parse_exclusive),
        exclusive_maximum: obj.get("exclusiveMaximum").and_then(parse_exclusive),
        multiple_of: obj
            .get("multipleOf")
            .and_then(|v| v.as_f64())
            .filter(|m| *m > 0.0),
        min_length: obj.get("minLength").and_then(as_usize),
        max_length: obj.get("maxLength").and_then(as_usize),
        pattern: obj.get("pattern").and_then(|v| v.as_str()).map(String::from),
        min_items: obj.get("minItems").and_then(as_usize),
        max_items: obj.get("maxItems").and_then(as_usize),
        items: None,
        properties: None,
        required: obj
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect::<IndexSet<_>>()
            })
            .unwrap_or_default(),
        enum_values: obj.get("enum").and_then(|v| v.as_array()).cloned(),
        const_value: obj.get("const").cloned(),
        example,
        default: obj.get("default").cloned(),
        nullable: obj.get("nullable").and_then(|v| v.as_bool()),
        generator,
        all_of: Vec::new(),
        one_of: Vec::new(),
        any_of: Vec::new(),
        discriminator: None,
    }
}

fn parse_type(value: &Value) -> Option<TypeDecl> {
    match value {
        Value::String(name) => Some(TypeDecl::Single(SchemaKind::from_name(name))),
        Value::Array(names) => {
            let kinds: Vec<SchemaKind> = names
                .iter()
                .filter_map(|v| v.as_str())
                .map(SchemaKind::from_name)
                .collect();
            if kinds.is_empty() {
                None
            } else {
                Some(TypeDecl::Union(kinds))
            }
        }
        _ => None,
    }
}

fn parse_exclusive(value: &Value) -> Option<ExclusiveBound> {
    match value {
        Value::Bool(flag) => Some(ExclusiveBound::Flag(*flag)),
        Value::Number(n) => n.as_f64().map(ExclusiveBound::Value),
        _ => None,
    }
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().map(|n| n as usize)
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_simple_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer", "minimum": 0 }
            },
            "required": ["name"]
        });

        let graph = SchemaGraph::from_value(&schema).unwrap();
        let root = graph.node(graph.root());
        assert_eq!(root.kind(), SchemaKind::Object);
        assert!(root.is_required("name"));
        assert!(!root.is_required("age"));

        let props = root.properties.as_ref().unwrap();
        let names: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(graph.node(props["age"]).minimum, Some(0.0));
    }

    #[test]
    fn test_recursive_ref_shares_identity() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "value": { "type": "integer" },
                            "next": { "$ref": "#/components/schemas/Node" }
                        }
                    }
                }
            }
        });

        let graph = SchemaGraph::from_document(&doc, "#/components/schemas/Node").unwrap();
        let root_id = graph.root();
        let next = graph.node(root_id).properties.as_ref().unwrap()["next"];
        assert_eq!(next, root_id);
    }

    #[test]
    fn test_alias_into_cycle_shares_identity() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "required": ["child"],
                        "properties": {
                            "child": { "$ref": "#/components/schemas/Alias" }
                        }
                    },
                    "Alias": { "$ref": "#/components/schemas/Node" }
                }
            }
        });

        let graph = SchemaGraph::from_document(&doc, "#/components/schemas/Node").unwrap();
        let root_id = graph.root();
        let child = graph.node(root_id).properties.as_ref().unwrap()["child"];
        assert_eq!(child, root_id);

        let via_alias = SchemaGraph::from_document(&doc, "#/components/schemas/Alias").unwrap();
        assert_eq!(via_alias.node(via_alias.root()).kind(), SchemaKind::Object);
    }

    #[test]
    fn test_alias_cycle_degrades_to_untyped() {
        let doc = json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/A" }
            }
        });

        let graph = SchemaGraph::from_document(&doc, "#/definitions/A").unwrap();
        assert_eq!(graph.node(graph.root()).kind(), SchemaKind::Unknown);
    }

    #[test]
    fn test_definitions_and_defs_refs() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "$ref": "#/definitions/A" },
                "b": { "$ref": "#/$defs/B" }
            },
            "definitions": { "A": { "type": "string" } },
            "$defs": { "B": { "type": "boolean" } }
        });

        let graph = SchemaGraph::from_value(&schema).unwrap();
        let props = graph.node(graph.root()).properties.clone().unwrap();
        assert_eq!(graph.node(props["a"]).kind(), SchemaKind::String);
        assert_eq!(graph.node(props["b"]).kind(), SchemaKind::Boolean);
    }

    #[test]
    fn test_discriminator_mapping_resolves_bare_names() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Pet": {
                        "oneOf": [
                            { "$ref": "#/components/schemas/Cat" },
                            { "$ref": "#/components/schemas/Dog" }
                        ],
                        "discriminator": {
                            "propertyName": "petType",
                            "mapping": {
                                "cat": "Cat",
                                "dog": "#/components/schemas/Dog",
                                "bird": "#/components/schemas/Bird"
                            }
                        }
                    },
                    "Cat": { "type": "object", "properties": { "petType": { "type": "string" } } },
                    "Dog": { "type": "object", "properties": { "petType": { "type": "string" } } }
                }
            }
        });

        let graph = SchemaGraph::from_document(&doc, "#/components/schemas/Pet").unwrap();
        let pet = graph.node(graph.root());
        let disc = pet.discriminator.as_ref().unwrap();
        assert_eq!(disc.property_name, "petType");
        // "bird" points nowhere and is dropped
        assert_eq!(disc.mapping.len(), 2);
        assert_eq!(disc.mapping["cat"], pet.one_of[0]);
        assert_eq!(disc.mapping["dog"], pet.one_of[1]);
    }

    #[test]
    fn test_extension_and_examples() {
        let schema = json!({
            "type": ["string", "null"],
            "x-faker": "person.firstName",
            "examples": ["Ada", "Grace"],
            "exclusiveMinimum": true,
            "exclusiveMaximum": 10
        });

        let graph = SchemaGraph::from_value(&schema).unwrap();
        let node = graph.node(graph.root());
        assert_eq!(node.generator.as_deref(), Some("person.firstName"));
        assert_eq!(node.example, Some(json!("Ada")));
        assert!(node.is_nullable());
        assert_eq!(node.exclusive_minimum, Some(ExclusiveBound::Flag(true)));
        assert_eq!(node.exclusive_maximum, Some(ExclusiveBound::Value(10.0)));
    }

    #[test]
    fn test_unresolved_and_external_refs_fail() {
        let missing = json!({ "properties": { "a": { "$ref": "#/definitions/Missing" } } });
        assert!(matches!(
            SchemaGraph::from_value(&missing),
            Err(SchemaLoadError::UnresolvedReference(_))
        ));

        let external = json!({ "properties": { "a": { "$ref": "other.yaml#/A" } } });
        assert!(matches!(
            SchemaGraph::from_value(&external),
            Err(SchemaLoadError::UnsupportedReference(_))
        ));
    }

    #[test]
    fn test_load_yaml_document() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("schema.yaml");
        std::fs::write(
            &path,
            "type: object\nproperties:\n  id:\n    type: string\n    format: uuid\n",
        )?;

        let doc = load_document(&path)?;
        let graph = SchemaGraph::from_value(&doc)?;
        let id = graph.node(graph.root()).properties.as_ref().unwrap()["id"];
        assert_eq!(graph.node(id).format.as_deref(), Some("uuid"));
        Ok(())
    }
}
