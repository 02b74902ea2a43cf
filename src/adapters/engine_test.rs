use super::engine::{GenerationContext, ValueGenerator, DEFAULT_MAX_ITEMS};
use super::overrides::get_by_path;
use crate::domain::{GenerationErrorKind, GenerationOptions, SchemaGraph};
use serde_json::{json, Value};

fn graph(schema: Value) -> SchemaGraph {
    SchemaGraph::from_value(&schema).unwrap()
}

fn run(graph: &SchemaGraph, options: &GenerationOptions) -> Value {
    ValueGenerator::new(graph, options).generate_root().unwrap()
}

fn run_seeded(schema: Value, seed: u64) -> Value {
    run(&graph(schema), &GenerationOptions::seeded(seed))
}

fn user_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "name", "email", "tags"],
        "properties": {
            "id": { "type": "integer", "minimum": 1, "maximum": 9999 },
            "name": { "type": "string" },
            "email": { "type": "string", "format": "email" },
            "nickname": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 3 },
            "address": {
                "type": "object",
                "required": ["city"],
                "properties": {
                    "city": { "type": "string" },
                    "zip": { "type": "string", "pattern": "^[0-9]{5}$" }
                }
            }
        }
    })
}

// ============================================================================
// Determinism and required properties
// ============================================================================

#[test]
fn test_same_seed_same_value() {
    let schema = graph(user_schema());
    for seed in [0, 7, 42, 1234] {
        let options = GenerationOptions::seeded(seed);
        assert_eq!(run(&schema, &options), run(&schema, &options));
    }
}

#[test]
fn test_required_properties_always_present() {
    let schema = graph(json!({
        "type": "object",
        "required": ["id", "status", "undeclared"],
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "status": { "type": "string", "enum": ["active", "inactive"], "nullable": true },
            "notes": { "type": "string" }
        }
    }));

    for seed in 0..40 {
        let value = run(&schema, &GenerationOptions::seeded(seed));
        let object = value.as_object().unwrap();
        assert!(object.contains_key("id"));
        assert!(object.contains_key("status"));
        assert_eq!(object.get("undeclared"), Some(&Value::Null));
    }
}

#[test]
fn test_optional_properties_are_sometimes_omitted() {
    let schema = graph(user_schema());
    let mut with_nickname = 0;
    for seed in 0..40 {
        let value = run(&schema, &GenerationOptions::seeded(seed));
        if value.get("nickname").is_some() {
            with_nickname += 1;
        }
    }
    assert!(with_nickname > 0 && with_nickname < 40);
}

#[test]
fn test_property_order_follows_declaration() {
    let schema = graph(json!({
        "type": "object",
        "required": ["zeta", "alpha", "mid"],
        "properties": {
            "zeta": { "type": "boolean" },
            "alpha": { "type": "boolean" },
            "mid": { "type": "boolean" }
        }
    }));
    let value = run(&schema, &GenerationOptions::seeded(1));
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

// ============================================================================
// Priority chain
// ============================================================================

#[test]
fn test_nullable_yields_both_outcomes() {
    for schema in [
        json!({ "type": "string", "nullable": true }),
        json!({ "type": ["string", "null"] }),
    ] {
        let schema = graph(schema);
        let (mut nulls, mut strings) = (0, 0);
        for seed in 0..40 {
            match run(&schema, &GenerationOptions::seeded(seed)) {
                Value::Null => nulls += 1,
                Value::String(_) => strings += 1,
                other => panic!("unexpected value {}", other),
            }
        }
        assert!(nulls > 0, "never null");
        assert!(strings > 0, "never a string");
    }
}

#[test]
fn test_null_type_generates_null() {
    assert_eq!(run_seeded(json!({ "type": "null" }), 3), Value::Null);
}

#[test]
fn test_example_then_default_unless_bypassed() {
    let schema = graph(json!({
        "type": "string",
        "example": "example-value-from-schema",
        "default": "default-value-from-schema"
    }));
    assert_eq!(
        run(&schema, &GenerationOptions::seeded(1)),
        json!("example-value-from-schema")
    );

    let bypass = GenerationOptions {
        bypass_examples: true,
        ..GenerationOptions::seeded(1)
    };
    let value = run(&schema, &bypass);
    assert!(value.is_string());
    assert_ne!(value, json!("example-value-from-schema"));
    assert_ne!(value, json!("default-value-from-schema"));

    let only_default = graph(json!({ "type": "integer", "default": 7 }));
    assert_eq!(run(&only_default, &GenerationOptions::seeded(1)), json!(7));
}

#[test]
fn test_example_wins_over_named_generator() {
    let schema = graph(json!({
        "type": "string",
        "example": "fixed@example.com",
        "x-faker": "person.firstName"
    }));
    assert_eq!(run(&schema, &GenerationOptions::seeded(5)), json!("fixed@example.com"));
}

#[test]
fn test_named_generator_is_invoked() {
    let value = run_seeded(json!({ "type": "string", "x-faker": "internet.email" }), 9);
    assert!(value.as_str().unwrap().contains('@'));

    let value = run_seeded(json!({ "x-fake-strategy": "string.uuid" }), 9);
    assert!(uuid::Uuid::parse_str(value.as_str().unwrap()).is_ok());
}

#[test]
fn test_unresolvable_named_generator_is_an_error() {
    let schema = graph(json!({
        "type": "object",
        "required": ["broken"],
        "properties": {
            "broken": { "type": "string", "x-faker": "person.telepathy" }
        }
    }));
    let options = GenerationOptions::seeded(1);
    let err = ValueGenerator::new(&schema, &options)
        .generate_root()
        .unwrap_err();
    assert_eq!(err.kind(), GenerationErrorKind::UnresolvableGeneratorPath);
    assert!(err.to_string().contains("person.telepathy"));
}

#[test]
fn test_smart_defaults_by_property_name() {
    let schema = graph(json!({
        "type": "object",
        "required": ["email", "age", "coordinates", "firstName", "is_active"],
        "properties": {
            "email": { "type": "string" },
            "age": { "type": "integer", "minimum": 30, "maximum": 40 },
            "coordinates": { "type": "string" },
            "firstName": { "type": "integer", "minimum": 1, "maximum": 3 },
            "is_active": {}
        }
    }));

    for seed in 0..20 {
        let value = run(&schema, &GenerationOptions::seeded(seed));
        assert!(value["email"].as_str().unwrap().contains('@'));

        let age = value["age"].as_i64().unwrap();
        assert!((30..=40).contains(&age));

        let coordinates: Value = serde_json::from_str(value["coordinates"].as_str().unwrap()).unwrap();
        assert!(coordinates["latitude"].is_number());

        // An incompatible declared type falls through to structural generation
        let first = value["firstName"].as_i64().unwrap();
        assert!((1..=3).contains(&first));

        assert!(value["is_active"].is_boolean());
    }
}

#[test]
fn test_smart_default_skipped_for_stricter_shapes() {
    let schema = graph(json!({
        "type": "object",
        "required": ["email", "city"],
        "properties": {
            "email": { "type": "string", "enum": ["fixed@example.com"] },
            "city": { "type": "string", "pattern": "^CITY-[0-9]{2}$" }
        }
    }));
    let value = run(&schema, &GenerationOptions::seeded(2));
    assert_eq!(value["email"], json!("fixed@example.com"));
    assert!(value["city"].as_str().unwrap().starts_with("CITY-"));
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_override_wins_regardless_of_schema() {
    let schema = graph(user_schema());
    let options = GenerationOptions::seeded(3)
        .with_override("id", json!("not-a-number"))
        .with_override("address.city", json!("Lisbon"))
        .with_override("email", Value::Null);

    for seed in 0..20 {
        let options = GenerationOptions {
            seed: Some(seed),
            ..options.clone()
        };
        let value = run(&schema, &options);
        assert_eq!(value["id"], json!("not-a-number"));
        assert_eq!(value["address"]["city"], json!("Lisbon"));
        assert_eq!(value["email"], Value::Null);
    }
}

#[test]
fn test_override_below_optional_property_forces_it() {
    let schema = graph(user_schema());
    for seed in 0..20 {
        let options = GenerationOptions::seeded(seed).with_override("address.zip", json!("00000"));
        let value = run(&schema, &options);
        assert_eq!(value["address"]["zip"], json!("00000"));
    }
}

#[test]
fn test_synthetic_overrides_are_injected() {
    let schema = graph(user_schema());
    let options = GenerationOptions::seeded(4)
        .with_override("trace_id", json!("abc"))
        .with_override("address.country", json!("PT"));
    let value = run(&schema, &options);
    assert_eq!(value["trace_id"], json!("abc"));
    assert_eq!(value["address"]["country"], json!("PT"));
}

#[test]
fn test_override_on_array_item_path() {
    let schema = graph(user_schema());
    let options = GenerationOptions::seeded(6)
        .with_array_length("tags", 3, 3)
        .with_override("tags[1]", json!("pinned"));
    let value = run(&schema, &options);
    let tags = value["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[1], json!("pinned"));
}

#[test]
fn test_override_keeps_nullable_parent() {
    let schema = graph(json!({
        "type": "object",
        "required": ["profile"],
        "properties": {
            "profile": {
                "type": "object",
                "nullable": true,
                "properties": { "bio": { "type": "string" } }
            }
        }
    }));
    for seed in 0..30 {
        let options = GenerationOptions::seeded(seed).with_override("profile.bio", json!("hi"));
        let value = run(&schema, &options);
        assert_eq!(get_by_path(&value, "profile.bio"), Some(&json!("hi")));
    }
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_respects_declared_bounds() {
    let schema = graph(json!({
        "type": "array",
        "minItems": 2,
        "maxItems": 4,
        "items": { "type": "integer" }
    }));
    for seed in 0..40 {
        let len = run(&schema, &GenerationOptions::seeded(seed)).as_array().unwrap().len();
        assert!((2..=4).contains(&len), "length {}", len);
    }
}

#[test]
fn test_array_default_bounds() {
    let unbounded = graph(json!({ "type": "array", "items": { "type": "boolean" } }));
    let min_only = graph(json!({ "type": "array", "minItems": 7, "items": { "type": "boolean" } }));
    let max_only = graph(json!({ "type": "array", "maxItems": 2, "items": { "type": "boolean" } }));

    for seed in 0..30 {
        let options = GenerationOptions::seeded(seed);
        assert!(run(&unbounded, &options).as_array().unwrap().len() <= DEFAULT_MAX_ITEMS);
        assert_eq!(run(&min_only, &options).as_array().unwrap().len(), 7);
        assert!(run(&max_only, &options).as_array().unwrap().len() <= 2);
    }
}

#[test]
fn test_array_length_override_narrows_declared_bounds() {
    let schema = graph(json!({
        "type": "object",
        "required": ["items"],
        "properties": {
            "items": { "type": "array", "minItems": 1, "maxItems": 10, "items": { "type": "integer" } }
        }
    }));
    for seed in 0..30 {
        let options = GenerationOptions::seeded(seed).with_array_length("items", 4, 20);
        let len = run(&schema, &options)["items"].as_array().unwrap().len();
        assert!((4..=10).contains(&len), "length {}", len);
    }
}

#[test]
fn test_array_length_pin_beats_declared_bounds() {
    let schema = graph(json!({
        "type": "object",
        "required": ["items"],
        "properties": {
            "items": { "type": "array", "maxItems": 2, "items": { "type": "integer" } }
        }
    }));
    let options = GenerationOptions::seeded(1).with_array_length("items", 6, 6);
    assert_eq!(run(&schema, &options)["items"].as_array().unwrap().len(), 6);
}

#[test]
fn test_array_length_matched_by_path() {
    let schema = graph(json!({
        "type": "object",
        "required": ["profile"],
        "properties": {
            "profile": {
                "type": "object",
                "required": ["tags"],
                "properties": { "tags": { "type": "array", "items": { "type": "string" } } }
            }
        }
    }));
    let options = GenerationOptions::seeded(2).with_array_length("profile.tags", 3, 3);
    assert_eq!(run(&schema, &options)["profile"]["tags"].as_array().unwrap().len(), 3);
}

#[test]
fn test_wildcard_array_lengths_apply_to_each_element() {
    let schema = graph(json!({
        "type": "object",
        "required": ["users"],
        "properties": {
            "users": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["addresses"],
                    "properties": {
                        "addresses": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["street"],
                                "properties": { "street": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        }
    }));

    for seed in 0..20 {
        let options = GenerationOptions::seeded(seed)
            .with_array_length("users", 2, 2)
            .with_array_length("users[*].addresses", 1, 1);
        let value = run(&schema, &options);
        let users = value["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        for user in users {
            assert_eq!(user["addresses"].as_array().unwrap().len(), 1);
        }
    }
}

#[test]
fn test_array_without_items_schema() {
    let value = run(
        &graph(json!({ "type": "array", "minItems": 2, "maxItems": 2 })),
        &GenerationOptions::seeded(1),
    );
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(Value::is_string));
}

// ============================================================================
// Circular references
// ============================================================================

fn linked_list() -> SchemaGraph {
    let document = json!({
        "definitions": {
            "Node": {
                "type": "object",
                "required": ["value", "next"],
                "properties": {
                    "value": { "type": "integer" },
                    "next": { "$ref": "#/definitions/Node" }
                }
            }
        }
    });
    SchemaGraph::from_document(&document, "#/definitions/Node").unwrap()
}

fn chain_length(value: &Value) -> usize {
    let mut levels = 0;
    let mut current = value;
    while current.get("value").is_some() {
        levels += 1;
        current = &current["next"];
    }
    levels
}

#[test]
fn test_self_reference_terminates_at_max_depth() {
    let schema = linked_list();
    for max_depth in [0, 1, 3, 5] {
        let options = GenerationOptions {
            max_depth,
            ..GenerationOptions::seeded(8)
        };
        let value = run(&schema, &options);
        assert_eq!(chain_length(&value), max_depth + 1);
    }
}

#[test]
fn test_truncated_required_reference_is_stubbed() {
    let schema = linked_list();
    let options = GenerationOptions {
        max_depth: 1,
        ..GenerationOptions::seeded(8)
    };
    let value = run(&schema, &options);
    assert_eq!(value["next"]["next"], json!({}));
}

#[test]
fn test_truncated_reference_keeps_its_override() {
    let schema = linked_list();
    let options = GenerationOptions {
        max_depth: 1,
        ..GenerationOptions::seeded(8).with_override("next.next", json!({ "value": -1 }))
    };
    let value = run(&schema, &options);
    assert_eq!(value["next"]["next"], json!({ "value": -1 }));
    assert!(value["next"]["value"].is_i64());
}

#[test]
fn test_alias_into_cycle_generates_objects() {
    let document = json!({
        "components": { "schemas": {
            "Node": {
                "type": "object",
                "required": ["child"],
                "properties": { "child": { "$ref": "#/components/schemas/Alias" } }
            },
            "Alias": { "$ref": "#/components/schemas/Node" }
        } }
    });
    let schema = SchemaGraph::from_document(&document, "#/components/schemas/Node").unwrap();
    let options = GenerationOptions {
        max_depth: 1,
        ..GenerationOptions::seeded(3)
    };
    let value = run(&schema, &options);
    assert_eq!(value, json!({ "child": { "child": {} } }));
}

#[test]
fn test_empty_graph_generates_untyped_value() {
    let schema = SchemaGraph::new();
    let value = run(&schema, &GenerationOptions::seeded(1));
    assert!(value.is_string());
}

#[test]
fn test_recursive_tree_terminates() {
    let document = json!({
        "components": { "schemas": { "Category": {
            "type": "object",
            "required": ["name", "children"],
            "properties": {
                "name": { "type": "string" },
                "children": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 2,
                    "items": { "$ref": "#/components/schemas/Category" }
                }
            }
        } } }
    });
    let schema = SchemaGraph::from_document(&document, "#/components/schemas/Category").unwrap();

    fn depth(value: &Value) -> usize {
        value["children"]
            .as_array()
            .map(|children| 1 + children.iter().map(depth).max().unwrap_or(0))
            .unwrap_or(0)
    }

    for seed in 0..10 {
        let value = run(&schema, &GenerationOptions::seeded(seed));
        assert!(depth(&value) <= 2 * 3 + 1);
    }
}

#[test]
fn test_generate_from_context_root() {
    let schema = graph(json!({ "type": "boolean" }));
    let options = GenerationOptions::seeded(1);
    let ctx = GenerationContext::root(schema.root(), &options);
    assert_eq!(ctx.depth, 0);
    assert!(ctx.path.is_empty());
    assert!(ctx.visited.contains(&schema.root()));

    let mut generator = ValueGenerator::new(&schema, &options);
    let value = generator.generate(schema.node(schema.root()), &ctx).unwrap();
    assert!(value.is_boolean());
}
