use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use proteus::domain::{GenerationOptions, SchemaGraph};
use serde_json::json;

fn order_graph() -> SchemaGraph {
    let document = json!({
        "components": { "schemas": {
            "User": {
                "type": "object",
                "required": ["id", "email", "firstName", "orders"],
                "properties": {
                    "id": { "type": "string", "format": "uuid" },
                    "email": { "type": "string" },
                    "firstName": { "type": "string" },
                    "age": { "type": "integer", "minimum": 18, "maximum": 90 },
                    "status": { "type": "string", "enum": ["active", "suspended"] },
                    "orders": {
                        "type": "array",
                        "maxItems": 5,
                        "items": { "$ref": "#/components/schemas/Order" }
                    }
                }
            },
            "Order": {
                "type": "object",
                "required": ["sku", "total", "placedAt"],
                "properties": {
                    "sku": { "type": "string", "pattern": "^[A-Z]{3}-\\d{4}$" },
                    "total": { "type": "number", "minimum": 0, "maximum": 500 },
                    "placedAt": { "type": "string", "format": "date-time" },
                    "payment": {
                        "oneOf": [
                            { "type": "object", "properties": { "kind": { "const": "card" }, "last4": { "type": "string", "pattern": "\\d{4}" } } },
                            { "type": "object", "properties": { "kind": { "const": "iban" }, "iban": { "type": "string" } } }
                        ],
                        "discriminator": { "propertyName": "kind" }
                    }
                }
            }
        }}
    });
    SchemaGraph::from_document(&document, "#/components/schemas/User").unwrap()
}

fn benchmark_generate(c: &mut Criterion) {
    let graph = order_graph();
    let options = GenerationOptions::seeded(42);

    c.bench_function("generate_user", |b| {
        b.iter(|| proteus::generate(black_box(&graph), black_box(&options)).unwrap());
    });
}

fn benchmark_generate_with_overrides(c: &mut Criterion) {
    let graph = order_graph();
    let options = GenerationOptions::seeded(42)
        .with_override("email", json!("bench@example.com"))
        .with_override("orders.0.total", json!(10.5))
        .with_override("meta.source", json!("bench"))
        .with_array_length("orders", 3, 3);

    c.bench_function("generate_user_with_overrides", |b| {
        b.iter(|| proteus::generate(black_box(&graph), black_box(&options)).unwrap());
    });
}

fn benchmark_batch_sizes(c: &mut Criterion) {
    let graph = order_graph();
    let options = GenerationOptions::seeded(7);
    let mut group = c.benchmark_group("generate_batch");

    for count in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| proteus::generate_batch(&graph, &options, count).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_generate,
    benchmark_generate_with_overrides,
    benchmark_batch_sizes
);
criterion_main!(benches);
