use conform::prelude::*;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn order_schema() -> ObjectSchema {
    object().keys(keys! {
        "customer" => object()
            .key("name", string().trim().min(1).required())
            .key("email", string().pattern(r"^[^@\s]+@[^@\s]+$").unwrap()),
        "lines" => array().min(1).items(schemas([object()
            .key("sku", string().token().required())
            .key("qty", number().integer().min(1.0).default(1))
            .into()])),
        "shipping" => string()
            .when("priority", true, string().one_of(["air", "courier"]))
            .default("ground"),
        "priority" => boolean().coerce(),
    })
}

fn order(lines: usize) -> Value {
    let lines: Vec<Value> = (0..lines)
        .map(|i| json!({ "sku": format!("sku_{}", i), "qty": i + 1 }))
        .collect();
    json!({
        "customer": { "name": " Ada ", "email": "ada@example.com" },
        "lines": lines,
        "priority": "true",
        "shipping": "air",
    })
}

fn bench_leaf_schemas(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaf_schemas");

    let token = string().trim().token().min(3);
    group.bench_function("string_token", |b| {
        b.iter(|| token.check_value(black_box(json!("  user_name "))).unwrap())
    });

    let range = number().coerce().integer().min(0.0).max(1000.0);
    group.bench_function("number_coerce_range", |b| {
        b.iter(|| range.check_value(black_box(json!("512"))).unwrap())
    });

    group.finish();
}

fn bench_nested_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_validation");
    let schema = order_schema();

    for lines in [1, 10, 100] {
        let value = order(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &value, |b, value| {
            b.iter(|| schema.check_value(black_box(value.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_conditional_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditional_selection");

    let schema = object()
        .key("length", string().required())
        .key(
            "list",
            array()
                .when("length", "2", array().length(2))
                .when("length", "3", array().length(3))
                .when("length", Matcher::schema(string()), array().min(1)),
        );

    group.bench_function("equals_match", |b| {
        b.iter(|| schema.check_value(black_box(json!({"length": "2", "list": [1, 2]}))).unwrap())
    });

    group.bench_function("schema_match", |b| {
        b.iter(|| schema.check_value(black_box(json!({"length": "9", "list": [1]}))).unwrap())
    });

    group.finish();
}

fn bench_json_pipe(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_pipe");
    let schema = order_schema();
    let body = serde_json::to_vec(&order(10)).unwrap();

    group.bench_function("validate_json", |b| {
        b.iter(|| validate_json(black_box(&body), &schema).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_leaf_schemas,
    bench_nested_validation,
    bench_conditional_selection,
    bench_json_pipe
);
criterion_main!(benches);
