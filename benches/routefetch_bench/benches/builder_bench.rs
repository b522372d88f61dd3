//! Request builder benchmarks
//!
//! Measures navigation, builder copies and finalization without any network.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use routefetch_core::{create_client, RequestOptions};
use serde_json::json;

fn bench_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation");
    let api = create_client("http://localhost:8080/api", RequestOptions::new());

    for depth in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("segment", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut node = api.clone();
                for _ in 0..depth {
                    node = node.segment(black_box("items"));
                }
                node
            })
        });
    }

    group.bench_function("resolve_method", |b| {
        let users = api.segment("users");
        b.iter(|| users.resolve(black_box("$get")))
    });

    group.finish();
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize");
    let base = RequestOptions::new()
        .header("Authorization", "Bearer token")
        .header("Accept", "application/json");
    let api = create_client("http://localhost:8080/api", base);

    let get = api
        .segment("users")
        .segment(":id")
        .get()
        .params(json!({"id": 42}))
        .query(json!({"page": 1, "limit": 20}));
    group.bench_function("get_with_params_and_query", |b| {
        b.iter(|| black_box(&get).finalize())
    });

    let post = api
        .segment("users")
        .post()
        .headers(json!({"X-Request-Id": "bench"}))
        .body(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "tags": ["admin", "ops"],
        }));
    group.bench_function("post_with_body", |b| b.iter(|| black_box(&post).finalize()));

    let extra = RequestOptions::new().header("X-Request-Id", "override");
    group.bench_function("post_with_call_options", |b| {
        b.iter(|| black_box(&post).finalize_with(black_box(&extra)))
    });

    group.finish();
}

fn bench_builder_copy(c: &mut Criterion) {
    let api = create_client("/", RequestOptions::new());
    let template = api.post().body(json!({"payload": vec![0u8; 256]}));

    c.bench_function("builder_replace_one_field", |b| {
        b.iter(|| template.query(black_box(json!({"q": "x"}))))
    });
}

criterion_group!(benches, bench_navigation, bench_finalize, bench_builder_copy);
criterion_main!(benches);
