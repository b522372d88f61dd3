//! Query encoding and path substitution benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use routefetch_core::{BracketEncoder, FormEncoder, PathParams, QueryEncoder, RequestOptions};
use serde_json::json;

fn bench_query_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_encoding");

    let flat = json!({"page": 2, "limit": 50, "sort": "created_at", "q": "rust http"});
    let nested = json!({
        "filter": {"status": ["open", "closed"], "owner": {"id": 7}},
        "page": 1,
    });

    group.bench_function("bracket_flat", |b| {
        b.iter(|| BracketEncoder.encode(black_box(&flat)))
    });
    group.bench_function("bracket_nested", |b| {
        b.iter(|| BracketEncoder.encode(black_box(&nested)))
    });
    group.bench_function("form_flat", |b| {
        b.iter(|| FormEncoder.encode(black_box(&flat)))
    });

    group.finish();
}

fn bench_path_substitution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_substitution");

    let single: PathParams = [("id", "12345")].into_iter().collect();
    group.bench_function("single_param", |b| {
        b.iter(|| single.substitute(black_box("/users/:id/")))
    });

    let multi: PathParams = [("org", "acme"), ("repo", "routefetch"), ("issue", "99")]
        .into_iter()
        .collect();
    group.bench_function("three_params", |b| {
        b.iter(|| multi.substitute(black_box("/orgs/:org/repos/:repo/issues/:issue/")))
    });

    group.finish();
}

fn bench_option_merge(c: &mut Criterion) {
    let base = RequestOptions::new()
        .header("Authorization", "Bearer token")
        .header("Accept", "application/json")
        .with("timeout_ms", 3000);
    let derived = RequestOptions::new()
        .with("method", "POST")
        .with("headers", json!({"Content-Type": "application/json"}))
        .with("body", r#"{"a":1}"#);

    c.bench_function("options_merge", |b| {
        b.iter(|| black_box(&base).merged(black_box(&derived)))
    });
}

criterion_group!(benches, bench_query_encoding, bench_path_substitution, bench_option_merge);
criterion_main!(benches);
