//! Routing hot-path benchmarks
//!
//! Measures:
//! - Complexity classification
//! - Error signature normalization
//! - Enhancement context reads on a full memory

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logroute_core::memory::{normalize_error_signature, ContextMetadata, TurnMetadata};
use logroute_core::{classify, ConversationMemory, LogEntry, SearchResults};

const REQUESTS: &[(&str, &str)] = &[
    ("short", "show errors"),
    (
        "analytical",
        "analyze the error trend for checkout and correlate it with deploys to find the root cause",
    ),
    (
        "query",
        "write an elasticsearch bool query with a range filter on @timestamp and a terms match on service",
    ),
];

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for (name, text) in REQUESTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| classify(black_box(text)))
        });
    }

    group.finish();
}

fn bench_signature_normalization(c: &mut Criterion) {
    let message = "2024-05-02T11:03:55.120Z request 550e8400-e29b-41d4-a716-446655440000 \
                   failed after 3 retries with status 503 on node 12";

    c.bench_function("normalize_error_signature", |b| {
        b.iter(|| normalize_error_signature(black_box(message)))
    });
}

fn bench_enhancement_context(c: &mut Criterion) {
    let memory = ConversationMemory::default();
    let page = SearchResults::from_items(
        (0..50)
            .map(|i| {
                LogEntry::new(
                    "2024-05-02T11:03:55Z",
                    format!("service-{}", i % 7),
                    "ERROR",
                    format!("connection {} reset", i),
                )
            })
            .collect(),
    );
    for i in 0..60 {
        memory.add_conversation_turn(&format!("error query {}", i), "r", TurnMetadata::default());
        memory.add_query_context(
            "error query",
            r#"{"query":{"bool":{"filter":{"term":{"service.keyword":"service-1"}}}}}"#,
            &page,
            ContextMetadata::default(),
        );
    }

    c.bench_function("query_enhancement_context", |b| {
        b.iter(|| memory.query_enhancement_context(black_box("what about the same service")))
    });
}

criterion_group!(
    benches,
    bench_classification,
    bench_signature_normalization,
    bench_enhancement_context
);
criterion_main!(benches);
