//! Benchmarks for entity escape substitution.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use presto_entities::{EntityTable, substitute_entities};

/// Generate text with one escape every `stride` words.
fn generate_text(words: usize, stride: usize) -> String {
    let mut text = String::with_capacity(words * 8);
    for i in 0..words {
        if i % stride == 0 {
            text.push_str(&format!("\\agrave{i} "));
        } else {
            text.push_str("word ");
        }
    }
    text
}

fn bench_table_load(c: &mut Criterion) {
    c.bench_function("entity_table_load", |b| {
        b.iter(|| EntityTable::load(include_str!("../data/entities.txt")));
    });
}

fn bench_substitute_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute_entities");
    for words in [100, 1_000, 10_000] {
        let text = generate_text(words, 10);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| substitute_entities(text));
        });
    }
    group.finish();
}

fn bench_substitute_no_escapes(c: &mut Criterion) {
    let text = "plain words ".repeat(1_000);
    c.bench_function("substitute_entities_no_escapes", |b| {
        b.iter(|| substitute_entities(&text));
    });
}

criterion_group!(
    benches,
    bench_table_load,
    bench_substitute_varying_sizes,
    bench_substitute_no_escapes
);
criterion_main!(benches);
