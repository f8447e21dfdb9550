//! Benchmarks for local keyword resolution.
//!
//! Measures the first-match scan over the built-in catalog for inputs that
//! hit the first rule, a late rule, and no rule at all (full scan plus
//! fallback).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adkar_chat::KeywordResolver;

fn long_unmatched_input() -> String {
    "Our team is reorganizing next quarter and I want to prepare a plan that keeps \
     everyone productive while we move offices and adopt the new tooling. "
        .repeat(8)
}

fn bench_keyword_resolution(c: &mut Criterion) {
    let resolver = KeywordResolver::default();
    let unmatched = long_unmatched_input();

    let mut group = c.benchmark_group("keyword_resolve");
    group.bench_function("first_rule", |b| {
        b.iter(|| resolver.reply_for(black_box("Tell me about ADKAR please")))
    });
    group.bench_function("late_rule", |b| {
        b.iter(|| resolver.reply_for(black_box("hello there")))
    });
    group.bench_function("no_match_long_input", |b| {
        b.iter(|| resolver.reply_for(black_box(unmatched.as_str())))
    });
    group.finish();
}

criterion_group!(benches, bench_keyword_resolution);
criterion_main!(benches);
