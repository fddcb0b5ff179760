//! Benchmarks for classification, merging and compilation throughput.
//!
//! Run with: cargo bench

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use blockingmachine::{
    classify, compile, FilterListMetadata, FilterSource, Format, MemoryStore, MergeBatch,
    RawSource, StoredRule,
};

/// Generate a filter list body with a realistic mix of rule types.
fn generate_list(count: usize) -> String {
    let mut body = String::from("! Title: Bench list\n[Adblock Plus 2.0]\n");
    for i in 0..count {
        let line = match i % 6 {
            0 => format!("||ads{}.example.com^", i),
            1 => format!("||tracker{}.example.net^$third-party,script", i),
            2 => format!("@@||cdn{}.example.org^", i),
            3 => format!("example{}.com##.banner", i),
            4 => format!("/^https?:\\/\\/track{}\\./", i),
            _ => format!("host{}.example.com", i),
        };
        body.push_str(&line);
        body.push('\n');
    }
    body
}

fn source() -> FilterSource {
    FilterSource::resolve(&RawSource::new(
        "bench",
        "https://bench.example/list.txt",
        "advertising",
    ))
    .unwrap()
}

fn records(body: &str, source: &FilterSource) -> Vec<StoredRule> {
    let now = Utc::now();
    body.lines()
        .filter_map(|line| classify(line.trim(), source))
        .map(|rule| StoredRule::candidate(rule, source, now))
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let source = source();

    for size in [1_000, 10_000] {
        let body = generate_list(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let mut n = 0;
                for line in body.lines() {
                    if classify(black_box(line.trim()), &source).is_some() {
                        n += 1;
                    }
                }
                n
            });
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_batch");
    let source = source();

    for size in [1_000, 10_000] {
        let rules = records(&generate_list(size), &source);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rules, |b, rules| {
            b.iter(|| {
                let store = MemoryStore::new();
                let mut batch = MergeBatch::new();
                let now = Utc::now();
                for rule in rules {
                    batch.merge(&store, rule.clone(), now).unwrap();
                }
                batch.flush(&store).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let rules = records(&generate_list(10_000), &source());
    let meta = FilterListMetadata::default();
    group.throughput(Throughput::Elements(rules.len() as u64));

    for format in [Format::Hosts, Format::Unbound, Format::Adguard] {
        group.bench_with_input(BenchmarkId::from_parameter(format), &format, |b, &format| {
            b.iter(|| compile(black_box(&rules), &meta, format));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_merge, bench_compile);
criterion_main!(benches);
