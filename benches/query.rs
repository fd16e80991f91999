//! Read-path benchmarks over a synthetic table.
//!
//! Run with: `cargo bench --bench query`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use newsfeed_engine::classify::Annotator;
use newsfeed_engine::ingestion::build;
use newsfeed_engine::processing::{
    count_by, distinct_values, query, CountField, MultiValueField, PageRequest, QueryFilters,
};
use newsfeed_engine::types::{RawRow, Table};

const PLATFORMS: &[&str] = &["Twitter", "facebook", "WhatsApp, Twitter", "YouTube", "instagram,facebook"];
const REGIONS: &[&str] = &["India", "Kerala, India", "Delhi", "Tamil Nadu", "Maharashtra"];
const LABELS: &[&str] = &["False", "True", "TRUE", "Misleading"];

fn synthetic_table(size: usize) -> Table {
    let rows = (0..size).map(|i| {
        let statement = format!("Claim number {i} about the election");
        let body = format!("Body text for claim {i}, shared widely");
        RawRow::from_pairs([
            ("Eng_Trans_Statement", statement.as_str()),
            ("Eng_Trans_News_Body", body.as_str()),
            ("Publish_Date", "2021-03-15"),
            ("Language", "English, Hindi"),
            ("Platform", PLATFORMS[i % PLATFORMS.len()]),
            ("Region", REGIONS[i % REGIONS.len()]),
            ("Label", LABELS[i % LABELS.len()]),
        ])
    });
    build(rows, &Annotator::without_model())
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let filters = QueryFilters {
        platform: Some("twitter".to_string()),
        label: Some("false".to_string()),
        search: Some("election".to_string()),
        ..Default::default()
    };

    for size in [1_000, 10_000, 100_000] {
        let table = synthetic_table(size);
        group.bench_with_input(BenchmarkId::new("first_page", size), &table, |b, table| {
            b.iter(|| black_box(query(table, &filters, PageRequest::new(1, 10)).len()))
        });
        group.bench_with_input(BenchmarkId::new("last_page", size), &table, |b, table| {
            b.iter(|| black_box(query(table, &filters, PageRequest::new(1_000, 10)).len()))
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1_000, 10_000, 100_000] {
        let table = synthetic_table(size);
        group.bench_with_input(BenchmarkId::new("count_by_platform", size), &table, |b, table| {
            b.iter(|| black_box(count_by(table, CountField::Platform)))
        });
        group.bench_with_input(BenchmarkId::new("distinct_platforms", size), &table, |b, table| {
            b.iter(|| black_box(distinct_values(table, MultiValueField::Platform)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_query, bench_aggregate);
criterion_main!(benches);
