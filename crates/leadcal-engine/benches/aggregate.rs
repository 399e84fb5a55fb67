//! Full-pass aggregation throughput
//!
//! Run with: cargo bench --package leadcal-engine --bench aggregate

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use leadcal_engine::{AggregationInput, AggregationTuning, ChunkedAggregator, SnapshotHolder};
use leadcal_identity::SellerIndex;
use leadcal_model::{ContactFilters, Period};
use leadcal_test_utils::{five_seller_roster, mixed_events};
use std::sync::Arc;

const EVENTS: usize = 100_000;

fn input(filters: ContactFilters) -> AggregationInput {
    let period = Period::new(2026, 10).unwrap();
    let (events, _) = mixed_events(period, EVENTS, 97);
    AggregationInput {
        period,
        filters,
        events: events.into(),
        index: Arc::new(SellerIndex::build(&five_seller_roster())),
    }
}

fn bench_full_pass(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let input = input(ContactFilters::new());

    let mut group = c.benchmark_group("full_pass");
    group.throughput(Throughput::Elements(EVENTS as u64));
    for slice_size in [500, 6000, EVENTS] {
        let aggregator = ChunkedAggregator::new(
            AggregationTuning::new().with_slice_size(slice_size),
            Arc::new(SnapshotHolder::new()),
        );
        group.bench_with_input(
            BenchmarkId::new("slice", slice_size),
            &input,
            |b, input| {
                b.to_async(&rt).iter(|| async {
                    let ticket = aggregator.begin();
                    black_box(aggregator.run(input.clone(), ticket).await)
                });
            },
        );
    }
    group.finish();
}

fn bench_filtered_pass(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let input = input(ContactFilters::new().with_status("Ativo").with_origin("email"));
    let aggregator =
        ChunkedAggregator::new(AggregationTuning::new(), Arc::new(SnapshotHolder::new()));

    c.bench_function("filtered_pass", |b| {
        b.to_async(&rt).iter(|| async {
            let ticket = aggregator.begin();
            black_box(aggregator.run(input.clone(), ticket).await)
        });
    });
}

criterion_group!(benches, bench_full_pass, bench_filtered_pass);
criterion_main!(benches);
