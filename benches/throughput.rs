use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use misctags::{
    core::store::RecordStore,
    index::{frequencies, universe},
    search::filter,
    types::Timestamp,
};

fn at(i: u64) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap()
}

fn tags(i: u64) -> [String; 3] {
    [format!("t{}", i % 97), format!("k{}", i % 13), format!("u{i}")]
}

fn populated(n: u64) -> RecordStore {
    let mut store = RecordStore::new();
    for i in 0..n {
        store.create(tags(i), at(i)).expect("create");
    }
    store
}

fn bench_creates(c: &mut Criterion) {
    c.bench_function("store_create_10k", |b| {
        b.iter(|| populated(10_000));
    });
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let store = populated(20_000);
    let records = store.list();

    for query in ["t1", "t12 k", "t12 k3 u1"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| filter(&records, query));
        });
    }

    group.finish();
}

fn bench_tag_views(c: &mut Criterion) {
    let store = populated(20_000);
    let records = store.list();

    c.bench_function("frequencies_20k", |b| {
        b.iter(|| frequencies(&records));
    });
    c.bench_function("universe_20k", |b| {
        b.iter(|| universe(&records));
    });
}

criterion_group!(benches, bench_creates, bench_filter, bench_tag_views);
criterion_main!(benches);
