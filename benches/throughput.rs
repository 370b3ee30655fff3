//! Throughput Benchmark for EmberKV
//!
//! Measures request round-trips through the engine workers under a few
//! workloads. Every operation is a queue send plus a oneshot reply.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use emberkv::{Item, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn running_store(rt: &Runtime) -> Arc<Store> {
    let _guard = rt.enter();
    let store = Store::new();
    store.init();
    Arc::new(store)
}

/// Benchmark PUT operations
fn bench_put(c: &mut Criterion) {
    let rt = runtime();
    let store = running_store(&rt);

    let mut group = c.benchmark_group("put");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let item = Item::new(i.to_string(), format!("key:{}", i), Bytes::from("small_value"));
            rt.block_on(store.put(item, Duration::ZERO)).unwrap();
            i += 1;
        });
    });

    group.bench_function("put_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let item = Item::new(i.to_string(), format!("ttl:{}", i), Bytes::from("value"));
            rt.block_on(store.put(item, Duration::from_secs(3600))).unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let rt = runtime();
    let store = running_store(&rt);

    // Pre-populate with data
    rt.block_on(async {
        for i in 0..10_000 {
            let item = Item::new(i.to_string(), format!("key:{}", i), Bytes::from("value"));
            store.put(item, Duration::ZERO).await.unwrap();
        }
    });

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 10_000);
            black_box(rt.block_on(store.get(&key)).unwrap());
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(rt.block_on(store.get(&key)).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark list pushes and reads
fn bench_lists(c: &mut Criterion) {
    let rt = runtime();
    let store = running_store(&rt);

    let mut group = c.benchmark_group("lists");
    group.throughput(Throughput::Elements(1));

    group.bench_function("list_push", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let item = Item::member(format!("{:08}", i % 1_000), Bytes::from("member"));
            rt.block_on(store.list_push("bench", item)).unwrap();
            i += 1;
        });
    });

    group.bench_function("list_get_1000", |b| {
        b.iter(|| {
            black_box(rt.block_on(store.list_get("bench")).unwrap());
        });
    });

    group.finish();
}

/// Benchmark concurrent callers sharing one store
fn bench_concurrent(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_tasks_mixed", |b| {
        b.iter(|| {
            let store = running_store(&rt);
            rt.block_on(async {
                let handles: Vec<_> = (0..4)
                    .map(|t| {
                        let store = Arc::clone(&store);
                        tokio::spawn(async move {
                            for i in 0..1_000 {
                                let key = format!("key:{}:{}", t, i);
                                let item = Item::new(i.to_string(), key.clone(), Bytes::from("value"));
                                store.put(item, Duration::ZERO).await.unwrap();
                                store.get(&key).await.unwrap();
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap();
                }
            });
            store.close();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_lists, bench_concurrent);

criterion_main!(benches);
