// Criterion benchmarks for edgepick-selector
//
// Run benchmarks with:
//   cargo bench -p edgepick-selector
//
// For detailed output with plots:
//   cargo bench -p edgepick-selector -- --save-baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edgepick_common::{Credentials, EdgeNodeConf};
use edgepick_metrics::SelectionMetrics;
use edgepick_selector::{CursorStore, EdgeNodeSelector, NoopProbe};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Runtime;

fn conf(host_count: usize) -> EdgeNodeConf {
    EdgeNodeConf::new(
        (0..host_count).map(|i| format!("edge-{}", i)).collect(),
        Credentials {
            user: "hadoop".to_string(),
            ssh_key: "key".to_string(),
        },
    )
    .unwrap()
}

fn bench_next_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_next_index");

    let cursors = CursorStore::new();
    group.bench_function("existing_profile", |b| {
        cursors.next_index("p");
        b.iter(|| cursors.next_index(black_box("p")));
    });

    group.bench_function("across_wrap", |b| {
        cursors.seed("wrap", u64::MAX - 1_000);
        b.iter(|| cursors.next_index(black_box("wrap")));
    });

    group.bench_function("rotating_profiles", |b| {
        let profiles: Vec<String> = (0..16).map(|i| format!("profile-{}", i)).collect();
        let mut i = 0usize;
        b.iter(|| {
            cursors.next_index(black_box(&profiles[i % profiles.len()]));
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

fn bench_select_noop(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_noop");
    let rt = Runtime::new().unwrap();

    for host_count in [2, 5, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(host_count), host_count, |b, &count| {
            let conf = conf(count);
            let selector = EdgeNodeSelector::with_cursors(Arc::new(CursorStore::new()));
            b.to_async(&rt).iter(|| async {
                selector
                    .select_with_probe(black_box(&conf), "p", None, &NoopProbe)
                    .await
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_select_with_exclusion_and_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_options");
    let rt = Runtime::new().unwrap();
    let conf = conf(5);

    group.bench_function("exclude_one", |b| {
        let selector = EdgeNodeSelector::with_cursors(Arc::new(CursorStore::new()));
        b.to_async(&rt).iter(|| async {
            selector
                .select_with_probe(&conf, "p", black_box(Some("edge-2")), &NoopProbe)
                .await
                .unwrap()
        });
    });

    group.bench_function("with_metrics", |b| {
        let selector = EdgeNodeSelector::with_cursors(Arc::new(CursorStore::new()))
            .with_metrics(Arc::new(SelectionMetrics::new()));
        b.to_async(&rt).iter(|| async {
            selector
                .select_with_probe(&conf, "p", None, &NoopProbe)
                .await
                .unwrap()
        });
    });

    group.finish();
}

fn bench_concurrent_next_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_next_index");

    for thread_count in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(thread_count),
            thread_count,
            |b, &threads| {
                let cursors = Arc::new(CursorStore::new());
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|_| {
                            let cursors = cursors.clone();
                            thread::spawn(move || {
                                for _ in 0..1_000 {
                                    cursors.next_index("p");
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_next_index,
    bench_select_noop,
    bench_select_with_exclusion_and_metrics,
    bench_concurrent_next_index
);
criterion_main!(benches);
