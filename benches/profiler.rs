//! Reuse-distance tracker throughput.
//!
//! Run with: `cargo bench --bench profiler`
//!
//! Compares the splay-tree index against the linear reference on a Zipfian
//! key stream, and measures the full per-layer profiler path.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use edgecache::ds::LinearRecencyIndex;
use edgecache::key::{CacheRequest, KeyKind};
use edgecache::profiler::{CacheProfiler, ProfilerConfig, ReuseDistanceTracker};
use rand::SeedableRng;
use rand_distr::{Distribution, Zipf};

const OPS: usize = 20_000;

fn zipf_trace(universe: u64, len: usize, seed: u64) -> Vec<u64> {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    let zipf = Zipf::new(universe as f64, 0.99).unwrap();
    (0..len).map(|_| zipf.sample(&mut rng) as u64).collect()
}

// ============================================================================
// Tracker: splay vs linear
// ============================================================================

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_record");
    group.throughput(Throughput::Elements(OPS as u64));

    for universe in [1_000u64, 10_000] {
        let trace = zipf_trace(universe, OPS, 7);

        group.bench_with_input(BenchmarkId::new("splay", universe), &trace, |b, trace| {
            b.iter(|| {
                let mut tracker = ReuseDistanceTracker::new();
                for &key in trace {
                    black_box(tracker.record(key));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("linear", universe), &trace, |b, trace| {
            b.iter(|| {
                let mut tracker = ReuseDistanceTracker::with_index(LinearRecencyIndex::new());
                for &key in trace {
                    black_box(tracker.record(key));
                }
            })
        });
    }
    group.finish();
}

// ============================================================================
// Profiler: tracker + histogram + advisor
// ============================================================================

fn bench_profiler(c: &mut Criterion) {
    let trace: Vec<CacheRequest> = zipf_trace(50_000, OPS, 11)
        .into_iter()
        .map(CacheRequest::new)
        .collect();

    let mut group = c.benchmark_group("profiler_add_request");
    group.throughput(Throughput::Elements(OPS as u64));
    group.bench_function("two_layers", |b| {
        b.iter(|| {
            let mut profiler = CacheProfiler::new(ProfilerConfig {
                max_cache_size: 8_192,
                key_kind: KeyKind::Int64,
                layer_sizes: vec![2_048, 6_144],
                adjust_interval: 1_000,
                ..ProfilerConfig::default()
            })
            .unwrap();
            for (i, req) in trace.iter().enumerate() {
                let _ = black_box(profiler.add_request(req, 1 + i % 2));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_tracker, bench_profiler);
criterion_main!(benches);
