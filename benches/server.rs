//! Server request throughput, static vs dynamic boundaries.
//!
//! Run with: `cargo bench --bench server`

use std::hint::black_box;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use edgecache::builder::EvictionAlgorithm;
use edgecache::key::CacheRequest;
use edgecache::server::{CacheServer, ServerBuilder};
use rand::SeedableRng;
use rand_distr::{Distribution, Zipf};

const CAPACITY: usize = 4_096;
const OPS: usize = 50_000;

fn trace() -> Vec<(CacheRequest, usize)> {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
    let zipf = Zipf::new(100_000.0, 0.99).unwrap();
    (0..OPS)
        .map(|i| (CacheRequest::new(zipf.sample(&mut rng) as u64), 1 + i % 2))
        .collect()
}

fn server(algorithm: EvictionAlgorithm, dynamic: bool) -> CacheServer {
    ServerBuilder::new(1, CAPACITY)
        .boundaries(&[0.25, 0.5, 0.25])
        .algorithm(algorithm)
        .adjust_interval(1_000)
        .dynamic_boundaries(dynamic)
        .build()
        .unwrap()
}

fn bench_add_request(c: &mut Criterion) {
    let trace = trace();
    let mut group = c.benchmark_group("server_add_request");
    group.throughput(Throughput::Elements(OPS as u64));

    for algorithm in [EvictionAlgorithm::Lru, EvictionAlgorithm::Fifo] {
        group.bench_function(algorithm.name(), |b| {
            b.iter_batched(
                || server(algorithm, false),
                |mut server| {
                    for (req, layer) in &trace {
                        black_box(server.add_request(req, *layer).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_dynamic(c: &mut Criterion) {
    let trace = trace();
    let mut group = c.benchmark_group("server_dynamic");
    group.throughput(Throughput::Elements(OPS as u64));
    group.bench_function("lru_profiled", |b| {
        b.iter_batched(
            || server(EvictionAlgorithm::Lru, true),
            |mut server| {
                for (req, layer) in &trace {
                    black_box(server.add_request(req, *layer).unwrap());
                    let _ = black_box(server.profile_request(req, *layer));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_add_request, bench_dynamic);
criterion_main!(benches);
