// ==============================================
// DYNAMIC BOUNDARY PIPELINE (integration)
// ==============================================
//
// Drives dynamic servers through `profile_request` + `add_request` and
// checks the capacity bookkeeping that ties the profiler, the advisor and
// the engines together.

use edgecache::builder::EvictionAlgorithm;
use edgecache::error::SimError;
use edgecache::key::{CacheRequest, KeyKind};
use edgecache::profiler::{Advice, BoundaryDecision, CacheProfiler, LatencyProfile, ProfilerConfig};
use edgecache::server::{CacheServer, ServerBuilder};
use proptest::prelude::*;

fn dynamic_server(total: usize, interval: u64) -> CacheServer {
    ServerBuilder::new(21, total)
        .name("edge-21")
        .boundaries(&[0.25, 0.25, 0.5])
        .algorithm(EvictionAlgorithm::Lru)
        .latencies(LatencyProfile::new(1, 10, 100).unwrap())
        .adjust_interval(interval)
        .dynamic_boundaries(true)
        .build()
        .unwrap()
}

fn serve(server: &mut CacheServer, key: u64, layer: usize) -> Result<Advice, SimError> {
    let req = CacheRequest::new(key);
    server.add_request(&req, layer)?;
    server.profile_request(&req, layer)
}

fn assert_consistent(server: &CacheServer, total: usize, static_size: usize) {
    let sizes = server.layer_sizes();
    assert_eq!(sizes.iter().sum::<usize>(), total);
    assert_eq!(sizes[2], static_size);
    assert_eq!(server.cache_size(), total);
    let profiler = server.profiler().unwrap();
    assert_eq!(profiler.layer_sizes(), sizes);
    for (i, &size) in sizes.iter().enumerate() {
        assert_eq!(server.layer(i + 1).unwrap().size(), size);
    }
}

// ==============================================
// Cadence
// ==============================================

#[test]
fn evaluation_fires_once_per_interval_in_lock_step() {
    let interval = 5;
    let mut server = dynamic_server(40, interval);
    for round in 1..=47u64 {
        let _ = serve(&mut server, round % 7, 1);
        let _ = serve(&mut server, 100 + round % 11, 2);
        let evaluations = server.profiler().unwrap().advisor().evaluations();
        assert_eq!(evaluations, round / interval, "round {}", round);
    }
}

#[test]
fn evaluation_waits_for_every_tunable_layer() {
    let mut server = dynamic_server(40, 2);
    for key in 0..50u64 {
        assert_eq!(serve(&mut server, key, 1), Ok(Advice::NoOpYet));
        assert_eq!(serve(&mut server, key, 3), Ok(Advice::NoOpYet));
    }
    assert_eq!(server.profiler().unwrap().advisor().evaluations(), 0);

    let _ = serve(&mut server, 0, 2);
    let advice = serve(&mut server, 1, 2);
    assert!(matches!(advice, Ok(Advice::Evaluated(_)) | Err(SimError::Invariant(_))));
    assert_eq!(server.profiler().unwrap().advisor().evaluations(), 1);
}

// ==============================================
// Shifts
// ==============================================

#[test]
fn layer_two_grows_when_layer_one_reuses_at_capacity() {
    // C1 = C2 = 2. Layer 1 cycles three keys (distance 2 == C1), layer 2
    // only sees cold keys, so delta2 > 0 and layer 2 takes a unit.
    let mut server = dynamic_server(8, 6);
    let mut last = Ok(Advice::NoOpYet);
    for i in 0..6u64 {
        let _ = serve(&mut server, i % 3, 1);
        last = serve(&mut server, 1_000 + i, 2);
    }
    assert_eq!(last, Ok(Advice::Evaluated(BoundaryDecision::ShiftToSecond)));
    assert_eq!(server.layer_sizes(), &[1, 3, 4]);
    assert_eq!(server.stats().boundary_shifts, 1);
    assert_consistent(&server, 8, 4);
}

#[test]
fn shrunk_layer_evicts_lazily() {
    let mut server = dynamic_server(8, 6);
    for i in 0..6u64 {
        let _ = serve(&mut server, i % 3, 1);
        let _ = serve(&mut server, 1_000 + i, 2);
    }
    assert_eq!(server.layer_sizes()[0], 1);
    // Layer 1 still holds its two residents until the next admission.
    assert_eq!(server.layer(1).unwrap().len(), 2);
    server.add_request(&CacheRequest::new(77u64), 1).unwrap();
    assert_eq!(server.layer(1).unwrap().len(), 1);
}

#[test]
fn empty_donor_blocks_the_shift() {
    let mut server = dynamic_server(8, 6);
    server.set_new_boundaries(&[0, 4, 4]).unwrap();
    // Layer 1 has C1 = 0; H1[0] repeats make delta2 > 0, asking layer 1 to donate.
    for i in 0..6u64 {
        let _ = serve(&mut server, 5, 1);
        let _ = serve(&mut server, 1_000 + i, 2);
    }
    assert_eq!(server.layer_sizes(), &[0, 4, 4]);
    assert_eq!(server.stats().boundary_shifts, 0);
    assert_consistent(&server, 8, 4);
}

#[test]
fn set_size_respans_the_profiler() {
    let mut server = dynamic_server(8, 1_000);
    server.set_size(16).unwrap();
    assert_eq!(server.layer_sizes(), &[4, 4, 8]);
    let profiler = server.profiler().unwrap();
    assert_eq!(profiler.max_cache_size(), 16);
    assert!(profiler.histogram(1).unwrap().capacity() >= 18);
    assert_consistent(&server, 16, 8);
}

#[test]
fn shrink_to_one_and_back_restores_shifted_split() {
    let mut server = dynamic_server(8, 6);
    for i in 0..6u64 {
        let _ = serve(&mut server, i % 3, 1);
        let _ = serve(&mut server, 1_000 + i, 2);
    }
    assert_eq!(server.layer_sizes(), &[1, 3, 4]);

    server.set_size(1).unwrap();
    assert_eq!(server.layer_sizes(), &[0, 0, 1]);
    assert_consistent(&server, 1, 1);

    server.set_size(8).unwrap();
    assert_eq!(server.layer_sizes(), &[1, 3, 4]);
    assert_consistent(&server, 8, 4);

    server.set_size(16).unwrap();
    assert_eq!(server.layer_sizes(), &[2, 6, 8]);
    assert_consistent(&server, 16, 8);
}

// ==============================================
// Profiler lifecycle
// ==============================================

#[test]
fn clear_keeps_configuration() {
    let latencies = LatencyProfile::new(2, 20, 200).unwrap();
    let mut profiler = CacheProfiler::new(ProfilerConfig {
        max_cache_size: 10,
        key_kind: KeyKind::Int64,
        layer_sizes: vec![3, 7],
        adjust_interval: 4,
        latencies,
    })
    .unwrap();
    for k in 0..9u64 {
        let _ = profiler.add_request(&CacheRequest::new(k % 4), 1 + (k as usize % 2));
    }

    profiler.clear();
    for layer in 1..=2 {
        let hist = profiler.histogram(layer).unwrap();
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.capacity(), 12);
        assert_eq!(profiler.live_keys(layer), Some(0));
        assert_eq!(profiler.logical_clock(layer), Some(0));
    }
    assert_eq!(profiler.layer_sizes(), &[3, 7]);
    assert_eq!(profiler.advisor().latencies(), latencies);
    assert_eq!(profiler.advisor().adjust_interval(), 4);
}

// ==============================================
// Property tests
// ==============================================

proptest! {
    #[test]
    fn prop_capacity_is_conserved(
        trace in prop::collection::vec((0u64..24, 1usize..=3), 1..400),
        interval in 1u64..6,
    ) {
        let mut server = dynamic_server(12, interval);
        let static_size = server.layer_sizes()[2];
        for (key, layer) in trace {
            match serve(&mut server, key, layer) {
                Ok(_) | Err(SimError::Invariant(_)) => {},
                Err(SimError::Config(err)) => panic!("unexpected config error: {}", err),
            }
            let sizes = server.layer_sizes();
            prop_assert_eq!(sizes.iter().sum::<usize>(), 12);
            prop_assert_eq!(sizes[2], static_size);
            for (i, &size) in sizes.iter().enumerate() {
                prop_assert_eq!(server.layer(i + 1).unwrap().size(), size);
            }
        }
        let profiler = server.profiler().unwrap();
        for layer in 1..=3 {
            prop_assert_eq!(
                profiler.histogram(layer).unwrap().total(),
                profiler.logical_clock(layer).unwrap()
            );
        }
        let stats = server.stats();
        prop_assert!(stats.boundary_shifts + stats.rejected_evaluations
            <= profiler.advisor().evaluations());
    }
}
