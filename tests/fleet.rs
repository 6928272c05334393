// ==============================================
// FLEET STATISTICS (integration)
// ==============================================
//
// Independent servers, one per thread, reporting into one shared sink.

use std::sync::Arc;
use std::thread;

use edgecache::key::CacheRequest;
use edgecache::server::{FleetStats, ServerBuilder, ServerStats};
use rand::SeedableRng;
use rand_distr::{Distribution, Zipf};

const SERVERS: u64 = 4;
const REQUESTS: usize = 5_000;

#[test]
fn fleet_totals_match_per_server_stats() {
    let fleet = Arc::new(FleetStats::new(2));

    let handles: Vec<_> = (0..SERVERS)
        .map(|id| {
            let fleet = Arc::clone(&fleet);
            thread::spawn(move || -> ServerStats {
                let mut server = ServerBuilder::new(id, 64)
                    .boundaries(&[0.25, 0.75])
                    .stats_sink(fleet)
                    .build()
                    .unwrap();
                let mut rng = rand::rngs::SmallRng::seed_from_u64(id);
                let zipf = Zipf::new(500.0, 1.0).unwrap();
                for i in 0..REQUESTS {
                    let key = zipf.sample(&mut rng) as u64;
                    let layer = 1 + i % 2;
                    server.add_request(&CacheRequest::new(key), layer).unwrap();
                }
                server.stats().clone()
            })
        })
        .collect();

    let per_server: Vec<ServerStats> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let totals = fleet.totals();
    assert_eq!(totals.req, SERVERS * REQUESTS as u64);
    assert_eq!(totals.req, per_server.iter().map(|s| s.num_req).sum::<u64>());
    assert_eq!(totals.hit, per_server.iter().map(|s| s.num_hit).sum::<u64>());
    for layer in 1..=2 {
        let expected: u64 = per_server
            .iter()
            .map(|s| s.num_hit_per_layer[layer - 1])
            .sum();
        assert_eq!(fleet.layer(layer).hit, expected);
    }
    assert!(totals.hit > 0);
}
