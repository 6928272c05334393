//! Request/hit counters for one server and for a whole fleet.

use parking_lot::Mutex;

use crate::traits::StatsSink;

/// Per-server counters. Layer ids are 1-based in every accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub server_id: u64,
    pub num_req: u64,
    pub num_hit: u64,
    pub num_req_per_layer: Vec<u64>,
    pub num_hit_per_layer: Vec<u64>,
    /// Evaluations that moved a capacity unit.
    pub boundary_shifts: u64,
    /// Evaluations rejected because both deltas shared a sign.
    pub rejected_evaluations: u64,
}

impl ServerStats {
    pub fn new(server_id: u64, num_layers: usize) -> Self {
        Self {
            server_id,
            num_req_per_layer: vec![0; num_layers],
            num_hit_per_layer: vec![0; num_layers],
            ..Self::default()
        }
    }

    /// Records one request on `layer_id`; the caller validates the index.
    pub(crate) fn record(&mut self, layer_id: usize, hit: bool) {
        let slot = layer_id - 1;
        self.num_req += 1;
        self.num_req_per_layer[slot] += 1;
        if hit {
            self.num_hit += 1;
            self.num_hit_per_layer[slot] += 1;
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        ratio(self.num_hit, self.num_req)
    }

    /// Hit ratio of one layer, `None` for an unknown layer.
    pub fn layer_hit_ratio(&self, layer_id: usize) -> Option<f64> {
        let slot = layer_id.checked_sub(1)?;
        let req = *self.num_req_per_layer.get(slot)?;
        let hit = *self.num_hit_per_layer.get(slot)?;
        Some(ratio(hit, req))
    }
}

fn ratio(hit: u64, req: u64) -> f64 {
    if req == 0 {
        0.0
    } else {
        hit as f64 / req as f64
    }
}

/// Counters for one layer across every server reporting to a [`FleetStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerCounters {
    pub req: u64,
    pub hit: u64,
}

/// Fleet-wide [`StatsSink`] shared by many servers.
///
/// Grows to fit whatever layer ids are reported.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use edgecache::server::FleetStats;
/// use edgecache::traits::StatsSink;
///
/// let fleet = Arc::new(FleetStats::new(2));
/// fleet.record(1, true);
/// fleet.record(2, false);
/// fleet.record(1, false);
///
/// assert_eq!(fleet.layer(1).req, 2);
/// assert_eq!(fleet.layer(1).hit, 1);
/// assert_eq!(fleet.totals().req, 3);
/// ```
#[derive(Debug, Default)]
pub struct FleetStats {
    layers: Mutex<Vec<LayerCounters>>,
}

impl FleetStats {
    pub fn new(num_layers: usize) -> Self {
        Self {
            layers: Mutex::new(vec![LayerCounters::default(); num_layers]),
        }
    }

    /// Counters for `layer_id`; zero for layers never reported.
    pub fn layer(&self, layer_id: usize) -> LayerCounters {
        let layers = self.layers.lock();
        layer_id
            .checked_sub(1)
            .and_then(|i| layers.get(i))
            .copied()
            .unwrap_or_default()
    }

    pub fn totals(&self) -> LayerCounters {
        self.layers
            .lock()
            .iter()
            .fold(LayerCounters::default(), |acc, c| LayerCounters {
                req: acc.req + c.req,
                hit: acc.hit + c.hit,
            })
    }

    pub fn snapshot(&self) -> Vec<LayerCounters> {
        self.layers.lock().clone()
    }

    pub fn reset(&self) {
        self.layers
            .lock()
            .iter_mut()
            .for_each(|c| *c = LayerCounters::default());
    }
}

impl StatsSink for FleetStats {
    fn record(&self, layer_id: usize, hit: bool) {
        let Some(slot) = layer_id.checked_sub(1) else {
            return;
        };
        let mut layers = self.layers.lock();
        if layers.len() <= slot {
            layers.resize(slot + 1, LayerCounters::default());
        }
        layers[slot].req += 1;
        if hit {
            layers[slot].hit += 1;
        }
    }
}
