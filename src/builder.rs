//! Eviction-algorithm selection and layer construction.
//!
//! Hides concrete engine types behind `Box<dyn CacheLayer>` so servers can be
//! assembled from a selector and a handful of parameters.
//!
//! ## Example
//!
//! ```rust
//! use edgecache::builder::{EvictionAlgorithm, LayerBuilder};
//! use edgecache::key::{CacheRequest, KeyKind};
//!
//! let algorithm: EvictionAlgorithm = "lru".parse().unwrap();
//! let mut layer = LayerBuilder::new(100, KeyKind::Int64).build(algorithm);
//! assert!(!layer.add_element(&CacheRequest::new(1u64)));
//! assert!(layer.add_element(&CacheRequest::new(1u64)));
//!
//! assert!("arc".parse::<EvictionAlgorithm>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::key::KeyKind;
use crate::policy::{FifoLayer, LruLayer};
use crate::traits::CacheLayer;

/// Available eviction engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionAlgorithm {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// First In, First Out eviction.
    Fifo,
}

impl EvictionAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            EvictionAlgorithm::Lru => "lru",
            EvictionAlgorithm::Fifo => "fifo",
        }
    }
}

impl FromStr for EvictionAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionAlgorithm::Lru),
            "fifo" => Ok(EvictionAlgorithm::Fifo),
            _ => Err(ConfigError::new(format!(
                "eviction algorithm {:?} is not supported",
                s
            ))),
        }
    }
}

impl fmt::Display for EvictionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder for boxed cache layers.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    size: usize,
    key_kind: KeyKind,
    block_size: Option<u64>,
}

impl LayerBuilder {
    /// Create a builder for a layer holding `size` distinct keys.
    pub fn new(size: usize, key_kind: KeyKind) -> Self {
        Self {
            size,
            key_kind,
            block_size: None,
        }
    }

    pub fn block_size(mut self, block_size: Option<u64>) -> Self {
        self.block_size = block_size;
        self
    }

    /// Build a layer running `algorithm`.
    pub fn build(self, algorithm: EvictionAlgorithm) -> Box<dyn CacheLayer> {
        match algorithm {
            EvictionAlgorithm::Lru => Box::new(LruLayer::with_block_size(
                self.size,
                self.key_kind,
                self.block_size,
            )),
            EvictionAlgorithm::Fifo => Box::new(FifoLayer::with_block_size(
                self.size,
                self.key_kind,
                self.block_size,
            )),
        }
    }
}
