//! # Engine Configuration
//!
//! Tunables for the terrain core, deserializable from JSON so a host
//! application can ship a config file without recompiling. Every field has
//! a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a `World` and its remeshing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The shared terrain seed; generation is a pure function of this.
    pub seed: u32,

    /// Maximum number of chunks kept resident before distance/LRU eviction
    /// starts disposing the least recently used ones.
    pub max_resident_chunks: usize,

    /// Chunks within this radius (in chunks) of the viewer are never
    /// evicted, regardless of how stale their LRU slot is.
    pub keep_radius: i32,

    /// Half-extent of the world-space grid scanned for the spawn point.
    pub spawn_probe_radius: i32,

    /// Stride of the spawn probe grid, in blocks.
    pub spawn_probe_step: i32,

    /// Fixed remesh worker count. `None` derives it from the host's
    /// available parallelism; either way it is clamped to a small range.
    pub worker_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: 1337,
            max_resident_chunks: 512,
            keep_radius: 8,
            spawn_probe_radius: 32,
            spawn_probe_step: 4,
            worker_threads: None,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// # Arguments
    /// * `json` - A JSON object; absent fields fall back to their defaults
    ///
    /// # Returns
    /// The parsed configuration, or the underlying parse error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
