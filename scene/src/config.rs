//! Configuration types

use tracing::debug;

/// Tuning knobs for the culling engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CullingConfig {
    /// Number of spheres each dispatched job tests.
    pub chunk_size: usize,
    /// Dedicated worker count for dispatchers built from this config;
    /// `None` uses the process-global pool.
    pub worker_threads: Option<usize>,
}

impl CullingConfig {
    /// Create a config with custom tuning.
    ///
    /// Panics on a zero chunk size.
    pub fn new(chunk_size: usize, worker_threads: Option<usize>) -> Self {
        assert!(chunk_size > 0, "chunk_size must be at least 1");
        debug!(
            chunk_size,
            worker_threads = ?worker_threads,
            "creating culling config"
        );
        Self {
            chunk_size,
            worker_threads,
        }
    }
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            worker_threads: None,
        }
    }
}
