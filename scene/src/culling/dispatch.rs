//! Job dispatch for parallel culling

use crate::config::CullingConfig;
use thiserror::Error;

/// A unit of work submitted to a dispatcher.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Black-box executor for fire-and-forget work items.
///
/// Submitted jobs run to completion; there is no cancellation or timeout.
/// Completion is observed by the submitter through whatever channel the job
/// itself reports on.
pub trait JobDispatcher: Send + Sync {
    /// Queue `job` for execution, possibly on another thread.
    fn execute(&self, job: Job);
}

/// Errors from building a dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dedicated worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Dispatcher backed by rayon.
///
/// Uses the process-global pool by default;
/// [`with_threads`](RayonDispatcher::with_threads) builds a dedicated pool
/// instead.
#[derive(Default)]
pub struct RayonDispatcher {
    pool: Option<rayon::ThreadPool>,
}

impl RayonDispatcher {
    /// Dispatcher over the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Dispatcher over a dedicated pool with `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, DispatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(Self { pool: Some(pool) })
    }

    /// Build from a culling config: a dedicated pool when `worker_threads`
    /// is set, the global pool otherwise.
    pub fn from_config(config: &CullingConfig) -> Result<Self, DispatchError> {
        match config.worker_threads {
            Some(threads) => Self::with_threads(threads),
            None => Ok(Self::new()),
        }
    }
}

impl JobDispatcher for RayonDispatcher {
    fn execute(&self, job: Job) {
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
    }
}

/// Runs every job on the calling thread.
///
/// For tests and single-threaded hosts; join semantics become trivial
/// because the work is already done when `execute` returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl JobDispatcher for InlineDispatcher {
    fn execute(&self, job: Job) {
        job();
    }
}
