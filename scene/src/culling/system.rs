//! Sphere storage and frustum culling, synchronous and dispatched

use crate::config::CullingConfig;
use crate::culling::dispatch::JobDispatcher;
use crate::culling::frustum::{Frustum, Sphere};
use glam::Vec3;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use tracing::{debug, error};

/// Public contract of a visibility culler.
///
/// One concrete implementation exists ([`SphereCuller`]); the trait keeps the
/// job dispatcher injectable and lets hosts stub the whole engine out.
pub trait Culler {
    /// Append one sphere at `slot`, which must equal the next free slot.
    ///
    /// The slot number *is* the storage index used by the update calls and
    /// reported in results; a mismatched `slot` is a fatal logic error.
    fn add_static(&mut self, sphere: Sphere, slot: usize);

    /// Bulk-append spheres; slots are assigned by position.
    fn insert(&mut self, spheres: &[Sphere]);

    /// Replace the radius of the sphere at `slot`.
    ///
    /// Panics when `slot` is out of range.
    fn update_bounding_radius(&mut self, radius: f32, slot: usize);

    /// Replace the center of the sphere at `slot`.
    ///
    /// Panics when `slot` is out of range.
    fn update_bounding_position(&mut self, position: Vec3, slot: usize);

    /// Test every stored sphere against `frustum` on the calling thread,
    /// overwriting the synchronous result buffer. The dispatched-path
    /// buffer is untouched.
    fn cull_to_frustum(&mut self, frustum: &Frustum);

    /// Dispatch the same test in chunks and return without waiting.
    ///
    /// At most one dispatched cull may be in flight per culler; re-issuing
    /// before joining through [`result_async`](Culler::result_async) is a
    /// fatal logic error. Mutating the sphere set while the cull is in
    /// flight violates the caller contract (debug-asserted); workers read a
    /// snapshot, so even a violating program stays memory-safe.
    fn cull_to_frustum_async(&mut self, frustum: &Frustum);

    /// Slot indices surviving the last synchronous cull, unordered.
    fn result(&self) -> &[usize];

    /// Join any in-flight dispatched cull, then return its surviving slots.
    ///
    /// Blocks until every outstanding chunk has reported. With nothing in
    /// flight the previous buffer is returned unchanged, possibly stale or
    /// empty.
    fn result_async(&mut self) -> &[usize];

    /// Read-only view of the stored spheres; correlating slots with caller
    /// metadata is the caller's responsibility.
    fn spheres(&self) -> &[Sphere];
}

struct PendingCull {
    results: Receiver<Vec<usize>>,
    chunks: usize,
}

/// Dense sphere set culled against a frustum through an injected dispatcher.
///
/// Synchronous and dispatched culls keep disjoint result buffers so
/// interleaved use cannot corrupt either path's last answer.
pub struct SphereCuller {
    dispatcher: Arc<dyn JobDispatcher>,
    spheres: Arc<Vec<Sphere>>,
    sync_results: Vec<usize>,
    async_results: Vec<usize>,
    pending: Option<PendingCull>,
    chunk_size: usize,
}

impl SphereCuller {
    /// Culler with default tuning.
    pub fn new(dispatcher: Arc<dyn JobDispatcher>) -> Self {
        Self::with_config(dispatcher, &CullingConfig::default())
    }

    /// Culler tuned by `config`.
    pub fn with_config(dispatcher: Arc<dyn JobDispatcher>, config: &CullingConfig) -> Self {
        assert!(config.chunk_size > 0, "chunk_size must be at least 1");
        Self {
            dispatcher,
            spheres: Arc::new(Vec::new()),
            sync_results: Vec::new(),
            async_results: Vec::new(),
            pending: None,
            chunk_size: config.chunk_size,
        }
    }

    /// Number of stored spheres.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Whether any sphere is stored.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    fn spheres_mut(&mut self) -> &mut Vec<Sphere> {
        debug_assert!(
            self.pending.is_none(),
            "sphere set mutated while a dispatched cull is in flight"
        );
        Arc::make_mut(&mut self.spheres)
    }
}

impl Culler for SphereCuller {
    fn add_static(&mut self, sphere: Sphere, slot: usize) {
        let next = self.spheres.len();
        assert!(
            slot == next,
            "slot {slot} does not address the next free slot {next}"
        );
        self.spheres_mut().push(sphere);
    }

    fn insert(&mut self, spheres: &[Sphere]) {
        self.spheres_mut().extend_from_slice(spheres);
    }

    fn update_bounding_radius(&mut self, radius: f32, slot: usize) {
        let len = self.spheres.len();
        assert!(slot < len, "sphere slot {slot} out of range ({len} stored)");
        self.spheres_mut()[slot].radius = radius;
    }

    fn update_bounding_position(&mut self, position: Vec3, slot: usize) {
        let len = self.spheres.len();
        assert!(slot < len, "sphere slot {slot} out of range ({len} stored)");
        self.spheres_mut()[slot].center = position;
    }

    fn cull_to_frustum(&mut self, frustum: &Frustum) {
        self.sync_results.clear();
        for (slot, sphere) in self.spheres.iter().enumerate() {
            if frustum.contains_sphere(sphere) {
                self.sync_results.push(slot);
            }
        }
        debug!(
            visible = self.sync_results.len(),
            culled = self.spheres.len() - self.sync_results.len(),
            "synchronous cull complete"
        );
    }

    fn cull_to_frustum_async(&mut self, frustum: &Frustum) {
        assert!(
            self.pending.is_none(),
            "dispatched cull already in flight; join through result_async first"
        );

        let frustum = *frustum;
        let total = self.spheres.len();
        let chunks = total.div_ceil(self.chunk_size);
        let (tx, rx) = mpsc::channel();

        for chunk in 0..chunks {
            let start = chunk * self.chunk_size;
            let end = (start + self.chunk_size).min(total);
            let spheres = Arc::clone(&self.spheres);
            let tx = tx.clone();
            self.dispatcher.execute(Box::new(move || {
                let mut hits = Vec::new();
                for (offset, sphere) in spheres[start..end].iter().enumerate() {
                    if frustum.contains_sphere(sphere) {
                        hits.push(start + offset);
                    }
                }
                let _ = tx.send(hits);
            }));
        }

        debug!(spheres = total, chunks, "dispatched cull");
        self.pending = Some(PendingCull { results: rx, chunks });
    }

    fn result(&self) -> &[usize] {
        &self.sync_results
    }

    fn result_async(&mut self) -> &[usize] {
        if let Some(pending) = self.pending.take() {
            self.async_results.clear();
            for _ in 0..pending.chunks {
                match pending.results.recv() {
                    Ok(mut hits) => self.async_results.append(&mut hits),
                    Err(err) => {
                        error!(error = %err, "culling worker dropped its result channel");
                        break;
                    }
                }
            }
            debug!(visible = self.async_results.len(), "dispatched cull joined");
        }
        &self.async_results
    }

    fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }
}
