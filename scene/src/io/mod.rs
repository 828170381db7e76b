//! Persistence for hierarchy state

pub mod blob;
pub mod snapshot;

// Re-export commonly used types
pub use blob::BlobError;
pub use snapshot::{HierarchySnapshot, SnapshotError};
