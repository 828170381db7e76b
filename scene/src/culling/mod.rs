//! Visibility culling against a view frustum

pub mod dispatch;
pub mod frustum;
pub mod system;

// Re-export commonly used types
pub use dispatch::{DispatchError, InlineDispatcher, Job, JobDispatcher, RayonDispatcher};
pub use frustum::{Frustum, Sphere};
pub use system::{Culler, SphereCuller};
