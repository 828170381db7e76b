//! Scene-graph and spatial-visibility layer
//!
//! This crate provides a transform hierarchy that keeps child world
//! transforms consistent with a moving parent, and a sphere-vs-frustum
//! culling engine producing visible slot sets synchronously or through a
//! parallel job dispatch.

pub mod config;
pub mod core;
pub mod culling;
pub mod io;

// Re-export commonly used types
pub mod prelude {
    // Hierarchy types
    pub use crate::core::{
        Child, EntityId, Hierarchy, ListenerId, ParentChanged, SimpleUniverse, Universe,
    };

    // Culling types
    pub use crate::culling::{
        Culler, Frustum, InlineDispatcher, JobDispatcher, RayonDispatcher, Sphere, SphereCuller,
    };

    // Config types
    pub use crate::config::CullingConfig;

    // IO types
    pub use crate::io::{BlobError, HierarchySnapshot, SnapshotError};

    // Math types
    pub use glam::{Mat4, Quat, Vec3, Vec4};
}

/// Initialize logging for the host process
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
