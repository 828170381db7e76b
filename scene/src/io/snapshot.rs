//! JSON snapshots of the transform hierarchy
//!
//! Human-readable companion to the binary blob format, for tooling and
//! debugging. Same replay semantics: relations go back in through
//! `set_parent`, so world transforms must be loaded first.

use crate::core::entity::{EntityId, Universe};
use crate::core::hierarchy::Hierarchy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// One parent relation in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Raw child handle.
    pub child: i32,
    /// Raw parent handle.
    pub parent: i32,
}

/// Serializable capture of the hierarchy's parent relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchySnapshot {
    /// Relations in unspecified order.
    pub relations: Vec<Relation>,
}

/// Errors from snapshot save/load.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File could not be read or written.
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot JSON is malformed.
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored handle is negative.
    #[error("invalid entity handle {0}")]
    InvalidHandle(i32),
}

impl HierarchySnapshot {
    /// Capture the current parent relations of `hierarchy`.
    pub fn capture(hierarchy: &Hierarchy) -> Self {
        let relations = hierarchy
            .relations()
            .map(|(child, parent)| Relation {
                child: child.raw(),
                parent: parent.raw(),
            })
            .collect();
        Self { relations }
    }

    /// Replay the captured relations into `hierarchy` through `set_parent`.
    ///
    /// Handles are validated up front, so a bad snapshot fails before any
    /// relation is applied. Referenced entities must already hold valid
    /// world transforms in `universe`.
    pub fn apply(
        &self,
        hierarchy: &mut Hierarchy,
        universe: &mut dyn Universe,
    ) -> Result<(), SnapshotError> {
        for relation in &self.relations {
            if relation.child < 0 {
                return Err(SnapshotError::InvalidHandle(relation.child));
            }
            if relation.parent < 0 {
                return Err(SnapshotError::InvalidHandle(relation.parent));
            }
        }
        for relation in &self.relations {
            hierarchy.set_parent(
                universe,
                EntityId::new(relation.child),
                Some(EntityId::new(relation.parent)),
            );
        }
        debug!(relations = self.relations.len(), "snapshot applied");
        Ok(())
    }

    /// Serialize to pretty JSON at `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!(
            path = ?path.as_ref(),
            relations = self.relations.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Load a snapshot from `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path.as_ref())?;
        let snapshot: Self = serde_json::from_str(&json)?;
        debug!(
            path = ?path.as_ref(),
            relations = snapshot.relations.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::SimpleUniverse;
    use glam::{Mat4, Vec3};

    fn populated() -> (SimpleUniverse, Hierarchy) {
        let mut universe = SimpleUniverse::new();
        let root = universe.spawn(0, Mat4::IDENTITY);
        let a = universe.spawn(1, Mat4::from_translation(Vec3::X));
        let b = universe.spawn(2, Mat4::from_translation(Vec3::Y));

        let mut hierarchy = Hierarchy::new();
        hierarchy.set_parent(&mut universe, a, Some(root));
        hierarchy.set_parent(&mut universe, b, Some(a));
        (universe, hierarchy)
    }

    #[test]
    fn test_capture_apply_round_trip() {
        let (mut universe, hierarchy) = populated();
        let snapshot = HierarchySnapshot::capture(&hierarchy);
        assert_eq!(snapshot.relations.len(), 2);

        let mut restored = Hierarchy::new();
        snapshot.apply(&mut restored, &mut universe).unwrap();

        for (child, parent) in hierarchy.relations() {
            assert_eq!(restored.parent(child), Some(parent));
        }
    }

    #[test]
    fn test_file_round_trip() {
        let (mut universe, hierarchy) = populated();
        let snapshot = HierarchySnapshot::capture(&hierarchy);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hierarchy.json");
        snapshot.save_to_file(&path).unwrap();

        let loaded = HierarchySnapshot::load_from_file(&path).unwrap();
        let mut restored = Hierarchy::new();
        loaded.apply(&mut restored, &mut universe).unwrap();
        assert_eq!(restored.len(), hierarchy.len());
    }

    #[test]
    fn test_negative_handle_fails_before_applying() {
        let mut universe = SimpleUniverse::new();
        let mut hierarchy = Hierarchy::new();

        let snapshot = HierarchySnapshot {
            relations: vec![
                Relation { child: 1, parent: 0 },
                Relation {
                    child: 2,
                    parent: -1,
                },
            ],
        };

        let result = snapshot.apply(&mut hierarchy, &mut universe);
        assert!(matches!(result, Err(SnapshotError::InvalidHandle(-1))));
        // Validation runs before replay; nothing was applied.
        assert!(hierarchy.is_empty());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = HierarchySnapshot::load_from_file(&path);
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = HierarchySnapshot::load_from_file("does/not/exist.json");
        assert!(matches!(result, Err(SnapshotError::Io(_))));
    }
}
