//! Binary persistence for the transform hierarchy
//!
//! Layout: little-endian `i32` relation count, then `count` pairs of
//! `(i32 child, i32 parent)`, in exactly that order. There is no version
//! field; format changes are breaking.

use crate::core::entity::{EntityId, Universe};
use crate::core::hierarchy::Hierarchy;
use std::io::{Read, Write};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the binary hierarchy format.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Underlying stream failure, including truncation.
    #[error("hierarchy blob io: {0}")]
    Io(#[from] std::io::Error),
    /// The stored relation count is negative.
    #[error("invalid relation count {0}")]
    InvalidCount(i32),
    /// A stored handle is negative.
    #[error("invalid entity handle {0}")]
    InvalidHandle(i32),
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<(), BlobError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, BlobError> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(i32::from_le_bytes(buffer))
}

/// Write the parent relations of `hierarchy` to `writer`.
///
/// Pair order follows map iteration and is unspecified; readers must not
/// depend on it. Detached entities are roots by absence and are never
/// written.
pub fn write<W: Write>(hierarchy: &Hierarchy, mut writer: W) -> Result<(), BlobError> {
    let count = i32::try_from(hierarchy.len()).expect("relation count exceeds i32");
    write_i32(&mut writer, count)?;
    for (child, parent) in hierarchy.relations() {
        write_i32(&mut writer, child.raw())?;
        write_i32(&mut writer, parent.raw())?;
    }
    debug!(relations = count, "hierarchy blob written");
    Ok(())
}

/// Replay relations from `reader` into `hierarchy` through `set_parent`.
///
/// Every referenced handle must already have a valid world transform in
/// `universe`: local offsets are captured from current transforms during the
/// replay, so loading hierarchy state before transform state silently
/// produces wrong offsets rather than an error.
pub fn read<R: Read>(
    hierarchy: &mut Hierarchy,
    universe: &mut dyn Universe,
    mut reader: R,
) -> Result<(), BlobError> {
    let count = read_i32(&mut reader)?;
    if count < 0 {
        return Err(BlobError::InvalidCount(count));
    }
    for _ in 0..count {
        let child = read_i32(&mut reader)?;
        let parent = read_i32(&mut reader)?;
        if child < 0 {
            return Err(BlobError::InvalidHandle(child));
        }
        if parent < 0 {
            return Err(BlobError::InvalidHandle(parent));
        }
        hierarchy.set_parent(universe, EntityId::new(child), Some(EntityId::new(parent)));
    }
    debug!(relations = count, "hierarchy blob replayed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::SimpleUniverse;
    use glam::{Mat4, Vec3};
    use std::fs::File;
    use std::io::{Seek, SeekFrom};

    fn populated() -> (SimpleUniverse, Hierarchy) {
        let mut universe = SimpleUniverse::new();
        let root = universe.spawn(0, Mat4::IDENTITY);
        let left = universe.spawn(1, Mat4::from_translation(Vec3::X));
        let right = universe.spawn(2, Mat4::from_translation(Vec3::Y));
        let leaf = universe.spawn(3, Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0)));

        let mut hierarchy = Hierarchy::new();
        hierarchy.set_parent(&mut universe, left, Some(root));
        hierarchy.set_parent(&mut universe, right, Some(root));
        hierarchy.set_parent(&mut universe, leaf, Some(right));
        (universe, hierarchy)
    }

    fn assert_same_relations(a: &Hierarchy, b: &Hierarchy) {
        assert_eq!(a.len(), b.len());
        for (child, parent) in a.relations() {
            assert_eq!(b.parent(child), Some(parent));
        }
    }

    #[test]
    fn test_round_trip_through_memory() {
        let (mut universe, hierarchy) = populated();

        let mut bytes = Vec::new();
        write(&hierarchy, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + hierarchy.len() * 8);

        let mut restored = Hierarchy::new();
        read(&mut restored, &mut universe, bytes.as_slice()).unwrap();
        assert_same_relations(&hierarchy, &restored);
    }

    #[test]
    fn test_round_trip_through_file() {
        let (mut universe, hierarchy) = populated();

        let mut file: File = tempfile::tempfile().unwrap();
        write(&hierarchy, &mut file).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut restored = Hierarchy::new();
        read(&mut restored, &mut universe, &mut file).unwrap();
        assert_same_relations(&hierarchy, &restored);
    }

    #[test]
    fn test_empty_hierarchy_is_four_zero_bytes() {
        let hierarchy = Hierarchy::new();
        let mut bytes = Vec::new();
        write(&hierarchy, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_single_relation_layout() {
        let mut universe = SimpleUniverse::new();
        let parent = universe.spawn(7, Mat4::IDENTITY);
        let child = universe.spawn(260, Mat4::IDENTITY);

        let mut hierarchy = Hierarchy::new();
        hierarchy.set_parent(&mut universe, child, Some(parent));

        let mut bytes = Vec::new();
        write(&hierarchy, &mut bytes).unwrap();
        // count = 1, child = 260 = 0x104, parent = 7, all little-endian.
        assert_eq!(bytes, vec![1, 0, 0, 0, 4, 1, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn test_truncated_stream_is_io_error() {
        let mut universe = SimpleUniverse::new();
        let mut hierarchy = Hierarchy::new();
        let bytes = [1, 0, 0, 0, 5, 0];
        let result = read(&mut hierarchy, &mut universe, bytes.as_slice());
        assert!(matches!(result, Err(BlobError::Io(_))));
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let mut universe = SimpleUniverse::new();
        let mut hierarchy = Hierarchy::new();
        let bytes = (-1i32).to_le_bytes();
        let result = read(&mut hierarchy, &mut universe, bytes.as_slice());
        assert!(matches!(result, Err(BlobError::InvalidCount(-1))));
    }

    #[test]
    fn test_negative_handle_is_rejected() {
        let mut universe = SimpleUniverse::new();
        let mut hierarchy = Hierarchy::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&(-7i32).to_le_bytes());
        let result = read(&mut hierarchy, &mut universe, bytes.as_slice());
        assert!(matches!(result, Err(BlobError::InvalidHandle(-7))));
    }

    #[test]
    fn test_replay_restores_local_offsets() {
        let (mut universe, hierarchy) = populated();

        let mut bytes = Vec::new();
        write(&hierarchy, &mut bytes).unwrap();

        let mut restored = Hierarchy::new();
        read(&mut restored, &mut universe, bytes.as_slice()).unwrap();

        // The replayed store recaptures offsets from the live transforms, so
        // moving the root carries its children exactly as before.
        let root = EntityId::new(0);
        let left = EntityId::new(1);
        universe.set_world_transform(root, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        restored.process_moved(&mut universe);

        let left_position = universe.world_transform(left).w_axis.truncate();
        assert!((left_position - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-4);
    }
}
