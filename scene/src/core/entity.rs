//! Entity handles and the universe boundary

use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Opaque handle for an entity owned by an external universe.
///
/// Handles are non-negative; the backing integer matches the persisted
/// hierarchy format. "No entity" is expressed as `Option<EntityId>` at API
/// boundaries rather than a reserved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(i32);

impl EntityId {
    /// Create a handle from a raw index.
    ///
    /// Panics when `raw` is negative.
    pub fn new(raw: i32) -> Self {
        assert!(raw >= 0, "entity handle must be non-negative, got {raw}");
        Self(raw)
    }

    /// The raw integer backing this handle.
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Narrow interface onto the externally-owned entity universe.
///
/// The hierarchy reads and writes world transforms through this trait and
/// consumes the move notifications the universe queues. Implementations must
/// queue one notification per [`set_world_transform`](Universe::set_world_transform)
/// call, observable through [`poll_moved`](Universe::poll_moved) in call
/// order.
pub trait Universe {
    /// Current world transform of `entity`.
    fn world_transform(&self, entity: EntityId) -> Mat4;

    /// Overwrite the world transform of `entity` and queue a move
    /// notification for it.
    fn set_world_transform(&mut self, entity: EntityId, transform: Mat4);

    /// Pop the oldest queued move notification, if any.
    fn poll_moved(&mut self) -> Option<EntityId>;
}

/// Minimal in-memory [`Universe`] used by tests and developer utilities.
#[derive(Debug, Default)]
pub struct SimpleUniverse {
    transforms: HashMap<EntityId, Mat4>,
    moved: VecDeque<EntityId>,
}

impl SimpleUniverse {
    /// Create an empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entity at the given world transform without queueing a move
    /// notification.
    pub fn spawn(&mut self, raw: i32, transform: Mat4) -> EntityId {
        let entity = EntityId::new(raw);
        self.transforms.insert(entity, transform);
        entity
    }

    /// Number of queued move notifications.
    pub fn pending_moves(&self) -> usize {
        self.moved.len()
    }
}

impl Universe for SimpleUniverse {
    fn world_transform(&self, entity: EntityId) -> Mat4 {
        self.transforms
            .get(&entity)
            .copied()
            .unwrap_or(Mat4::IDENTITY)
    }

    fn set_world_transform(&mut self, entity: EntityId, transform: Mat4) {
        self.transforms.insert(entity, transform);
        self.moved.push_back(entity);
    }

    fn poll_moved(&mut self) -> Option<EntityId> {
        self.moved.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_handle_round_trip() {
        let entity = EntityId::new(42);
        assert_eq!(entity.raw(), 42);
    }

    #[test]
    #[should_panic(expected = "entity handle must be non-negative")]
    fn test_negative_handle_rejected() {
        EntityId::new(-1);
    }

    #[test]
    fn test_unknown_entity_is_identity() {
        let universe = SimpleUniverse::new();
        assert_eq!(universe.world_transform(EntityId::new(7)), Mat4::IDENTITY);
    }

    #[test]
    fn test_spawn_does_not_notify() {
        let mut universe = SimpleUniverse::new();
        universe.spawn(0, Mat4::from_translation(Vec3::X));
        assert_eq!(universe.pending_moves(), 0);
        assert_eq!(universe.poll_moved(), None);
    }

    #[test]
    fn test_moves_are_queued_in_order() {
        let mut universe = SimpleUniverse::new();
        let a = universe.spawn(0, Mat4::IDENTITY);
        let b = universe.spawn(1, Mat4::IDENTITY);

        universe.set_world_transform(b, Mat4::from_translation(Vec3::Y));
        universe.set_world_transform(a, Mat4::from_translation(Vec3::X));

        assert_eq!(universe.poll_moved(), Some(b));
        assert_eq!(universe.poll_moved(), Some(a));
        assert_eq!(universe.poll_moved(), None);

        let moved = universe.world_transform(a).w_axis.truncate();
        assert_eq!(moved, Vec3::X);
    }
}
