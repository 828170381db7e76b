//! Parent/child transform hierarchy
//!
//! Maintains a forest of parent/child relations over externally-owned
//! entities and keeps the cached parent-relative offsets valid as entities
//! move. A moving parent pushes its world transform one level down to its
//! direct children; propagation is never transitive within a single
//! notification.

use crate::core::entity::{EntityId, Universe};
use crate::core::events::{ListenerId, ListenerSet};
use glam::Mat4;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// A child relation together with its cached parent-relative transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Child {
    /// The child entity.
    pub entity: EntityId,
    /// Maps the child's local space into its parent's space; captured at the
    /// last [`Hierarchy::set_parent`] or the last correction after an
    /// external move of the child.
    pub local_transform: Mat4,
}

/// Payload delivered to parent-change listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentChanged {
    /// The re-parented entity.
    pub child: EntityId,
    /// Its new parent; `None` when it became a root.
    pub parent: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationState {
    Idle,
    Propagating,
}

/// Forest of parent/child relations with cached local offsets.
///
/// Single-threaded by contract: all mutation and listener delivery happen on
/// one logical thread. Move notifications should be delivered through
/// [`process_moved`](Hierarchy::process_moved) so that notifications raised
/// by the hierarchy's own propagation writes are recognized and dropped;
/// delivering a queued notification through any other path loses that
/// bookkeeping.
pub struct Hierarchy {
    parents: HashMap<EntityId, EntityId>,
    children: HashMap<EntityId, Vec<Child>>,
    parent_changed: ListenerSet<ParentChanged>,
    state: PropagationState,
    // Entities whose queued move notification was raised by our own
    // propagation writes; those notifications are dropped on delivery.
    echoes: HashSet<EntityId>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self {
            parents: HashMap::new(),
            children: HashMap::new(),
            parent_changed: ListenerSet::new(),
            state: PropagationState::Idle,
            echoes: HashSet::new(),
        }
    }

    /// Re-parent `child` under `parent`, or detach it when `parent` is
    /// `None`.
    ///
    /// Any current relation is removed first. On attach, the current world
    /// transforms of both entities are read to capture the child's
    /// parent-relative offset, so both must already be valid in `universe`.
    /// Registered parent-change listeners run synchronously, in registration
    /// order, before this call returns.
    ///
    /// Panics when the stored relations are inconsistent (the child is
    /// missing from its recorded parent's children list).
    pub fn set_parent(
        &mut self,
        universe: &mut dyn Universe,
        child: EntityId,
        parent: Option<EntityId>,
    ) {
        if let Some(old) = self.parents.remove(&child) {
            let siblings = self.children.get_mut(&old).unwrap_or_else(|| {
                panic!(
                    "hierarchy inconsistent: no children list for {} while {} points at it",
                    old.raw(),
                    child.raw()
                )
            });
            let position = siblings
                .iter()
                .position(|record| record.entity == child)
                .unwrap_or_else(|| {
                    panic!(
                        "hierarchy inconsistent: {} missing from children of {}",
                        child.raw(),
                        old.raw()
                    )
                });
            siblings.remove(position);
            trace!(child = child.raw(), old_parent = old.raw(), "detached");
        }

        if let Some(parent) = parent {
            self.parents.insert(child, parent);
            let local =
                universe.world_transform(parent).inverse() * universe.world_transform(child);
            self.children.entry(parent).or_default().push(Child {
                entity: child,
                local_transform: local,
            });
            debug!(child = child.raw(), parent = parent.raw(), "parent set");
        } else {
            debug!(child = child.raw(), "parent cleared");
        }

        self.parent_changed.emit(&ParentChanged { child, parent });
    }

    /// Parent of `child`, or `None` for roots.
    pub fn parent(&self, child: EntityId) -> Option<EntityId> {
        self.parents.get(&child).copied()
    }

    /// Direct children of `parent` with their cached local transforms.
    ///
    /// Empty when `parent` has no children. The slice borrows from the
    /// hierarchy and cannot be held across the next mutation.
    pub fn children(&self, parent: EntityId) -> &[Child] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// Register a parent-change listener; the token removes it again.
    pub fn on_parent_changed(
        &mut self,
        listener: impl FnMut(&ParentChanged) + 'static,
    ) -> ListenerId {
        self.parent_changed.register(listener)
    }

    /// Remove a previously registered listener; `false` when the token is
    /// unknown.
    pub fn remove_parent_changed(&mut self, id: ListenerId) -> bool {
        self.parent_changed.unregister(id)
    }

    /// Handle a move notification for `entity`.
    ///
    /// Pushes `entity`'s world transform one level down to its direct
    /// children, then re-captures `entity`'s own parent-relative offset so a
    /// direct external mutation keeps the cached offset correct. The child
    /// writes queue further notifications in the universe; those are echoes
    /// of this call and are dropped when delivered, so a single external
    /// move never cascades past the first level.
    pub fn entity_moved(&mut self, universe: &mut dyn Universe, entity: EntityId) {
        if self.state == PropagationState::Propagating {
            return;
        }
        if self.echoes.remove(&entity) {
            trace!(entity = entity.raw(), "dropped echo notification");
            return;
        }
        self.state = PropagationState::Propagating;

        if let Some(records) = self.children.get(&entity) {
            if !records.is_empty() {
                let parent_world = universe.world_transform(entity);
                for record in records {
                    universe
                        .set_world_transform(record.entity, parent_world * record.local_transform);
                    self.echoes.insert(record.entity);
                }
                trace!(
                    entity = entity.raw(),
                    children = records.len(),
                    "propagated move"
                );
            }
        }

        if let Some(parent) = self.parents.get(&entity).copied() {
            let inverse_parent = universe.world_transform(parent).inverse();
            let world = universe.world_transform(entity);
            if let Some(record) = self
                .children
                .get_mut(&parent)
                .and_then(|records| records.iter_mut().find(|record| record.entity == entity))
            {
                record.local_transform = inverse_parent * world;
            }
        }

        self.state = PropagationState::Idle;
    }

    /// Drain the universe's queued move notifications through
    /// [`entity_moved`](Hierarchy::entity_moved).
    pub fn process_moved(&mut self, universe: &mut dyn Universe) {
        while let Some(entity) = universe.poll_moved() {
            self.entity_moved(universe, entity);
        }
    }

    /// Number of stored parent relations.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether any relation is stored.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// All `(child, parent)` pairs in unspecified order.
    pub(crate) fn relations(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.parents.iter().map(|(child, parent)| (*child, *parent))
    }
}
