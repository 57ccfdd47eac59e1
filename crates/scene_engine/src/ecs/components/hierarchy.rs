//! Parent/child hierarchy components
//!
//! `Parent` is authored by gameplay code. `Children` is maintained by the
//! hierarchy hooks so that every `Parent` has exactly one back-reference.

use crate::ecs::{Component, ComponentKind, Entity};

/// Number of child slots per entity
pub const CHILDREN_CAPACITY: usize = 16;

/// Reference to the parent entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parent {
    /// Parent entity
    pub entity: Entity,
}

impl Parent {
    /// Create a parent reference
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}

impl Component for Parent {
    const KIND: ComponentKind = ComponentKind::Parent;
}

/// Fixed-capacity list of child references; free slots hold [`Entity::INVALID`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Children {
    slots: [Entity; CHILDREN_CAPACITY],
}

impl Default for Children {
    fn default() -> Self {
        Self {
            slots: [Entity::INVALID; CHILDREN_CAPACITY],
        }
    }
}

impl Component for Children {
    const KIND: ComponentKind = ComponentKind::Children;
}

impl Children {
    /// Store `child` in the first free slot
    ///
    /// Returns false when the array is full. Linking a child that is already
    /// present is a no-op that succeeds.
    pub fn link(&mut self, child: Entity) -> bool {
        if self.contains(child) {
            return true;
        }
        match self.slots.iter_mut().find(|slot| slot.is_invalid()) {
            Some(slot) => {
                *slot = child;
                true
            }
            None => false,
        }
    }

    /// Clear the slot holding `child`; returns false if it was not present
    pub fn unlink(&mut self, child: Entity) -> bool {
        match self.slots.iter_mut().find(|slot| **slot == child) {
            Some(slot) => {
                *slot = Entity::INVALID;
                true
            }
            None => false,
        }
    }

    /// Whether `child` occupies a slot
    pub fn contains(&self, child: Entity) -> bool {
        !child.is_invalid() && self.slots.contains(&child)
    }

    /// Occupied slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().copied().filter(|slot| !slot.is_invalid())
    }

    /// Number of linked children
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no child is linked
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Raw slot array, including free slots
    pub fn slots(&self) -> &[Entity; CHILDREN_CAPACITY] {
        &self.slots
    }
}
