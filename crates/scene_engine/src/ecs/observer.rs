//! Change observers
//!
//! An observer collects the entities that recently matched its trigger. The
//! collection is an ordered set: re-triggering an entity that is already
//! pending does not duplicate it. Consumers drain the set once per frame.

use std::collections::HashSet;

use super::{ComponentKind, Entity, KindSet};

/// Handle to an observer registered on a [`crate::ecs::ComponentStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) usize);

/// What an observer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Entity starts satisfying "has every kind in `all`"; fires again only after
    /// it stops satisfying and re-enters
    Group {
        /// Required kinds
        all: KindSet,
    },
    /// A component of `kind` is created on an entity lacking every kind in `without`
    Created {
        /// Observed kind
        kind: ComponentKind,
        /// Kinds that suppress the trigger when present at creation time
        without: KindSet,
    },
    /// A component of `kind` is updated on an entity that has every kind in `with`
    Updated {
        /// Observed kind
        kind: ComponentKind,
        /// Kinds that must be present for the update to count
        with: KindSet,
    },
}

impl Trigger {
    /// Group trigger over a kind set
    pub fn group(all: impl Into<KindSet>) -> Self {
        Self::Group { all: all.into() }
    }

    /// Creation trigger for a single kind
    pub fn created(kind: ComponentKind) -> Self {
        Self::Created { kind, without: KindSet::empty() }
    }

    /// Update trigger for a single kind
    pub fn updated(kind: ComponentKind) -> Self {
        Self::Updated { kind, with: KindSet::empty() }
    }

    /// Exclude entities having any of `kinds` (creation triggers only)
    pub fn without(self, kinds: impl Into<KindSet>) -> Self {
        match self {
            Self::Created { kind, without } => Self::Created { kind, without: without | kinds.into() },
            other => other,
        }
    }

    /// Require `kinds` to be present (update triggers only)
    pub fn with(self, kinds: impl Into<KindSet>) -> Self {
        match self {
            Self::Updated { kind, with } => Self::Updated { kind, with: with | kinds.into() },
            other => other,
        }
    }
}

/// Insertion-ordered set of entities without duplicates
#[derive(Debug, Default, Clone)]
pub struct EntitySet {
    order: Vec<Entity>,
    members: HashSet<Entity>,
}

impl EntitySet {
    /// Insert, returning false if already present
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.members.insert(entity) {
            self.order.push(entity);
            true
        } else {
            false
        }
    }

    /// Remove, returning false if absent
    pub fn remove(&mut self, entity: Entity) -> bool {
        if self.members.remove(&entity) {
            self.order.retain(|e| *e != entity);
            true
        } else {
            false
        }
    }

    /// Membership test
    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Take every entry, leaving the set empty
    pub fn drain(&mut self) -> Vec<Entity> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }
}

/// A registered observer and its pending entities
#[derive(Debug)]
pub struct Observer {
    trigger: Trigger,
    pending: EntitySet,
    inside: HashSet<Entity>,
}

impl Observer {
    pub(crate) fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            pending: EntitySet::default(),
            inside: HashSet::new(),
        }
    }

    /// The trigger this observer was registered with
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Entities collected since the last drain
    pub fn pending(&self) -> &EntitySet {
        &self.pending
    }

    pub(crate) fn drain(&mut self) -> Vec<Entity> {
        self.pending.drain()
    }

    /// A component of `kind` was added or removed; `mask` is the entity's mask afterwards
    pub(crate) fn on_membership_changed(&mut self, entity: Entity, kind: ComponentKind, mask: KindSet, added: bool) {
        match self.trigger {
            Trigger::Group { all } => {
                if !all.contains(kind.set()) {
                    return;
                }
                if mask.contains(all) {
                    if self.inside.insert(entity) {
                        self.pending.insert(entity);
                    }
                } else {
                    self.inside.remove(&entity);
                    self.pending.remove(entity);
                }
            }
            Trigger::Created { kind: observed, without } => {
                if observed != kind {
                    return;
                }
                if added {
                    if !mask.intersects(without) {
                        self.pending.insert(entity);
                    }
                } else {
                    self.pending.remove(entity);
                }
            }
            Trigger::Updated { kind: observed, .. } => {
                if observed == kind && !added {
                    self.pending.remove(entity);
                }
            }
        }
    }

    /// A component of `kind` was updated; `mask` is the entity's current mask
    pub(crate) fn on_updated(&mut self, entity: Entity, kind: ComponentKind, mask: KindSet) {
        if let Trigger::Updated { kind: observed, with } = self.trigger {
            if observed == kind && mask.contains(with) {
                self.pending.insert(entity);
            }
        }
    }

    pub(crate) fn forget(&mut self, entity: Entity) {
        self.pending.remove(entity);
        self.inside.remove(&entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_set_dedups_and_keeps_order() {
        let mut set = EntitySet::default();
        let a = Entity::new(1, 0);
        let b = Entity::new(2, 0);
        assert!(set.insert(b));
        assert!(set.insert(a));
        assert!(!set.insert(b));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(set.drain(), vec![b, a]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_group_fires_once_per_entry() {
        let all = KindSet::TRANSFORM | KindSet::COLLIDER;
        let mut observer = Observer::new(Trigger::group(all));
        let entity = Entity::new(1, 0);

        observer.on_membership_changed(entity, ComponentKind::Transform, KindSet::TRANSFORM, true);
        assert!(observer.pending().is_empty());

        observer.on_membership_changed(entity, ComponentKind::Collider, all, true);
        assert_eq!(observer.drain(), vec![entity]);

        // Unrelated kind added while inside: no re-fire
        observer.on_membership_changed(entity, ComponentKind::Name, all | KindSet::NAME, true);
        observer.on_membership_changed(entity, ComponentKind::Collider, all, true);
        assert!(observer.pending().is_empty());

        // Leave and re-enter
        observer.on_membership_changed(entity, ComponentKind::Collider, KindSet::TRANSFORM, false);
        observer.on_membership_changed(entity, ComponentKind::Collider, all, true);
        assert_eq!(observer.drain(), vec![entity]);
    }

    #[test]
    fn test_created_respects_exclusion() {
        let mut observer = Observer::new(
            Trigger::created(ComponentKind::Collider).without(ComponentKind::RigidBody),
        );
        let plain = Entity::new(1, 0);
        let dynamic = Entity::new(2, 0);

        observer.on_membership_changed(plain, ComponentKind::Collider, KindSet::COLLIDER, true);
        observer.on_membership_changed(
            dynamic,
            ComponentKind::Collider,
            KindSet::COLLIDER | KindSet::RIGID_BODY,
            true,
        );
        assert_eq!(observer.drain(), vec![plain]);
    }

    #[test]
    fn test_updated_requires_companion_kinds() {
        let mut observer = Observer::new(
            Trigger::updated(ComponentKind::Transform).with(ComponentKind::PhysicsBody),
        );
        let entity = Entity::new(1, 0);

        observer.on_updated(entity, ComponentKind::Transform, KindSet::TRANSFORM);
        assert!(observer.pending().is_empty());

        let mask = KindSet::TRANSFORM | KindSet::PHYSICS_BODY;
        observer.on_updated(entity, ComponentKind::Transform, mask);
        observer.on_updated(entity, ComponentKind::Transform, mask);
        assert_eq!(observer.drain(), vec![entity]);
    }
}
