//! Transform resolution
//!
//! Two passes per frame. The local pass writes `T * R * S` into every
//! Transform's `local_to_world`; the hierarchy pass then composes each parented
//! entity with its ancestors' local matrices. Both passes write through the
//! silent `get_mut` path so resolution never re-triggers transform observers.

use std::collections::HashSet;

use crate::ecs::components::{Parent, Transform};
use crate::ecs::{ComponentKind, ComponentStore, Entity};
use crate::foundation::math::Mat4;

/// Default bound on parent chain length
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 64;

/// Why a parent walk stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkFault {
    Cycle,
    TooDeep,
}

/// Compose `entity`'s matrix with every ancestor's local matrix.
///
/// The walk stops at the first ancestor lacking a Parent, or whose parent is
/// dead or has no Transform. A cycle or a chain longer than `max_depth` is a
/// data error: it is logged and the entity's own local matrix is returned.
pub fn world_matrix(store: &ComponentStore, entity: Entity, max_depth: usize) -> Mat4 {
    let Some(transform) = store.get::<Transform>(entity) else {
        return Mat4::identity();
    };
    let local = transform.local_matrix();
    match compose_ancestors(store, entity, local, max_depth, |t| t.local_matrix()) {
        Ok(matrix) => matrix,
        Err(fault) => {
            log::warn!("Parent chain of {:?} is broken ({:?}), using its local matrix", entity, fault);
            local
        }
    }
}

fn compose_ancestors(
    store: &ComponentStore,
    entity: Entity,
    local: Mat4,
    max_depth: usize,
    ancestor_matrix: impl Fn(&Transform) -> Mat4,
) -> Result<Mat4, WalkFault> {
    let mut world = local;
    let mut visited = HashSet::from([entity]);
    let mut current = entity;

    while let Some(parent) = store.get::<Parent>(current).map(|p| p.entity) {
        if !store.is_alive(parent) || parent.is_invalid() {
            break;
        }
        let Some(parent_transform) = store.get::<Transform>(parent) else {
            break;
        };
        if !visited.insert(parent) {
            return Err(WalkFault::Cycle);
        }
        if visited.len() > max_depth + 1 {
            return Err(WalkFault::TooDeep);
        }
        world = ancestor_matrix(parent_transform) * world;
        current = parent;
    }
    Ok(world)
}

/// Resolves local and parent-composed world matrices
#[derive(Debug, Clone)]
pub struct TransformSystem {
    max_depth: usize,
    resolved: Vec<(Entity, Mat4)>,
}

impl Default for TransformSystem {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HIERARCHY_DEPTH)
    }
}

impl TransformSystem {
    /// System bounding parent chains to `max_depth` ancestors
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            resolved: Vec::new(),
        }
    }

    /// Maximum parent chain length
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Write every Transform's local matrix into its `local_to_world`.
    /// Returns the number of transforms resolved.
    pub fn resolve_local(&mut self, store: &mut ComponentStore) -> usize {
        let entities = store.entities_of(ComponentKind::Transform).to_vec();
        for &entity in &entities {
            if let Some(transform) = store.get_mut::<Transform>(entity) {
                transform.local_to_world = transform.local_matrix();
            }
        }
        entities.len()
    }

    /// Compose parented entities with their ancestors.
    ///
    /// Must run after [`Self::resolve_local`]: every ancestor contributes the
    /// local matrix cached by that pass. Results are gathered first and written
    /// afterwards so no entity sees a partially updated ancestor.
    pub fn resolve_hierarchy(&mut self, store: &mut ComponentStore) -> usize {
        self.resolved.clear();

        for &entity in store.entities_of(ComponentKind::Parent) {
            let Some(transform) = store.get::<Transform>(entity) else {
                continue;
            };
            let local = transform.local_to_world;
            let world = match compose_ancestors(store, entity, local, self.max_depth, |t| t.local_to_world) {
                Ok(world) => world,
                Err(fault) => {
                    log::warn!("Parent chain of {:?} is broken ({:?}), using its local matrix", entity, fault);
                    local
                }
            };
            self.resolved.push((entity, world));
        }

        for (entity, world) in &self.resolved {
            if let Some(transform) = store.get_mut::<Transform>(*entity) {
                transform.local_to_world = *world;
            }
        }
        log::trace!("Resolved {} parented transforms", self.resolved.len());
        self.resolved.len()
    }

    /// Both passes in order; returns the number of transforms resolved
    pub fn resolve(&mut self, store: &mut ComponentStore) -> usize {
        let count = self.resolve_local(store);
        self.resolve_hierarchy(store);
        count
    }
}
