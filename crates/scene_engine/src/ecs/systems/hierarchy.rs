//! Parent/Children synchronization
//!
//! Hooks on the `Parent` kind keep every parent's `Children` array holding
//! exactly one back-reference per child.

use crate::ecs::components::{Children, Parent};
use crate::ecs::{Component, ComponentStore, EcsError, Entity};

/// Register the Parent lifecycle hooks on `store`
pub fn register(store: &mut ComponentStore) -> Result<(), EcsError> {
    store.on_construct::<Parent>(parent_constructed)?;
    store.on_update::<Parent>(parent_updated)?;
    store.on_destroy::<Parent>(parent_destroyed)?;
    Ok(())
}

/// Parent `child` to `parent`, replacing any previous parent
pub fn set_parent(store: &mut ComponentStore, child: Entity, parent: Entity) -> Result<(), EcsError> {
    store.insert_or_replace(child, Parent::new(parent))
}

/// Detach `child` from its parent; returns the previous parent
pub fn detach(store: &mut ComponentStore, child: Entity) -> Option<Entity> {
    store.remove::<Parent>(child).map(|parent| parent.entity)
}

fn validate(store: &ComponentStore, child: Entity, parent: Entity) -> Result<(), EcsError> {
    if parent.is_invalid() || parent == child || !store.is_alive(parent) {
        log::error!("Entity {:?} cannot be parented to {:?}", child, parent);
        return Err(EcsError::InvalidParent { child, parent });
    }
    Ok(())
}

fn link(store: &mut ComponentStore, parent: Entity, child: Entity) -> Result<(), EcsError> {
    if !store.has::<Children>(parent) {
        store.emplace::<Children>(parent)?;
    }
    let children = store
        .get_mut::<Children>(parent)
        .ok_or(EcsError::MissingComponent { entity: parent, kind: Children::KIND })?;
    if !children.link(child) {
        log::error!("Children of {:?} are full, cannot link {:?}", parent, child);
        return Err(EcsError::ChildrenFull { parent, child });
    }
    Ok(())
}

fn unlink(store: &mut ComponentStore, parent: Entity, child: Entity) {
    if !store.is_alive(parent) {
        return;
    }
    let unlinked = store
        .get_mut::<Children>(parent)
        .is_some_and(|children| children.unlink(child));
    if !unlinked {
        log::error!("Parent {:?} holds no back-reference to {:?}", parent, child);
    }
}

fn parent_constructed(store: &mut ComponentStore, child: Entity) -> Result<(), EcsError> {
    let parent = store
        .get::<Parent>(child)
        .map(|p| p.entity)
        .ok_or(EcsError::MissingComponent { entity: child, kind: Parent::KIND })?;
    validate(store, child, parent)?;
    link(store, parent, child)
}

fn parent_updated(store: &mut ComponentStore, child: Entity, previous: &Parent) -> Result<(), EcsError> {
    let parent = store
        .get::<Parent>(child)
        .map(|p| p.entity)
        .ok_or(EcsError::MissingComponent { entity: child, kind: Parent::KIND })?;
    if parent == previous.entity {
        return Ok(());
    }
    validate(store, child, parent)?;

    unlink(store, previous.entity, child);
    if let Err(err) = link(store, parent, child) {
        if store.is_alive(previous.entity) {
            // Restore the old back-reference; the store restores the old Parent value
            if let Err(restore_err) = link(store, previous.entity, child) {
                log::error!(
                    "Cannot restore {:?} as a child of {:?}: {}",
                    child,
                    previous.entity,
                    restore_err
                );
            }
        }
        return Err(err);
    }
    Ok(())
}

fn parent_destroyed(store: &mut ComponentStore, child: Entity, parent: &Parent) {
    unlink(store, parent.entity, child);
}
