//! ECS error types

use thiserror::Error;

use super::{ComponentKind, Entity};

/// Component store contract violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle does not name a live entity
    #[error("Entity {0:?} is not alive")]
    DeadEntity(Entity),

    /// The reserved placeholder entity cannot carry components or be destroyed
    #[error("Entity {0:?} is reserved")]
    ReservedEntity(Entity),

    /// A component of this kind already exists on the entity
    #[error("Entity {entity:?} already has a {kind} component")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Component kind
        kind: ComponentKind,
    },

    /// The entity has no component of this kind
    #[error("Entity {entity:?} has no {kind} component")]
    MissingComponent {
        /// Target entity
        entity: Entity,
        /// Component kind
        kind: ComponentKind,
    },

    /// Two component types were registered under the same kind tag
    #[error("Component kind {0} is registered with a different type")]
    KindMismatch(ComponentKind),

    /// The parent's children array has no free slot
    #[error("Parent {parent:?} has no free child slot for {child:?}")]
    ChildrenFull {
        /// Parent entity
        parent: Entity,
        /// Child that could not be linked
        child: Entity,
    },

    /// A parent reference names a dead entity, the sentinel, or the child itself
    #[error("Entity {child:?} cannot be parented to {parent:?}")]
    InvalidParent {
        /// Child entity
        child: Entity,
        /// Requested parent
        parent: Entity,
    },

    /// The kind is owned by an engine system and cannot be edited by scene users
    #[error("Component kind {0} is managed by the engine")]
    EngineManaged(ComponentKind),

    /// A runtime kind name did not match any component kind
    #[error("Unknown component kind: {0}")]
    UnknownKind(String),
}
