//! Entity-Component store
//!
//! Sparse-set component tables, lifecycle hooks and change observers for the scene.

pub mod entity;
pub mod component;
pub mod storage;
pub mod observer;
pub mod error;
pub mod store;
pub mod view;
pub mod components;
pub mod systems;

pub use entity::{Entity, ENGINE_INVALID_GAME_OBJECT_ID};
pub use component::{Component, ComponentKind, KindSet};
pub use storage::{ComponentStorage, ConstructHook, DestroyHook, Hooks, UpdateHook};
pub use observer::{EntitySet, Observer, ObserverId, Trigger};
pub use error::EcsError;
pub use store::ComponentStore;
pub use view::{ComponentView, ViewIter};
