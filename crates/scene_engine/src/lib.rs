//! # Scene Engine
//!
//! The scene core of a 3D engine: entities and components, change observers,
//! a parent/child transform resolver and a bridge to a rigid-body solver.
//!
//! ## Features
//!
//! - **Component Store**: Sparse per-kind storage with lifecycle hooks
//! - **Change Observers**: Group, created and updated triggers drained once per frame
//! - **Transform Hierarchy**: Parent-composed world matrices with cycle and depth guards
//! - **Physics Bridge**: Body lifetime, transform sync, collisions and ray queries
//! - **Renderer Interface**: Light packing, camera buffers, static and skinned draws
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new(SceneConfig::default())?;
//!
//!     let floor = scene.create_named("floor")?;
//!     scene.insert(floor, Transform::from_position(Vec3::new(0.0, -1.0, 0.0)))?;
//!     scene.insert(floor, Collider::cuboid(Vec3::new(20.0, 1.0, 20.0)))?;
//!
//!     let crate_box = scene.create_entity();
//!     scene.insert(crate_box, Transform::from_position(Vec3::new(0.0, 5.0, 0.0)))?;
//!     scene.insert(crate_box, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0)))?;
//!     scene.insert(crate_box, RigidBody::new(1.0))?;
//!
//!     for _ in 0..120 {
//!         scene.update(1.0 / 60.0);
//!     }
//!     println!("{}", scene.last_frame());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared building blocks
pub mod foundation;
pub mod config;
pub mod assets;

// Entities, components and systems
pub mod ecs;

// Collaborator interfaces
pub mod physics;
pub mod render;

pub mod scene;

pub use scene::{FrameStats, Scene, SceneError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{GeometryHandle, SkinHandle, TextureHandle},
        config::{Config, PhysicsConfig, RenderConfig, SceneConfig},
        ecs::components::{
            Bone, Camera, Children, Collider, ColliderShape, CompoundChild, Light, LightFactory, LightKind,
            Material, Mesh, Name, Parent, PrimitiveShape, RigidBody, Skin, Transform,
        },
        ecs::{Component, ComponentKind, ComponentView, EcsError, Entity, ObserverId, Trigger},
        foundation::math::{Mat4, Quat, Vec3, Vec4},
        physics::{Collision, PhysicsBackend, RayHit, SimplePhysicsWorld},
        render::{DrawCommand, RenderError, Renderer, UniformBufferHandle, Viewport},
        FrameStats, Scene, SceneError,
    };
}
