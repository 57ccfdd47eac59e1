//! Physics
//!
//! The [`PhysicsBackend`] collaborator contract, the built-in
//! [`SimplePhysicsWorld`] implementing it, and the [`PhysicsBridge`] that keeps
//! backend bodies in step with scene components.

pub mod backend;
pub mod primitives;
pub mod simple_world;
pub mod bridge;

pub use backend::{
    BodyDesc, BodyHandle, ContactManifold, ContactPoint, DebugLine, PhysicsBackend, PhysicsError,
    RayTestHit, ShapeDesc, ShapeHandle,
};
pub use primitives::{BoundingSphere, OrientedBox, Ray};
pub use simple_world::SimplePhysicsWorld;
pub use bridge::{BridgeStats, Collision, PhysicsBridge, RayHit};
