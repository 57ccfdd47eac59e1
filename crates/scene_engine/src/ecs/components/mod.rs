//! Scene components
//!
//! Pure data; the logic that keeps derived components consistent lives in the
//! systems and the physics bridge.

pub mod transform;
pub mod hierarchy;
pub mod render;
pub mod lighting;
pub mod camera;
pub mod physics;
pub mod name;

pub use transform::Transform;
pub use hierarchy::{Children, Parent, CHILDREN_CAPACITY};
pub use render::{Bone, Material, Mesh, Skin};
pub use lighting::{Light, LightFactory, LightKind};
pub use camera::{Camera, CameraBuffer, Projection};
pub use physics::{
    Collider, ColliderShape, CompoundChild, PhysicsBody, PrimitiveShape, RigidBody,
    COMPOUND_CHILDREN_CAPACITY,
};
pub use name::{Name, NAME_CAPACITY};
