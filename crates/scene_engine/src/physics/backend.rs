//! Physics engine collaborator interface
//!
//! The physics bridge talks to a solver exclusively through [`PhysicsBackend`].
//! Shapes and bodies are opaque handles; the bridge owns their lifetime.

use thiserror::Error;

use crate::ecs::components::ColliderShape;
use crate::ecs::Entity;
use crate::foundation::math::{Quat, Vec3};

/// Handle to a backend collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u64);

/// Handle to a backend rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

impl ShapeHandle {
    /// The absent handle
    pub const INVALID: Self = Self(u64::MAX);
}

impl BodyHandle {
    /// The absent handle
    pub const INVALID: Self = Self(u64::MAX);
}

impl Default for ShapeHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Physics errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Shape parameters cannot describe a solid
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// The shape handle does not name a live shape
    #[error("Unknown shape handle {0:?}")]
    UnknownShape(ShapeHandle),

    /// The body handle does not name a live body
    #[error("Unknown body handle {0:?}")]
    UnknownBody(BodyHandle),
}

/// Shape construction parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDesc {
    /// Geometry
    pub shape: ColliderShape,
    /// Per-axis scaling applied to the geometry
    pub local_scaling: Vec3,
}

/// Rigid body construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Collision shape
    pub shape: ShapeHandle,
    /// Mass; zero makes the body static
    pub mass: f32,
    /// Initial world position
    pub position: Vec3,
    /// Initial world rotation
    pub rotation: Quat,
    /// Report contacts without collision response
    pub is_trigger: bool,
    /// Friction coefficient
    pub friction: f32,
    /// Restitution
    pub restitution: f32,
    /// Owning entity, reported back in contacts and ray hits
    pub entity: Entity,
}

/// One contact point of a manifold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position on the first body, world space
    pub position_on_a: Vec3,
    /// Contact position on the second body, world space
    pub position_on_b: Vec3,
    /// Number of consecutive steps the pair has been touching
    pub lifetime: i32,
}

/// Contacts between two bodies after the latest step
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    /// First participant
    pub entity_a: Entity,
    /// Second participant
    pub entity_b: Entity,
    /// Contact points
    pub points: Vec<ContactPoint>,
}

/// Closest ray hit reported by [`PhysicsBackend::ray_test`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTestHit {
    /// Entity owning the hit body
    pub entity: Entity,
    /// Hit position, world space
    pub point: Vec3,
    /// Surface normal, world space
    pub normal: Vec3,
    /// Hit distance as a fraction of the ray segment
    pub fraction: f32,
}

/// Debug line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Segment start
    pub from: Vec3,
    /// Segment end
    pub to: Vec3,
    /// RGB color
    pub color: Vec3,
}

/// Physics engine collaborator
pub trait PhysicsBackend {
    /// Build a collision shape
    fn create_shape(&mut self, desc: &ShapeDesc) -> Result<ShapeHandle, PhysicsError>;

    /// Release a collision shape; false if the handle was unknown
    fn destroy_shape(&mut self, shape: ShapeHandle) -> bool;

    /// Build a rigid body around an existing shape
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Release a rigid body; false if the handle was unknown
    fn destroy_body(&mut self, body: BodyHandle) -> bool;

    /// Teleport a body
    fn set_body_transform(&mut self, body: BodyHandle, position: Vec3, rotation: Quat) -> Result<(), PhysicsError>;

    /// Current world position and rotation of a body
    fn body_transform(&self, body: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Wake a sleeping body
    fn activate(&mut self, body: BodyHandle);

    /// Advance the simulation by `dt` seconds using at most `max_substeps` fixed steps.
    /// Returns the number of fixed steps taken.
    fn step_simulation(&mut self, dt: f32, max_substeps: u32) -> u32;

    /// Set the gravity acceleration
    fn set_gravity(&mut self, gravity: Vec3);

    /// Current gravity acceleration
    fn gravity(&self) -> Vec3;

    /// Contacts found by the latest step
    fn contact_manifolds(&self) -> Vec<ContactManifold>;

    /// Closest hit along the segment `from`..`to`
    ///
    /// `filter` is consulted before the narrow-phase test of each body; bodies
    /// whose entity it rejects are never tested.
    fn ray_test(&self, from: Vec3, to: Vec3, filter: &dyn Fn(Entity) -> bool) -> Option<RayTestHit>;

    /// Outline of every shape for debug rendering
    fn debug_lines(&self) -> Vec<DebugLine>;
}
