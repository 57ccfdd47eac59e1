//! Physics components
//!
//! `Collider` and `RigidBody` are authored by gameplay code. `PhysicsBody` is
//! engine-managed: the physics bridge creates it alongside the native body and
//! it never outlives the entity's `Collider`.

use crate::ecs::{Component, ComponentKind};
use crate::foundation::math::{Quat, Vec3};
use crate::physics::{BodyHandle, ShapeHandle};

/// Most children a compound collider may carry
pub const COMPOUND_CHILDREN_CAPACITY: usize = 8;

/// Primitive shape usable on its own or inside a compound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveShape {
    /// Box given by half extents
    Box {
        /// Half size along each local axis
        half_extents: Vec3,
    },
    /// Sphere given by radius
    Sphere {
        /// Sphere radius
        radius: f32,
    },
}

/// One child of a compound collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundChild {
    /// Child shape
    pub shape: PrimitiveShape,
    /// Offset from the entity origin
    pub offset: Vec3,
    /// Orientation relative to the entity
    pub rotation: Quat,
}

impl CompoundChild {
    /// Child at `offset` with identity rotation
    pub fn new(shape: PrimitiveShape, offset: Vec3) -> Self {
        Self {
            shape,
            offset,
            rotation: Quat::identity(),
        }
    }

    /// Builder pattern: set the child rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Collision shape variant
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    /// Single box
    Box {
        /// Half size along each local axis
        half_extents: Vec3,
    },
    /// Single sphere
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Several primitives with local offsets
    Compound(Vec<CompoundChild>),
}

/// Collision volume attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Shape variant
    pub shape: ColliderShape,
    /// Report contacts without collision response
    pub is_trigger: bool,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Restitution (0 = no bounce, 1 = perfectly elastic)
    pub bounciness: f32,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            shape: ColliderShape::Box {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            is_trigger: false,
            friction: 0.5,
            bounciness: 0.0,
        }
    }
}

impl Component for Collider {
    const KIND: ComponentKind = ComponentKind::Collider;
}

impl Collider {
    /// Box collider from its full size
    pub fn cuboid(size: Vec3) -> Self {
        Self {
            shape: ColliderShape::Box {
                half_extents: size * 0.5,
            },
            ..Default::default()
        }
    }

    /// Sphere collider
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            ..Default::default()
        }
    }

    /// Compound collider
    pub fn compound(children: Vec<CompoundChild>) -> Self {
        Self {
            shape: ColliderShape::Compound(children),
            ..Default::default()
        }
    }

    /// Builder pattern: mark as trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Builder pattern: set friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Builder pattern: set bounciness
    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }
}

/// Mass properties; zero mass means static or kinematic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    /// Body mass in kilograms
    pub mass: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self { mass: 1.0 }
    }
}

impl RigidBody {
    /// Body with the given mass
    pub fn new(mass: f32) -> Self {
        Self { mass }
    }
}

impl Component for RigidBody {
    const KIND: ComponentKind = ComponentKind::RigidBody;
}

/// Native physics objects owned by the physics bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicsBody {
    /// Collision shape
    pub shape: ShapeHandle,
    /// Rigid body
    pub body: BodyHandle,
}

impl Component for PhysicsBody {
    const KIND: ComponentKind = ComponentKind::PhysicsBody;
}
