//! Transform component
//!
//! Local position, rotation and scale plus the cached local-to-world matrix the
//! resolver writes every frame. Y-up right-handed coordinates.

use crate::ecs::{Component, ComponentKind};
use crate::foundation::math::{compose_trs, decompose_translation_rotation, Mat4, Quat, Vec3};

/// Spatial transform of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position relative to the parent (or world when unparented)
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,

    /// Derived world matrix, recomputed by the transform resolver
    pub local_to_world: Mat4,
}

impl Component for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_to_world: Mat4::identity(),
        }
    }
}

impl Transform {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create from position, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Default::default()
        }
    }

    /// Local matrix in TRS order
    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation, &self.scale)
    }

    /// World-space position taken from the cached matrix
    pub fn world_position(&self) -> Vec3 {
        decompose_translation_rotation(&self.local_to_world).0
    }

    /// World-space translation and rotation taken from the cached matrix
    pub fn world_position_rotation(&self) -> (Vec3, Quat) {
        decompose_translation_rotation(&self.local_to_world)
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from Euler angles (radians)
    pub fn with_rotation_euler(mut self, roll: f32, pitch: f32, yaw: f32) -> Self {
        self.rotation = Quat::from_euler_angles(roll, pitch, yaw);
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}
