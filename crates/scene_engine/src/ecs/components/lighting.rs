//! Lighting component
//!
//! Pure data; packing into GPU records happens in the lighting system.
//! Point and spot positions come from the entity's world matrix, directions are
//! given in the entity's local frame and rotated into world space on packing.

use crate::ecs::{Component, ComponentKind};
use crate::foundation::math::Vec3;

/// Light variant with its type-specific parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Parallel rays, like sunlight
    Directional {
        /// Direction the light travels
        direction: Vec3,
    },
    /// Radiates in all directions from the entity position
    Point {
        /// Maximum influence distance
        range: f32,
    },
    /// Cone of light from the entity position
    Spot {
        /// Cone axis
        direction: Vec3,
        /// Maximum influence distance
        range: f32,
        /// Inner cone angle in radians (full intensity)
        inner_cone: f32,
        /// Outer cone angle in radians (zero intensity)
        outer_cone: f32,
    },
}

/// Light source attached to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Variant and variant parameters
    pub kind: LightKind,
    /// RGB color (0.0 to 1.0 range)
    pub color: Vec3,
    /// Ambient contribution
    pub ambient: f32,
    /// Diffuse contribution
    pub diffuse: f32,
    /// Specular contribution
    pub specular: f32,
    /// Disabled lights are not packed
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        LightFactory::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Component for Light {
    const KIND: ComponentKind = ComponentKind::Light;
}

impl Light {
    /// Builder pattern: set ambient/diffuse/specular intensities
    pub fn with_intensities(mut self, ambient: f32, diffuse: f32, specular: f32) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }
}

/// Factory functions for light components
pub struct LightFactory;

impl LightFactory {
    /// Directional light travelling along `direction`
    pub fn directional(direction: Vec3, color: Vec3) -> Light {
        Light {
            kind: LightKind::Directional {
                direction: direction.normalize(),
            },
            color,
            ambient: 0.1,
            diffuse: 1.0,
            specular: 0.5,
            enabled: true,
        }
    }

    /// Point light reaching `range` units
    pub fn point(color: Vec3, range: f32) -> Light {
        Light {
            kind: LightKind::Point { range },
            color,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.5,
            enabled: true,
        }
    }

    /// Spot light along `direction` with cone angles in radians
    pub fn spot(direction: Vec3, color: Vec3, range: f32, inner_cone: f32, outer_cone: f32) -> Light {
        Light {
            kind: LightKind::Spot {
                direction: direction.normalize(),
                range,
                inner_cone,
                outer_cone,
            },
            color,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.5,
            enabled: true,
        }
    }
}
