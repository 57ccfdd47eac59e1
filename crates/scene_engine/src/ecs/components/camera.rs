//! Camera components
//!
//! The camera looks from its entity's world position towards `target`. The
//! engine-managed [`CameraBuffer`] holds the uniform buffer the camera record is
//! uploaded into.

use crate::ecs::{Component, ComponentKind};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::{UniformBufferHandle, Viewport};

/// Projection variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Half of the visible height in world units; width follows the aspect ratio
        half_height: f32,
    },
}

/// Camera attached to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Projection variant
    pub projection: Projection,
    /// Target rectangle in pixels
    pub viewport: Viewport,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
    /// Point the camera is looking at in world space
    pub target: Vec3,
    /// Up vector for camera orientation
    pub up: Vec3,
    /// Disabled cameras are skipped during rendering
    pub enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: utils::deg_to_rad(45.0),
            },
            viewport: Viewport::default(),
            near: 0.1,
            far: 1000.0,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            enabled: true,
        }
    }
}

impl Component for Camera {
    const KIND: ComponentKind = ComponentKind::Camera;
}

impl Camera {
    /// Perspective camera with a field of view in degrees
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: utils::deg_to_rad(fov_degrees),
            },
            near,
            far,
            ..Default::default()
        }
    }

    /// Orthographic camera showing `half_height` units above and below the axis
    pub fn orthographic(half_height: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic { half_height },
            near,
            far,
            ..Default::default()
        }
    }

    /// Builder pattern: look at a world-space point
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Builder pattern: set the viewport
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// World-to-camera matrix for a camera positioned at `eye`
    pub fn view_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::look_at(eye, self.target, self.up)
    }

    /// Projection matrix using the viewport aspect ratio
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.aspect_ratio();
        match self.projection {
            Projection::Perspective { fov_y } => Mat4::perspective(fov_y, aspect, self.near, self.far),
            Projection::Orthographic { half_height } => {
                let half_width = half_height * aspect;
                Mat4::orthographic(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        }
    }
}

/// Engine-managed uniform buffer holding a camera's GPU record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraBuffer {
    /// Renderer uniform buffer
    pub buffer: UniformBufferHandle,
}

impl Component for CameraBuffer {
    const KIND: ComponentKind = ComponentKind::CameraBuffer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_is_perspective_45() {
        let camera = Camera::default();
        match camera.projection {
            Projection::Perspective { fov_y } => assert_relative_eq!(fov_y, std::f32::consts::FRAC_PI_4, epsilon = 1e-6),
            Projection::Orthographic { .. } => panic!("default camera should be perspective"),
        }
        assert!(camera.near > 0.0 && camera.far > camera.near);
        assert!(camera.enabled);
    }

    #[test]
    fn test_view_matrix_moves_target_onto_negative_z() {
        let camera = Camera::default().with_target(Vec3::zeros());
        let view = camera.view_matrix(Vec3::new(0.0, 0.0, 5.0));
        let origin = view.transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_width_follows_aspect() {
        let camera = Camera::orthographic(2.0, 0.1, 10.0).with_viewport(Viewport::new(0, 0, 200, 100));
        let projection = camera.projection_matrix();
        assert_relative_eq!(projection[(0, 0)], 1.0 / 4.0, epsilon = 1e-6);
        assert_relative_eq!(projection[(1, 1)], 1.0 / 2.0, epsilon = 1e-6);
    }
}
