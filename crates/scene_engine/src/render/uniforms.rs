//! GPU uniform records
//!
//! `#[repr(C)]` plain-old-data layouts uploaded as raw bytes. Every field is a
//! 16-byte aligned vector or a scalar quartet, matching std140 rules.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec3};

/// Maximum number of directional lights supported
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum number of point lights supported
pub const MAX_POINT_LIGHTS: usize = 8;
/// Maximum number of spot lights supported
pub const MAX_SPOT_LIGHTS: usize = 4;

/// Light buffer header: ambient term and per-type counts
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightHeader {
    /// Ambient light color and intensity [r, g, b, intensity]
    pub ambient_color: [f32; 4],
    /// Number of packed directional lights
    pub directional_light_count: u32,
    /// Number of packed point lights
    pub point_light_count: u32,
    /// Number of packed spot lights
    pub spot_light_count: u32,
    /// Padding for std140 alignment
    pub _padding: u32,
}

/// Directional light record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// Light direction [x, y, z, padding]
    pub direction: [f32; 4],
    /// Light color [r, g, b, padding]
    pub color: [f32; 4],
    /// Intensities [ambient, diffuse, specular, padding]
    pub intensity: [f32; 4],
}

/// Point light record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    /// Light position and range [x, y, z, range]
    pub position: [f32; 4],
    /// Light color [r, g, b, padding]
    pub color: [f32; 4],
    /// Intensities [ambient, diffuse, specular, padding]
    pub intensity: [f32; 4],
}

/// Spot light record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotLightData {
    /// Light position and range [x, y, z, range]
    pub position: [f32; 4],
    /// Light direction [x, y, z, padding]
    pub direction: [f32; 4],
    /// Light color [r, g, b, padding]
    pub color: [f32; 4],
    /// Intensities [ambient, diffuse, specular, padding]
    pub intensity: [f32; 4],
    /// Cone angles [inner, outer, unused, unused]
    pub cone_angles: [f32; 4],
}

/// Complete light buffer: header then fixed-size per-type arrays
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MultiLightEnvironment {
    /// Ambient term and counts
    pub header: LightHeader,
    /// Directional light records
    pub directional_lights: [DirectionalLightData; MAX_DIRECTIONAL_LIGHTS],
    /// Point light records
    pub point_lights: [PointLightData; MAX_POINT_LIGHTS],
    /// Spot light records
    pub spot_lights: [SpotLightData; MAX_SPOT_LIGHTS],
}

impl MultiLightEnvironment {
    /// Empty environment with the given ambient term
    pub fn new(ambient_color: Vec3, ambient_intensity: f32) -> Self {
        let mut environment = Self::zeroed();
        environment.header.ambient_color = [ambient_color.x, ambient_color.y, ambient_color.z, ambient_intensity];
        environment
    }

    /// Total packed lights
    pub fn light_count(&self) -> usize {
        (self.header.directional_light_count + self.header.point_light_count + self.header.spot_light_count) as usize
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Camera record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniformData {
    /// View matrix (world to camera space), column major
    pub view_matrix: [[f32; 4]; 4],
    /// Projection matrix (camera to clip space), column major
    pub projection_matrix: [[f32; 4]; 4],
    /// Pre-computed view-projection matrix
    pub view_projection_matrix: [[f32; 4]; 4],
    /// Camera position in world space [x, y, z, padding]
    pub camera_position: [f32; 4],
    /// Viewport size and near/far planes [width, height, near, far]
    pub viewport_near_far: [f32; 4],
}

impl CameraUniformData {
    /// Build the record from resolved matrices
    pub fn new(view: &Mat4, projection: &Mat4, position: Vec3, viewport: [f32; 2], near: f32, far: f32) -> Self {
        Self {
            view_matrix: (*view).into(),
            projection_matrix: (*projection).into(),
            view_projection_matrix: (projection * view).into(),
            camera_position: [position.x, position.y, position.z, 1.0],
            viewport_near_far: [viewport[0], viewport[1], near, far],
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<LightHeader>() % 16, 0);
        assert_eq!(std::mem::size_of::<DirectionalLightData>() % 16, 0);
        assert_eq!(std::mem::size_of::<PointLightData>() % 16, 0);
        assert_eq!(std::mem::size_of::<SpotLightData>() % 16, 0);
        assert_eq!(std::mem::size_of::<CameraUniformData>() % 16, 0);
    }

    #[test]
    fn test_environment_header_leads_the_buffer() {
        let environment = MultiLightEnvironment::new(Vec3::new(0.2, 0.3, 0.4), 0.5);
        let bytes = environment.as_bytes();
        let ambient: &[f32] = bytemuck::cast_slice(&bytes[..16]);
        assert_eq!(ambient, &[0.2, 0.3, 0.4, 0.5]);
        assert_eq!(environment.light_count(), 0);
    }
}
