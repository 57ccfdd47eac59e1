//! Renderer interface and GPU-facing records

pub mod backend;
pub mod uniforms;

pub use backend::{
    DrawCommand, RenderError, RenderResult, Renderer, UniformBufferHandle, Viewport,
};
pub use uniforms::{
    CameraUniformData, DirectionalLightData, LightHeader, MultiLightEnvironment, PointLightData,
    SpotLightData, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
