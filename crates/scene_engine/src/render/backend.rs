//! Renderer collaborator interface
//!
//! The scene issues logical draw requests with resolved matrices. It never sees
//! graphics API objects; uniform data travels as raw bytes through opaque
//! buffer handles.

use thiserror::Error;

use crate::assets::{GeometryHandle, TextureHandle, ENGINE_INVALID_OBJECT_HANDLE};
use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Renderer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A handle passed to the renderer does not name a live resource
    #[error("Invalid {kind} handle: {raw}")]
    InvalidHandle {
        /// Resource kind, for diagnostics
        kind: &'static str,
        /// Raw handle value
        raw: u32,
    },

    /// Resource creation or upload failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Handle to a renderer-owned uniform buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformBufferHandle(pub u32);

impl UniformBufferHandle {
    /// The absent handle
    pub const INVALID: Self = Self(ENGINE_INVALID_OBJECT_HANDLE);

    /// Whether the handle names a buffer
    pub const fn is_valid(self) -> bool {
        self.0 != ENGINE_INVALID_OBJECT_HANDLE
    }
}

impl Default for UniformBufferHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Pixel rectangle a camera renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, 1280, 720)
    }
}

impl Viewport {
    /// Create a viewport
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Width over height; 1.0 for a degenerate rectangle
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// One logical draw request
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand<'a> {
    /// Geometry to draw
    pub geometry: GeometryHandle,
    /// Material base color
    pub color: Vec4,
    /// Material texture; may be invalid
    pub texture: TextureHandle,
    /// Model (local-to-world) matrix
    pub model: Mat4,
    /// Packed light records
    pub lights: UniformBufferHandle,
    /// Camera record for the current pass
    pub camera: UniformBufferHandle,
    /// Per-joint skinning matrices; `None` for static geometry
    pub bones: Option<&'a [Mat4]>,
}

/// Renderer collaborator
pub trait Renderer {
    /// Start a frame
    fn begin_frame(&mut self) -> RenderResult<()>;

    /// Finish and present a frame
    fn end_frame(&mut self) -> RenderResult<()>;

    /// Select and clear the target rectangle for the next draws
    fn set_viewport(&mut self, viewport: &Viewport, clear_color: [f32; 4]);

    /// Allocate a uniform buffer of `size` bytes
    fn create_uniform_buffer(&mut self, size: usize) -> RenderResult<UniformBufferHandle>;

    /// Release a uniform buffer
    fn destroy_uniform_buffer(&mut self, handle: UniformBufferHandle);

    /// Replace a uniform buffer's contents
    fn upload_uniform(&mut self, handle: UniformBufferHandle, bytes: &[u8]) -> RenderResult<()>;

    /// Submit a draw
    fn draw(&mut self, command: &DrawCommand<'_>) -> RenderResult<()>;

    /// Submit a debug line segment
    fn draw_line(&mut self, _from: Vec3, _to: Vec3, _color: Vec3) {}
}
