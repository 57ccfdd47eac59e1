//! Asset handles and registries
//!
//! Loading is out of scope for the scene core; it only deals in handles.

pub mod handle;
pub mod atlas;

pub use handle::{
    AnimationHandle, AssetHandle, GeometryHandle, SkinHandle, TextureHandle,
    ENGINE_INVALID_OBJECT_HANDLE,
};
pub use atlas::Atlas;
