//! Engine systems
//!
//! Systems contain logic, components contain data. Each system reads and writes
//! the [`crate::ecs::ComponentStore`] it is handed; none keeps entity state of
//! its own between frames.

pub mod hierarchy;
pub mod transform;
pub mod lighting;
pub mod rendering;

pub use transform::{world_matrix, TransformSystem, DEFAULT_MAX_HIERARCHY_DEPTH};
pub use lighting::LightingSystem;
pub use rendering::{RenderStats, RenderingSystem};
