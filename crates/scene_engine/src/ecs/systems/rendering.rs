//! # Rendering System
//!
//! Walks every enabled camera and submits mesh draws to the [`Renderer`]
//! collaborator. Static and skinned meshes are separate passes; skinned draws
//! carry one matrix per bone slot.
//!
//! Each camera owns a uniform buffer stored in its engine-managed
//! [`CameraBuffer`] component. Removing a `Camera` retires the buffer, which is
//! released at the start of the next render pass.

use crate::ecs::components::{Bone, Camera, CameraBuffer, Material, Mesh, Skin, Transform};
use crate::ecs::{ComponentStore, EcsError, Entity, KindSet};
use crate::foundation::math::{Mat4, Vec3};
use crate::physics::DebugLine;
use crate::render::{
    CameraUniformData, DrawCommand, MultiLightEnvironment, RenderResult, Renderer, UniformBufferHandle,
};

/// Draw submission counters for one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Cameras rendered
    pub cameras: usize,
    /// Draws accepted by the renderer
    pub draws_submitted: usize,
    /// Draws skipped for bad data or renderer errors
    pub draws_skipped: usize,
}

/// Register the camera buffer lifecycle on `store`
pub fn register(store: &mut ComponentStore) -> Result<(), EcsError> {
    store.retain_removed::<CameraBuffer>()?;
    store.on_destroy::<Camera>(camera_destroyed)
}

fn camera_destroyed(store: &mut ComponentStore, entity: Entity, _camera: &Camera) {
    store.remove::<CameraBuffer>(entity);
}

/// System responsible for camera passes and draw submission
pub struct RenderingSystem {
    lights_buffer: UniformBufferHandle,
    bone_matrices: Vec<Mat4>,
}

impl Default for RenderingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingSystem {
    /// Create a new rendering system
    pub fn new() -> Self {
        Self {
            lights_buffer: UniformBufferHandle::INVALID,
            bone_matrices: Vec::new(),
        }
    }

    /// Uniform buffer holding the packed lights, once created
    pub fn lights_buffer(&self) -> UniformBufferHandle {
        self.lights_buffer
    }

    /// Destroy uniform buffers of removed cameras; returns how many were released
    pub fn release_retired(&mut self, store: &mut ComponentStore, renderer: &mut dyn Renderer) -> usize {
        let retired = store.drain_retired::<CameraBuffer>();
        for (entity, camera_buffer) in &retired {
            if camera_buffer.buffer.is_valid() {
                renderer.destroy_uniform_buffer(camera_buffer.buffer);
                log::debug!("Released camera buffer of {:?}", entity);
            }
        }
        retired.len()
    }

    /// Upload the light environment, creating the buffer on first use
    pub fn upload_lights(&mut self, renderer: &mut dyn Renderer, environment: &MultiLightEnvironment) -> RenderResult<()> {
        if !self.lights_buffer.is_valid() {
            self.lights_buffer = renderer.create_uniform_buffer(std::mem::size_of::<MultiLightEnvironment>())?;
        }
        renderer.upload_uniform(self.lights_buffer, environment.as_bytes())
    }

    /// Release the lights buffer
    pub fn release(&mut self, renderer: &mut dyn Renderer) {
        if self.lights_buffer.is_valid() {
            renderer.destroy_uniform_buffer(self.lights_buffer);
            self.lights_buffer = UniformBufferHandle::INVALID;
        }
    }

    /// Render every enabled camera: upload its record, set its viewport, then
    /// submit static draws, skinned draws and the optional debug lines.
    pub fn render_cameras(
        &mut self,
        store: &mut ComponentStore,
        renderer: &mut dyn Renderer,
        clear_color: [f32; 4],
        debug_lines: &[DebugLine],
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let cameras = store.query(KindSet::CAMERA | KindSet::TRANSFORM, KindSet::empty());

        for entity in cameras {
            let Some(camera) = store.get::<Camera>(entity).copied() else {
                continue;
            };
            if !camera.enabled {
                continue;
            }
            let Some(camera_buffer) = self.camera_buffer(store, renderer, entity) else {
                continue;
            };

            let eye = store
                .get::<Transform>(entity)
                .map_or_else(Vec3::zeros, Transform::world_position);
            let record = CameraUniformData::new(
                &camera.view_matrix(eye),
                &camera.projection_matrix(),
                eye,
                [camera.viewport.width as f32, camera.viewport.height as f32],
                camera.near,
                camera.far,
            );
            if let Err(err) = renderer.upload_uniform(camera_buffer, record.as_bytes()) {
                log::error!("Cannot upload camera record of {:?}: {}", entity, err);
                continue;
            }
            renderer.set_viewport(&camera.viewport, clear_color);
            stats.cameras += 1;

            self.draw_static(store, renderer, camera_buffer, &mut stats);
            self.draw_skinned(store, renderer, camera_buffer, &mut stats);

            for line in debug_lines {
                renderer.draw_line(line.from, line.to, line.color);
            }
        }

        log::trace!(
            "Rendered {} cameras: {} draws, {} skipped",
            stats.cameras,
            stats.draws_submitted,
            stats.draws_skipped
        );
        stats
    }

    fn camera_buffer(
        &mut self,
        store: &mut ComponentStore,
        renderer: &mut dyn Renderer,
        entity: Entity,
    ) -> Option<UniformBufferHandle> {
        if let Some(existing) = store.get::<CameraBuffer>(entity) {
            return Some(existing.buffer);
        }
        let buffer = match renderer.create_uniform_buffer(std::mem::size_of::<CameraUniformData>()) {
            Ok(buffer) => buffer,
            Err(err) => {
                log::error!("Cannot create camera buffer for {:?}: {}", entity, err);
                return None;
            }
        };
        if let Err(err) = store.insert(entity, CameraBuffer { buffer }) {
            log::error!("Cannot attach camera buffer to {:?}: {}", entity, err);
            renderer.destroy_uniform_buffer(buffer);
            return None;
        }
        Some(buffer)
    }

    fn draw_static(
        &mut self,
        store: &ComponentStore,
        renderer: &mut dyn Renderer,
        camera: UniformBufferHandle,
        stats: &mut RenderStats,
    ) {
        let entities = store.query(KindSet::TRANSFORM | KindSet::MESH | KindSet::MATERIAL, KindSet::SKIN);
        for entity in entities {
            let (Some(transform), Some(mesh), Some(material)) =
                (store.get::<Transform>(entity), store.get::<Mesh>(entity), store.get::<Material>(entity))
            else {
                continue;
            };
            self.submit(renderer, entity, mesh, material, transform.local_to_world, camera, None, stats);
        }
    }

    fn draw_skinned(
        &mut self,
        store: &ComponentStore,
        renderer: &mut dyn Renderer,
        camera: UniformBufferHandle,
        stats: &mut RenderStats,
    ) {
        let entities = store.query(
            KindSet::TRANSFORM | KindSet::MESH | KindSet::MATERIAL | KindSet::SKIN,
            KindSet::empty(),
        );
        let mut bones = std::mem::take(&mut self.bone_matrices);
        for entity in entities {
            let (Some(transform), Some(mesh), Some(material), Some(skin)) = (
                store.get::<Transform>(entity),
                store.get::<Mesh>(entity),
                store.get::<Material>(entity),
                store.get::<Skin>(entity),
            ) else {
                continue;
            };

            let inverse_world = transform.local_to_world.try_inverse().unwrap_or_else(|| {
                log::warn!("World matrix of {:?} is singular, skinning in world space", entity);
                Mat4::identity()
            });
            bones.clear();
            bones.extend(skin.bones.iter().map(|&bone| bone_matrix(store, &inverse_world, bone)));

            self.submit(renderer, entity, mesh, material, transform.local_to_world, camera, Some(bones.as_slice()), stats);
        }
        self.bone_matrices = bones;
    }

    #[allow(clippy::too_many_arguments)]
    fn submit(
        &self,
        renderer: &mut dyn Renderer,
        entity: Entity,
        mesh: &Mesh,
        material: &Material,
        model: Mat4,
        camera: UniformBufferHandle,
        bones: Option<&[Mat4]>,
        stats: &mut RenderStats,
    ) {
        if mesh.disabled {
            return;
        }
        if !mesh.geometry.is_valid() {
            log::warn!("Mesh of {:?} has no geometry, skipping draw", entity);
            stats.draws_skipped += 1;
            return;
        }

        let command = DrawCommand {
            geometry: mesh.geometry,
            color: material.color,
            texture: material.texture,
            model,
            lights: self.lights_buffer,
            camera,
            bones,
        };
        match renderer.draw(&command) {
            Ok(()) => stats.draws_submitted += 1,
            Err(err) => {
                log::error!("Draw of {:?} failed: {}", entity, err);
                stats.draws_skipped += 1;
            }
        }
    }
}

/// `inverse(entity_world) * bone_world * inverse_bind`; identity for empty or broken slots
fn bone_matrix(store: &ComponentStore, inverse_world: &Mat4, bone: Entity) -> Mat4 {
    if bone.is_invalid() {
        return Mat4::identity();
    }
    match (store.get::<Transform>(bone), store.get::<Bone>(bone)) {
        (Some(transform), Some(joint)) => inverse_world * transform.local_to_world * joint.inverse_bind_matrix,
        _ => {
            log::trace!("Bone slot {:?} has no joint data", bone);
            Mat4::identity()
        }
    }
}
