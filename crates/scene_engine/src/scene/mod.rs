//! Scene orchestration
//!
//! The [`Scene`] owns the component store, the physics bridge and the engine
//! systems, and runs them in a fixed order every frame:
//!
//! 1. release retired physics bodies, then build bodies flagged by observers
//! 2. push edited transforms into the physics world
//! 3. step the simulation
//! 4. write dynamic body poses back into transforms
//! 5. rebuild the collision list
//! 6. resolve local matrices, then parent-composed world matrices
//! 7. pack lights and render every enabled camera
//!
//! Reordering these steps shows the renderer stale matrices for a frame.

pub mod stats;

pub use stats::FrameStats;

use thiserror::Error;

use crate::config::{ConfigError, SceneConfig};
use crate::ecs::components::{CameraBuffer, Name};
use crate::ecs::systems::{hierarchy, rendering, LightingSystem, RenderStats, RenderingSystem, TransformSystem};
use crate::ecs::{Component, ComponentStore, ComponentView, EcsError, Entity, ObserverId, Trigger, ViewIter};
use crate::foundation::math::Vec3;
use crate::physics::{Collision, PhysicsBackend, PhysicsBridge, PhysicsError, RayHit, SimplePhysicsWorld};
use crate::render::{RenderError, Renderer};

/// Scene-level errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Component store contract violation
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Physics backend failure
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Renderer failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Entities, components and the systems that keep them consistent
pub struct Scene<P: PhysicsBackend = SimplePhysicsWorld> {
    store: ComponentStore,
    physics: PhysicsBridge<P>,
    transforms: TransformSystem,
    lighting: LightingSystem,
    rendering: RenderingSystem,
    config: SceneConfig,
    last_frame: FrameStats,
}

impl Scene<SimplePhysicsWorld> {
    /// Scene backed by the built-in physics world
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let backend = SimplePhysicsWorld::new(&config.physics);
        Self::with_backend(config, backend)
    }
}

impl<P: PhysicsBackend> Scene<P> {
    /// Scene backed by a caller-supplied physics engine
    pub fn with_backend(config: SceneConfig, backend: P) -> Result<Self, SceneError> {
        config.validate()?;

        let mut store = ComponentStore::new();
        hierarchy::register(&mut store)?;
        rendering::register(&mut store)?;
        let physics = PhysicsBridge::new(backend, &config.physics, &mut store)?
            .with_max_hierarchy_depth(config.max_hierarchy_depth);

        log::info!("Scene created");
        Ok(Self {
            store,
            physics,
            transforms: TransformSystem::new(config.max_hierarchy_depth),
            lighting: LightingSystem::new(),
            rendering: RenderingSystem::new(),
            config,
            last_frame: FrameStats::default(),
        })
    }

    // --- Frame ------------------------------------------------------------

    /// Physics and transform half of a frame
    pub fn update(&mut self, dt: f32) -> FrameStats {
        let mut stats = FrameStats::default();

        self.physics.collect_garbage(&mut self.store);
        self.physics.sync_bodies(&mut self.store);
        self.physics.sync_transforms(&mut self.store);
        self.physics.step(dt);
        stats.poses_written = self.physics.write_back(&mut self.store);
        stats.collisions = self.physics.rebuild_collisions().len();

        stats.transforms_resolved = self.transforms.resolve_local(&mut self.store);
        stats.hierarchy_resolved = self.transforms.resolve_hierarchy(&mut self.store);

        stats.record_physics(self.physics.take_stats());
        self.last_frame = stats;
        stats
    }

    /// Render half of a frame
    ///
    /// Renderer errors on individual draws are logged and counted; only a
    /// failure to begin or end the frame is returned.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<RenderStats, SceneError> {
        renderer.begin_frame()?;
        self.rendering.release_retired(&mut self.store, renderer);

        let ambient = Vec3::from(self.config.render.ambient_color);
        let environment = self
            .lighting
            .pack(&self.store, ambient, self.config.render.ambient_intensity);
        self.last_frame.lights_packed = environment.light_count();
        if let Err(err) = self.rendering.upload_lights(renderer, environment) {
            log::error!("Cannot upload lights: {}", err);
        }

        let debug_lines = if self.physics.debug_draw() {
            self.physics.debug_lines()
        } else {
            Vec::new()
        };
        let stats = self.rendering.render_cameras(
            &mut self.store,
            renderer,
            self.config.render.clear_color,
            &debug_lines,
        );
        self.last_frame.record_render(stats);

        renderer.end_frame()?;
        Ok(stats)
    }

    /// Update then render
    pub fn frame(&mut self, dt: f32, renderer: &mut dyn Renderer) -> Result<FrameStats, SceneError> {
        self.update(dt);
        self.render(renderer)?;
        log::trace!("Frame: {}", self.last_frame);
        Ok(self.last_frame)
    }

    /// Statistics of the latest frame
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Release every renderer resource the scene holds
    pub fn release_render_resources(&mut self, renderer: &mut dyn Renderer) {
        let cameras: Vec<Entity> = self.store.iter::<CameraBuffer>().map(|(entity, _)| entity).collect();
        for entity in cameras {
            self.store.remove::<CameraBuffer>(entity);
        }
        self.rendering.release_retired(&mut self.store, renderer);
        self.rendering.release(renderer);
    }

    // --- Entities and components -----------------------------------------

    /// Create an entity
    pub fn create_entity(&mut self) -> Entity {
        self.store.create()
    }

    /// Create an entity carrying a [`Name`]
    pub fn create_named(&mut self, name: &str) -> Result<Entity, SceneError> {
        let entity = self.store.create();
        self.store.insert(entity, Name::new(name))?;
        Ok(entity)
    }

    /// Destroy an entity and release its physics body
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.store.destroy(entity)?;
        self.physics.collect_garbage(&mut self.store);
        Ok(())
    }

    /// Whether the entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.store.is_alive(entity)
    }

    /// Attach a component
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<&mut T, SceneError> {
        user_editable::<T>()?;
        Ok(self.store.insert(entity, value)?)
    }

    /// Attach a default component
    pub fn emplace<T: Component>(&mut self, entity: Entity) -> Result<&mut T, SceneError> {
        user_editable::<T>()?;
        Ok(self.store.emplace(entity)?)
    }

    /// Read a component
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store.get(entity)
    }

    /// Whether the entity has a `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store.has::<T>(entity)
    }

    /// Replace a component value, notifying observers
    pub fn replace<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), SceneError> {
        user_editable::<T>()?;
        Ok(self.store.replace(entity, value)?)
    }

    /// Edit a component in place, notifying observers
    pub fn patch<T: Component>(&mut self, entity: Entity, edit: impl FnOnce(&mut T)) -> Result<(), SceneError> {
        user_editable::<T>()?;
        Ok(self.store.patch(entity, edit)?)
    }

    /// Detach a component; native physics objects it owned are released now
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, SceneError> {
        user_editable::<T>()?;
        let removed = self.store.remove::<T>(entity);
        self.physics.collect_garbage(&mut self.store);
        Ok(removed)
    }

    /// Parent `child` to `parent`
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), SceneError> {
        Ok(hierarchy::set_parent(&mut self.store, child, parent)?)
    }

    /// Detach `child` from its parent
    pub fn detach(&mut self, child: Entity) -> Option<Entity> {
        hierarchy::detach(&mut self.store, child)
    }

    /// First entity whose [`Name`] equals `name`
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.store
            .iter::<Name>()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(entity, _)| entity)
    }

    /// Iterate entities matching a view
    pub fn view(&self, view: &ComponentView) -> ViewIter<'_> {
        view.iter(&self.store)
    }

    /// Iterate entities matching kinds given by name
    pub fn view_by_names<'a>(&self, include: &[&'a str], exclude: &[&'a str]) -> Result<ViewIter<'_>, SceneError> {
        let view = ComponentView::from_names(include.iter().copied(), exclude.iter().copied())?;
        Ok(view.iter(&self.store))
    }

    /// Register a change observer
    pub fn observe(&mut self, trigger: Trigger) -> ObserverId {
        self.store.observe(trigger)
    }

    /// Take an observer's pending entities
    pub fn drain(&mut self, observer: ObserverId) -> Vec<Entity> {
        self.store.drain(observer)
    }

    /// The component store
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Mutable component store; physics releases happen at the next update
    ///
    /// Unlike the scene mutators this does not guard engine-managed kinds.
    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    // --- Physics ----------------------------------------------------------

    /// Collisions found by the latest update
    pub fn collisions(&self) -> &[Collision] {
        self.physics.collisions()
    }

    /// Set gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.physics.set_gravity(gravity);
    }

    /// Closest hit along a ray, skipping `ignore`
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &[Entity]) -> Option<RayHit> {
        self.physics.raycast(origin, direction, max_distance, ignore)
    }

    /// The physics bridge
    pub fn physics(&self) -> &PhysicsBridge<P> {
        &self.physics
    }

    /// Mutable physics bridge
    pub fn physics_mut(&mut self) -> &mut PhysicsBridge<P> {
        &mut self.physics
    }

    /// Scene settings
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

/// Physics bodies and camera buffers are attached and released by engine systems only
fn user_editable<T: Component>() -> Result<(), EcsError> {
    if T::KIND.is_engine_managed() {
        log::error!("Refusing user edit of engine-managed {} component", T::KIND);
        return Err(EcsError::EngineManaged(T::KIND));
    }
    Ok(())
}
