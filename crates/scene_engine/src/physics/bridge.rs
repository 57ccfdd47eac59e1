//! Physics bridge
//!
//! Keeps native physics bodies in lockstep with `Collider`, `RigidBody` and
//! `Transform` components:
//!
//! - a `Collider` created without a `RigidBody` gets a static body
//! - an entity entering {RigidBody, Transform, Collider} gets a dynamic body
//! - an updated `Collider` rebuilds the body, destroying the old one first
//! - an updated `Transform` teleports the body and wakes it
//! - after each step, dynamic bodies write their pose back into `Transform`
//!
//! Native objects are released only through [`PhysicsBridge::collect_garbage`],
//! which drains the `PhysicsBody` values retired by the store. Removing a
//! `Collider` removes its `PhysicsBody` from an on-destroy hook, so no native
//! body outlives its collider.

use super::backend::{BodyDesc, ContactPoint, DebugLine, PhysicsBackend, PhysicsError, ShapeDesc};
use crate::config::PhysicsConfig;
use crate::ecs::components::{
    Collider, ColliderShape, Parent, PhysicsBody, RigidBody, Transform, COMPOUND_CHILDREN_CAPACITY,
};
use crate::ecs::systems::transform::{world_matrix, DEFAULT_MAX_HIERARCHY_DEPTH};
use crate::ecs::{ComponentKind, ComponentStore, EcsError, Entity, EntitySet, KindSet, ObserverId, Trigger};
use crate::foundation::math::{decompose_translation_rotation, is_valid_rotation, Point3, Quat, Vec3};

/// Kinds an entity needs for a dynamic body
const DYNAMIC_KINDS: KindSet = KindSet::RIGID_BODY.union(KindSet::TRANSFORM).union(KindSet::COLLIDER);

/// Collision between two entities after the latest step
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// First participant
    pub a: Entity,
    /// Second participant
    pub b: Entity,
    /// Contact points; `position_on_a` lies on `a`
    pub contacts: Vec<ContactPoint>,
}

/// Closest raycast hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity that was hit
    pub entity: Entity,
    /// Hit position, world space
    pub point: Vec3,
    /// Surface normal, world space
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Lifecycle counters accumulated since the last [`PhysicsBridge::take_stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Native bodies built
    pub bodies_created: usize,
    /// Native bodies released
    pub bodies_destroyed: usize,
    /// Bodies teleported from an edited Transform
    pub transforms_synced: usize,
    /// Fixed solver steps taken
    pub substeps: u32,
}

#[derive(Debug, Clone, Copy)]
struct BridgeObservers {
    static_created: ObserverId,
    dynamic_group: ObserverId,
    collider_updated: ObserverId,
    transform_updated: ObserverId,
}

/// Synchronizes components with a [`PhysicsBackend`]
pub struct PhysicsBridge<P: PhysicsBackend> {
    backend: P,
    observers: BridgeObservers,
    max_substeps: u32,
    debug_draw: bool,
    max_hierarchy_depth: usize,
    collisions: Vec<Collision>,
    stats: BridgeStats,
}

impl<P: PhysicsBackend> PhysicsBridge<P> {
    /// Wire the bridge into `store`: observers, retired-body queue and hooks
    pub fn new(mut backend: P, config: &PhysicsConfig, store: &mut ComponentStore) -> Result<Self, EcsError> {
        let observers = BridgeObservers {
            static_created: store.observe(Trigger::created(ComponentKind::Collider).without(KindSet::RIGID_BODY)),
            dynamic_group: store.observe(Trigger::group(DYNAMIC_KINDS)),
            collider_updated: store.observe(Trigger::updated(ComponentKind::Collider)),
            transform_updated: store.observe(Trigger::updated(ComponentKind::Transform).with(KindSet::PHYSICS_BODY)),
        };
        store.retain_removed::<PhysicsBody>()?;
        store.on_destroy::<Collider>(collider_destroyed)?;
        store.on_destroy::<RigidBody>(rigid_body_destroyed)?;

        backend.set_gravity(Vec3::from(config.gravity));
        log::debug!("Physics bridge ready, gravity {:?}", config.gravity);

        Ok(Self {
            backend,
            observers,
            max_substeps: config.max_substeps,
            debug_draw: config.debug_draw,
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            collisions: Vec::new(),
            stats: BridgeStats::default(),
        })
    }

    /// Builder pattern: bound parent walks used to place parented bodies
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// The physics backend
    pub fn backend(&self) -> &P {
        &self.backend
    }

    /// Mutable access to the physics backend
    pub fn backend_mut(&mut self) -> &mut P {
        &mut self.backend
    }

    /// Whether collider outlines should be drawn after each camera pass
    pub fn debug_draw(&self) -> bool {
        self.debug_draw
    }

    /// Enable or disable debug drawing
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.debug_draw = enabled;
    }

    /// Counters since the last call, resetting them
    pub fn take_stats(&mut self) -> BridgeStats {
        std::mem::take(&mut self.stats)
    }

    /// Release native objects of every retired `PhysicsBody`.
    /// Returns the number of bodies released.
    pub fn collect_garbage(&mut self, store: &mut ComponentStore) -> usize {
        let retired = store.drain_retired::<PhysicsBody>();
        for (entity, body) in &retired {
            if !self.backend.destroy_body(body.body) {
                log::error!("Physics body {:?} of {:?} was already gone", body.body, entity);
            }
            if !self.backend.destroy_shape(body.shape) {
                log::error!("Physics shape {:?} of {:?} was already gone", body.shape, entity);
            }
            log::debug!("Released physics body of {:?}", entity);
        }
        self.stats.bodies_destroyed += retired.len();
        retired.len()
    }

    /// Create or rebuild bodies flagged by the lifecycle observers.
    /// Returns the number of bodies built.
    pub fn sync_bodies(&mut self, store: &mut ComponentStore) -> usize {
        let mut pending = EntitySet::default();
        for entity in store.drain(self.observers.static_created) {
            if store.has::<Collider>(entity) && !store.has::<RigidBody>(entity) {
                pending.insert(entity);
            }
        }
        for entity in store.drain(self.observers.dynamic_group) {
            if store.has_all(entity, DYNAMIC_KINDS) {
                pending.insert(entity);
            }
        }
        for entity in store.drain(self.observers.collider_updated) {
            if store.has::<Collider>(entity) && Self::rebuild_on_collider_edit(store, entity) {
                pending.insert(entity);
            }
        }

        let mut built = 0;
        for entity in pending.drain() {
            match self.rebuild_body(store, entity) {
                Ok(true) => built += 1,
                Ok(false) => {}
                Err(err) => log::error!("Failed to build physics body for {:?}: {}", entity, err),
            }
        }
        built
    }

    /// A collider edit only recreates an active body or builds one for an entity that is
    /// already eligible as static or dynamic
    fn rebuild_on_collider_edit(store: &ComponentStore, entity: Entity) -> bool {
        store.has::<PhysicsBody>(entity) || !store.has::<RigidBody>(entity) || store.has_all(entity, DYNAMIC_KINDS)
    }

    fn rebuild_body(&mut self, store: &mut ComponentStore, entity: Entity) -> Result<bool, PhysicsError> {
        if store.remove::<PhysicsBody>(entity).is_some() {
            self.collect_garbage(store);
        }
        let Some(collider) = store.get::<Collider>(entity).cloned() else {
            return Ok(false);
        };
        let transform = store.get::<Transform>(entity).cloned().unwrap_or_default();
        let mass = store.get::<RigidBody>(entity).map_or(0.0, |body| body.mass);
        let (position, rotation) = self.world_pose(store, entity, &transform);

        let shape = self.backend.create_shape(&ShapeDesc {
            shape: sanitize_shape(entity, &collider.shape),
            local_scaling: transform.scale,
        })?;
        let body = match self.backend.create_body(&BodyDesc {
            shape,
            mass,
            position,
            rotation,
            is_trigger: collider.is_trigger,
            friction: collider.friction,
            restitution: collider.bounciness,
            entity,
        }) {
            Ok(body) => body,
            Err(err) => {
                self.backend.destroy_shape(shape);
                return Err(err);
            }
        };

        if let Err(err) = store.insert(entity, PhysicsBody { shape, body }) {
            log::error!("Cannot attach physics body to {:?}: {}", entity, err);
            self.backend.destroy_body(body);
            self.backend.destroy_shape(shape);
            return Ok(false);
        }

        self.stats.bodies_created += 1;
        log::debug!(
            "Created {} physics body for {:?}",
            if mass > 0.0 { "dynamic" } else { "static" },
            entity
        );
        Ok(true)
    }

    /// World pose used to drive a body; parented entities are placed in world space
    fn world_pose(&self, store: &ComponentStore, entity: Entity, transform: &Transform) -> (Vec3, Quat) {
        if store.has::<Parent>(entity) {
            decompose_translation_rotation(&world_matrix(store, entity, self.max_hierarchy_depth))
        } else {
            (transform.position, transform.rotation)
        }
    }

    /// Teleport bodies whose Transform was edited, waking them.
    /// Returns the number of bodies moved.
    pub fn sync_transforms(&mut self, store: &mut ComponentStore) -> usize {
        let mut synced = 0;
        for entity in store.drain(self.observers.transform_updated) {
            let (Some(physics), Some(transform)) = (store.get::<PhysicsBody>(entity), store.get::<Transform>(entity))
            else {
                continue;
            };
            let (position, rotation) = self.world_pose(store, entity, transform);
            if let Err(err) = self.backend.set_body_transform(physics.body, position, rotation) {
                log::error!("Cannot move physics body of {:?}: {}", entity, err);
                continue;
            }
            self.backend.activate(physics.body);
            synced += 1;
        }
        self.stats.transforms_synced += synced;
        synced
    }

    /// Advance the simulation; returns the number of fixed steps taken
    pub fn step(&mut self, dt: f32) -> u32 {
        let substeps = self.backend.step_simulation(dt, self.max_substeps);
        self.stats.substeps += substeps;
        log::trace!("Physics step {:.4}s took {} substeps", dt, substeps);
        substeps
    }

    /// Copy simulated poses of dynamic bodies into their Transforms.
    ///
    /// Writes position and rotation only, through the silent write path.
    /// Parented entities receive the pose relative to their parent.
    pub fn write_back(&mut self, store: &mut ComponentStore) -> usize {
        let entities = store.query(
            KindSet::TRANSFORM | KindSet::PHYSICS_BODY | KindSet::RIGID_BODY,
            KindSet::empty(),
        );
        let mut written = 0;
        for entity in entities {
            let Some(physics) = store.get::<PhysicsBody>(entity) else {
                continue;
            };
            let Some((mut position, mut rotation)) = self.backend.body_transform(physics.body) else {
                log::warn!("Physics body of {:?} is missing from the backend", entity);
                continue;
            };
            if let Some(parent) = store.get::<Parent>(entity).map(|p| p.entity) {
                if store.has::<Transform>(parent) {
                    let parent_world = world_matrix(store, parent, self.max_hierarchy_depth);
                    let (_, parent_rotation) = decompose_translation_rotation(&parent_world);
                    if let Some(inverse) = parent_world.try_inverse() {
                        position = inverse.transform_point(&Point3::from(position)).coords;
                        rotation = parent_rotation.inverse() * rotation;
                    }
                }
            }
            if let Some(transform) = store.get_mut::<Transform>(entity) {
                transform.position = position;
                transform.rotation = rotation;
                written += 1;
            }
        }
        written
    }

    /// Rebuild the collision list from the backend's contact manifolds
    pub fn rebuild_collisions(&mut self) -> &[Collision] {
        self.collisions = self
            .backend
            .contact_manifolds()
            .into_iter()
            .map(|manifold| Collision {
                a: manifold.entity_a,
                b: manifold.entity_b,
                contacts: manifold.points,
            })
            .collect();
        &self.collisions
    }

    /// Collisions found by the latest step
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Set gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.backend.set_gravity(gravity);
    }

    /// Current gravity
    pub fn gravity(&self) -> Vec3 {
        self.backend.gravity()
    }

    /// Closest hit along `direction` within `max_distance`, skipping `ignore`
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &[Entity]) -> Option<RayHit> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        if !(max_distance > 0.0) {
            return None;
        }
        let to = origin + direction * max_distance;
        let hit = self.backend.ray_test(origin, to, &|entity| !ignore.contains(&entity))?;
        Some(RayHit {
            entity: hit.entity,
            point: hit.point,
            normal: hit.normal,
            distance: hit.fraction * max_distance,
        })
    }

    /// Collider outlines from the backend
    pub fn debug_lines(&self) -> Vec<DebugLine> {
        self.backend.debug_lines()
    }
}

/// Clamp a compound to its child capacity and repair malformed rotations
fn sanitize_shape(entity: Entity, shape: &ColliderShape) -> ColliderShape {
    let ColliderShape::Compound(children) = shape else {
        return shape.clone();
    };
    let mut children = children.clone();
    if children.len() > COMPOUND_CHILDREN_CAPACITY {
        log::error!(
            "Compound collider of {:?} has {} children, keeping the first {}",
            entity,
            children.len(),
            COMPOUND_CHILDREN_CAPACITY
        );
        children.truncate(COMPOUND_CHILDREN_CAPACITY);
    }
    for child in &mut children {
        if !is_valid_rotation(&child.rotation) {
            log::error!("Compound child of {:?} has a malformed rotation, using identity", entity);
            child.rotation = Quat::identity();
        }
    }
    ColliderShape::Compound(children)
}

fn collider_destroyed(store: &mut ComponentStore, entity: Entity, _collider: &Collider) {
    store.remove::<PhysicsBody>(entity);
}

/// A collider that loses its rigid body becomes static
fn rigid_body_destroyed(store: &mut ComponentStore, entity: Entity, _body: &RigidBody) {
    if !store.has::<Collider>(entity) {
        return;
    }
    if let Err(err) = store.patch::<Collider>(entity, |_| {}) {
        log::error!("Cannot rebuild {:?} as a static body: {}", entity, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{CompoundChild, PrimitiveShape};
    use crate::physics::SimplePhysicsWorld;
    use approx::assert_relative_eq;

    fn setup(config: &PhysicsConfig) -> (ComponentStore, PhysicsBridge<SimplePhysicsWorld>) {
        let mut store = ComponentStore::new();
        let bridge = PhysicsBridge::new(SimplePhysicsWorld::new(config), config, &mut store).unwrap();
        (store, bridge)
    }

    fn frame(store: &mut ComponentStore, bridge: &mut PhysicsBridge<SimplePhysicsWorld>, dt: f32) {
        bridge.collect_garbage(store);
        bridge.sync_bodies(store);
        bridge.sync_transforms(store);
        bridge.step(dt);
        bridge.write_back(store);
        bridge.rebuild_collisions();
    }

    #[test]
    fn test_collider_alone_builds_static_body() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::default());
        let wall = store.create();
        store.insert(wall, Transform::from_position(Vec3::new(0.0, 1.0, 0.0))).unwrap();
        store.insert(wall, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();

        frame(&mut store, &mut bridge, 1.0 / 60.0);

        assert!(store.has::<PhysicsBody>(wall));
        assert_eq!(bridge.backend().body_count(), 1);
        assert_eq!(store.get::<Transform>(wall).unwrap().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(bridge.take_stats().bodies_created, 1);
    }

    #[test]
    fn test_removing_collider_releases_native_objects() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::default());
        let ball = store.create();
        store.insert(ball, Transform::default()).unwrap();
        store.insert(ball, Collider::sphere(0.5)).unwrap();
        store.insert(ball, RigidBody::new(1.0)).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);
        assert_eq!(bridge.backend().body_count(), 1);

        store.remove::<Collider>(ball);
        assert!(!store.has::<PhysicsBody>(ball));
        bridge.collect_garbage(&mut store);

        assert_eq!(bridge.backend().body_count(), 0);
        assert_eq!(bridge.backend().shape_count(), 0);
    }

    #[test]
    fn test_dynamic_body_falls_and_writes_back() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::default());
        let ball = store.create();
        store.insert(ball, Transform::from_position(Vec3::new(0.0, 10.0, 0.0))).unwrap();
        store.insert(ball, Collider::sphere(0.5)).unwrap();
        store.insert(ball, RigidBody::new(1.0)).unwrap();

        for _ in 0..10 {
            frame(&mut store, &mut bridge, 1.0 / 60.0);
        }
        assert!(store.get::<Transform>(ball).unwrap().position.y < 10.0);
    }

    #[test]
    fn test_edited_transform_teleports_body() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::zero_gravity());
        let crate_entity = store.create();
        store.insert(crate_entity, Transform::default()).unwrap();
        store.insert(crate_entity, Collider::default()).unwrap();
        store.insert(crate_entity, RigidBody::new(2.0)).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);

        store
            .patch::<Transform>(crate_entity, |t| t.position = Vec3::new(5.0, 0.0, 0.0))
            .unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);

        let body = store.get::<PhysicsBody>(crate_entity).unwrap().body;
        let (position, _) = bridge.backend().body_transform(body).unwrap();
        assert_relative_eq!(position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(bridge.take_stats().transforms_synced, 1);
    }

    #[test]
    fn test_removing_rigid_body_rebuilds_static() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::zero_gravity());
        let entity = store.create();
        store.insert(entity, Transform::default()).unwrap();
        store.insert(entity, Collider::default()).unwrap();
        store.insert(entity, RigidBody::new(1.0)).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);
        bridge.take_stats();

        store.remove::<RigidBody>(entity);
        frame(&mut store, &mut bridge, 1.0 / 60.0);

        let stats = bridge.take_stats();
        assert_eq!(stats.bodies_created, 1);
        assert_eq!(stats.bodies_destroyed, 1);
        assert_eq!(bridge.backend().body_count(), 1);
    }

    #[test]
    fn test_collider_edit_without_transform_builds_nothing() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::default());
        let entity = store.create();
        store.insert(entity, RigidBody::new(1.0)).unwrap();
        store.insert(entity, Collider::sphere(0.5)).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);
        assert!(!store.has::<PhysicsBody>(entity));

        store
            .patch::<Collider>(entity, |collider| collider.shape = ColliderShape::Sphere { radius: 1.0 })
            .unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);

        assert!(!store.has::<PhysicsBody>(entity));
        assert_eq!(bridge.backend().body_count(), 0);
        assert_eq!(bridge.take_stats().bodies_created, 0);

        store.insert(entity, Transform::default()).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);
        assert!(store.has::<PhysicsBody>(entity));
        assert_eq!(bridge.backend().body_count(), 1);
    }

    #[test]
    fn test_oversized_compound_is_truncated() {
        let child = CompoundChild::new(PrimitiveShape::Sphere { radius: 0.25 }, Vec3::zeros());
        let shape = ColliderShape::Compound(vec![child; COMPOUND_CHILDREN_CAPACITY + 3]);
        match sanitize_shape(Entity::new(1, 0), &shape) {
            ColliderShape::Compound(children) => assert_eq!(children.len(), COMPOUND_CHILDREN_CAPACITY),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_raycast_reports_distance() {
        let (mut store, mut bridge) = setup(&PhysicsConfig::zero_gravity());
        let target = store.create();
        store.insert(target, Transform::from_position(Vec3::new(0.0, 0.0, -10.0))).unwrap();
        store.insert(target, Collider::sphere(1.0)).unwrap();
        frame(&mut store, &mut bridge, 1.0 / 60.0);

        let hit = bridge
            .raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 100.0, &[])
            .unwrap();
        assert_eq!(hit.entity, target);
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-4);

        assert!(bridge.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 5.0, &[]).is_none());
        assert!(bridge.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 100.0, &[target]).is_none());
    }
}
