//! End-to-end frame pipeline tests driving a full `Scene`

use approx::assert_relative_eq;
use scene_engine::ecs::components::{CameraBuffer, Children, PhysicsBody};
use scene_engine::ecs::KindSet;
use scene_engine::physics::{
    BodyDesc, BodyHandle, ContactManifold, DebugLine, PhysicsError, RayTestHit, ShapeDesc, ShapeHandle,
};
use scene_engine::prelude::*;
use scene_engine::render::RenderResult;

/// Solver wrapper counting every native object it hands out
struct CountingWorld {
    inner: SimplePhysicsWorld,
    shapes_created: usize,
    shapes_destroyed: usize,
    bodies_created: usize,
    bodies_destroyed: usize,
}

impl CountingWorld {
    fn new(config: &PhysicsConfig) -> Self {
        Self {
            inner: SimplePhysicsWorld::new(config),
            shapes_created: 0,
            shapes_destroyed: 0,
            bodies_created: 0,
            bodies_destroyed: 0,
        }
    }

    fn live_bodies(&self) -> usize {
        self.bodies_created - self.bodies_destroyed
    }

    fn live_shapes(&self) -> usize {
        self.shapes_created - self.shapes_destroyed
    }
}

impl PhysicsBackend for CountingWorld {
    fn create_shape(&mut self, desc: &ShapeDesc) -> Result<ShapeHandle, PhysicsError> {
        let shape = self.inner.create_shape(desc)?;
        self.shapes_created += 1;
        Ok(shape)
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) -> bool {
        let destroyed = self.inner.destroy_shape(shape);
        if destroyed {
            self.shapes_destroyed += 1;
        }
        destroyed
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        let body = self.inner.create_body(desc)?;
        self.bodies_created += 1;
        Ok(body)
    }

    fn destroy_body(&mut self, body: BodyHandle) -> bool {
        let destroyed = self.inner.destroy_body(body);
        if destroyed {
            self.bodies_destroyed += 1;
        }
        destroyed
    }

    fn set_body_transform(&mut self, body: BodyHandle, position: Vec3, rotation: Quat) -> Result<(), PhysicsError> {
        self.inner.set_body_transform(body, position, rotation)
    }

    fn body_transform(&self, body: BodyHandle) -> Option<(Vec3, Quat)> {
        self.inner.body_transform(body)
    }

    fn activate(&mut self, body: BodyHandle) {
        self.inner.activate(body);
    }

    fn step_simulation(&mut self, dt: f32, max_substeps: u32) -> u32 {
        self.inner.step_simulation(dt, max_substeps)
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.inner.set_gravity(gravity);
    }

    fn gravity(&self) -> Vec3 {
        self.inner.gravity()
    }

    fn contact_manifolds(&self) -> Vec<ContactManifold> {
        self.inner.contact_manifolds()
    }

    fn ray_test(&self, from: Vec3, to: Vec3, filter: &dyn Fn(Entity) -> bool) -> Option<RayTestHit> {
        self.inner.ray_test(from, to, filter)
    }

    fn debug_lines(&self) -> Vec<DebugLine> {
        self.inner.debug_lines()
    }
}

/// Renderer recording what the scene submits
#[derive(Default)]
struct RecordingRenderer {
    frames: usize,
    next_buffer: u32,
    live_buffers: Vec<UniformBufferHandle>,
    uploads: usize,
    draws: Vec<(GeometryHandle, Mat4, Option<Vec<Mat4>>)>,
    lines: usize,
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self) -> RenderResult<()> {
        self.draws.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: &Viewport, _clear_color: [f32; 4]) {}

    fn create_uniform_buffer(&mut self, _size: usize) -> RenderResult<UniformBufferHandle> {
        let handle = UniformBufferHandle(self.next_buffer);
        self.next_buffer += 1;
        self.live_buffers.push(handle);
        Ok(handle)
    }

    fn destroy_uniform_buffer(&mut self, handle: UniformBufferHandle) {
        self.live_buffers.retain(|live| *live != handle);
    }

    fn upload_uniform(&mut self, _handle: UniformBufferHandle, _bytes: &[u8]) -> RenderResult<()> {
        self.uploads += 1;
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand<'_>) -> RenderResult<()> {
        self.draws.push((command.geometry, command.model, command.bones.map(<[Mat4]>::to_vec)));
        Ok(())
    }

    fn draw_line(&mut self, _from: Vec3, _to: Vec3, _color: Vec3) {
        self.lines += 1;
    }
}

const DT: f32 = 1.0 / 60.0;

fn counting_scene(config: SceneConfig) -> Scene<CountingWorld> {
    let _ = env_logger::builder().is_test(true).try_init();
    let backend = CountingWorld::new(&config.physics);
    Scene::with_backend(config, backend).unwrap()
}

fn position_of<P: PhysicsBackend>(scene: &Scene<P>, entity: Entity) -> Vec3 {
    scene.get::<Transform>(entity).unwrap().position
}

#[test]
fn test_static_body_is_replaced_when_rigid_body_arrives() {
    let mut scene = counting_scene(SceneConfig::default());
    let entity = scene.create_entity();
    scene.insert(entity, Transform::from_position(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    scene.insert(entity, Collider::sphere(0.5)).unwrap();

    scene.update(DT);
    assert_eq!(scene.physics().backend().live_bodies(), 1);
    let static_body = *scene.get::<PhysicsBody>(entity).unwrap();

    scene.insert(entity, RigidBody::new(2.0)).unwrap();
    let stats = scene.update(DT);

    let backend = scene.physics().backend();
    assert_eq!(backend.live_bodies(), 1);
    assert_eq!(backend.live_shapes(), 1);
    assert_eq!(backend.bodies_created, 2);
    assert_eq!((stats.bodies_created, stats.bodies_destroyed), (1, 1));
    assert_ne!(*scene.get::<PhysicsBody>(entity).unwrap(), static_body);
    assert!(position_of(&scene, entity).y < 5.0, "dynamic body should fall");
}

#[test]
fn test_removing_rigid_body_rebuilds_static_body() {
    let mut scene = counting_scene(SceneConfig::default());
    let entity = scene.create_entity();
    scene.insert(entity, Transform::from_position(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    scene.insert(entity, Collider::sphere(0.5)).unwrap();
    scene.insert(entity, RigidBody::new(1.0)).unwrap();
    scene.update(DT);

    assert!(scene.remove::<RigidBody>(entity).unwrap().is_some());
    scene.update(DT);
    let resting = position_of(&scene, entity);
    for _ in 0..30 {
        scene.update(DT);
    }

    assert_eq!(scene.physics().backend().live_bodies(), 1);
    assert!(scene.has::<PhysicsBody>(entity));
    assert_relative_eq!(position_of(&scene, entity), resting);
}

#[test]
fn test_repeated_collider_updates_keep_one_live_body() {
    let mut scene = counting_scene(SceneConfig::default());
    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();
    scene.insert(entity, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();
    scene.update(DT);

    for size in 1..=5 {
        scene.replace(entity, Collider::sphere(size as f32)).unwrap();
    }
    let stats = scene.update(DT);
    assert_eq!(stats.bodies_created, 1);
    assert_eq!(scene.physics().backend().live_bodies(), 1);

    for radius in [0.5, 0.75, 1.0] {
        scene.patch::<Collider>(entity, |collider| collider.shape = ColliderShape::Sphere { radius }).unwrap();
        scene.update(DT);
        assert_eq!(scene.physics().backend().live_bodies(), 1);
    }

    assert!(scene.remove::<Collider>(entity).unwrap().is_some());
    let backend = scene.physics().backend();
    assert_eq!(backend.live_bodies(), 0);
    assert_eq!(backend.live_shapes(), 0);
    assert!(!scene.has::<PhysicsBody>(entity));
}

#[test]
fn test_destroying_entities_releases_every_native_object() {
    let mut scene = counting_scene(SceneConfig::default());
    let entities: Vec<Entity> = (0..4)
        .map(|i| {
            let entity = scene.create_entity();
            scene.insert(entity, Transform::from_position(Vec3::new(i as f32 * 3.0, 0.0, 0.0))).unwrap();
            scene.insert(entity, Collider::sphere(1.0)).unwrap();
            if i % 2 == 0 {
                scene.insert(entity, RigidBody::new(1.0)).unwrap();
            }
            entity
        })
        .collect();
    scene.update(DT);
    assert_eq!(scene.physics().backend().live_bodies(), 4);

    for entity in entities {
        scene.destroy_entity(entity).unwrap();
    }
    assert_eq!(scene.physics().backend().live_bodies(), 0);
    assert_eq!(scene.physics().backend().live_shapes(), 0);
}

#[test]
fn test_parented_world_position_adds_offsets() {
    let mut scene = counting_scene(SceneConfig::default());
    let parent = scene.create_entity();
    scene.insert(parent, Transform::from_position(Vec3::new(10.0, 0.0, 0.0))).unwrap();
    let child = scene.create_entity();
    scene.insert(child, Transform::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();
    scene.set_parent(child, parent).unwrap();

    scene.update(DT);

    let world = scene.get::<Transform>(child).unwrap().world_position();
    assert_relative_eq!(world, Vec3::new(11.0, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn test_chain_world_matrix_is_product_of_locals() {
    let mut scene = counting_scene(SceneConfig::default());
    let a_local = Transform::from_trs(
        Vec3::new(1.0, 0.0, 0.0),
        Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        Vec3::new(1.0, 1.0, 1.0),
    );
    let b_local = Transform::from_trs(Vec3::new(0.0, 2.0, 0.0), Quat::identity(), Vec3::new(2.0, 2.0, 2.0));
    let c_local = Transform::from_position(Vec3::new(0.0, 0.0, 3.0));

    let a = scene.create_entity();
    scene.insert(a, a_local.clone()).unwrap();
    let b = scene.create_entity();
    scene.insert(b, b_local.clone()).unwrap();
    let c = scene.create_entity();
    scene.insert(c, c_local.clone()).unwrap();
    scene.set_parent(b, a).unwrap();
    scene.set_parent(c, b).unwrap();

    let stats = scene.update(DT);

    let expected = a_local.local_matrix() * b_local.local_matrix() * c_local.local_matrix();
    assert_relative_eq!(scene.get::<Transform>(c).unwrap().local_to_world, expected, epsilon = 1e-4);
    assert_eq!(stats.hierarchy_resolved, 2);
}

#[test]
fn test_parent_and_children_stay_symmetric() {
    let mut scene = counting_scene(SceneConfig::default());
    let first = scene.create_entity();
    let second = scene.create_entity();
    let kids: Vec<Entity> = (0..3).map(|_| scene.create_entity()).collect();
    for &kid in &kids {
        scene.set_parent(kid, first).unwrap();
    }

    scene.set_parent(kids[1], second).unwrap();
    scene.detach(kids[2]);

    let first_children: Vec<Entity> = scene.get::<Children>(first).unwrap().iter().collect();
    let second_children: Vec<Entity> = scene.get::<Children>(second).unwrap().iter().collect();
    assert_eq!(first_children, vec![kids[0]]);
    assert_eq!(second_children, vec![kids[1]]);
    for parent in [first, second] {
        for child in scene.get::<Children>(parent).unwrap().iter() {
            assert_eq!(scene.get::<Parent>(child).map(|p| p.entity), Some(parent));
        }
    }
    assert!(scene.set_parent(kids[0], kids[0]).is_err());
    assert_eq!(scene.get::<Parent>(kids[0]).map(|p| p.entity), Some(first));
}

#[test]
fn test_bodies_do_not_drift_without_gravity() {
    let config = SceneConfig::default().with_physics(PhysicsConfig::zero_gravity());
    let mut scene = counting_scene(config);
    let start = Vec3::new(1.0, 3.0, -2.0);
    let entity = scene.create_entity();
    scene.insert(entity, Transform::from_position(start)).unwrap();
    scene.insert(entity, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();
    scene.insert(entity, RigidBody::new(1.0)).unwrap();

    for _ in 0..240 {
        scene.update(DT);
    }

    assert_relative_eq!(position_of(&scene, entity), start, epsilon = 1e-5);
}

#[test]
fn test_falling_box_lands_on_floor_and_reports_collision() {
    let mut scene = counting_scene(SceneConfig::default());
    let floor = scene.create_named("floor").unwrap();
    scene.insert(floor, Transform::from_position(Vec3::new(0.0, -0.5, 0.0))).unwrap();
    scene.insert(floor, Collider::cuboid(Vec3::new(20.0, 1.0, 20.0))).unwrap();
    let falling = scene.create_named("box").unwrap();
    scene.insert(falling, Transform::from_position(Vec3::new(0.0, 2.0, 0.0))).unwrap();
    scene.insert(falling, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();
    scene.insert(falling, RigidBody::new(1.0)).unwrap();

    let mut touched = false;
    for _ in 0..180 {
        scene.update(DT);
        touched |= scene
            .collisions()
            .iter()
            .any(|c| (c.a == floor && c.b == falling) || (c.a == falling && c.b == floor));
    }

    assert!(touched);
    let y = position_of(&scene, falling).y;
    assert!((0.4..0.6).contains(&y), "box should rest on the floor, got y = {y}");
}

#[test]
fn test_edited_transform_teleports_body() {
    let config = SceneConfig::default().with_physics(PhysicsConfig::zero_gravity());
    let mut scene = counting_scene(config);
    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();
    scene.insert(entity, Collider::sphere(0.5)).unwrap();
    scene.insert(entity, RigidBody::new(1.0)).unwrap();
    scene.update(DT);

    scene.patch::<Transform>(entity, |t| t.position = Vec3::new(0.0, 0.0, 7.0)).unwrap();
    let stats = scene.update(DT);

    assert_eq!(stats.transforms_synced, 1);
    assert_relative_eq!(position_of(&scene, entity), Vec3::new(0.0, 0.0, 7.0), epsilon = 1e-5);
}

#[test]
fn test_raycast_skips_ignored_entities() {
    let mut scene = counting_scene(SceneConfig::default());
    let near = scene.create_entity();
    scene.insert(near, Transform::from_position(Vec3::new(2.0, 0.0, 0.0))).unwrap();
    scene.insert(near, Collider::sphere(0.5)).unwrap();
    let far = scene.create_entity();
    scene.insert(far, Transform::from_position(Vec3::new(5.0, 0.0, 0.0))).unwrap();
    scene.insert(far, Collider::sphere(0.5)).unwrap();
    scene.update(DT);

    let hit = scene.raycast(Vec3::zeros(), Vec3::x(), 10.0, &[]).unwrap();
    assert_eq!(hit.entity, near);
    assert_relative_eq!(hit.distance, 1.5, epsilon = 1e-4);

    let hit = scene.raycast(Vec3::zeros(), Vec3::x(), 10.0, &[near]).unwrap();
    assert_eq!(hit.entity, far);
    assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-4);
    assert_relative_eq!(hit.normal, -Vec3::x(), epsilon = 1e-4);

    assert!(scene.raycast(Vec3::zeros(), Vec3::x(), 10.0, &[near, far]).is_none());
    assert!(scene.raycast(Vec3::zeros(), Vec3::x(), 1.0, &[]).is_none());
}

#[test]
fn test_observers_report_each_entity_once() {
    let mut scene = counting_scene(SceneConfig::default());
    let created = scene.observe(Trigger::created(ComponentKind::Mesh));
    let group = scene.observe(Trigger::group(KindSet::TRANSFORM | KindSet::MESH));
    let updated = scene.observe(Trigger::updated(ComponentKind::Transform));

    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();
    scene.insert(entity, Mesh::new(GeometryHandle(0))).unwrap();
    for _ in 0..3 {
        scene.patch::<Transform>(entity, |t| t.position.x += 1.0).unwrap();
    }

    assert_eq!(scene.drain(created), vec![entity]);
    assert_eq!(scene.drain(group), vec![entity]);
    assert_eq!(scene.drain(updated), vec![entity]);
    assert!(scene.drain(created).is_empty());
    assert!(scene.drain(updated).is_empty());

    // Leaving the group before draining cancels the notification
    let leaver = scene.create_entity();
    scene.insert(leaver, Transform::identity()).unwrap();
    scene.insert(leaver, Mesh::new(GeometryHandle(1))).unwrap();
    assert!(scene.remove::<Mesh>(leaver).unwrap().is_some());
    assert!(scene.drain(group).is_empty());
}

#[test]
fn test_named_views_match_typed_views() {
    let mut scene = counting_scene(SceneConfig::default());
    let lit = scene.create_named("lamp").unwrap();
    scene.insert(lit, Transform::identity()).unwrap();
    scene.insert(lit, LightFactory::point(Vec3::new(1.0, 1.0, 1.0), 5.0)).unwrap();
    let plain = scene.create_named("crate").unwrap();
    scene.insert(plain, Transform::identity()).unwrap();

    let typed: Vec<Entity> = scene.view(&ComponentView::new(KindSet::TRANSFORM).excluding(KindSet::LIGHT)).collect();
    let named: Vec<Entity> = scene.view_by_names(&["Transform"], &["Light"]).unwrap().collect();
    assert_eq!(typed, vec![plain]);
    assert_eq!(named, typed);
    assert_eq!(scene.find_by_name("lamp"), Some(lit));
    assert!(scene.view_by_names(&["Teapot"], &[]).is_err());
}

fn add_camera<P: PhysicsBackend>(scene: &mut Scene<P>) -> Entity {
    let camera = scene.create_entity();
    scene.insert(camera, Transform::from_position(Vec3::new(0.0, 2.0, 10.0))).unwrap();
    scene.insert(camera, Camera::perspective(60.0, 0.1, 100.0)).unwrap();
    camera
}

#[test]
fn test_lights_are_packed_and_uploaded_each_frame() {
    let mut scene = counting_scene(SceneConfig::default());
    add_camera(&mut scene);
    let sun = scene.create_entity();
    scene
        .insert(sun, LightFactory::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.9)))
        .unwrap();
    for x in [-2.0, 2.0] {
        let lamp = scene.create_entity();
        scene.insert(lamp, Transform::from_position(Vec3::new(x, 1.0, 0.0))).unwrap();
        scene.insert(lamp, LightFactory::point(Vec3::new(1.0, 0.5, 0.2), 8.0)).unwrap();
    }

    let mut renderer = RecordingRenderer::default();
    let stats = scene.frame(DT, &mut renderer).unwrap();

    assert_eq!(stats.lights_packed, 3);
    assert_eq!(stats.cameras_rendered, 1);
    // One light record and one camera record
    assert_eq!(renderer.uploads, 2);
    assert_eq!(renderer.live_buffers.len(), 2);

    scene.frame(DT, &mut renderer).unwrap();
    assert_eq!(renderer.live_buffers.len(), 2, "buffers are reused across frames");
    assert_eq!(renderer.frames, 2);
}

#[test]
fn test_static_and_skinned_meshes_are_drawn() {
    let mut scene = counting_scene(SceneConfig::default());
    add_camera(&mut scene);

    let statue = scene.create_entity();
    scene.insert(statue, Transform::from_position(Vec3::new(3.0, 0.0, 0.0))).unwrap();
    scene.insert(statue, Mesh::new(GeometryHandle(0))).unwrap();
    scene.insert(statue, Material::from_color(Vec4::new(1.0, 1.0, 1.0, 1.0))).unwrap();

    let character = scene.create_entity();
    scene.insert(character, Transform::from_position(Vec3::new(-1.0, 0.0, 0.0))).unwrap();
    scene.insert(character, Mesh::new(GeometryHandle(1)).with_skin(SkinHandle(0))).unwrap();
    scene.insert(character, Material::from_color(Vec4::new(0.8, 0.6, 0.5, 1.0))).unwrap();
    let bone = scene.create_entity();
    scene.insert(bone, Transform::from_position(Vec3::new(0.0, 1.0, 0.0))).unwrap();
    scene.insert(bone, Bone::default()).unwrap();
    scene.set_parent(bone, character).unwrap();
    scene.insert(character, Skin::new(vec![bone, Entity::INVALID])).unwrap();

    let broken = scene.create_entity();
    scene.insert(broken, Transform::identity()).unwrap();
    scene.insert(broken, Mesh::default()).unwrap();
    scene.insert(broken, Material::from_color(Vec4::new(1.0, 0.0, 0.0, 1.0))).unwrap();

    let mut renderer = RecordingRenderer::default();
    let stats = scene.frame(DT, &mut renderer).unwrap();

    assert_eq!(stats.draws_submitted, 2);
    assert_eq!(stats.draws_skipped, 1);

    let (_, model, bones) = renderer.draws.iter().find(|(g, _, _)| *g == GeometryHandle(0)).unwrap();
    assert_relative_eq!(*model, Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0)), epsilon = 1e-5);
    assert!(bones.is_none());

    let (_, _, bones) = renderer.draws.iter().find(|(g, _, _)| *g == GeometryHandle(1)).unwrap();
    let bones = bones.as_ref().unwrap();
    assert_eq!(bones.len(), 2);
    assert_relative_eq!(bones[0], Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0)), epsilon = 1e-5);
    assert_relative_eq!(bones[1], Mat4::identity());
}

#[test]
fn test_destroyed_camera_buffer_is_released_next_render() {
    let mut scene = counting_scene(SceneConfig::default());
    let camera = add_camera(&mut scene);
    let mut renderer = RecordingRenderer::default();
    scene.frame(DT, &mut renderer).unwrap();
    assert_eq!(renderer.live_buffers.len(), 2);

    scene.destroy_entity(camera).unwrap();
    assert_eq!(renderer.live_buffers.len(), 2);
    scene.frame(DT, &mut renderer).unwrap();
    assert_eq!(renderer.live_buffers.len(), 1);

    scene.release_render_resources(&mut renderer);
    assert!(renderer.live_buffers.is_empty());
}

#[test]
fn test_debug_draw_submits_collider_outlines() {
    let config = SceneConfig::default().with_physics(PhysicsConfig::default().with_debug_draw(true));
    let mut scene = counting_scene(config);
    add_camera(&mut scene);
    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();
    scene.insert(entity, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();

    let mut renderer = RecordingRenderer::default();
    scene.frame(DT, &mut renderer).unwrap();
    assert!(renderer.lines > 0);
}

#[test]
fn test_user_cannot_remove_engine_managed_body() {
    let mut scene = counting_scene(SceneConfig::default());
    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();
    scene.insert(entity, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0))).unwrap();
    scene.update(DT);

    let err = scene.remove::<PhysicsBody>(entity).unwrap_err();
    assert!(matches!(err, SceneError::Ecs(EcsError::EngineManaged(ComponentKind::PhysicsBody))));
    for _ in 0..3 {
        scene.update(DT);
    }

    assert!(scene.has::<PhysicsBody>(entity));
    assert_eq!(scene.physics().backend().live_bodies(), 1);
}

#[test]
fn test_user_cannot_attach_engine_managed_components() {
    let mut scene = counting_scene(SceneConfig::default());
    let entity = scene.create_entity();
    scene.insert(entity, Transform::identity()).unwrap();

    assert!(matches!(
        scene.emplace::<PhysicsBody>(entity),
        Err(SceneError::Ecs(EcsError::EngineManaged(ComponentKind::PhysicsBody)))
    ));
    assert!(matches!(
        scene.emplace::<CameraBuffer>(entity),
        Err(SceneError::Ecs(EcsError::EngineManaged(ComponentKind::CameraBuffer)))
    ));
    assert!(!scene.has::<PhysicsBody>(entity));
    assert!(!scene.has::<CameraBuffer>(entity));

    scene.insert(entity, Collider::sphere(0.5)).unwrap();
    scene.update(DT);
    assert!(matches!(
        scene.patch::<PhysicsBody>(entity, |_| {}),
        Err(SceneError::Ecs(EcsError::EngineManaged(_)))
    ));
    assert_eq!(scene.physics().backend().live_bodies(), 1);
}
