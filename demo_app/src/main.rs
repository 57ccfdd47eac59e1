//! Falling boxes demo
//!
//! Drops a handful of boxes onto a floor, runs the frame pipeline headless
//! against a logging renderer, then reports collisions and a raycast.
//!
//! Usage: `falling_boxes [config.toml|config.ron]`

use rand::prelude::*;
use scene_engine::assets::Atlas;
use scene_engine::prelude::*;
use scene_engine::render::RenderResult;

const FRAMES: usize = 300;
const BOX_COUNT: usize = 6;
const DT: f32 = 1.0 / 60.0;

/// Renderer that logs what it is asked to draw
#[derive(Default)]
struct LoggingRenderer {
    next_buffer: u32,
    draws: usize,
    lines: usize,
}

impl Renderer for LoggingRenderer {
    fn begin_frame(&mut self) -> RenderResult<()> {
        self.draws = 0;
        self.lines = 0;
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        log::trace!("Frame submitted: {} draws, {} debug lines", self.draws, self.lines);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport, _clear_color: [f32; 4]) {
        log::trace!("Viewport {}x{}", viewport.width, viewport.height);
    }

    fn create_uniform_buffer(&mut self, size: usize) -> RenderResult<UniformBufferHandle> {
        let handle = UniformBufferHandle(self.next_buffer);
        self.next_buffer += 1;
        log::debug!("Created uniform buffer {:?} ({} bytes)", handle, size);
        Ok(handle)
    }

    fn destroy_uniform_buffer(&mut self, handle: UniformBufferHandle) {
        log::debug!("Destroyed uniform buffer {:?}", handle);
    }

    fn upload_uniform(&mut self, _handle: UniformBufferHandle, _bytes: &[u8]) -> RenderResult<()> {
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand<'_>) -> RenderResult<()> {
        self.draws += 1;
        let model = &command.model;
        log::trace!(
            "Draw {:?} at [{:.2}, {:.2}, {:.2}]",
            command.geometry,
            model[(0, 3)],
            model[(1, 3)],
            model[(2, 3)]
        );
        Ok(())
    }

    fn draw_line(&mut self, _from: Vec3, _to: Vec3, _color: Vec3) {
        self.lines += 1;
    }
}

fn load_config() -> SceneConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SceneConfig::default();
    };
    match SceneConfig::load_from_file(&path) {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path);
            config
        }
        Err(err) => {
            log::warn!("Cannot load {}: {}, using defaults", path, err);
            SceneConfig::default()
        }
    }
}

/// Geometry the renderer is assumed to have uploaded, keyed by name
fn register_geometry() -> Atlas<GeometryHandle, &'static str> {
    let mut geometry = Atlas::new(8);
    geometry.add("plane", "meshes/plane.obj");
    geometry.add("cube", "meshes/cube.obj");
    geometry
}

fn build_scene(
    scene: &mut Scene,
    geometry: &Atlas<GeometryHandle, &'static str>,
    rng: &mut impl Rng,
) -> Result<Vec<Entity>, SceneError> {
    let plane = geometry.find("plane");
    let cube = geometry.find("cube");

    let floor = scene.create_named("floor")?;
    scene.insert(floor, Transform::from_position(Vec3::new(0.0, -0.5, 0.0)))?;
    scene.insert(floor, Collider::cuboid(Vec3::new(20.0, 1.0, 20.0)).with_friction(0.8))?;
    scene.insert(floor, Mesh::new(plane))?;
    scene.insert(floor, Material::from_color(Vec4::new(0.3, 0.3, 0.35, 1.0)))?;

    let mut boxes = Vec::with_capacity(BOX_COUNT);
    for i in 0..BOX_COUNT {
        let entity = scene.create_named(&format!("box_{i}"))?;
        let position = Vec3::new(rng.gen_range(-3.0..3.0), rng.gen_range(2.0..8.0), rng.gen_range(-3.0..3.0));
        scene.insert(entity, Transform::from_position(position))?;
        scene.insert(entity, Collider::cuboid(Vec3::new(1.0, 1.0, 1.0)).with_bounciness(0.2))?;
        scene.insert(entity, RigidBody::new(rng.gen_range(0.5..2.0)))?;
        scene.insert(entity, Mesh::new(cube))?;
        scene.insert(
            entity,
            Material::from_color(Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0)),
        )?;
        boxes.push(entity);
    }

    // A pillar with a lamp riding on top of it
    let pillar = scene.create_named("pillar")?;
    scene.insert(pillar, Transform::from_position(Vec3::new(6.0, 1.5, 0.0)))?;
    scene.insert(pillar, Collider::cuboid(Vec3::new(1.0, 3.0, 1.0)))?;
    scene.insert(pillar, Mesh::new(cube))?;
    scene.insert(pillar, Material::from_color(Vec4::new(0.6, 0.6, 0.6, 1.0)))?;
    let lamp = scene.create_named("lamp")?;
    scene.insert(lamp, Transform::from_position(Vec3::new(0.0, 2.0, 0.0)))?;
    scene.insert(lamp, LightFactory::point(Vec3::new(1.0, 0.8, 0.5), 12.0))?;
    scene.set_parent(lamp, pillar)?;

    let sun = scene.create_named("sun")?;
    scene.insert(
        sun,
        LightFactory::directional(Vec3::new(-0.3, -1.0, -0.2), Vec3::new(1.0, 1.0, 0.95)),
    )?;

    let camera = scene.create_named("camera")?;
    scene.insert(camera, Transform::from_position(Vec3::new(0.0, 6.0, 14.0)))?;
    scene.insert(camera, Camera::perspective(60.0, 0.1, 200.0).with_target(Vec3::new(0.0, 1.0, 0.0)))?;

    Ok(boxes)
}

fn main() -> Result<(), SceneError> {
    scene_engine::foundation::logging::init();

    let mut scene = Scene::new(load_config())?;
    let mut rng = thread_rng();
    let geometry = register_geometry();
    let boxes = build_scene(&mut scene, &geometry, &mut rng)?;
    let mut renderer = LoggingRenderer::default();

    for frame in 0..FRAMES {
        let stats = scene.frame(DT, &mut renderer)?;
        if frame % 60 == 0 {
            log::info!("Frame {}: {}", frame, stats);
        }
    }

    for collision in scene.collisions() {
        let name = |entity: Entity| {
            scene
                .get::<Name>(entity)
                .map_or_else(|| format!("{entity:?}"), |name| name.as_str().to_string())
        };
        println!(
            "{} touches {} ({} contacts)",
            name(collision.a),
            name(collision.b),
            collision.contacts.len()
        );
    }

    for entity in &boxes {
        if let Some(transform) = scene.get::<Transform>(*entity) {
            println!("{:?} rests at {:?}", entity, transform.position);
        }
    }

    let origin = Vec3::new(0.0, 20.0, 0.0);
    match scene.raycast(origin, -Vec3::y(), 50.0, &[]) {
        Some(hit) => println!("Ray from {:?} hit {:?} at distance {:.2}", origin, hit.entity, hit.distance),
        None => println!("Ray from {:?} hit nothing", origin),
    }

    scene.release_render_resources(&mut renderer);
    Ok(())
}
