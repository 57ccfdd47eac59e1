//! Built-in physics world
//!
//! A small impulse-based rigid body simulation implementing [`PhysicsBackend`]:
//! fixed-step semi-implicit Euler integration under gravity, brute-force pair
//! tests between sphere and oriented box primitives, positional correction,
//! restitution and friction impulses. Bodies translate only; orientation is
//! whatever was last set through [`PhysicsBackend::set_body_transform`].

use std::collections::HashMap;

use slotmap::{new_key_type, Key, KeyData, SlotMap};

use super::backend::{
    BodyDesc, BodyHandle, ContactManifold, ContactPoint, DebugLine, PhysicsBackend, PhysicsError,
    RayTestHit, ShapeDesc, ShapeHandle,
};
use super::primitives::{BoundingSphere, OrientedBox, Ray};
use crate::config::PhysicsConfig;
use crate::ecs::components::{ColliderShape, PrimitiveShape};
use crate::ecs::Entity;
use crate::foundation::math::{is_valid_rotation, Quat, Vec3};

new_key_type! {
    struct ShapeKey;
    struct BodyKey;
}

/// Penetration tolerated before positional correction kicks in
const PENETRATION_SLOP: f32 = 0.005;
/// Fraction of the remaining penetration removed per step
const CORRECTION_PERCENT: f32 = 0.8;
/// Speed under which a body counts as idle
const SLEEP_SPEED: f32 = 0.05;
/// Idle time before a body falls asleep
const SLEEP_DELAY: f32 = 0.5;
/// Segments per debug circle
const DEBUG_CIRCLE_SEGMENTS: usize = 16;

fn shape_key(handle: ShapeHandle) -> ShapeKey {
    KeyData::from_ffi(handle.0).into()
}

fn shape_handle(key: ShapeKey) -> ShapeHandle {
    ShapeHandle(key.data().as_ffi())
}

fn body_key(handle: BodyHandle) -> BodyKey {
    KeyData::from_ffi(handle.0).into()
}

fn body_handle(key: BodyKey) -> BodyHandle {
    BodyHandle(key.data().as_ffi())
}

#[derive(Debug, Clone, Copy)]
struct Part {
    primitive: PrimitiveShape,
    offset: Vec3,
    rotation: Quat,
}

#[derive(Debug)]
struct Shape {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Copy)]
struct Body {
    shape: ShapeKey,
    entity: Entity,
    inv_mass: f32,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    is_trigger: bool,
    friction: f32,
    restitution: f32,
    sleeping: bool,
    idle_time: f32,
}

impl Body {
    fn is_dynamic(&self) -> bool {
        self.inv_mass > 0.0
    }

    fn is_awake(&self) -> bool {
        self.is_dynamic() && !self.sleeping
    }

    fn wake(&mut self) {
        self.sleeping = false;
        self.idle_time = 0.0;
    }
}

#[derive(Debug, Clone, Copy)]
enum WorldPart {
    Sphere(BoundingSphere),
    Box(OrientedBox),
}

/// Narrow-phase result; `normal` points from the first body to the second
#[derive(Debug, Clone, Copy)]
struct Contact {
    normal: Vec3,
    depth: f32,
    on_a: Vec3,
    on_b: Vec3,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
            on_a: self.on_b,
            on_b: self.on_a,
        }
    }
}

struct PairContacts {
    a: BodyKey,
    b: BodyKey,
    contacts: Vec<Contact>,
}

/// Default physics backend
pub struct SimplePhysicsWorld {
    shapes: SlotMap<ShapeKey, Shape>,
    bodies: SlotMap<BodyKey, Body>,
    gravity: Vec3,
    fixed_time_step: f32,
    accumulator: f32,
    pair_lifetimes: HashMap<(BodyKey, BodyKey), i32>,
    manifolds: Vec<ContactManifold>,
}

impl SimplePhysicsWorld {
    /// Create an empty world
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            shapes: SlotMap::with_key(),
            bodies: SlotMap::with_key(),
            gravity: Vec3::from(config.gravity),
            fixed_time_step: config.fixed_time_step,
            accumulator: 0.0,
            pair_lifetimes: HashMap::new(),
            manifolds: Vec::new(),
        }
    }

    /// Number of live shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Linear velocity of a body
    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(body_key(body)).map(|b| b.velocity)
    }

    /// Set the linear velocity of a body, waking it
    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        let body_state = self
            .bodies
            .get_mut(body_key(body))
            .ok_or(PhysicsError::UnknownBody(body))?;
        body_state.velocity = velocity;
        body_state.wake();
        Ok(())
    }

    /// Whether a body is asleep
    pub fn is_sleeping(&self, body: BodyHandle) -> bool {
        self.bodies.get(body_key(body)).is_some_and(|b| b.sleeping)
    }

    fn build_parts(desc: &ShapeDesc) -> Result<Vec<Part>, PhysicsError> {
        let scale = desc.local_scaling.abs();
        if scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PhysicsError::InvalidShape(format!("degenerate scaling {:?}", desc.local_scaling)));
        }

        let scale_primitive = |primitive: PrimitiveShape| -> Result<PrimitiveShape, PhysicsError> {
            match primitive {
                PrimitiveShape::Box { half_extents } => {
                    let scaled = half_extents.component_mul(&scale);
                    if scaled.iter().any(|e| !e.is_finite() || *e <= 0.0) {
                        return Err(PhysicsError::InvalidShape(format!("box half extents {:?}", half_extents)));
                    }
                    Ok(PrimitiveShape::Box { half_extents: scaled })
                }
                PrimitiveShape::Sphere { radius } => {
                    let scaled = radius * scale.max();
                    if !scaled.is_finite() || scaled <= 0.0 {
                        return Err(PhysicsError::InvalidShape(format!("sphere radius {}", radius)));
                    }
                    Ok(PrimitiveShape::Sphere { radius: scaled })
                }
            }
        };

        let centered = |primitive| Part {
            primitive,
            offset: Vec3::zeros(),
            rotation: Quat::identity(),
        };

        match &desc.shape {
            ColliderShape::Box { half_extents } => Ok(vec![centered(scale_primitive(PrimitiveShape::Box {
                half_extents: *half_extents,
            })?)]),
            ColliderShape::Sphere { radius } => Ok(vec![centered(scale_primitive(PrimitiveShape::Sphere {
                radius: *radius,
            })?)]),
            ColliderShape::Compound(children) => {
                if children.is_empty() {
                    return Err(PhysicsError::InvalidShape("compound without children".to_string()));
                }
                children
                    .iter()
                    .map(|child| {
                        if !is_valid_rotation(&child.rotation) {
                            return Err(PhysicsError::InvalidShape("compound child rotation".to_string()));
                        }
                        Ok(Part {
                            primitive: scale_primitive(child.shape)?,
                            offset: child.offset.component_mul(&desc.local_scaling),
                            rotation: child.rotation,
                        })
                    })
                    .collect()
            }
        }
    }

    fn world_parts(shape: &Shape, position: &Vec3, rotation: &Quat) -> Vec<WorldPart> {
        shape
            .parts
            .iter()
            .map(|part| {
                let center = position + rotation * part.offset;
                match part.primitive {
                    PrimitiveShape::Sphere { radius } => WorldPart::Sphere(BoundingSphere::new(center, radius)),
                    PrimitiveShape::Box { half_extents } => {
                        WorldPart::Box(OrientedBox::new(center, rotation * part.rotation, half_extents))
                    }
                }
            })
            .collect()
    }

    fn body_parts(&self, body: &Body) -> Vec<WorldPart> {
        self.shapes
            .get(body.shape)
            .map(|shape| Self::world_parts(shape, &body.position, &body.rotation))
            .unwrap_or_default()
    }

    fn detect(&self) -> Vec<PairContacts> {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();
        let parts: Vec<Vec<WorldPart>> = keys.iter().map(|key| self.body_parts(&self.bodies[*key])).collect();

        let mut pairs = Vec::new();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (a, b) = (&self.bodies[keys[i]], &self.bodies[keys[j]]);
                if !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }
                let contacts: Vec<Contact> = parts[i]
                    .iter()
                    .flat_map(|pa| parts[j].iter().filter_map(move |pb| collide(pa, pb)))
                    .collect();
                if !contacts.is_empty() {
                    pairs.push(PairContacts {
                        a: keys[i],
                        b: keys[j],
                        contacts,
                    });
                }
            }
        }
        pairs
    }

    fn resolve(&mut self, pair: &PairContacts) {
        let Some(contact) = pair
            .contacts
            .iter()
            .copied()
            .max_by(|x, y| x.depth.total_cmp(&y.depth))
        else {
            return;
        };
        let (Some(mut a), Some(mut b)) = (self.bodies.get(pair.a).copied(), self.bodies.get(pair.b).copied()) else {
            return;
        };
        if a.is_trigger || b.is_trigger {
            return;
        }

        if a.is_awake() && b.is_dynamic() && b.sleeping {
            b.wake();
        }
        if b.is_awake() && a.is_dynamic() && a.sleeping {
            a.wake();
        }

        let inv_a = if a.is_awake() { a.inv_mass } else { 0.0 };
        let inv_b = if b.is_awake() { b.inv_mass } else { 0.0 };
        let total = inv_a + inv_b;
        if total <= 0.0 {
            return;
        }

        let n = contact.normal;
        let correction = n * ((contact.depth - PENETRATION_SLOP).max(0.0) / total * CORRECTION_PERCENT);
        a.position -= correction * inv_a;
        b.position += correction * inv_b;

        let relative = b.velocity - a.velocity;
        let normal_speed = relative.dot(&n);
        if normal_speed < 0.0 {
            let restitution = a.restitution.max(b.restitution);
            let j = -(1.0 + restitution) * normal_speed / total;
            a.velocity -= n * (j * inv_a);
            b.velocity += n * (j * inv_b);

            let relative = b.velocity - a.velocity;
            let tangential = relative - n * relative.dot(&n);
            if let Some(tangent) = tangential.try_normalize(1e-6) {
                let mu = (a.friction * b.friction).sqrt();
                let jt = (-relative.dot(&tangent) / total).clamp(-j * mu, j * mu);
                a.velocity -= tangent * (jt * inv_a);
                b.velocity += tangent * (jt * inv_b);
            }
        }

        if let Some(slot) = self.bodies.get_mut(pair.a) {
            *slot = a;
        }
        if let Some(slot) = self.bodies.get_mut(pair.b) {
            *slot = b;
        }
    }

    fn substep(&mut self, h: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.is_awake()) {
            body.velocity += gravity * h;
            body.position += body.velocity * h;
        }

        for pair in self.detect() {
            self.resolve(&pair);
        }

        for body in self.bodies.values_mut().filter(|b| b.is_awake()) {
            if body.velocity.norm_squared() < SLEEP_SPEED * SLEEP_SPEED {
                body.idle_time += h;
                if body.idle_time >= SLEEP_DELAY {
                    body.sleeping = true;
                    body.velocity = Vec3::zeros();
                    log::trace!("Body of {:?} fell asleep", body.entity);
                }
            } else {
                body.idle_time = 0.0;
            }
        }
    }

    fn refresh_manifolds(&mut self) {
        let pairs = self.detect();
        let mut lifetimes = HashMap::with_capacity(pairs.len());
        self.manifolds.clear();

        for pair in pairs {
            let lifetime = self.pair_lifetimes.get(&(pair.a, pair.b)).map_or(0, |l| l + 1);
            lifetimes.insert((pair.a, pair.b), lifetime);
            let (Some(a), Some(b)) = (self.bodies.get(pair.a), self.bodies.get(pair.b)) else {
                continue;
            };
            self.manifolds.push(ContactManifold {
                entity_a: a.entity,
                entity_b: b.entity,
                points: pair
                    .contacts
                    .iter()
                    .map(|c| ContactPoint {
                        position_on_a: c.on_a,
                        position_on_b: c.on_b,
                        lifetime,
                    })
                    .collect(),
            });
        }
        self.pair_lifetimes = lifetimes;
    }
}

impl Default for SimplePhysicsWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl PhysicsBackend for SimplePhysicsWorld {
    fn create_shape(&mut self, desc: &ShapeDesc) -> Result<ShapeHandle, PhysicsError> {
        let parts = Self::build_parts(desc)?;
        let key = self.shapes.insert(Shape { parts });
        Ok(shape_handle(key))
    }

    fn destroy_shape(&mut self, shape: ShapeHandle) -> bool {
        self.shapes.remove(shape_key(shape)).is_some()
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        let shape = shape_key(desc.shape);
        if !self.shapes.contains_key(shape) {
            return Err(PhysicsError::UnknownShape(desc.shape));
        }
        let inv_mass = if desc.mass.is_finite() && desc.mass > 0.0 {
            1.0 / desc.mass
        } else {
            if desc.mass != 0.0 {
                log::warn!("Body for {:?} has invalid mass {}, treating as static", desc.entity, desc.mass);
            }
            0.0
        };
        let rotation = if is_valid_rotation(&desc.rotation) {
            desc.rotation
        } else {
            log::warn!("Body for {:?} has an invalid rotation, using identity", desc.entity);
            Quat::identity()
        };

        let key = self.bodies.insert(Body {
            shape,
            entity: desc.entity,
            inv_mass,
            position: desc.position,
            rotation,
            velocity: Vec3::zeros(),
            is_trigger: desc.is_trigger,
            friction: desc.friction,
            restitution: desc.restitution,
            sleeping: false,
            idle_time: 0.0,
        });
        Ok(body_handle(key))
    }

    fn destroy_body(&mut self, body: BodyHandle) -> bool {
        let key = body_key(body);
        if self.bodies.remove(key).is_none() {
            return false;
        }
        self.pair_lifetimes.retain(|(a, b), _| *a != key && *b != key);
        // Anything resting on the removed body has to fall again
        for other in self.bodies.values_mut() {
            other.wake();
        }
        true
    }

    fn set_body_transform(&mut self, body: BodyHandle, position: Vec3, rotation: Quat) -> Result<(), PhysicsError> {
        let state = self.bodies.get_mut(body_key(body)).ok_or(PhysicsError::UnknownBody(body))?;
        state.position = position;
        if is_valid_rotation(&rotation) {
            state.rotation = rotation;
        } else {
            log::warn!("Ignoring invalid rotation for body of {:?}", state.entity);
        }
        Ok(())
    }

    fn body_transform(&self, body: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies.get(body_key(body)).map(|b| (b.position, b.rotation))
    }

    fn activate(&mut self, body: BodyHandle) {
        if let Some(state) = self.bodies.get_mut(body_key(body)) {
            state.wake();
        }
    }

    fn step_simulation(&mut self, dt: f32, max_substeps: u32) -> u32 {
        if !dt.is_finite() || dt < 0.0 {
            log::trace!("Ignoring simulation step of {}s", dt);
            return 0;
        }

        let mut steps = 0;
        if max_substeps == 0 {
            if dt > 0.0 {
                self.substep(dt);
                steps = 1;
            }
        } else {
            self.accumulator += dt;
            while self.accumulator >= self.fixed_time_step && steps < max_substeps {
                self.substep(self.fixed_time_step);
                self.accumulator -= self.fixed_time_step;
                steps += 1;
            }
            if self.accumulator >= self.fixed_time_step {
                log::trace!("Solver fell behind, dropping {:.4}s of simulation time", self.accumulator);
                self.accumulator = 0.0;
            }
        }

        self.refresh_manifolds();
        steps
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
        for body in self.bodies.values_mut() {
            body.wake();
        }
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn contact_manifolds(&self) -> Vec<ContactManifold> {
        self.manifolds.clone()
    }

    fn ray_test(&self, from: Vec3, to: Vec3, filter: &dyn Fn(Entity) -> bool) -> Option<RayTestHit> {
        let segment = to - from;
        let length = segment.norm();
        if length <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(from, segment);

        let mut best: Option<RayTestHit> = None;
        for body in self.bodies.values() {
            if !filter(body.entity) {
                continue;
            }
            for part in self.body_parts(body) {
                let hit = match part {
                    WorldPart::Sphere(sphere) => sphere.intersect_ray(&ray),
                    WorldPart::Box(cuboid) => cuboid.intersect_ray(&ray),
                };
                let Some((t, point, normal)) = hit else {
                    continue;
                };
                let fraction = t / length;
                if t <= length && best.map_or(true, |current| fraction < current.fraction) {
                    best = Some(RayTestHit {
                        entity: body.entity,
                        point,
                        normal,
                        fraction,
                    });
                }
            }
        }
        best
    }

    fn debug_lines(&self) -> Vec<DebugLine> {
        let mut lines = Vec::new();
        for body in self.bodies.values() {
            let color = if body.is_trigger {
                Vec3::new(1.0, 1.0, 0.0)
            } else if !body.is_dynamic() {
                Vec3::new(0.0, 1.0, 0.0)
            } else if body.sleeping {
                Vec3::new(0.5, 0.5, 0.5)
            } else {
                Vec3::new(1.0, 1.0, 1.0)
            };
            for part in self.body_parts(body) {
                match part {
                    WorldPart::Box(cuboid) => box_outline(&cuboid, color, &mut lines),
                    WorldPart::Sphere(sphere) => sphere_outline(&sphere, color, &mut lines),
                }
            }
        }
        lines
    }
}

fn collide(a: &WorldPart, b: &WorldPart) -> Option<Contact> {
    match (a, b) {
        (WorldPart::Sphere(sa), WorldPart::Sphere(sb)) => sphere_sphere(sa, sb),
        (WorldPart::Sphere(sa), WorldPart::Box(bb)) => sphere_box(sa, bb),
        (WorldPart::Box(ba), WorldPart::Sphere(sb)) => sphere_box(sb, ba).map(Contact::flipped),
        (WorldPart::Box(ba), WorldPart::Box(bb)) => box_box(ba, bb),
    }
}

fn sphere_sphere(a: &BoundingSphere, b: &BoundingSphere) -> Option<Contact> {
    if !a.intersects(b) {
        return None;
    }
    let delta = b.center - a.center;
    let distance = delta.norm();
    let normal = delta.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
    Some(Contact {
        normal,
        depth: a.radius + b.radius - distance,
        on_a: a.center + normal * a.radius,
        on_b: b.center - normal * b.radius,
    })
}

fn sphere_box(sphere: &BoundingSphere, cuboid: &OrientedBox) -> Option<Contact> {
    let closest = cuboid.closest_point(&sphere.center);
    let delta = sphere.center - closest;
    let distance = delta.norm();
    if distance > sphere.radius {
        return None;
    }

    if distance > 1e-6 {
        let normal = -delta / distance;
        return Some(Contact {
            normal,
            depth: sphere.radius - distance,
            on_a: sphere.center + normal * sphere.radius,
            on_b: closest,
        });
    }

    // Center inside the box: push out through the nearest face
    let local = cuboid.to_local(&sphere.center);
    let mut axis = 0;
    let mut min_gap = f32::INFINITY;
    for i in 0..3 {
        let gap = cuboid.half_extents[i] - local[i].abs();
        if gap < min_gap {
            min_gap = gap;
            axis = i;
        }
    }
    let sign = if local[axis] >= 0.0 { 1.0 } else { -1.0 };
    let mut outward = Vec3::zeros();
    outward[axis] = sign;
    let mut surface = local;
    surface[axis] = sign * cuboid.half_extents[axis];

    let normal = -(cuboid.rotation * outward);
    Some(Contact {
        normal,
        depth: sphere.radius + min_gap,
        on_a: sphere.center + normal * sphere.radius,
        on_b: cuboid.center + cuboid.rotation * surface,
    })
}

fn box_box(a: &OrientedBox, b: &OrientedBox) -> Option<Contact> {
    let axes_a = a.axes();
    let axes_b = b.axes();
    let between = b.center - a.center;

    let mut candidates: Vec<Vec3> = Vec::with_capacity(15);
    candidates.extend_from_slice(&axes_a);
    candidates.extend_from_slice(&axes_b);
    for axis_a in &axes_a {
        for axis_b in &axes_b {
            if let Some(axis) = axis_a.cross(axis_b).try_normalize(1e-6) {
                candidates.push(axis);
            }
        }
    }

    let mut best_axis = Vec3::y();
    let mut best_overlap = f32::INFINITY;
    for axis in candidates {
        let distance = between.dot(&axis);
        let overlap = a.projected_radius(&axis) + b.projected_radius(&axis) - distance.abs();
        if overlap < 0.0 {
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = if distance < 0.0 { -axis } else { axis };
        }
    }

    // Deepest corner of b along the separating normal
    let corners = b.corners();
    let deepest = corners
        .iter()
        .copied()
        .min_by(|x, y| x.dot(&best_axis).total_cmp(&y.dot(&best_axis)))
        .unwrap_or(b.center);

    Some(Contact {
        normal: best_axis,
        depth: best_overlap,
        on_a: deepest + best_axis * best_overlap,
        on_b: deepest,
    })
}

fn box_outline(cuboid: &OrientedBox, color: Vec3, lines: &mut Vec<DebugLine>) {
    let corners = cuboid.corners();
    for i in 0..corners.len() {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                lines.push(DebugLine {
                    from: corners[i],
                    to: corners[i | bit],
                    color,
                });
            }
        }
    }
}

fn sphere_outline(sphere: &BoundingSphere, color: Vec3, lines: &mut Vec<DebugLine>) {
    let step = std::f32::consts::TAU / DEBUG_CIRCLE_SEGMENTS as f32;
    let planes = [(Vec3::x(), Vec3::y()), (Vec3::y(), Vec3::z()), (Vec3::z(), Vec3::x())];
    for (u, v) in planes {
        for i in 0..DEBUG_CIRCLE_SEGMENTS {
            let (a0, a1) = (i as f32 * step, (i + 1) as f32 * step);
            lines.push(DebugLine {
                from: sphere.center + (u * a0.cos() + v * a0.sin()) * sphere.radius,
                to: sphere.center + (u * a1.cos() + v * a1.sin()) * sphere.radius,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::CompoundChild;
    use approx::assert_relative_eq;

    fn world() -> SimplePhysicsWorld {
        SimplePhysicsWorld::new(&PhysicsConfig::default())
    }

    fn cube_desc(half: f32) -> ShapeDesc {
        ShapeDesc {
            shape: ColliderShape::Box {
                half_extents: Vec3::new(half, half, half),
            },
            local_scaling: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    fn sphere_desc(radius: f32) -> ShapeDesc {
        ShapeDesc {
            shape: ColliderShape::Sphere { radius },
            local_scaling: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    fn body(world: &mut SimplePhysicsWorld, shape: &ShapeDesc, mass: f32, position: Vec3, entity: u32) -> BodyHandle {
        let shape = world.create_shape(shape).unwrap();
        world
            .create_body(&BodyDesc {
                shape,
                mass,
                position,
                rotation: Quat::identity(),
                is_trigger: false,
                friction: 0.5,
                restitution: 0.0,
                entity: Entity::new(entity, 0),
            })
            .unwrap()
    }

    #[test]
    fn test_fixed_step_accumulator() {
        let mut world = world();
        assert_eq!(world.step_simulation(1.0 / 120.0, 10), 0);
        assert_eq!(world.step_simulation(1.0 / 120.0, 10), 1);
        assert_eq!(world.step_simulation(1.0, 10), 10);
    }

    #[test]
    fn test_free_fall_under_gravity() {
        let mut world = world();
        let ball = body(&mut world, &sphere_desc(0.5), 1.0, Vec3::new(0.0, 10.0, 0.0), 1);

        world.step_simulation(1.0 / 60.0, 10);
        let (position, _) = world.body_transform(ball).unwrap();
        assert!(position.y < 10.0);
        assert_relative_eq!(world.linear_velocity(ball).unwrap().y, -9.81 / 60.0, epsilon = 1e-4);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut world = world();
        let floor = body(&mut world, &cube_desc(5.0), 0.0, Vec3::zeros(), 1);
        world.step_simulation(1.0, 10);
        assert_eq!(world.body_transform(floor).unwrap().0, Vec3::zeros());
    }

    #[test]
    fn test_box_comes_to_rest_on_floor() {
        let mut world = world();
        body(&mut world, &cube_desc(5.0), 0.0, Vec3::new(0.0, -5.0, 0.0), 1);
        let crate_body = body(&mut world, &cube_desc(0.5), 1.0, Vec3::new(0.0, 2.0, 0.0), 2);

        for _ in 0..240 {
            world.step_simulation(1.0 / 60.0, 10);
        }
        let (position, _) = world.body_transform(crate_body).unwrap();
        assert_relative_eq!(position.y, 0.5, epsilon = 0.05);
        assert!(world.is_sleeping(crate_body));

        let manifolds = world.contact_manifolds();
        assert_eq!(manifolds.len(), 1);
        assert!(manifolds[0].points[0].lifetime > 0);
    }

    #[test]
    fn test_trigger_reports_contact_without_response() {
        let mut world = zero_gravity_world();
        let shape = world.create_shape(&cube_desc(1.0)).unwrap();
        world
            .create_body(&BodyDesc {
                shape,
                mass: 0.0,
                position: Vec3::zeros(),
                rotation: Quat::identity(),
                is_trigger: true,
                friction: 0.5,
                restitution: 0.0,
                entity: Entity::new(1, 0),
            })
            .unwrap();
        let ball = body(&mut world, &sphere_desc(0.5), 1.0, Vec3::new(0.5, 0.0, 0.0), 2);

        world.step_simulation(1.0 / 60.0, 10);
        assert_eq!(world.body_transform(ball).unwrap().0, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(world.contact_manifolds().len(), 1);
    }

    fn zero_gravity_world() -> SimplePhysicsWorld {
        SimplePhysicsWorld::new(&PhysicsConfig::zero_gravity())
    }

    #[test]
    fn test_sphere_sphere_separation() {
        let mut world = zero_gravity_world();
        let a = body(&mut world, &sphere_desc(1.0), 1.0, Vec3::new(0.0, 0.0, 0.0), 1);
        let b = body(&mut world, &sphere_desc(1.0), 1.0, Vec3::new(1.5, 0.0, 0.0), 2);

        for _ in 0..30 {
            world.step_simulation(1.0 / 60.0, 10);
        }
        let distance = (world.body_transform(b).unwrap().0 - world.body_transform(a).unwrap().0).norm();
        assert!(distance > 1.9, "spheres still overlap: {}", distance);
    }

    #[test]
    fn test_ray_filter_skips_rejected_entities() {
        let mut world = zero_gravity_world();
        body(&mut world, &cube_desc(0.5), 0.0, Vec3::new(3.0, 0.0, 0.0), 1);
        body(&mut world, &sphere_desc(0.5), 0.0, Vec3::new(6.0, 0.0, 0.0), 2);

        let from = Vec3::zeros();
        let to = Vec3::new(10.0, 0.0, 0.0);
        let first = world.ray_test(from, to, &|_| true).unwrap();
        assert_eq!(first.entity, Entity::new(1, 0));
        assert_relative_eq!(first.point.x, 2.5, epsilon = 1e-4);

        let second = world.ray_test(from, to, &|e| e != Entity::new(1, 0)).unwrap();
        assert_eq!(second.entity, Entity::new(2, 0));
        assert_relative_eq!(second.fraction, 0.55, epsilon = 1e-4);
    }

    #[test]
    fn test_compound_scaling_and_validation() {
        let mut world = zero_gravity_world();
        let compound = ShapeDesc {
            shape: ColliderShape::Compound(vec![
                CompoundChild::new(PrimitiveShape::Sphere { radius: 0.5 }, Vec3::new(1.0, 0.0, 0.0)),
                CompoundChild::new(
                    PrimitiveShape::Box {
                        half_extents: Vec3::new(0.5, 0.5, 0.5),
                    },
                    Vec3::new(-1.0, 0.0, 0.0),
                ),
            ]),
            local_scaling: Vec3::new(2.0, 2.0, 2.0),
        };
        let shape = world.create_shape(&compound).unwrap();
        assert!(world.destroy_shape(shape));
        assert!(!world.destroy_shape(shape));

        let empty = ShapeDesc {
            shape: ColliderShape::Compound(Vec::new()),
            local_scaling: Vec3::new(1.0, 1.0, 1.0),
        };
        assert!(world.create_shape(&empty).is_err());
    }

    #[test]
    fn test_box_box_contact_normal_points_from_a_to_b() {
        let a = OrientedBox::new(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let b = OrientedBox::new(Vec3::new(0.0, 1.8, 0.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let contact = box_box(&a, &b).unwrap();
        assert_relative_eq!(contact.normal, Vec3::y(), epsilon = 1e-5);
        assert_relative_eq!(contact.depth, 0.2, epsilon = 1e-5);
    }
}
