//! Primitive collision shapes and intersection algorithms
//!
//! World-space rays, spheres and oriented boxes with the ray and overlap tests
//! used by the built-in physics world.

use crate::foundation::math::{Quat, Vec3};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A bounding sphere in world space
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Test ray intersection with this sphere
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        let oc = ray.origin - self.center;

        // Solve |origin + t*direction - center|^2 = radius^2
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        let t = if t1 >= 0.0 {
            t1
        } else if t2 >= 0.0 {
            t2
        } else {
            return None;
        };

        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center)
            .try_normalize(f32::EPSILON)
            .unwrap_or(-ray.direction);
        Some((t, hit_point, normal))
    }
}

/// An oriented box in world space
#[derive(Debug, Clone, Copy)]
pub struct OrientedBox {
    /// Box center
    pub center: Vec3,
    /// Box orientation
    pub rotation: Quat,
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Create an oriented box
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents,
        }
    }

    /// World-space unit axes of the box
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::x(),
            self.rotation * Vec3::y(),
            self.rotation * Vec3::z(),
        ]
    }

    /// The eight corners in world space
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        let mut corners = [Vec3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let local = Vec3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            );
            *corner = self.center + self.rotation * local;
        }
        corners
    }

    /// Half length of the box's projection onto a unit axis
    pub fn projected_radius(&self, axis: &Vec3) -> f32 {
        let [x, y, z] = self.axes();
        self.half_extents.x * x.dot(axis).abs()
            + self.half_extents.y * y.dot(axis).abs()
            + self.half_extents.z * z.dot(axis).abs()
    }

    /// Express a world point in the box's local frame
    pub fn to_local(&self, point: &Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    /// Closest point on or inside the box to a world point
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let local = self.to_local(point);
        let clamped = Vec3::new(
            local.x.clamp(-self.half_extents.x, self.half_extents.x),
            local.y.clamp(-self.half_extents.y, self.half_extents.y),
            local.z.clamp(-self.half_extents.z, self.half_extents.z),
        );
        self.center + self.rotation * clamped
    }

    /// Slab test in the box's local frame
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        let inverse = self.rotation.inverse();
        let origin = inverse * (ray.origin - self.center);
        let direction = inverse * ray.direction;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let mut entry_axis = 0;
        let mut entry_sign = 0.0;

        for axis in 0..3 {
            let extent = self.half_extents[axis];
            if direction[axis].abs() < f32::EPSILON {
                if origin[axis].abs() > extent {
                    return None;
                }
                continue;
            }
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (-extent - origin[axis]) * inv_d;
            let mut t1 = (extent - origin[axis]) * inv_d;
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }
            if t0 > t_min {
                t_min = t0;
                entry_axis = axis;
                entry_sign = sign;
            }
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }

        // Origin inside the box: report the exit point
        let (t, normal_local) = if t_min >= 0.0 {
            let mut n = Vec3::zeros();
            n[entry_axis] = entry_sign;
            (t_min, n)
        } else {
            (t_max, -direction.normalize())
        };

        let normal = (self.rotation * normal_local)
            .try_normalize(f32::EPSILON)
            .unwrap_or(-ray.direction);
        Some((t, ray.point_at(t), normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_ray_hits_front_face() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));

        let (t, point, normal) = sphere.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(0.0, 0.0, -4.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_ray_miss() {
        let sphere = BoundingSphere::new(Vec3::new(3.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_box_ray_reports_entry_face_normal() {
        let cube = OrientedBox::new(Vec3::new(5.0, 0.0, 0.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));

        let (t, point, normal) = cube.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotated_box_ray() {
        // 45 degrees about Y: the corner faces the ray
        let cube = OrientedBox::new(
            Vec3::new(0.0, 0.0, -5.0),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_4),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));

        let (t, _, _) = cube.intersect_ray(&ray).unwrap();
        assert_relative_eq!(t, 5.0 - std::f32::consts::SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_box_closest_point_clamps() {
        let cube = OrientedBox::new(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let closest = cube.closest_point(&Vec3::new(3.0, 0.5, 0.0));
        assert_relative_eq!(closest, Vec3::new(1.0, 0.5, 0.0), epsilon = 1e-6);
        assert_relative_eq!(cube.projected_radius(&Vec3::x()), 1.0, epsilon = 1e-6);
    }
}
