//! Ray queries over triangle geometry.
//!
//! [`SpatialIndex`] is the only contract placement relies on; [`TriangleBvh`]
//! is the index the pipeline builds from the terrain mesh.

pub mod aabb;
pub mod bvh;

pub use aabb::Aabb;
pub use bvh::TriangleBvh;

use glam::Vec3;

/// Three corner positions.
pub type Triangle = [Vec3; 3];

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray pointing straight down (-Y).
    pub fn down(origin: Vec3) -> Self {
        Self::new(origin, Vec3::NEG_Y)
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray-AABB intersection using the slab method.
    ///
    /// Returns `(t_near, t_far)` clipped to `t >= 0`. Axis-parallel rays are
    /// tested against the slab directly instead of dividing by zero.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let t0 = (lo - o) * inv;
            let t1 = (hi - o) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }

    /// Moller-Trumbore ray/triangle test. Returns the hit distance.
    pub fn intersects_triangle(&self, triangle: &Triangle) -> Option<f32> {
        const EPSILON: f32 = 1e-12;

        let [a, b, c] = *triangle;
        let e1 = b - a;
        let e2 = c - a;
        let p = self.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(e1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// Closest intersection reported by a [`SpatialIndex`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    /// Index of the triangle in the list the index was built from
    pub primitive: usize,
}

/// Prebuilt index answering closest-hit ray queries.
pub trait SpatialIndex {
    fn intersect(&self, ray: &Ray) -> Option<RayHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray.at(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_intersects_aabb_hit() {
        let ray = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::X);
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let (t_near, t_far) = ray.intersects_aabb(&aabb).unwrap();
        assert!((t_near - 2.0).abs() < 0.001);
        assert!((t_far - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_intersects_aabb_miss() {
        let ray = Ray::new(Vec3::new(-2.0, 5.0, 0.5), Vec3::X);
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(ray.intersects_aabb(&aabb).is_none());
    }

    #[test]
    fn test_vertical_ray_on_flat_box() {
        // Zero-thickness boxes are what flat terrain produces
        let aabb = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let hit = Ray::down(Vec3::new(0.25, 3.0, 1.0)).intersects_aabb(&aabb);
        assert_eq!(hit, Some((3.0, 3.0)));
        assert!(Ray::down(Vec3::new(1.5, 3.0, 0.0)).intersects_aabb(&aabb).is_none());
    }

    #[test]
    fn test_intersects_triangle() {
        let tri = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let t = Ray::down(Vec3::new(0.2, 2.0, 0.2)).intersects_triangle(&tri).unwrap();
        assert!((t - 2.0).abs() < 1e-6);
        assert!(Ray::down(Vec3::new(0.8, 2.0, 0.8)).intersects_triangle(&tri).is_none());
        assert!(Ray::new(Vec3::new(0.2, 2.0, 0.2), Vec3::Y).intersects_triangle(&tri).is_none());
    }
}
