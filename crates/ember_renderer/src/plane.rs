//! Infinite planes and disks.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable, Material};

/// Tolerance for near-parallel rays.
const PARALLEL_EPS: f32 = 1e-4;

/// Solve `ray` against the plane through `center` with `normal`.
fn plane_t(ray: &Ray, center: Vec3, normal: Vec3, ray_t: Interval) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let t = (center - ray.origin).dot(normal) / denom;
    ray_t.surrounds(t).then_some(t)
}

/// Tiling UV for an unbounded surface: fractional part of x/z.
fn plane_uv(p: Vec3) -> (f32, f32) {
    (p.x - p.x.floor(), p.z - p.z.floor())
}

/// An infinite plane.
///
/// Unbounded, so it reports no bounding box and must never be placed under
/// a BVH.
pub struct Plane {
    center: Vec3,
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Plane {
    pub fn new(center: Vec3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            material,
        }
    }
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let t = plane_t(ray, self.center, self.normal, ray_t)?;
        let (u, v) = plane_uv(ray.at(t));
        Some(HitRecord::new(
            ray,
            self.normal,
            t,
            u,
            v,
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }
}

/// A flat disk: a plane hit restricted to a radius around the center.
pub struct Disk {
    center: Vec3,
    normal: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Disk {
    pub fn new(center: Vec3, normal: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            radius,
            material,
        }
    }
}

impl Hittable for Disk {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let t = plane_t(ray, self.center, self.normal, ray_t)?;
        let p = ray.at(t);
        if (p - self.center).length_squared() > self.radius * self.radius {
            return None;
        }
        let (u, v) = plane_uv(p);
        Some(HitRecord::new(
            ray,
            self.normal,
            t,
            u,
            v,
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // Conservative for any orientation; thin axes get padded.
        let rvec = Vec3::splat(self.radius);
        Some(Aabb::from_points(self.center - rvec, self.center + rvec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    #[test]
    fn test_plane_hit() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, grey());
        let ray = Ray::new_simple(Vec3::new(0.3, 5.0, 0.7), -Vec3::Y);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = plane
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 5.0).abs() < 1e-4);
        assert_eq!(rec.normal, Vec3::Y);
        assert!((rec.u - 0.3).abs() < 1e-4);
        assert!((rec.v - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, grey());
        let ray = Ray::new_simple(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(plane
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_plane_has_no_box() {
        assert!(Plane::new(Vec3::ZERO, Vec3::Y, grey())
            .bounding_box()
            .is_none());
    }

    #[test]
    fn test_disk_radial_reject() {
        let disk = Disk::new(Vec3::ZERO, Vec3::Y, 2.0, grey());
        let mut rng = StdRng::seed_from_u64(0);
        let t = Interval::new(0.001, f32::INFINITY);

        let inside = Ray::new_simple(Vec3::new(1.0, 5.0, 1.0), -Vec3::Y);
        assert!(disk.hit(&inside, t, &mut rng).is_some());

        let outside = Ray::new_simple(Vec3::new(2.0, 5.0, 2.0), -Vec3::Y);
        assert!(disk.hit(&outside, t, &mut rng).is_none());
    }

    #[test]
    fn test_disk_box_contains_disk() {
        let disk = Disk::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 2.0, grey());
        let bbox = disk.bounding_box().unwrap();
        assert!(bbox.x.contains(-1.0) && bbox.x.contains(3.0));
        assert!(bbox.z.contains(1.0) && bbox.z.contains(5.0));
    }
}
