//! Sphere primitives, static and keyframe-animated.

use std::f32::consts::PI;
use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable, Material};

/// A sphere.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        Self {
            center,
            radius,
            material,
            bbox: Aabb::from_points(center - rvec, center + rvec),
        }
    }
}

/// UV coordinates for a point on the unit sphere centered at the origin:
/// u from the azimuth around Y, v from the elevation.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let phi = p.z.atan2(p.x);
    let theta = p.y.clamp(-1.0, 1.0).asin();
    let u = 1.0 - (phi + PI) / (2.0 * PI);
    let v = (theta + PI / 2.0) / PI;
    (u, v)
}

/// Quadratic sphere intersection shared by [`Sphere`] and [`MovingSphere`]:
/// the nearer in-range root wins, then the farther one.
fn hit_sphere_at<'a>(
    ray: &Ray,
    ray_t: Interval,
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
) -> Option<HitRecord<'a>> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let mut root = (-half_b - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (-half_b + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let outward_normal = (ray.at(root) - center) / radius;
    let (u, v) = sphere_uv(outward_normal);
    Some(HitRecord::new(ray, outward_normal, root, u, v, material))
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        hit_sphere_at(ray, ray_t, self.center, self.radius, self.material.as_ref())
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

/// A sphere whose center moves linearly between two keyframes; the ray's
/// time selects where it is sampled.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center position at `time`, interpolated between the keyframes.
    pub fn center(&self, time: f32) -> Vec3 {
        self.center0
            + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        hit_sphere_at(
            ray,
            ray_t,
            self.center(ray.time),
            self.radius,
            self.material.as_ref(),
        )
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let box0 = Aabb::from_points(self.center(self.time0) - rvec, self.center(self.time0) + rvec);
        let box1 = Aabb::from_points(self.center(self.time1) - rvec, self.center(self.time1) + rvec);
        Some(Aabb::union(&box0, &box1))
    }
}
