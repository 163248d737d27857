//! Hittable trait, hit records, and the primitive list.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::Material;

/// Record of a ray-primitive intersection.
///
/// Built per query and consumed immediately by the caller; the material is
/// borrowed from the primitive that produced the hit.
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal, always oriented against the incoming ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t along the ray
    pub t: f32,
    /// Surface UV coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the geometric front face was hit
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record at `ray.at(t)`, orienting `outward_normal` against
    /// the ray and remembering which face was struck.
    pub fn new(
        ray: &Ray,
        outward_normal: Vec3,
        t: f32,
        u: f32,
        v: f32,
        material: &'a dyn Material,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        Self {
            p: ray.at(t),
            normal: if front_face {
                outward_normal
            } else {
                -outward_normal
            },
            material,
            t,
            u,
            v,
            front_face,
        }
    }
}

/// Anything a ray can intersect.
///
/// `rng` feeds primitives with stochastic intersection behavior (the
/// constant-density medium); most implementations ignore it.
pub trait Hittable: Send + Sync {
    /// The closest intersection with `ray` in `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>>;

    /// The bounding box, or `None` for unbounded primitives (planes).
    ///
    /// Box-less primitives cannot be placed under a BVH.
    fn bounding_box(&self) -> Option<Aabb>;
}

/// An ordered collection of primitives; a hit is the minimum-t hit over
/// all members.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Consume the list, yielding its primitives (for BVH construction).
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut closest_so_far = ray_t.max;
        let mut closest_hit = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, closest_so_far), rng) {
                closest_so_far = rec.t;
                closest_hit = Some(rec);
            }
        }

        closest_hit
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let mut bbox: Option<Aabb> = None;
        for object in &self.objects {
            let child = object.bounding_box()?;
            bbox = Some(match bbox {
                Some(b) => Aabb::union(&b, &child),
                None => child,
            });
        }
        bbox
    }
}
