//! Constant-density participating medium (smoke, fog).

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::texture::Texture;
use crate::{gen_f32, Color, HitRecord, Hittable, Isotropic, Material};

/// A volume of constant density bounded by another primitive.
///
/// A ray entering the boundary scatters after an exponentially-distributed
/// distance; if that distance exceeds the path length through the boundary
/// the ray passes through unscattered. The registered hit carries an
/// arbitrary normal and an isotropic phase material.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    phase_function: Arc<dyn Material>,
    neg_inv_density: f32,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self {
            boundary,
            phase_function: Arc::new(Isotropic::new(albedo)),
            neg_inv_density: -1.0 / density,
        }
    }

    pub fn textured(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            phase_function: Arc::new(Isotropic::textured(albedo)),
            neg_inv_density: -1.0 / density,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        // Entry and exit distances through the boundary, found by probing
        // the full line and then again past the entry point.
        let rec1 = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let rec2 = self
            .boundary
            .hit(ray, Interval::new(rec1.t + 1e-4, f32::INFINITY), rng)?;

        let t_enter = rec1.t.max(ray_t.min).max(0.0);
        let t_exit = rec2.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction.length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).max(f32::MIN_POSITIVE).ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X, // arbitrary
            material: self.phase_function.as_ref(),
            t,
            u: 0.0,
            v: 0.0,
            front_face: true, // also arbitrary
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
