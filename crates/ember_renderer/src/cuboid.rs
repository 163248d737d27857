//! Axis-aligned box built from six rectangle faces.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{AxisRect, HitRecord, Hittable, HittableList, Material};

/// An axis-aligned box spanning two opposite corners, realized as six
/// owned [`AxisRect`] sides.
pub struct Cuboid {
    box_min: Vec3,
    box_max: Vec3,
    sides: HittableList,
}

impl Cuboid {
    /// A box with the same material on every face.
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        Self::with_face_materials(p0, p1, std::array::from_fn(|_| material.clone()))
    }

    /// A box with one material per face, ordered front, back, top, bottom,
    /// left, right. Back/top/left faces get mirrored U so that adjoining
    /// faces keep a consistent texture orientation (skybox usage).
    pub fn with_face_materials(p0: Vec3, p1: Vec3, materials: [Arc<dyn Material>; 6]) -> Self {
        let [front, back, top, bottom, left, right] = materials;

        let mut sides = HittableList::new();
        sides.add(Arc::new(AxisRect::xy(p0.x, p1.x, p0.y, p1.y, p1.z, front)));
        sides.add(Arc::new(
            AxisRect::xy(p0.x, p1.x, p0.y, p1.y, p0.z, back).with_reversed_u(),
        ));
        sides.add(Arc::new(
            AxisRect::xz(p0.x, p1.x, p0.z, p1.z, p1.y, top).with_reversed_u(),
        ));
        sides.add(Arc::new(AxisRect::xz(p0.x, p1.x, p0.z, p1.z, p0.y, bottom)));
        sides.add(Arc::new(
            AxisRect::yz(p0.y, p1.y, p0.z, p1.z, p1.x, left).with_reversed_u(),
        ));
        sides.add(Arc::new(AxisRect::yz(p0.y, p1.y, p0.z, p1.z, p0.x, right)));

        Self {
            box_min: p0,
            box_max: p1,
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.box_min, self.box_max))
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
    fn test_cuboid_hit_nearest_face() {
        let cuboid = Cuboid::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0), grey());
        let ray = Ray::new_simple(Vec3::new(1.0, 1.0, 5.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cuboid
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        // Enters through the z=2 face.
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_cuboid_miss() {
        let cuboid = Cuboid::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0), grey());
        let ray = Ray::new_simple(Vec3::new(5.0, 5.0, 5.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(cuboid
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_cuboid_box_idempotent() {
        let cuboid = Cuboid::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(4.0, 5.0, 6.0), grey());
        let a = cuboid.bounding_box().unwrap();
        assert_eq!(a, cuboid.bounding_box().unwrap());
        assert_eq!(a.min(), Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(a.max(), Vec3::new(4.0, 5.0, 6.0));
    }
}
