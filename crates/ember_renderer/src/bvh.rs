//! Bounding volume hierarchy over scene primitives.

use std::cmp::Ordering;
use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray};
use rand::RngCore;
use thiserror::Error;

use crate::{HitRecord, Hittable, HittableList};

/// Construction-time failures. Malformed scenes are rejected here rather
/// than producing corrupted pixels at render time.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error("primitive without a bounding box cannot be placed in a BVH")]
    MissingBoundingBox,

    #[error("cannot build a BVH over an empty primitive list")]
    Empty,
}

/// An internal node of the hierarchy.
///
/// Owns exactly two children; a single-primitive range aliases the same
/// leaf on both sides. The merged child box is computed once at
/// construction and the tree is never mutated afterwards.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a hierarchy over the primitives of `list`.
    pub fn from_list(list: HittableList, rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        Self::build(list.into_objects(), rng)
    }

    /// Build a hierarchy over `objects`.
    ///
    /// Every primitive must report a bounding box; an unbounded primitive
    /// (e.g. a plane) is a configuration error.
    pub fn build(objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Result<Self, BvhError> {
        if objects.is_empty() {
            return Err(BvhError::Empty);
        }

        // Resolve every box up front so the sort comparators stay total.
        let mut boxed: Vec<(Arc<dyn Hittable>, Aabb)> = objects
            .into_iter()
            .map(|object| {
                let bbox = object.bounding_box().ok_or(BvhError::MissingBoundingBox)?;
                Ok((object, bbox))
            })
            .collect::<Result<_, BvhError>>()?;

        Ok(Self::split(&mut boxed, rng))
    }

    fn split(objects: &mut [(Arc<dyn Hittable>, Aabb)], rng: &mut dyn RngCore) -> Self {
        // Random split axis; ranges are sorted by box minimum along it.
        let axis = (rng.next_u32() % 3) as usize;
        let compare = |a: &(Arc<dyn Hittable>, Aabb), b: &(Arc<dyn Hittable>, Aabb)| {
            a.1.axis(axis)
                .min
                .partial_cmp(&b.1.axis(axis).min)
                .unwrap_or(Ordering::Equal)
        };

        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match objects {
            [only] => (only.0.clone(), only.0.clone()),
            [a, b] => {
                if compare(a, b) != Ordering::Greater {
                    (a.0.clone(), b.0.clone())
                } else {
                    (b.0.clone(), a.0.clone())
                }
            }
            _ => {
                objects.sort_unstable_by(compare);
                let mid = objects.len() / 2;
                let (lhs, rhs) = objects.split_at_mut(mid);
                (
                    Arc::new(Self::split(lhs, rng)) as Arc<dyn Hittable>,
                    Arc::new(Self::split(rhs, rng)) as Arc<dyn Hittable>,
                )
            }
        };

        // Children built from boxed primitives always report a box.
        let left_box = left.bounding_box().unwrap_or(Aabb::EMPTY);
        let right_box = right.bounding_box().unwrap_or(Aabb::EMPTY);

        Self {
            bbox: Aabb::union(&left_box, &right_box),
            left,
            right,
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t, rng);

        // A left hit narrows the interval for the right subtree; this is
        // what keeps traversal sub-linear.
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rng);

        hit_right.or(hit_left)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gen_range, Lambertian, Material, Plane, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RANGE: Interval = Interval {
        min: 0.001,
        max: f32::INFINITY,
    };

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    #[test]
    fn test_empty_list_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            BvhNode::build(vec![], &mut rng),
            Err(BvhError::Empty)
        ));
    }

    #[test]
    fn test_boxless_primitive_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects: Vec<Arc<dyn Hittable>> = vec![
            Arc::new(Sphere::new(Vec3::ZERO, 1.0, grey())),
            Arc::new(Plane::new(Vec3::ZERO, Vec3::Y, grey())),
        ];
        assert!(matches!(
            BvhNode::build(objects, &mut rng),
            Err(BvhError::MissingBoundingBox)
        ));
    }

    #[test]
    fn test_single_primitive_tree() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects: Vec<Arc<dyn Hittable>> =
            vec![Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, grey()))];
        let bvh = BvhNode::build(objects, &mut rng).unwrap();

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = bvh.hit(&ray, RANGE, &mut rng).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        // The core correctness invariant: identical hit/no-hit and hit
        // distance versus a brute-force scan, over randomized scenes.
        let mut rng = StdRng::seed_from_u64(42);

        for scene_seed in 0..8 {
            let mut build_rng = StdRng::seed_from_u64(scene_seed);
            let mut list = HittableList::new();
            let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();

            for _ in 0..50 {
                let center = Vec3::new(
                    gen_range(&mut build_rng, -20.0, 20.0),
                    gen_range(&mut build_rng, -20.0, 20.0),
                    gen_range(&mut build_rng, -20.0, 20.0),
                );
                let radius = gen_range(&mut build_rng, 0.2, 2.0);
                let sphere: Arc<dyn Hittable> = Arc::new(Sphere::new(center, radius, grey()));
                list.add(sphere.clone());
                objects.push(sphere);
            }

            let bvh = BvhNode::build(objects, &mut build_rng).unwrap();

            for _ in 0..200 {
                let origin = Vec3::new(
                    gen_range(&mut rng, -30.0, 30.0),
                    gen_range(&mut rng, -30.0, 30.0),
                    gen_range(&mut rng, -30.0, 30.0),
                );
                let direction = Vec3::new(
                    gen_range(&mut rng, -1.0, 1.0),
                    gen_range(&mut rng, -1.0, 1.0),
                    gen_range(&mut rng, -1.0, 1.0),
                );
                if direction.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new_simple(origin, direction);

                let brute = list.hit(&ray, RANGE, &mut rng).map(|r| r.t);
                let fast = bvh.hit(&ray, RANGE, &mut rng).map(|r| r.t);

                match (brute, fast) {
                    (None, None) => {}
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-5, "{a} vs {b}"),
                    other => panic!("bvh and scan disagree: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_node_box_contains_children() {
        let mut rng = StdRng::seed_from_u64(9);
        let centers = [
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(5.0, 3.0, -2.0),
            Vec3::new(0.0, -4.0, 6.0),
        ];
        let objects: Vec<Arc<dyn Hittable>> = centers
            .iter()
            .map(|&c| Arc::new(Sphere::new(c, 1.0, grey())) as Arc<dyn Hittable>)
            .collect();

        let bvh = BvhNode::build(objects, &mut rng).unwrap();
        let bbox = bvh.bounding_box().unwrap();
        for c in centers {
            assert!(bbox.x.contains(c.x) && bbox.y.contains(c.y) && bbox.z.contains(c.z));
        }
    }
}
