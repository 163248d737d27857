//! Triangle-mesh primitive built from an [`ember_core::Mesh`].

use std::sync::Arc;

use ember_core::Mesh;
use ember_math::{Aabb, Interval, Ray};
use rand::RngCore;

use crate::{BvhError, BvhNode, HitRecord, Hittable, Material, Triangle};

/// A mesh of triangles sharing one material.
///
/// Hit queries are a minimum-t linear scan, so nontrivial meshes should be
/// converted to a BVH with [`TriangleMesh::build_bvh`] instead of being
/// added to a scene directly.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    bbox: Aabb,
}

impl TriangleMesh {
    pub fn new(mesh: &Mesh, material: Arc<dyn Material>) -> Self {
        let triangles: Vec<Triangle> = (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle(i);
                Triangle::new(a, b, c, material.clone())
            })
            .collect();

        let bbox = triangles
            .iter()
            .filter_map(|t| t.bounding_box())
            .fold(Aabb::EMPTY, |acc, b| Aabb::union(&acc, &b));

        Self { triangles, bbox }
    }

    /// Build a BVH over the mesh triangles instead of a linear-scan mesh.
    pub fn build_bvh(
        mesh: &Mesh,
        material: Arc<dyn Material>,
        rng: &mut dyn RngCore,
    ) -> Result<BvhNode, BvhError> {
        let triangles: Vec<Arc<dyn Hittable>> = (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle(i);
                Arc::new(Triangle::new(a, b, c, material.clone())) as Arc<dyn Hittable>
            })
            .collect();
        BvhNode::build(triangles, rng)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Hittable for TriangleMesh {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut closest_so_far = ray_t.max;
        let mut closest_hit = None;

        for triangle in &self.triangles {
            if let Some(rec) = triangle.hit(ray, Interval::new(ray_t.min, closest_so_far), rng) {
                closest_so_far = rec.t;
                closest_hit = Some(rec);
            }
        }

        closest_hit
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (!self.triangles.is_empty()).then_some(self.bbox)
    }
}
