//! Axis-aligned rectangles in the three coordinate planes.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable, Material};

/// Which coordinate plane the rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RectPlane {
    /// Spans x/y, fixed z, normal +Z
    Xy,
    /// Spans x/z, fixed y, normal +Y
    Xz,
    /// Spans y/z, fixed x, normal +X
    Yz,
}

/// An axis-aligned rectangle: a 2D extent `[a0,a1] x [b0,b1]` at offset `k`
/// along the fixed axis.
pub struct AxisRect {
    plane: RectPlane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    /// Reverse the U coordinate (orientation control for e.g. skybox faces).
    reversed_u: bool,
    material: Arc<dyn Material>,
}

impl AxisRect {
    /// Rectangle spanning `x in [x0,x1]`, `y in [y0,y1]` at `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xy, x0, x1, y0, y1, k, material)
    }

    /// Rectangle spanning `x in [x0,x1]`, `z in [z0,z1]` at `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xz, x0, x1, z0, z1, k, material)
    }

    /// Rectangle spanning `y in [y0,y1]`, `z in [z0,z1]` at `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Yz, y0, y1, z0, z1, k, material)
    }

    fn new(
        plane: RectPlane,
        a0: f32,
        a1: f32,
        b0: f32,
        b1: f32,
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0,
            a1,
            b0,
            b1,
            k,
            reversed_u: false,
            material,
        }
    }

    /// Mirror the U coordinate across the rectangle.
    pub fn with_reversed_u(mut self) -> Self {
        self.reversed_u = true;
        self
    }

    fn outward_normal(&self) -> Vec3 {
        match self.plane {
            RectPlane::Xy => Vec3::Z,
            RectPlane::Xz => Vec3::Y,
            RectPlane::Yz => Vec3::X,
        }
    }

    /// Decompose a ray into (position, direction) along the fixed axis and
    /// the two free axes, in (fixed, a, b) order.
    fn decompose(&self, ray: &Ray) -> (f32, f32, f32, f32, f32, f32) {
        let o = ray.origin;
        let d = ray.direction;
        match self.plane {
            RectPlane::Xy => (o.z, d.z, o.x, d.x, o.y, d.y),
            RectPlane::Xz => (o.y, d.y, o.x, d.x, o.z, d.z),
            RectPlane::Yz => (o.x, d.x, o.y, d.y, o.z, d.z),
        }
    }
}

impl Hittable for AxisRect {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let (ok, dk, oa, da, ob, db) = self.decompose(ray);

        let t = (self.k - ok) / dk;
        if !t.is_finite() || !ray_t.contains(t) {
            return None;
        }

        let a = oa + t * da;
        let b = ob + t * db;
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        // The Yz orientation maps U to the second free axis so that
        // adjoining faces of a box share texture orientation.
        let (mut u, v) = match self.plane {
            RectPlane::Xy | RectPlane::Xz => (
                (a - self.a0) / (self.a1 - self.a0),
                (b - self.b0) / (self.b1 - self.b0),
            ),
            RectPlane::Yz => (
                (b - self.b0) / (self.b1 - self.b0),
                (a - self.a0) / (self.a1 - self.a0),
            ),
        };
        if self.reversed_u {
            u = 1.0 - u;
        }

        Some(HitRecord::new(
            ray,
            self.outward_normal(),
            t,
            u,
            v,
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // Flat along the fixed axis; Aabb construction pads it.
        let (min, max) = match self.plane {
            RectPlane::Xy => (
                Vec3::new(self.a0, self.b0, self.k),
                Vec3::new(self.a1, self.b1, self.k),
            ),
            RectPlane::Xz => (
                Vec3::new(self.a0, self.k, self.b0),
                Vec3::new(self.a1, self.k, self.b1),
            ),
            RectPlane::Yz => (
                Vec3::new(self.k, self.a0, self.b0),
                Vec3::new(self.k, self.a1, self.b1),
            ),
        };
        Some(Aabb::from_points(min, max))
    }
}
