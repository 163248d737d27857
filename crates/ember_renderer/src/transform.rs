//! Decorators that reposition or reclassify a wrapped primitive.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable};

/// Shift a primitive by an offset: the incoming ray is moved by the
/// inverse offset, the hit point and box by the offset itself.
pub struct Translate {
    child: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(child: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { child, offset }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let moved = Ray::new(ray.origin - self.offset, ray.direction, ray.time);
        let mut rec = self.child.hit(&moved, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.child.bounding_box()?.translated(self.offset))
    }
}

/// Rotation axis for [`Rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotate a primitive about one coordinate axis through the origin.
///
/// Rays are rotated by the inverse angle before delegating; hit points and
/// normals are rotated forward. The world-space box encloses the 8 rotated
/// corners of the child's box and is necessarily looser than the true
/// rotated volume.
pub struct Rotate {
    child: Arc<dyn Hittable>,
    axis: Axis,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Option<Aabb>,
}

impl Rotate {
    pub fn around_x(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::X, degrees)
    }

    pub fn around_y(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::Y, degrees)
    }

    pub fn around_z(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::Z, degrees)
    }

    fn new(child: Arc<dyn Hittable>, axis: Axis, degrees: f32) -> Self {
        let radians = degrees.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let bbox = child.bounding_box().map(|child_box| {
            let mut min = Vec3::splat(f32::INFINITY);
            let mut max = Vec3::splat(f32::NEG_INFINITY);

            for i in 0..2 {
                for j in 0..2 {
                    for k in 0..2 {
                        let corner = Vec3::new(
                            if i == 0 { child_box.x.min } else { child_box.x.max },
                            if j == 0 { child_box.y.min } else { child_box.y.max },
                            if k == 0 { child_box.z.min } else { child_box.z.max },
                        );
                        let rotated = rotate_forward(axis, sin_theta, cos_theta, corner);
                        min = min.min(rotated);
                        max = max.max(rotated);
                    }
                }
            }

            Aabb::from_points(min, max)
        });

        Self {
            child,
            axis,
            sin_theta,
            cos_theta,
            bbox,
        }
    }
}

/// Rotate `p` from child space into world space.
fn rotate_forward(axis: Axis, sin: f32, cos: f32, p: Vec3) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(p.x, cos * p.y + sin * p.z, -sin * p.y + cos * p.z),
        Axis::Y => Vec3::new(cos * p.x + sin * p.z, p.y, -sin * p.x + cos * p.z),
        Axis::Z => Vec3::new(cos * p.x - sin * p.y, sin * p.x + cos * p.y, p.z),
    }
}

/// Rotate `p` from world space into child space (inverse of
/// [`rotate_forward`]).
fn rotate_inverse(axis: Axis, sin: f32, cos: f32, p: Vec3) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(p.x, cos * p.y - sin * p.z, sin * p.y + cos * p.z),
        Axis::Y => Vec3::new(cos * p.x - sin * p.z, p.y, sin * p.x + cos * p.z),
        Axis::Z => Vec3::new(cos * p.x + sin * p.y, cos * p.y - sin * p.x, p.z),
    }
}

impl Hittable for Rotate {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let rotated = Ray::new(
            rotate_inverse(self.axis, self.sin_theta, self.cos_theta, ray.origin),
            rotate_inverse(self.axis, self.sin_theta, self.cos_theta, ray.direction),
            ray.time,
        );

        let mut rec = self.child.hit(&rotated, ray_t, rng)?;
        rec.p = rotate_forward(self.axis, self.sin_theta, self.cos_theta, rec.p);
        rec.normal = rotate_forward(self.axis, self.sin_theta, self.cos_theta, rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}

/// Compose rotations about all three axes (applied Y, then X, then Z).
pub fn rotate_xyz(
    child: Arc<dyn Hittable>,
    x_degrees: f32,
    y_degrees: f32,
    z_degrees: f32,
) -> Arc<dyn Hittable> {
    let rotated = Arc::new(Rotate::around_y(child, y_degrees));
    let rotated = Arc::new(Rotate::around_x(rotated, x_degrees));
    Arc::new(Rotate::around_z(rotated, z_degrees))
}

/// Invert the front/back classification of every hit on the wrapped
/// primitive without altering geometry. Makes one-sided emitters visible
/// only from the desired side.
pub struct FlipFace {
    child: Arc<dyn Hittable>,
}

impl FlipFace {
    pub fn new(child: Arc<dyn Hittable>) -> Self {
        Self { child }
    }
}

impl Hittable for FlipFace {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut rec = self.child.hit(ray, ray_t, rng)?;
        rec.front_face = !rec.front_face;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.child.bounding_box()
    }
}
