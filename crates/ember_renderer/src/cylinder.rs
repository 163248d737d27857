//! Finite cylinders and cones, axis-aligned with Z.
//!
//! Both solve a quadratic for the curved surface plus linear equations for
//! the cap planes, then walk the candidate roots in ascending order and
//! accept the first whose hit point actually lies inside the finite extent.
//! Picking the smallest algebraic root blindly would report hits outside
//! the shape.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{HitRecord, Hittable, Material};

/// One candidate root and the surface it belongs to.
#[derive(Clone, Copy)]
enum Candidate {
    Lateral(f32),
    TopCap(f32),
    BottomCap(f32),
}

impl Candidate {
    fn t(&self) -> f32 {
        match *self {
            Candidate::Lateral(t) | Candidate::TopCap(t) | Candidate::BottomCap(t) => t,
        }
    }
}

/// Collect finite, in-range candidates sorted by ascending t.
fn sorted_candidates(candidates: &mut Vec<Candidate>, ray_t: Interval) {
    candidates.retain(|c| c.t().is_finite() && ray_t.surrounds(c.t()));
    candidates.sort_by(|a, b| a.t().partial_cmp(&b.t()).unwrap_or(std::cmp::Ordering::Equal));
}

/// A cylinder of the given radius, centered at `center`, extending
/// `height / 2` above and below it along Z.
pub struct Cylinder {
    center: Vec3,
    radius: f32,
    height: f32,
    material: Arc<dyn Material>,
}

impl Cylinder {
    pub fn new(center: Vec3, radius: f32, height: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            height,
            material,
        }
    }
}

impl Hittable for Cylinder {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let oc = ray.origin - self.center;
        let d = ray.direction;

        // Lateral surface: x^2 + y^2 = r^2 in the cylinder frame.
        let a = d.x * d.x + d.y * d.y;
        let b = 2.0 * (d.x * oc.x + d.y * oc.y);
        let c = oc.x * oc.x + oc.y * oc.y - self.radius * self.radius;

        let mut candidates = Vec::with_capacity(4);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 && a.abs() > f32::EPSILON {
            let sqrtd = discriminant.sqrt();
            candidates.push(Candidate::Lateral((-b - sqrtd) / (2.0 * a)));
            candidates.push(Candidate::Lateral((-b + sqrtd) / (2.0 * a)));
        }

        let half = self.height / 2.0;
        candidates.push(Candidate::TopCap((half - oc.z) / d.z));
        candidates.push(Candidate::BottomCap((-half - oc.z) / d.z));

        sorted_candidates(&mut candidates, ray_t);

        for candidate in candidates {
            let t = candidate.t();
            let p = ray.at(t);
            let local = p - self.center;

            match candidate {
                Candidate::Lateral(_) => {
                    if local.z.abs() < half {
                        let outward_normal = Vec3::new(local.x, local.y, 0.0).normalize();
                        return Some(HitRecord::new(
                            ray,
                            outward_normal,
                            t,
                            0.0,
                            0.0,
                            self.material.as_ref(),
                        ));
                    }
                }
                Candidate::TopCap(_) | Candidate::BottomCap(_) => {
                    if local.x * local.x + local.y * local.y <= self.radius * self.radius {
                        let outward_normal = match candidate {
                            Candidate::TopCap(_) => Vec3::Z,
                            _ => -Vec3::Z,
                        };
                        return Some(HitRecord::new(
                            ray,
                            outward_normal,
                            t,
                            0.0,
                            0.0,
                            self.material.as_ref(),
                        ));
                    }
                }
            }
        }

        None
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let extent = Vec3::new(self.radius, self.radius, self.height / 2.0);
        Some(Aabb::from_points(self.center - extent, self.center + extent))
    }
}

/// A truncated cone with apex at z = `tip_z` (in world coordinates), base
/// radius `radius` at the apex distance, sliced to `height / 2` above and
/// below `center` along Z.
pub struct Cone {
    center: Vec3,
    radius: f32,
    height: f32,
    tip_z: f32,
    material: Arc<dyn Material>,
}

impl Cone {
    pub fn new(
        center: Vec3,
        radius: f32,
        height: f32,
        tip_z: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center,
            radius,
            height,
            tip_z,
            material,
        }
    }

    /// Cone radius at a signed offset from the apex plane.
    fn radius_at(&self, apex_offset: f32) -> f32 {
        let apex_height = self.tip_z - self.center.z;
        (self.radius / apex_height) * apex_offset
    }
}

impl Hittable for Cone {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let oc = ray.origin - self.center;
        let d = ray.direction;

        let apex_height = self.tip_z - self.center.z;
        let slope_sq = (self.radius * self.radius) / (apex_height * apex_height);

        // Lateral surface: x^2 + y^2 = slope^2 * (z - apex)^2 in the cone frame.
        let a = d.x * d.x + d.y * d.y - slope_sq * d.z * d.z;
        let b = 2.0 * (d.x * oc.x + d.y * oc.y - slope_sq * (oc.z - apex_height) * d.z);
        let c = oc.x * oc.x + oc.y * oc.y - slope_sq * (oc.z - apex_height) * (oc.z - apex_height);

        let mut candidates = Vec::with_capacity(4);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 && a.abs() > f32::EPSILON {
            let sqrtd = discriminant.sqrt();
            candidates.push(Candidate::Lateral((-b - sqrtd) / (2.0 * a)));
            candidates.push(Candidate::Lateral((-b + sqrtd) / (2.0 * a)));
        }

        let half = self.height / 2.0;
        candidates.push(Candidate::TopCap((half - oc.z) / d.z));
        candidates.push(Candidate::BottomCap((-half - oc.z) / d.z));

        sorted_candidates(&mut candidates, ray_t);

        for candidate in candidates {
            let t = candidate.t();
            let p = ray.at(t);
            let local = p - self.center;

            match candidate {
                Candidate::Lateral(_) => {
                    if local.z.abs() < half {
                        let side = Vec3::new(local.x, local.y, 0.0).normalize();
                        let outward_normal =
                            (side + Vec3::new(0.0, 0.0, self.radius / apex_height)).normalize();
                        return Some(HitRecord::new(
                            ray,
                            outward_normal,
                            t,
                            0.0,
                            0.0,
                            self.material.as_ref(),
                        ));
                    }
                }
                Candidate::TopCap(_) | Candidate::BottomCap(_) => {
                    // Cap radius shrinks towards the apex.
                    let cap_offset = match candidate {
                        Candidate::TopCap(_) => apex_height - half,
                        _ => apex_height + half,
                    };
                    let cap_radius = self.radius_at(cap_offset);
                    if local.x * local.x + local.y * local.y <= cap_radius * cap_radius {
                        let outward_normal = match candidate {
                            Candidate::TopCap(_) => Vec3::Z,
                            _ => -Vec3::Z,
                        };
                        return Some(HitRecord::new(
                            ray,
                            outward_normal,
                            t,
                            0.0,
                            0.0,
                            self.material.as_ref(),
                        ));
                    }
                }
            }
        }

        None
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // Widest at the cap farthest from the apex.
        let apex_height = self.tip_z - self.center.z;
        let half = self.height / 2.0;
        let r = self
            .radius_at(apex_height - half)
            .abs()
            .max(self.radius_at(apex_height + half).abs());
        let extent = Vec3::new(r, r, half);
        Some(Aabb::from_points(self.center - extent, self.center + extent))
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

    const RANGE: Interval = Interval {
        min: 0.001,
        max: f32::INFINITY,
    };

    #[test]
    fn test_cylinder_lateral_hit() {
        let cyl = Cylinder::new(Vec3::ZERO, 1.0, 2.0, grey());
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cyl.hit(&ray, RANGE, &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-3);
        assert!((rec.normal - (-Vec3::X)).length() < 1e-3);
    }

    #[test]
    fn test_cylinder_cap_hit() {
        let cyl = Cylinder::new(Vec3::ZERO, 1.0, 2.0, grey());
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cyl.hit(&ray, RANGE, &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-3);
        assert!((rec.normal - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_cylinder_lateral_root_beyond_height_falls_through_to_miss() {
        // Ray above the cylinder pointed so the infinite-lateral solution
        // lies outside the height bound and the caps are missed sideways.
        let cyl = Cylinder::new(Vec3::ZERO, 1.0, 2.0, grey());
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 5.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(cyl.hit(&ray, RANGE, &mut rng).is_none());
    }

    #[test]
    fn test_cylinder_inside_hits_far_wall() {
        // From the axis, the nearest lateral root is behind t_min's mirror;
        // the scan must skip out-of-range candidates, not give up.
        let cyl = Cylinder::new(Vec3::ZERO, 1.0, 2.0, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cyl.hit(&ray, RANGE, &mut rng).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_cylinder_box_idempotent() {
        let cyl = Cylinder::new(Vec3::new(0.0, 0.0, 1.0), 1.0, 2.0, grey());
        let a = cyl.bounding_box().unwrap();
        assert_eq!(a, cyl.bounding_box().unwrap());
        assert!((a.z.min - 0.0).abs() < 1e-4 && (a.z.max - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_cone_lateral_hit_narrows_towards_apex() {
        // Apex at z=2, base radius 1 at the apex-distance plane; at z=1 the
        // cone radius is 0.5.
        let cone = Cone::new(Vec3::ZERO, 1.0, 2.0, 2.0, grey());
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 0.99), Vec3::X);
        let rec = cone.hit(&ray, RANGE, &mut rng).unwrap();
        // Entry near x = -0.5 at z ~ 1.
        assert!((rec.t - 4.5).abs() < 0.1);

        // Outside the narrowed radius at that height: no lateral hit.
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.9, 0.99), Vec3::X);
        assert!(cone.hit(&ray, RANGE, &mut rng).is_none());
    }

    #[test]
    fn test_cone_bottom_cap_hit() {
        let cone = Cone::new(Vec3::ZERO, 1.0, 2.0, 2.0, grey());
        let ray = Ray::new_simple(Vec3::new(0.5, 0.0, -5.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cone.hit(&ray, RANGE, &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-3);
        assert!((rec.normal - (-Vec3::Z)).length() < 1e-3);
    }
}
