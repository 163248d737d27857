//! Material trait and the scattering models.

use std::f32::consts::PI;
use std::sync::Arc;

use ember_math::{Onb, Ray, Vec3};
use rand::RngCore;

use crate::texture::{SolidColor, Texture};
use crate::{
    gen_f32, random_cosine_direction, random_in_unit_sphere, random_unit_vector, HitRecord,
};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// How a scatter event must be weighted by the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScatterKind {
    /// Deterministic outgoing direction; no density division.
    Specular,
    /// Direction drawn from a distribution with the given sampling density.
    Diffuse { pdf: f32 },
}

/// Result of a scatter event.
pub struct ScatterRecord {
    pub ray: Ray,
    pub attenuation: Color,
    pub kind: ScatterKind,
}

/// How light interacts with a surface.
pub trait Material: Send + Sync {
    /// Light emitted at the hit point. Most materials emit nothing.
    fn emitted(&self, _rec: &HitRecord) -> Color {
        Color::ZERO
    }

    /// Scatter an incoming ray, or absorb it (`None`).
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord>;

    /// Density of `scattered` under this material's sampling distribution.
    /// Only meaningful for diffuse events; specular events bypass it.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }
}

/// Cosine-weighted diffuse reflector.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn textured(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let basis = Onb::from_w(rec.normal);
        let direction = basis.local(random_cosine_direction(rng));
        let pdf = basis.w.dot(direction).max(0.0) / PI;

        Some(ScatterRecord {
            ray: Ray::new(rec.p, direction, ray_in.time),
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            kind: ScatterKind::Diffuse { pdf },
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec.normal.dot(scattered.direction.normalize());
        cosine.max(0.0) / PI
    }
}

/// Mirror reflector with an optional fuzz radius.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// `fuzz` is clamped to [0, 1]; 0 is a perfect mirror.
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction.normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // A perturbed reflection below the surface is absorbed; letting it
        // through would leak energy under the surface.
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterRecord {
            ray: Ray::new(rec.p, direction, ray_in.time),
            attenuation: self.albedo,
            kind: ScatterKind::Specular,
        })
    }
}

/// Refractive material (glass, water) with Schlick-approximated Fresnel.
pub struct Dielectric {
    refraction_index: f32,
    tint: Color,
    fuzz: f32,
}

impl Dielectric {
    pub fn new(refraction_index: f32) -> Self {
        Self::tinted(refraction_index, Color::ONE, 0.0)
    }

    /// A colored and/or frosted variant.
    pub fn tinted(refraction_index: f32, tint: Color, fuzz: f32) -> Self {
        Self {
            refraction_index,
            tint,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
        let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let mut direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        if self.fuzz > 0.0 {
            direction += self.fuzz * random_in_unit_sphere(rng);
        }

        Some(ScatterRecord {
            ray: Ray::new(rec.p, direction, ray_in.time),
            attenuation: self.tint,
            kind: ScatterKind::Specular,
        })
    }
}

/// Emitter that never scatters. Emits only from its geometric front face,
/// so a flipped face (or the back of a panel) stays dark.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self {
            emit: Arc::new(SolidColor::new(emit)),
        }
    }

    pub fn textured(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn emitted(&self, rec: &HitRecord) -> Color {
        if rec.front_face {
            self.emit.value(rec.u, rec.v, rec.p)
        } else {
            Color::ZERO
        }
    }

    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }
}

/// Uniform-sphere scatterer used as the phase function of participating
/// media.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

const UNIFORM_SPHERE_PDF: f32 = 1.0 / (4.0 * PI);

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn textured(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            ray: Ray::new(rec.p, random_unit_vector(rng), ray_in.time),
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            kind: ScatterKind::Diffuse {
                pdf: UNIFORM_SPHERE_PDF,
            },
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        UNIFORM_SPHERE_PDF
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with normal `n`.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hittable, Sphere};
    use ember_math::Interval;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// A hit straight onto a sphere's +Z pole, for material tests.
    fn pole_hit(material: &dyn Material) -> (Ray, HitRecord<'_>) {
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let rec = HitRecord::new(&ray, Vec3::Z, 4.0, 0.5, 0.5, material);
        (ray, rec)
    }

    #[test]
    fn test_lambertian_scatters_into_hemisphere() {
        let material = Lambertian::new(Color::splat(0.8));
        let (ray, rec) = pole_hit(&material);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..64 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert!(scatter.ray.direction.dot(rec.normal) > 0.0);

            let ScatterKind::Diffuse { pdf } = scatter.kind else {
                panic!("lambertian must be density-weighted");
            };
            // Sampled density and queried density agree for the same ray.
            let queried = material.scattering_pdf(&ray, &rec, &scatter.ray);
            assert!((pdf - queried).abs() < 1e-4);
            assert!(pdf > 0.0 && pdf <= 1.0 / PI + 1e-4);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let material = Metal::new(Color::splat(0.9), 0.0);
        let mut rng = StdRng::seed_from_u64(1);

        // 45-degree incidence on the +Z pole of a sphere at the origin.
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, 6.0), Vec3::new(1.0, 0.0, -1.0));
        let rec = HitRecord::new(&ray, Vec3::Z, 5.0, 0.0, 0.0, &material);

        let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(scatter.kind, ScatterKind::Specular);
        let d = scatter.ray.direction.normalize();
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert!((d - expected).length() < 1e-4);
    }

    #[test]
    fn test_fuzzy_metal_absorbs_below_surface() {
        // Grazing incidence with maximum fuzz: some perturbed reflections
        // point into the surface and must be absorbed.
        let material = Metal::new(Color::splat(0.9), 1.0);
        let mut rng = StdRng::seed_from_u64(7);

        let ray = Ray::new_simple(
            Vec3::new(-5.0, 0.0, 5.001),
            Vec3::new(1.0, 0.0, -0.001).normalize(),
        );
        let rec = HitRecord::new(&ray, Vec3::Z, 5.0, 0.0, 0.0, &material);

        let absorbed = (0..256)
            .filter(|_| material.scatter(&ray, &rec, &mut rng).is_none())
            .count();
        assert!(absorbed > 0, "grazing fuzzy metal never absorbed");
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(1);

        // Exiting glass at a grazing angle: must reflect, not refract.
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.05).normalize());
        // Back-face hit: the ray travels inside the medium.
        let rec = HitRecord::new(&ray, Vec3::Z, 1.0, 0.0, 0.0, &material);
        assert!(!rec.front_face);

        let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(scatter.kind, ScatterKind::Specular);
        // Reflected ray keeps travelling away from the interface.
        assert!(scatter.ray.direction.z < 0.0);
    }

    #[test]
    fn test_dielectric_straight_through() {
        let material = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(3);

        // Normal incidence refracts straight through (or reflects straight
        // back); either way the direction stays on the Z axis.
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let rec = HitRecord::new(&ray, Vec3::Z, 4.0, 0.0, 0.0, &material);

        for _ in 0..16 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            let d = scatter.ray.direction.normalize();
            assert!(d.x.abs() < 1e-4 && d.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_diffuse_light_front_face_only() {
        let material = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let front = HitRecord::new(&ray, Vec3::Z, 4.0, 0.0, 0.0, &material);
        assert_eq!(material.emitted(&front), Color::new(4.0, 4.0, 4.0));

        let back = HitRecord::new(&ray, -Vec3::Z, 4.0, 0.0, 0.0, &material);
        assert_eq!(material.emitted(&back), Color::ZERO);

        let mut rng = StdRng::seed_from_u64(0);
        assert!(material.scatter(&ray, &front, &mut rng).is_none());
    }

    #[test]
    fn test_isotropic_density_is_uniform() {
        let material = Isotropic::new(Color::ONE);
        let (ray, rec) = pole_hit(&material);
        let mut rng = StdRng::seed_from_u64(5);

        let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(
            scatter.kind,
            ScatterKind::Diffuse {
                pdf: UNIFORM_SPHERE_PDF
            }
        );
        assert_eq!(
            material.scattering_pdf(&ray, &rec, &scatter.ray),
            UNIFORM_SPHERE_PDF
        );
    }

    #[test]
    fn test_materials_share_across_primitives() {
        // One material instance serving several primitives, as scenes do.
        let shared: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.7)));
        let a = Sphere::new(Vec3::ZERO, 1.0, shared.clone());
        let b = Sphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0, shared);

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        assert!(a
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_some());
        let ray = Ray::new_simple(Vec3::new(3.0, 0.0, 5.0), -Vec3::Z);
        assert!(b
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_some());
    }
}
