//! The radiance estimator.

use ember_math::Interval;
use rand::RngCore;

use crate::{Color, Hittable, Ray, ScatterKind};

/// Lower bound for intersection tests; avoids self-intersection acne.
const T_MIN: f32 = 0.001;

/// Sampling densities below this terminate the path instead of dividing.
const PDF_EPS: f32 = 1e-8;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Maximum path length before forced termination
    pub max_depth: u32,
    /// Radiance of rays that escape the scene
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
        }
    }
}

/// Estimate the radiance carried by `ray`.
///
/// Walks scattering events iteratively: emission is accumulated at every
/// bounce, the running weight picks up the attenuation (divided by the
/// sampling density for diffuse events), and the path ends on escape,
/// absorption, or the depth cap.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut radiance = Color::ZERO;
    let mut weight = Color::ONE;

    for _ in 0..config.max_depth {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY), rng) else {
            // Escaped to the background.
            return radiance + config.background * weight;
        };

        radiance += rec.material.emitted(&rec) * weight;

        let Some(scatter) = rec.material.scatter(&ray, &rec, rng) else {
            // Pure emitter or absorber.
            return radiance;
        };

        match scatter.kind {
            ScatterKind::Specular => {
                weight *= scatter.attenuation;
            }
            ScatterKind::Diffuse { pdf } => {
                debug_assert!(pdf > PDF_EPS, "degenerate scatter density {pdf}");
                if pdf < PDF_EPS {
                    return radiance;
                }
                let scattering_pdf = rec.material.scattering_pdf(&ray, &rec, &scatter.ray);
                weight *= scatter.attenuation * scattering_pdf / pdf;
            }
        }

        ray = scatter.ray;
    }

    // Depth cap reached: the truncated tail contributes nothing.
    radiance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AxisRect, DiffuseLight, FlipFace, HittableList, Lambertian, Metal, Sphere, Vec3,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sky() -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 1,
            max_depth: 8,
            background: Color::ONE,
        }
    }

    #[test]
    fn test_escaped_ray_returns_background() {
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        let config = RenderConfig {
            background: Color::new(0.1, 0.2, 0.3),
            ..sky()
        };

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        assert_eq!(
            ray_color(&ray, &world, &config, &mut rng),
            Color::new(0.1, 0.2, 0.3)
        );
    }

    #[test]
    fn test_zero_depth_returns_black() {
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        let config = RenderConfig {
            max_depth: 0,
            ..sky()
        };

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray_color(&ray, &world, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_emitter_terminates_path() {
        let mut world = HittableList::new();
        world.add(Arc::new(AxisRect::xy(
            -10.0,
            10.0,
            -10.0,
            10.0,
            -5.0,
            Arc::new(DiffuseLight::new(Color::new(3.0, 3.0, 3.0))),
        )));

        let mut rng = StdRng::seed_from_u64(0);
        let config = RenderConfig {
            background: Color::ZERO,
            ..sky()
        };

        // Facing the light's front (+Z) side.
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert_eq!(
            ray_color(&ray, &world, &config, &mut rng),
            Color::new(3.0, 3.0, 3.0)
        );

        // From behind, the one-sided light is dark.
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert_eq!(ray_color(&ray, &world, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_mirror_halves_energy_per_bounce() {
        // A perfect mirror with albedo 0.5 reflecting straight into a white
        // background: exactly one bounce, so the estimate is deterministic.
        let mut world = HittableList::new();
        world.add(Arc::new(AxisRect::xy(
            -10.0,
            10.0,
            -10.0,
            10.0,
            -5.0,
            Arc::new(Metal::new(Color::splat(0.5), 0.0)),
        )));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let estimate = ray_color(&ray, &world, &sky(), &mut rng);
        assert!((estimate - Color::splat(0.5)).length() < 1e-4);
    }

    #[test]
    fn test_diffuse_bounce_weight_cancels_density() {
        // For the cosine-weighted diffuse model, scattering_pdf / pdf is 1,
        // so one bounce to a white background yields exactly the albedo.
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Lambertian::new(Color::new(0.3, 0.6, 0.9))),
        )));

        let mut rng = StdRng::seed_from_u64(1);
        let config = RenderConfig {
            max_depth: 2,
            ..sky()
        };
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let estimate = ray_color(&ray, &world, &config, &mut rng);
        assert!((estimate - Color::new(0.3, 0.6, 0.9)).length() < 1e-4);
    }

    #[test]
    fn test_estimate_variance_shrinks_with_samples() {
        // Monte Carlo sanity: the variance of batch means decreases as the
        // per-batch sample count grows.
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )));
        // Ceiling panel emitting downward.
        world.add(Arc::new(FlipFace::new(Arc::new(AxisRect::xz(
            -20.0,
            20.0,
            -20.0,
            20.0,
            10.0,
            Arc::new(DiffuseLight::new(Color::splat(4.0))),
        )))));

        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 6,
            background: Color::ZERO,
        };
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);

        let mut rng = StdRng::seed_from_u64(11);
        let mut batch_variance = |batch_size: u32| -> f32 {
            let means: Vec<f32> = (0..30)
                .map(|_| {
                    let sum: f32 = (0..batch_size)
                        .map(|_| ray_color(&ray, &world, &config, &mut rng).x)
                        .sum();
                    sum / batch_size as f32
                })
                .collect();
            let mean = means.iter().sum::<f32>() / means.len() as f32;
            means.iter().map(|m| (m - mean).powi(2)).sum::<f32>() / means.len() as f32
        };

        let coarse = batch_variance(10);
        let fine = batch_variance(1000);
        assert!(
            fine < coarse,
            "variance should shrink: {coarse} at 10 spp vs {fine} at 1000 spp"
        );
    }
}
