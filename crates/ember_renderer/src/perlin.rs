//! Perlin gradient noise with turbulence.

use ember_math::Vec3;
use rand::RngCore;

use crate::{gen_range, random_unit_vector};

const POINT_COUNT: usize = 256;

/// Octaves accumulated by [`Perlin::turb`].
const TURBULENCE_DEPTH: u32 = 7;

/// Gradient noise over a 256-entry permutation lattice.
pub struct Perlin {
    random_vectors: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let random_vectors = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();

        Self {
            random_vectors,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothed gradient noise in [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut corners = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in corners.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i64) & 255) as usize]
                        ^ self.perm_y[((j + dj as i64) & 255) as usize]
                        ^ self.perm_z[((k + dk as i64) & 255) as usize];
                    *corner = self.random_vectors[index];
                }
            }
        }

        perlin_interp(&corners, u, v, w)
    }

    /// Multi-octave turbulence: the absolute sum of progressively
    /// higher-frequency, lower-weight noise.
    pub fn turb(&self, p: Vec3) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..TURBULENCE_DEPTH {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();

    // Fisher-Yates shuffle.
    for i in (1..POINT_COUNT).rev() {
        let target = gen_range(rng, 0.0, (i + 1) as f32) as usize;
        p.swap(i, target.min(i));
    }
    p
}

/// Hermite-smoothed trilinear interpolation of gradient dot products.
fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            for k in 0..2 {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * c[i][j][k].dot(weight_v);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_deterministic_per_instance() {
        let mut rng = StdRng::seed_from_u64(1);
        let perlin = Perlin::new(&mut rng);
        let p = Vec3::new(1.3, 2.7, 3.1);
        assert_eq!(perlin.noise(p), perlin.noise(p));
    }

    #[test]
    fn test_noise_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let perlin = Perlin::new(&mut rng);
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * 0.59, i as f32 * 0.73);
            let n = perlin.noise(p);
            assert!((-1.0..=1.0).contains(&n), "noise {n} out of range");
        }
    }

    #[test]
    fn test_turbulence_is_nonnegative() {
        let mut rng = StdRng::seed_from_u64(3);
        let perlin = Perlin::new(&mut rng);
        for i in 0..100 {
            let p = Vec3::splat(i as f32 * 0.11);
            assert!(perlin.turb(p) >= 0.0);
        }
    }

    #[test]
    fn test_permutation_covers_all_indices() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut perm = generate_perm(&mut rng);
        perm.sort_unstable();
        assert_eq!(perm, (0..POINT_COUNT).collect::<Vec<_>>());
    }
}
