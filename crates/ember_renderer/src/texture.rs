//! Texture trait and implementations.

use std::path::Path;
use std::sync::Arc;

use ember_core::ImageData;
use ember_math::Vec3;
use rand::RngCore;

use crate::{Color, Perlin};

/// Fallback color when an image texture has no data: bright cyan, chosen
/// to be obvious in a render.
const MISSING_TEXTURE_COLOR: Color = Vec3::new(0.0, 1.0, 1.0);

/// Per-point color lookup.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A single constant color.
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3D checker pattern: the sign of a sine product selects between two
/// sub-textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(even: Color, odd: Color) -> Self {
        Self::textured(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }

    pub fn textured(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self { even, odd }
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like texture driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        Color::ONE * 0.5 * (1.0 + (self.scale * p.z + 10.0 * self.noise.turb(p)).sin())
    }
}

/// Nearest-pixel lookup into a decoded image.
///
/// A texture that failed to load keeps rendering with a debug color
/// instead of aborting the render.
pub struct ImageTexture {
    data: Option<Arc<ImageData>>,
}

impl ImageTexture {
    /// Load from a file; on failure the texture falls back to
    /// [`MISSING_TEXTURE_COLOR`].
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let data = match ImageData::load(path) {
            Ok(data) => Some(Arc::new(data)),
            Err(err) => {
                log::warn!(
                    "could not load texture image {}: {err}; using debug color",
                    path.display()
                );
                None
            }
        };
        Self { data }
    }

    pub fn from_data(data: Arc<ImageData>) -> Self {
        Self { data: Some(data) }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(data) = &self.data else {
            return MISSING_TEXTURE_COLOR;
        };

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0); // flip V to image coordinates

        let i = ((u * data.width() as f32) as u32).min(data.width() - 1);
        let j = ((v * data.height() as f32) as u32).min(data.height() - 1);

        let [r, g, b] = data.pixel(i, j);
        let scale = 1.0 / 255.0;
        Color::new(scale * r as f32, scale * g as f32, scale * b as f32)
    }
}
