//! Decoded image data for image-mapped textures.

use std::path::Path;

use crate::AssetResult;

/// Bytes per pixel of the decoded buffer (packed RGB8).
pub const BYTES_PER_PIXEL: usize = 3;

/// A decoded RGB8 image.
///
/// The renderer's image texture samples this with nearest-pixel lookups;
/// there is no filtering here.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Decode an image file into a packed RGB8 buffer.
    pub fn load(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)?.to_rgb8();
        let (width, height) = decoded.dimensions();

        log::debug!(
            "loaded image {} ({}x{}, {} bytes)",
            path.display(),
            width,
            height,
            decoded.as_raw().len()
        );

        Ok(Self {
            width,
            height,
            pixels: decoded.into_raw(),
        })
    }

    /// Wrap an already-decoded RGB8 buffer.
    ///
    /// The buffer length must be `width * height * BYTES_PER_PIXEL`.
    pub fn from_rgb8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between the starts of adjacent rows.
    pub fn bytes_per_scanline(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// The RGB bytes of the pixel at `(x, y)`, with (0, 0) the top-left.
    ///
    /// Coordinates are clamped to the image extent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let offset = y * self.bytes_per_scanline() + x * BYTES_PER_PIXEL;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }
}
