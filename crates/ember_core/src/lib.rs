//! Renderer-agnostic asset types for ember.
//!
//! Holds decoded image data for textures and triangle meshes loaded from
//! OBJ files. Nothing in this crate knows about rays or materials; the
//! renderer wraps these types into hittable primitives.

mod image_data;
mod mesh;

pub use image_data::ImageData;
pub use mesh::Mesh;

use thiserror::Error;

/// Errors raised while loading assets from disk.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("malformed mesh at line {line}: {reason}")]
    MalformedMesh { line: usize, reason: String },
}

pub type AssetResult<T> = Result<T, AssetError>;
