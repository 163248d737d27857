//! ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer: scenes are in-memory graphs of hittable
//! primitives and materials, sampled by a fixed pool of worker threads that
//! claim image tiles and accumulate radiance into a shared film.

mod bvh;
mod camera;
mod cuboid;
mod cylinder;
mod film;
mod hittable;
mod integrator;
mod material;
mod medium;
mod mesh;
mod perlin;
mod plane;
mod rect;
mod sampling;
mod scheduler;
mod sphere;
mod texture;
mod transform;
mod triangle;

pub use bvh::{BvhError, BvhNode};
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use cylinder::{Cone, Cylinder};
pub use film::{Film, FILM_CHANNELS};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{ray_color, RenderConfig};
pub use material::{
    Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterKind,
    ScatterRecord,
};
pub use medium::ConstantMedium;
pub use mesh::TriangleMesh;
pub use perlin::Perlin;
pub use plane::{Disk, Plane};
pub use rect::AxisRect;
pub use sampling::{
    gen_f32, gen_range, random_cosine_direction, random_in_unit_disk, random_in_unit_sphere,
    random_unit_vector,
};
pub use scheduler::{render_parallel, Tile, TileScheduler, DEFAULT_TILE_SIZE};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture};
pub use transform::{rotate_xyz, FlipFace, Rotate, Translate};
pub use triangle::Triangle;

/// Re-export math types used throughout the public API.
pub use ember_math::{Aabb, Interval, Onb, Ray, Vec3};
