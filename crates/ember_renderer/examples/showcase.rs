//! A daylight scene exercising the wider primitive set: checkered ground,
//! a marble sphere, a motion-blurred sphere, a glass cylinder, a metal
//! cone, and an OBJ mesh when one is supplied on the command line.

use std::sync::Arc;

use anyhow::{Context, Result};
use ember_core::Mesh;
use ember_renderer::{
    render_parallel, rotate_xyz, BvhNode, Camera, CheckerTexture, Color, Cone, Cylinder,
    Dielectric, Film, HittableList, Lambertian, Metal, MovingSphere, NoiseTexture, RenderConfig,
    Sphere, Texture, Translate, TriangleMesh, Vec3,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SmallRng::from_entropy();
    let mut world = HittableList::new();

    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::new(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::textured(checker)),
    )));

    let marble: Arc<dyn Texture> = Arc::new(NoiseTexture::new(4.0, &mut rng));
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::textured(marble)),
    )));

    world.add(Arc::new(MovingSphere::new(
        Vec3::new(4.0, 0.6, 2.0),
        Vec3::new(4.0, 1.1, 2.0),
        0.0,
        1.0,
        0.6,
        Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.1))),
    )));

    // Cylinder and cone are built along Z, stood upright, then placed.
    let cylinder = Arc::new(Cylinder::new(
        Vec3::ZERO,
        0.8,
        2.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    let cylinder = rotate_xyz(cylinder, -90.0, 0.0, 0.0);
    world.add(Arc::new(Translate::new(cylinder, Vec3::new(-4.0, 1.0, 2.5))));

    let cone = Arc::new(Cone::new(
        Vec3::ZERO,
        1.0,
        2.0,
        2.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 0.05)),
    ));
    let cone = rotate_xyz(cone, -90.0, 0.0, 0.0);
    world.add(Arc::new(Translate::new(cone, Vec3::new(-2.5, 1.0, 5.5))));

    if let Some(path) = std::env::args().nth(1) {
        let mesh = Mesh::load_obj(&path, Vec3::new(0.0, 0.2, 4.0), 0.7)
            .with_context(|| format!("loading mesh {path}"))?;
        world.add(Arc::new(TriangleMesh::build_bvh(
            &mesh,
            Arc::new(Lambertian::new(Color::new(0.7, 0.5, 0.5))),
            &mut rng,
        )?));
    }

    let world = BvhNode::from_list(world, &mut rng).context("building scene BVH")?;

    let (width, height) = (600, 338);
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(13.0, 4.0, 3.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_lens(25.0, 0.1, 12.0)
        .with_shutter(0.0, 1.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 100,
        max_depth: 50,
        background: Color::new(0.7, 0.8, 1.0),
    };

    let film = Film::new(width, height);
    render_parallel(&world, &camera, &config, &film);

    let image = image::RgbaImage::from_raw(width, height, film.snapshot_rgba())
        .context("assembling output image")?;
    image.save("showcase.png").context("writing showcase.png")?;

    println!("wrote showcase.png");
    Ok(())
}
