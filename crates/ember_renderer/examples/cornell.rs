//! Renders a Cornell box with a rotated tall block, a smoke block, and a
//! glass sphere, then writes the result to `cornell.png`.

use std::sync::Arc;

use anyhow::{Context, Result};
use ember_renderer::{
    render_parallel, AxisRect, BvhNode, Camera, Color, ConstantMedium, Cuboid, Dielectric,
    DiffuseLight, Film, FlipFace, HittableList, Lambertian, Material, RenderConfig, Rotate,
    Sphere, Translate, Vec3,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn build_scene() -> HittableList {
    let mut world = HittableList::new();

    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 15.0)));

    // Walls
    world.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    world.add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    world.add(Arc::new(AxisRect::xz(
        0.0,
        555.0,
        0.0,
        555.0,
        0.0,
        white.clone(),
    )));
    world.add(Arc::new(AxisRect::xz(
        0.0,
        555.0,
        0.0,
        555.0,
        555.0,
        white.clone(),
    )));
    world.add(Arc::new(AxisRect::xy(
        0.0,
        555.0,
        0.0,
        555.0,
        555.0,
        white.clone(),
    )));

    // Ceiling panel, emitting downward only
    world.add(Arc::new(FlipFace::new(Arc::new(AxisRect::xz(
        213.0, 343.0, 227.0, 332.0, 554.0, light,
    )))));

    // Tall block, rotated and shifted
    let tall = Arc::new(Cuboid::new(
        Vec3::ZERO,
        Vec3::new(165.0, 330.0, 165.0),
        white.clone(),
    ));
    let tall = Arc::new(Rotate::around_y(tall, 15.0));
    world.add(Arc::new(Translate::new(tall, Vec3::new(265.0, 0.0, 295.0))));

    // Short block wrapped in smoke
    let short = Arc::new(Cuboid::new(
        Vec3::ZERO,
        Vec3::new(165.0, 165.0, 165.0),
        white,
    ));
    let short = Arc::new(Rotate::around_y(short, -18.0));
    let short = Arc::new(Translate::new(short, Vec3::new(130.0, 0.0, 65.0)));
    world.add(Arc::new(ConstantMedium::new(short, 0.01, Color::ONE)));

    // Glass sphere above the smoke
    world.add(Arc::new(Sphere::new(
        Vec3::new(212.0, 240.0, 147.0),
        60.0,
        Arc::new(Dielectric::new(1.5)),
    )));

    world
}

fn main() -> Result<()> {
    env_logger::init();

    let world = build_scene();
    let mut rng = SmallRng::from_entropy();
    let world = BvhNode::from_list(world, &mut rng).context("building scene BVH")?;

    let width = 400;
    let height = 400;

    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 200,
        max_depth: 50,
        background: Color::ZERO,
    };

    let film = Film::new(width, height);
    render_parallel(&world, &camera, &config, &film);

    let image = image::RgbaImage::from_raw(width, height, film.snapshot_rgba())
        .context("assembling output image")?;
    image.save("cornell.png").context("writing cornell.png")?;

    println!("wrote cornell.png");
    Ok(())
}
