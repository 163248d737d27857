//! Tile scheduler and the worker thread pool.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{ray_color, Camera, Film, Hittable, RenderConfig};

/// Tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// A rectangular block of pixels rendered by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Snake-order cursor over the tile grid plus the taken flags, all mutated
/// under one lock.
struct GridState {
    taken: Vec<bool>,
    cursor_x: i64,
    cursor_y: i64,
    leftward: bool,
}

/// Hands out image tiles to worker threads.
///
/// Tiles are visited bottom row first in a boustrophedon ("snake") order
/// so neighboring claims stay spatially adjacent; this is a coherence
/// heuristic, not a correctness requirement. A tile is claimed exactly
/// once and never handed to a second worker.
pub struct TileScheduler {
    image_width: u32,
    image_height: u32,
    tile_size: u32,
    grid_width: u32,
    grid_height: u32,
    state: Mutex<GridState>,
}

impl TileScheduler {
    pub fn new(image_width: u32, image_height: u32, tile_size: u32) -> Self {
        let grid_width = image_width.div_ceil(tile_size);
        let grid_height = image_height.div_ceil(tile_size);

        Self {
            image_width,
            image_height,
            tile_size,
            grid_width,
            grid_height,
            state: Mutex::new(GridState {
                taken: vec![false; (grid_width * grid_height) as usize],
                cursor_x: -1,
                cursor_y: grid_height as i64 - 1,
                leftward: false,
            }),
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.grid_width * self.grid_height
    }

    /// Claim the next untaken tile, or `None` once the grid is exhausted.
    ///
    /// The lock is held only for the cursor walk, never while rendering.
    pub fn claim(&self) -> Option<Tile> {
        let mut state = self.state.lock().expect("tile grid lock poisoned");

        loop {
            self.advance(&mut state);

            let (x, y) = (state.cursor_x, state.cursor_y);
            if y < 0 {
                return None;
            }

            let index = (y as u32 * self.grid_width + x as u32) as usize;
            if !state.taken[index] {
                state.taken[index] = true;
                return Some(self.tile_at(x as u32, y as u32));
            }
        }
    }

    /// Move the snake cursor one step: alternate rows run in opposite
    /// directions, bottom row upward.
    fn advance(&self, state: &mut GridState) {
        state.cursor_x += if state.leftward { -1 } else { 1 };

        if state.cursor_x == self.grid_width as i64 || state.cursor_x == -1 {
            state.cursor_y -= 1;
            state.leftward = !state.leftward;
            state.cursor_x = if state.leftward {
                self.grid_width as i64 - 1
            } else {
                0
            };
        }
    }

    /// The pixel rectangle of grid cell (x, y), clipped to the image.
    fn tile_at(&self, grid_x: u32, grid_y: u32) -> Tile {
        let x = grid_x * self.tile_size;
        let y = grid_y * self.tile_size;
        Tile {
            x,
            y,
            width: self.tile_size.min(self.image_width - x),
            height: self.tile_size.min(self.image_height - y),
        }
    }
}

/// Render the scene into `film` with a fixed pool of worker threads.
///
/// Each worker owns an entropy-seeded generator, repeatedly claims a tile,
/// renders every sample of every pixel in it, and exits once no tiles
/// remain; the shared completion counter reaching the thread count is the
/// only termination signal. The film may be snapshotted concurrently from
/// another thread for live display.
pub fn render_parallel(
    world: &dyn Hittable,
    camera: &Camera,
    config: &RenderConfig,
    film: &Film,
) {
    assert_eq!(
        (camera.image_width, camera.image_height),
        (film.width(), film.height()),
        "film and camera resolutions differ"
    );

    let scheduler = TileScheduler::new(film.width(), film.height(), DEFAULT_TILE_SIZE);
    let thread_count = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let done_count = AtomicUsize::new(0);

    log::info!(
        "rendering {}x{} at {} spp on {} threads ({} tiles)",
        film.width(),
        film.height(),
        config.samples_per_pixel,
        thread_count,
        scheduler.tile_count()
    );
    let started = Instant::now();

    let scheduler = &scheduler;
    let done_count = &done_count;
    thread::scope(|scope| {
        for worker_id in 0..thread_count {
            scope.spawn(move || {
                let mut rng = SmallRng::from_entropy();

                while let Some(tile) = scheduler.claim() {
                    render_tile(world, camera, config, film, tile, &mut rng);
                }

                done_count.fetch_add(1, Ordering::SeqCst);
                log::debug!("worker {worker_id} finished");
            });
        }
    });

    debug_assert_eq!(done_count.load(Ordering::SeqCst), thread_count);
    log::info!("render finished in {:.2?}", started.elapsed());
}

/// Render all samples of all pixels in `tile` into the film.
fn render_tile(
    world: &dyn Hittable,
    camera: &Camera,
    config: &RenderConfig,
    film: &Film,
    tile: Tile,
    rng: &mut SmallRng,
) {
    for _ in 0..config.samples_per_pixel {
        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                let ray = camera.get_ray(x, y, rng);
                let color = ray_color(&ray, world, config, rng);
                // This worker holds the tile containing (x, y) exclusively.
                unsafe {
                    film.add_sample(x, y, color);
                }
            }
        }
    }
}
