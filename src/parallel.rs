//! Scanline-parallel rendering.
//!
//! The canvas buffer is split into one slice per row and rows are traced
//! independently. The world and camera are only read, so they are shared by
//! reference across workers.

use std::time::Instant;

use rayon::prelude::*;
use rayon::{ ThreadPoolBuilder, ThreadPoolBuildError };

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::world::World;

/// Renders on rayon's global pool.
pub fn render(camera: &Camera, world: &World, depth: usize) -> Canvas {
    let start = Instant::now();
    let mut canvas = Canvas::new(camera.hsize, camera.vsize);

    render_rows(camera, world, depth, &mut canvas);

    log::info!(
        "rendered {}x{} on {} threads in {:.2?}",
        camera.hsize, camera.vsize, rayon::current_num_threads(), start.elapsed()
    );
    canvas
}

/// Renders on a dedicated pool of `threads` workers. Zero lets rayon pick.
pub fn render_with_threads(camera: &Camera, world: &World, depth: usize, threads: usize)
    -> Result<Canvas, ThreadPoolBuildError> {
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    log::debug!("built render pool with {} threads", pool.current_num_threads());

    Ok(pool.install(|| render(camera, world, depth)))
}

fn render_rows(camera: &Camera, world: &World, depth: usize, canvas: &mut Canvas) {
    let width = canvas.width;
    if width == 0 {
        return;
    }

    canvas
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let ray = camera.ray_for_pixel(x, y);
                *pixel = world.color_at(&ray, depth);
            }
        });
}

#[test]
fn thread_count_does_not_change_image() {
    use crate::matrix::Matrix;
    use crate::tuple::Tuple;

    let w = World::default();
    let camera = Camera::new(24, 16, std::f64::consts::PI / 2.0).with_transform(
        Matrix::view_transform(
            Tuple::point(0.0, 1.0, -5.0),
            Tuple::origin(),
            Tuple::vector(0.0, 1.0, 0.0),
        ),
    );

    let single = render_with_threads(&camera, &w, 5, 1).unwrap();
    let many = render_with_threads(&camera, &w, 5, 4).unwrap();
    assert_eq!(single, many);
    assert_eq!(single, render(&camera, &w, 5));
}

#[test]
fn empty_canvas_renders() {
    let camera = Camera::new(0, 0, 1.0);
    let image = render(&camera, &World::default(), 5);

    assert_eq!((image.width, image.height), (0, 0));
}
