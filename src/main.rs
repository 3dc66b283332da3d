use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ Context, Result };
use clap::Parser;

use whitted::camera::Camera;
use whitted::consts::DEFAULT_OUTPUT;
use whitted::scene::Scene;

/// Renders a JSON scene description to a PPM image.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Scene description to render
    #[clap(value_parser)]
    scene: PathBuf,

    /// Where to write the PPM image
    #[clap(short, long, value_parser, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Override the camera's horizontal size in pixels
    #[clap(long, value_parser)]
    width: Option<usize>,

    /// Override the camera's vertical size in pixels
    #[clap(long, value_parser)]
    height: Option<usize>,

    /// Maximum reflection/refraction bounces
    #[clap(short, long, value_parser)]
    depth: Option<usize>,

    /// Render worker count; rayon picks when omitted
    #[clap(short, long, value_parser)]
    threads: Option<usize>,

    /// Bounding volume subdivision threshold
    #[clap(long, value_parser)]
    divide: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let mut scene = Scene::load(&args.scene)
        .with_context(|| format!("failed to load scene {:?}", args.scene))?;

    if args.width.is_some() || args.height.is_some() {
        let old = &scene.camera;
        scene.camera = Camera::new(
            args.width.unwrap_or(old.hsize),
            args.height.unwrap_or(old.vsize),
            old.field_of_view,
        ).with_transform(*old.transform());
    }

    scene.world.divide(args.divide.unwrap_or(scene.divide_threshold));
    log::info!("scene ready in {:.2?}", start.elapsed());

    let depth = args.depth.unwrap_or(scene.max_depth);
    let image = match args.threads {
        Some(threads) => scene.camera
            .render_with_threads(&scene.world, depth, threads)
            .context("failed to build render thread pool")?,
        None => scene.camera.render(&scene.world, depth),
    };

    image.save(&args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    log::info!("wrote {:?}, total {:.2?}", args.output, start.elapsed());

    Ok(())
}
