use rayon::ThreadPoolBuildError;

use crate::canvas::Canvas;
use crate::matrix::Matrix;
use crate::parallel;
use crate::ray::Ray;
use crate::tuple::Tuple;
use crate::world::World;

/// A pinhole camera producing one ray per canvas pixel.
///
/// The camera sits at the origin of its own space looking down `-z`, with the
/// canvas one unit in front of it. `transform` is usually a view transform
/// and maps world space into camera space.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    /// The angle describing "how much" the camera can see.
    pub field_of_view: f64,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    transform: Matrix,
    inverse: Matrix,
}

impl Camera {
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = hsize as f64 / vsize as f64;

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        Camera {
            hsize,
            vsize,
            field_of_view,
            half_width,
            half_height,
            pixel_size: half_width * 2.0 / hsize as f64,
            transform: Matrix::identity(),
            inverse: Matrix::identity(),
        }
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Matrix {
        &self.transform
    }

    /// Replaces the camera transform.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular, e.g. a view transform whose `up`
    /// is parallel to the line of sight.
    pub fn set_transform(&mut self, transform: Matrix) {
        let inverse = match transform.inverse() {
            Some(inverse) => inverse,
            None => panic!("camera transform is not invertible:\n{}", transform),
        };

        self.transform = transform;
        self.inverse = inverse;
    }

    pub fn with_transform(mut self, transform: Matrix) -> Camera {
        self.set_transform(transform);
        self
    }

    /// The world-space ray through the centre of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // Camera looks toward -z, so +x is to the left
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.inverse * Tuple::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple::origin();
        let direction = (pixel - origin).normalize();

        Ray::new(origin, direction)
    }

    /// Renders `world` on rayon's global pool, tracing reflections and
    /// refractions `depth` bounces deep.
    pub fn render(&self, world: &World, depth: usize) -> Canvas {
        parallel::render(self, world, depth)
    }

    /// Renders on a dedicated pool of `threads` workers.
    pub fn render_with_threads(&self, world: &World, depth: usize, threads: usize)
        -> Result<Canvas, ThreadPoolBuildError> {
        parallel::render_with_threads(self, world, depth, threads)
    }
}

#[test]
fn pixel_size_for_canvas_shapes() {
    use std::f64::consts::PI;

    assert!(crate::feq(Camera::new(200, 125, PI / 2.0).pixel_size(), 0.01));
    assert!(crate::feq(Camera::new(125, 200, PI / 2.0).pixel_size(), 0.01));
}

#[test]
fn ray_through_center_and_corner() {
    use std::f64::consts::PI;

    let c = Camera::new(201, 101, PI / 2.0);
    let r = c.ray_for_pixel(100, 50);
    assert_eq!(r.origin, Tuple::origin());
    assert_eq!(r.direction, Tuple::vector(0.0, 0.0, -1.0));

    let r = c.ray_for_pixel(0, 0);
    assert_eq!(r.origin, Tuple::origin());
    assert_eq!(r.direction, Tuple::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    use std::f64::consts::PI;

    let c = Camera::new(201, 101, PI / 2.0)
        .with_transform(Matrix::rotation_y(PI / 4.0) * Matrix::translation(0.0, -2.0, 5.0));
    let r = c.ray_for_pixel(100, 50);
    let h = 2f64.sqrt() / 2.0;

    assert_eq!(r.origin, Tuple::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction, Tuple::vector(h, 0.0, -h));
}

#[test]
#[should_panic]
fn degenerate_view_panics() {
    let from = Tuple::point(0.0, 0.0, -5.0);
    let view = Matrix::view_transform(from, Tuple::origin(), Tuple::vector(0.0, 0.0, 1.0));
    Camera::new(10, 10, 1.0).set_transform(view);
}

#[cfg(test)]
fn assert_center_pixel(image: &Canvas, x: usize, y: usize) {
    use crate::color::Color;

    let c = image.read_pixel(x, y).unwrap();
    let expected = Color::rgb(0.38066, 0.47583, 0.2855);
    assert!(
        (c.r - expected.r).abs() < 1e-4
            && (c.g - expected.g).abs() < 1e-4
            && (c.b - expected.b).abs() < 1e-4,
        "{:?}", c
    );
}

#[test]
fn render_default_world() {
    use std::f64::consts::PI;

    let w = World::default();
    let view = Matrix::view_transform(
        Tuple::point(0.0, 0.0, -5.0),
        Tuple::origin(),
        Tuple::vector(0.0, 1.0, 0.0),
    );

    let small = Camera::new(11, 11, PI / 2.0).with_transform(view);
    assert_center_pixel(&small.render(&w, 5), 5, 5);

    let wide = Camera::new(201, 101, PI / 2.0).with_transform(view);
    let image = wide.render(&w, 5);
    assert_eq!((image.width, image.height), (201, 101));
    assert_center_pixel(&image, 100, 50);
}
