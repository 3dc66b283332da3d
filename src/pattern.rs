use std::f64::consts::PI;
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::matrix::Matrix;
use crate::shape::Shape;
use crate::tuple::Tuple;

/// Projection from a 3D point to `(u, v)` texture coordinates in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UvMap {
    Spherical,
    Planar,
    Cylindrical,
}

/// A 2D texture sampled at `(u, v)`.
#[derive(Clone, Debug, PartialEq)]
pub enum UvTexture {
    /// `width` by `height` checkers across the unit square.
    Checkers { width: f64, height: f64, a: Color, b: Color },

    /// A solid color with a distinct square in each corner, for checking how
    /// a mapping is oriented.
    AlignCheck { main: Color, ul: Color, ur: Color, bl: Color, br: Color },

    /// An image, usually loaded from a PPM.
    Image(Arc<Canvas>),
}

/// One face of a cube map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Left,
    Front,
    Right,
    Back,
    Up,
    Down,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Solid(Color),

    /// Alternates along X: `floor(x)` even gives the first color.
    Stripe(Color, Color),

    /// Linear blend along X, repeating every unit.
    Gradient(Color, Color),

    /// Concentric rings around the Y axis.
    Ring(Color, Color),

    /// 3D checkers of unit size.
    Checker(Color, Color),

    Map(UvMap, UvTexture),

    /// One texture per face, ordered left, front, right, back, up, down.
    Cube(Box<[UvTexture; 6]>),

    /// Sum of the member patterns.
    Chain(Vec<Pattern>),
}

/// A color generator over pattern space.
///
/// Every pattern carries its own transform, which maps object space to
/// pattern space.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    kind: PatternKind,
    transform: Matrix,
    inverse: Matrix,
}

impl Pattern {
    fn new(kind: PatternKind) -> Pattern {
        Pattern {
            kind,
            transform: Matrix::identity(),
            inverse: Matrix::identity(),
        }
    }

    /// The same color everywhere.
    pub fn solid(c: Color) -> Pattern {
        Pattern::new(PatternKind::Solid(c))
    }

    /// Alternates `a` and `b` every unit along `x`.
    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Stripe(a, b))
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Gradient(a, b))
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Ring(a, b))
    }

    pub fn checker(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Checker(a, b))
    }

    pub fn uv(map: UvMap, texture: UvTexture) -> Pattern {
        Pattern::new(PatternKind::Map(map, texture))
    }

    /// A cube map; faces are ordered left, front, right, back, up, down.
    pub fn cube_map(faces: [UvTexture; 6]) -> Pattern {
        Pattern::new(PatternKind::Cube(Box::new(faces)))
    }

    pub fn chain(patterns: Vec<Pattern>) -> Pattern {
        Pattern::new(PatternKind::Chain(patterns))
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn transform(&self) -> &Matrix {
        &self.transform
    }

    /// Replaces the pattern transform.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular.
    pub fn set_transform(&mut self, transform: Matrix) {
        let inverse = match transform.inverse() {
            Some(inverse) => inverse,
            None => panic!("pattern transform is not invertible:\n{}", transform),
        };

        self.transform = transform;
        self.inverse = inverse;
    }

    pub fn with_transform(mut self, transform: Matrix) -> Pattern {
        self.set_transform(transform);
        self
    }

    /// Color at a point already in pattern space.
    pub fn pattern_at(&self, p: Tuple) -> Color {
        match self.kind {
            PatternKind::Solid(c) => c,
            PatternKind::Stripe(a, b) => {
                if p.x.floor().rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternKind::Gradient(a, b) => a + (b - a) * (p.x - p.x.floor()),
            PatternKind::Ring(a, b) => {
                let r = (p.x * p.x + p.z * p.z).sqrt();
                if r.floor().rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternKind::Checker(a, b) => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if sum.rem_euclid(2.0) == 0.0 { a } else { b }
            }
            PatternKind::Map(map, ref texture) => {
                let (u, v) = map.uv(p);
                texture.uv_at(u, v)
            }
            PatternKind::Cube(ref faces) => {
                let face = CubeFace::from_point(p);
                let (u, v) = face.uv(p);
                faces[face as usize].uv_at(u, v)
            }
            PatternKind::Chain(ref patterns) => patterns
                .iter()
                .fold(Color::black(), |acc, pat| acc + pat.pattern_at(pat.inverse * p)),
        }
    }

    /// Color of `shape` at a world-space point, going through the shape's
    /// ancestors and then the pattern transform.
    pub fn pattern_at_shape(&self, shape: &Shape, world_point: Tuple) -> Color {
        let object_point = shape.world_to_object(world_point);
        self.pattern_at(self.inverse * object_point)
    }
}

impl UvMap {
    pub fn uv(&self, p: Tuple) -> (f64, f64) {
        match self {
            UvMap::Spherical => {
                let radius = Tuple::vector(p.x, p.y, p.z).magnitude();
                let phi = (p.y / radius).acos();
                (azimuth_u(p), 1.0 - phi / PI)
            }
            UvMap::Planar => (p.x.rem_euclid(1.0), p.z.rem_euclid(1.0)),
            UvMap::Cylindrical => (azimuth_u(p), p.y.rem_euclid(1.0)),
        }
    }
}

/// Fraction of a turn around the Y axis, increasing counter-clockwise when
/// seen from above and starting at `-z`.
fn azimuth_u(p: Tuple) -> f64 {
    let theta = p.x.atan2(p.z);
    let raw_u = theta / (2.0 * PI);

    1.0 - (raw_u + 0.5)
}

impl UvTexture {
    /// Color at texture coordinates `(u, v)`, both in `[0, 1]` with `v`
    /// running upward. Images are sampled at the nearest pixel, with row zero
    /// at the top.
    pub fn uv_at(&self, u: f64, v: f64) -> Color {
        match self {
            UvTexture::Checkers { width, height, a, b } => {
                let sum = (u * width).floor() + (v * height).floor();
                if sum.rem_euclid(2.0) == 0.0 { *a } else { *b }
            }
            UvTexture::AlignCheck { main, ul, ur, bl, br } => {
                if v > 0.8 {
                    if u < 0.2 {
                        return *ul;
                    }
                    if u > 0.8 {
                        return *ur;
                    }
                } else if v < 0.2 {
                    if u < 0.2 {
                        return *bl;
                    }
                    if u > 0.8 {
                        return *br;
                    }
                }

                *main
            }
            UvTexture::Image(canvas) => {
                // v runs bottom to top, image rows top to bottom
                let x = u * (canvas.width.saturating_sub(1)) as f64;
                let y = (1.0 - v) * (canvas.height.saturating_sub(1)) as f64;

                canvas
                    .read_pixel(x.round() as usize, y.round() as usize)
                    .unwrap_or_else(Color::black)
            }
        }
    }
}

impl CubeFace {
    /// The face a point on the unit cube lies on, by its largest component.
    pub fn from_point(p: Tuple) -> CubeFace {
        let coord = p.x.abs().max(p.y.abs()).max(p.z.abs());

        if coord == p.x {
            CubeFace::Right
        } else if coord == -p.x {
            CubeFace::Left
        } else if coord == p.y {
            CubeFace::Up
        } else if coord == -p.y {
            CubeFace::Down
        } else if coord == p.z {
            CubeFace::Front
        } else {
            CubeFace::Back
        }
    }

    pub fn uv(&self, p: Tuple) -> (f64, f64) {
        let wrap = |a: f64| a.rem_euclid(2.0) / 2.0;

        match self {
            CubeFace::Front => (wrap(p.x + 1.0), wrap(p.y + 1.0)),
            CubeFace::Back => (wrap(1.0 - p.x), wrap(p.y + 1.0)),
            CubeFace::Left => (wrap(p.z + 1.0), wrap(p.y + 1.0)),
            CubeFace::Right => (wrap(1.0 - p.z), wrap(p.y + 1.0)),
            CubeFace::Up => (wrap(p.x + 1.0), wrap(1.0 - p.z)),
            CubeFace::Down => (wrap(p.x + 1.0), wrap(p.z + 1.0)),
        }
    }
}

#[cfg(test)]
fn assert_uv(actual: (f64, f64), expected: (f64, f64)) {
    assert!(
        crate::feq(actual.0, expected.0) && crate::feq(actual.1, expected.1),
        "{:?} != {:?}", actual, expected
    );
}

#[test]
fn stripe_alternates_along_x_only() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for p in [Tuple::point(0.0, 1.0, 0.0), Tuple::point(0.0, 2.0, 0.0), Tuple::point(0.0, 0.0, 2.0)] {
        assert_eq!(pattern.pattern_at(p), Color::white());
    }

    assert_eq!(pattern.pattern_at(Tuple::point(0.9, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple::point(-0.1, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple::point(-1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple::point(-1.1, 0.0, 0.0)), Color::white());
}

#[test]
fn gradient_ring_and_checker() {
    let gradient = Pattern::gradient(Color::white(), Color::black());
    assert_eq!(gradient.pattern_at(Tuple::point(0.25, 0.0, 0.0)), Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(gradient.pattern_at(Tuple::point(0.75, 0.0, 0.0)), Color::rgb(0.25, 0.25, 0.25));

    let ring = Pattern::ring(Color::white(), Color::black());
    assert_eq!(ring.pattern_at(Tuple::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(ring.pattern_at(Tuple::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(ring.pattern_at(Tuple::point(0.0, 0.0, 1.0)), Color::black());
    assert_eq!(ring.pattern_at(Tuple::point(0.708, 0.0, 0.708)), Color::black());

    let checker = Pattern::checker(Color::white(), Color::black());
    assert_eq!(checker.pattern_at(Tuple::point(0.99, 0.0, 0.0)), Color::white());
    assert_eq!(checker.pattern_at(Tuple::point(1.01, 0.0, 0.0)), Color::black());
    assert_eq!(checker.pattern_at(Tuple::point(0.0, 0.99, 0.0)), Color::white());
    assert_eq!(checker.pattern_at(Tuple::point(0.0, 1.01, 0.0)), Color::black());
    assert_eq!(checker.pattern_at(Tuple::point(0.0, 0.0, 1.01)), Color::black());
}

#[test]
fn pattern_follows_shape_and_pattern_transforms() {
    let mut shape = Shape::sphere();
    shape.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    let plain = Pattern::stripe(Color::white(), Color::black());
    assert_eq!(plain.pattern_at_shape(&shape, Tuple::point(1.5, 0.0, 0.0)), Color::white());

    let scaled = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix::scaling(2.0, 2.0, 2.0));
    assert_eq!(scaled.pattern_at_shape(&Shape::sphere(), Tuple::point(1.5, 0.0, 0.0)), Color::white());

    let moved = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix::translation(0.5, 0.0, 0.0));
    assert_eq!(moved.pattern_at_shape(&shape, Tuple::point(2.5, 0.0, 0.0)), Color::white());
}

#[test]
fn pattern_sees_through_groups() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(5.0, 0.0, 0.0));
    let mut g = Shape::group();
    g.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    g.add_child(s);

    let pattern = Pattern::gradient(Color::black(), Color::white());
    let c = pattern.pattern_at_shape(&g.children()[0], Tuple::point(10.5, 0.0, 0.0));
    assert_eq!(c, Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn chain_sums_members_in_their_own_space() {
    let chain = Pattern::chain(vec![
        Pattern::solid(Color::rgb(0.2, 0.0, 0.0)),
        Pattern::stripe(Color::rgb(0.0, 0.5, 0.0), Color::rgb(0.0, 0.0, 0.5))
            .with_transform(Matrix::translation(1.0, 0.0, 0.0)),
    ]);

    assert_eq!(chain.pattern_at(Tuple::point(0.5, 0.0, 0.0)), Color::rgb(0.2, 0.0, 0.5));
    assert_eq!(chain.pattern_at(Tuple::point(1.5, 0.0, 0.0)), Color::rgb(0.2, 0.5, 0.0));
}

#[test]
fn uv_checkers() {
    let t = UvTexture::Checkers { width: 2.0, height: 2.0, a: Color::black(), b: Color::white() };

    assert_eq!(t.uv_at(0.0, 0.0), Color::black());
    assert_eq!(t.uv_at(0.5, 0.0), Color::white());
    assert_eq!(t.uv_at(0.0, 0.5), Color::white());
    assert_eq!(t.uv_at(0.5, 0.5), Color::black());
    assert_eq!(t.uv_at(1.0, 1.0), Color::black());
}

#[test]
fn spherical_mapping() {
    let h = 2f64.sqrt() / 2.0;
    let cases = [
        (Tuple::point(0.0, 0.0, -1.0), (0.0, 0.5)),
        (Tuple::point(1.0, 0.0, 0.0), (0.25, 0.5)),
        (Tuple::point(0.0, 0.0, 1.0), (0.5, 0.5)),
        (Tuple::point(-1.0, 0.0, 0.0), (0.75, 0.5)),
        (Tuple::point(0.0, 1.0, 0.0), (0.5, 1.0)),
        (Tuple::point(0.0, -1.0, 0.0), (0.5, 0.0)),
        (Tuple::point(h, h, 0.0), (0.25, 0.75)),
    ];

    for (p, uv) in cases.iter() {
        assert_uv(UvMap::Spherical.uv(*p), *uv);
    }
}

#[test]
fn planar_mapping_wraps_positive() {
    let cases = [
        (Tuple::point(0.25, 0.0, 0.5), (0.25, 0.5)),
        (Tuple::point(0.25, 0.0, -0.25), (0.25, 0.75)),
        (Tuple::point(0.25, 0.5, -0.25), (0.25, 0.75)),
        (Tuple::point(1.25, 0.0, 0.5), (0.25, 0.5)),
        (Tuple::point(0.25, 0.0, -1.75), (0.25, 0.25)),
        (Tuple::point(1.0, 0.0, -1.0), (0.0, 0.0)),
        (Tuple::point(0.0, 0.0, 0.0), (0.0, 0.0)),
    ];

    for (p, uv) in cases.iter() {
        assert_uv(UvMap::Planar.uv(*p), *uv);
    }
}

#[test]
fn cylindrical_mapping() {
    let cases = [
        (Tuple::point(0.0, 0.0, -1.0), (0.0, 0.0)),
        (Tuple::point(0.0, 0.5, -1.0), (0.0, 0.5)),
        (Tuple::point(0.0, 1.0, -1.0), (0.0, 0.0)),
        (Tuple::point(0.70711, 0.5, -0.70711), (0.125, 0.5)),
        (Tuple::point(1.0, -0.25, 0.0), (0.25, 0.75)),
        (Tuple::point(0.70711, 0.1, 0.70711), (0.375, 0.1)),
        (Tuple::point(0.0, 0.2, 1.0), (0.5, 0.2)),
        (Tuple::point(-0.70711, 0.3, 0.70711), (0.625, 0.3)),
        (Tuple::point(-1.0, 0.4, 0.0), (0.75, 0.4)),
        (Tuple::point(-0.70711, 0.5, -0.70711), (0.875, 0.5)),
    ];

    for (p, uv) in cases.iter() {
        assert_uv(UvMap::Cylindrical.uv(*p), *uv);
    }
}

#[test]
fn align_check_corners() {
    let t = UvTexture::AlignCheck {
        main: Color::white(),
        ul: Color::red(),
        ur: Color::rgb(1.0, 1.0, 0.0),
        bl: Color::green(),
        br: Color::rgb(0.0, 1.0, 1.0),
    };

    assert_eq!(t.uv_at(0.5, 0.5), Color::white());
    assert_eq!(t.uv_at(0.1, 0.9), Color::red());
    assert_eq!(t.uv_at(0.9, 0.9), Color::rgb(1.0, 1.0, 0.0));
    assert_eq!(t.uv_at(0.1, 0.1), Color::green());
    assert_eq!(t.uv_at(0.9, 0.1), Color::rgb(0.0, 1.0, 1.0));
}

#[test]
fn cube_faces_from_points() {
    let cases = [
        (Tuple::point(-1.0, 0.5, -0.25), CubeFace::Left),
        (Tuple::point(1.1, -0.75, 0.8), CubeFace::Right),
        (Tuple::point(0.1, 0.6, 0.9), CubeFace::Front),
        (Tuple::point(-0.7, 0.0, -2.0), CubeFace::Back),
        (Tuple::point(0.5, 1.0, 0.9), CubeFace::Up),
        (Tuple::point(-0.2, -1.3, 1.1), CubeFace::Down),
    ];

    for (p, face) in cases.iter() {
        assert_eq!(CubeFace::from_point(*p), *face);
    }
}

#[test]
fn cube_face_uv() {
    let cases = [
        (CubeFace::Front, Tuple::point(-0.5, 0.5, 1.0), (0.25, 0.75)),
        (CubeFace::Front, Tuple::point(0.5, -0.5, 1.0), (0.75, 0.25)),
        (CubeFace::Back, Tuple::point(0.5, 0.5, -1.0), (0.25, 0.75)),
        (CubeFace::Back, Tuple::point(-0.5, -0.5, -1.0), (0.75, 0.25)),
        (CubeFace::Left, Tuple::point(-1.0, 0.5, -0.5), (0.25, 0.75)),
        (CubeFace::Left, Tuple::point(-1.0, -0.5, 0.5), (0.75, 0.25)),
        (CubeFace::Right, Tuple::point(1.0, 0.5, 0.5), (0.25, 0.75)),
        (CubeFace::Right, Tuple::point(1.0, -0.5, -0.5), (0.75, 0.25)),
        (CubeFace::Up, Tuple::point(-0.5, 1.0, -0.5), (0.25, 0.75)),
        (CubeFace::Up, Tuple::point(0.5, 1.0, 0.5), (0.75, 0.25)),
        (CubeFace::Down, Tuple::point(-0.5, -1.0, 0.5), (0.25, 0.75)),
        (CubeFace::Down, Tuple::point(0.5, -1.0, -0.5), (0.75, 0.25)),
    ];

    for (face, p, uv) in cases.iter() {
        assert_uv(face.uv(*p), *uv);
    }
}

#[test]
fn cube_map_picks_face_texture() {
    let face = |c: Color| UvTexture::AlignCheck { main: c, ul: c, ur: c, bl: c, br: c };
    let pattern = Pattern::cube_map([
        face(Color::red()),
        face(Color::green()),
        face(Color::blue()),
        face(Color::white()),
        face(Color::rgb(1.0, 1.0, 0.0)),
        face(Color::black()),
    ]);

    assert_eq!(pattern.pattern_at(Tuple::point(-1.0, 0.0, 0.0)), Color::red());
    assert_eq!(pattern.pattern_at(Tuple::point(0.0, 0.0, 1.0)), Color::green());
    assert_eq!(pattern.pattern_at(Tuple::point(1.0, 0.0, 0.0)), Color::blue());
    assert_eq!(pattern.pattern_at(Tuple::point(0.0, 0.0, -1.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple::point(0.0, 1.0, 0.0)), Color::rgb(1.0, 1.0, 0.0));
    assert_eq!(pattern.pattern_at(Tuple::point(0.0, -1.0, 0.0)), Color::black());
}

#[test]
fn image_texture_samples_canvas() {
    let mut canvas = Canvas::new(10, 10);
    for y in 0..10 {
        for x in 0..10 {
            canvas.write_pixel(x, y, &Color::rgb(x as f64 / 10.0, y as f64 / 10.0, 0.0));
        }
    }
    let t = UvTexture::Image(Arc::new(canvas));

    assert_eq!(t.uv_at(0.0, 0.0), Color::rgb(0.0, 0.9, 0.0));
    assert_eq!(t.uv_at(0.3, 0.0), Color::rgb(0.3, 0.9, 0.0));
    assert_eq!(t.uv_at(0.6, 0.3), Color::rgb(0.5, 0.6, 0.0));
    assert_eq!(t.uv_at(1.0, 1.0), Color::rgb(0.9, 0.0, 0.0));
}
