use crate::bounds::Bounds;
use crate::tuple::Tuple;

/// Precomputed data for a flat triangle.
///
/// Edges and the face normal are derived once at construction, since every
/// ray test needs them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple,
    pub p2: Tuple,
    pub p3: Tuple,

    /// `p2 - p1`
    pub e1: Tuple,
    /// `p3 - p1`
    pub e2: Tuple,

    pub normal: Tuple,
}

impl TriangleInfo {
    pub fn new(p1: Tuple, p2: Tuple, p3: Tuple) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }

    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::empty();
        b.add_point(self.p1);
        b.add_point(self.p2);
        b.add_point(self.p3);

        b
    }

    /// Möller-Trumbore test. Returns `(t, u, v)` where `u` and `v` are the
    /// barycentric weights of `p2` and `p3`.
    pub fn intersect(&self, origin: Tuple, direction: Tuple, epsilon: f64)
        -> Option<(f64, f64, f64)> {
        let dir_cross_e2 = direction.cross(&self.e2);
        let det = self.e1.dot(&dir_cross_e2);
        if det.abs() < epsilon {
            return None;
        }

        let f = 1.0 / det;
        let p1_to_origin = origin - self.p1;
        let u = f * p1_to_origin.dot(&dir_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let origin_cross_e1 = p1_to_origin.cross(&self.e1);
        let v = f * direction.dot(&origin_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some((f * self.e2.dot(&origin_cross_e1), u, v))
    }
}

/// A triangle with per-vertex normals, interpolated across the face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothTriangleInfo {
    pub triangle: TriangleInfo,
    pub n1: Tuple,
    pub n2: Tuple,
    pub n3: Tuple,
}

impl SmoothTriangleInfo {
    pub fn new(p1: Tuple, p2: Tuple, p3: Tuple, n1: Tuple, n2: Tuple, n3: Tuple)
        -> SmoothTriangleInfo {
        SmoothTriangleInfo {
            triangle: TriangleInfo::new(p1, p2, p3),
            n1,
            n2,
            n3,
        }
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Tuple {
        self.n2 * u + self.n3 * v + self.n1 * (1.0 - u - v)
    }
}

#[test]
fn triangle_precomputes_edges_and_normal() {
    let t = TriangleInfo::new(
        Tuple::point(0.0, 1.0, 0.0),
        Tuple::point(-1.0, 0.0, 0.0),
        Tuple::point(1.0, 0.0, 0.0),
    );

    assert_eq!(t.e1, Tuple::vector(-1.0, -1.0, 0.0));
    assert_eq!(t.e2, Tuple::vector(1.0, -1.0, 0.0));
    assert_eq!(t.normal, Tuple::vector(0.0, 0.0, -1.0));
    assert_eq!(t.bounds().min, Tuple::point(-1.0, 0.0, 0.0));
    assert_eq!(t.bounds().max, Tuple::point(1.0, 1.0, 0.0));
}

#[test]
fn smooth_normal_interpolates() {
    let st = SmoothTriangleInfo::new(
        Tuple::point(0.0, 1.0, 0.0),
        Tuple::point(-1.0, 0.0, 0.0),
        Tuple::point(1.0, 0.0, 0.0),
        Tuple::vector(0.0, 1.0, 0.0),
        Tuple::vector(-1.0, 0.0, 0.0),
        Tuple::vector(1.0, 0.0, 0.0),
    );

    assert_eq!(st.normal_at(0.45, 0.25), Tuple::vector(-0.2, 0.3, 0.0));
}
