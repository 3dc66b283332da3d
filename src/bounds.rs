use crate::consts::EPSILON;
use crate::matrix::Matrix;
use crate::ray::Ray;
use crate::tuple::Tuple;

/// An axis-aligned bounding box.
///
/// An empty box has `min = +inf` and `max = -inf` on every axis, so adding a
/// point or merging another box always works without special cases.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Tuple,
    pub max: Tuple,
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::empty()
    }
}

impl Bounds {
    pub fn empty() -> Bounds {
        Bounds {
            min: Tuple::point(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Tuple::point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn new(min: Tuple, max: Tuple) -> Bounds {
        Bounds { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn add_point(&mut self, p: Tuple) {
        self.min = Tuple::point(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Tuple::point(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn merge(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }

        self.add_point(other.min);
        self.add_point(other.max);
    }

    pub fn contains_point(&self, p: Tuple) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    pub fn contains_box(&self, other: &Bounds) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// The eight distinct corners of the box.
    pub fn corners(&self) -> [Tuple; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Tuple::point(lo.x, lo.y, lo.z),
            Tuple::point(lo.x, lo.y, hi.z),
            Tuple::point(lo.x, hi.y, lo.z),
            Tuple::point(lo.x, hi.y, hi.z),
            Tuple::point(hi.x, lo.y, lo.z),
            Tuple::point(hi.x, lo.y, hi.z),
            Tuple::point(hi.x, hi.y, lo.z),
            Tuple::point(hi.x, hi.y, hi.z),
        ]
    }

    /// Transforms the box by `m` and returns the box enclosing the result.
    ///
    /// Infinite extents survive the transform: a zero matrix entry times an
    /// infinite coordinate contributes nothing instead of NaN.
    pub fn transform(&self, m: &Matrix) -> Bounds {
        if self.is_empty() {
            return *self;
        }

        let mut out = Bounds::empty();
        for c in self.corners().iter() {
            out.add_point(transform_point(m, c));
        }

        out
    }

    /// Slab test against the box. Rays parallel to an axis get infinite
    /// slab distances rather than dividing by zero.
    pub fn intersects(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }

        let (tmin, tmax) = (0..3).fold((f64::NEG_INFINITY, f64::INFINITY), |(lo, hi), i| {
            let (t0, t1) = check_axis(
                ray.origin.axis(i),
                ray.direction.axis(i),
                self.min.axis(i),
                self.max.axis(i),
            );
            (lo.max(t0), hi.min(t1))
        });

        tmin <= tmax
    }

    /// Splits the box in half across its longest axis (x wins ties, then y).
    ///
    /// Returns `None` when that axis is unbounded, since halving it would not
    /// give two finite halves.
    pub fn split(&self) -> Option<(Bounds, Bounds)> {
        let dx = self.max.x - self.min.x;
        let dy = self.max.y - self.min.y;
        let dz = self.max.z - self.min.z;
        let greatest = dx.max(dy).max(dz);

        if !greatest.is_finite() {
            return None;
        }

        let (mut x0, mut y0, mut z0) = (self.min.x, self.min.y, self.min.z);
        let (mut x1, mut y1, mut z1) = (self.max.x, self.max.y, self.max.z);

        if greatest == dx {
            x0 += dx / 2.0;
            x1 = x0;
        } else if greatest == dy {
            y0 += dy / 2.0;
            y1 = y0;
        } else {
            z0 += dz / 2.0;
            z1 = z0;
        }

        let left = Bounds::new(self.min, Tuple::point(x1, y1, z1));
        let right = Bounds::new(Tuple::point(x0, y0, z0), self.max);

        Some((left, right))
    }
}

/// Slab entry/exit distances along one axis.
pub(crate) fn check_axis(origin: f64, direction: f64, min: f64, max: f64) -> (f64, f64) {
    let tmin_numerator = min - origin;
    let tmax_numerator = max - origin;

    let (tmin, tmax) = if direction.abs() >= EPSILON {
        (tmin_numerator / direction, tmax_numerator / direction)
    } else {
        (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
    };

    if tmin > tmax { (tmax, tmin) } else { (tmin, tmax) }
}

/// Matrix-point product that treats `0 * inf` as zero.
fn transform_point(m: &Matrix, p: &Tuple) -> Tuple {
    let term = |a: f64, b: f64| if a == 0.0 { 0.0 } else { a * b };
    let row = |r: usize| {
        term(m[(r, 0)], p.x) + term(m[(r, 1)], p.y) + term(m[(r, 2)], p.z) + m[(r, 3)]
    };

    Tuple::point(row(0), row(1), row(2))
}

#[test]
fn adding_points_grows_box() {
    let mut b = Bounds::empty();
    assert!(b.is_empty());

    b.add_point(Tuple::point(-5.0, 2.0, 0.0));
    b.add_point(Tuple::point(7.0, 0.0, -3.0));

    assert_eq!(b.min, Tuple::point(-5.0, 0.0, -3.0));
    assert_eq!(b.max, Tuple::point(7.0, 2.0, 0.0));
}

#[test]
fn merging_boxes() {
    let mut b1 = Bounds::new(Tuple::point(-5.0, -2.0, 0.0), Tuple::point(7.0, 4.0, 4.0));
    let b2 = Bounds::new(Tuple::point(8.0, -7.0, -2.0), Tuple::point(14.0, 2.0, 8.0));
    b1.merge(&b2);
    b1.merge(&Bounds::empty());

    assert_eq!(b1.min, Tuple::point(-5.0, -7.0, -2.0));
    assert_eq!(b1.max, Tuple::point(14.0, 4.0, 8.0));
}

#[test]
fn containment() {
    let b = Bounds::new(Tuple::point(5.0, -2.0, 0.0), Tuple::point(11.0, 4.0, 7.0));

    assert!(b.contains_point(Tuple::point(5.0, -2.0, 0.0)));
    assert!(b.contains_point(Tuple::point(8.0, 1.0, 3.0)));
    assert!(!b.contains_point(Tuple::point(3.0, 0.0, 3.0)));
    assert!(!b.contains_point(Tuple::point(8.0, 1.0, 8.0)));

    assert!(b.contains_box(&Bounds::new(Tuple::point(6.0, -1.0, 1.0), Tuple::point(10.0, 3.0, 6.0))));
    assert!(!b.contains_box(&Bounds::new(Tuple::point(4.0, -3.0, -1.0), Tuple::point(10.0, 3.0, 6.0))));
}

#[test]
fn transforming_box() {
    use std::f64::consts::PI;

    let b = Bounds::new(Tuple::point(-1.0, -1.0, -1.0), Tuple::point(1.0, 1.0, 1.0));
    let m = Matrix::rotation_x(PI / 4.0) * Matrix::rotation_y(PI / 4.0);
    let t = b.transform(&m);

    assert_eq!(t.min, Tuple::point(-1.41421, -1.70711, -1.70711));
    assert_eq!(t.max, Tuple::point(1.41421, 1.70711, 1.70711));
}

#[test]
fn transforming_infinite_box_avoids_nan() {
    let plane = Bounds::new(
        Tuple::point(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY),
        Tuple::point(f64::INFINITY, 0.0, f64::INFINITY),
    );
    let t = plane.transform(&Matrix::translation(0.0, 2.0, 0.0));

    assert_eq!(t.min.y, 2.0);
    assert_eq!(t.max.y, 2.0);
    assert_eq!(t.min.x, f64::NEG_INFINITY);
    assert_eq!(t.max.z, f64::INFINITY);
}

#[test]
fn ray_against_box() {
    let b = Bounds::new(Tuple::point(5.0, -2.0, 0.0), Tuple::point(11.0, 4.0, 7.0));
    let cases = [
        (Tuple::point(15.0, 1.0, 2.0), Tuple::vector(-1.0, 0.0, 0.0), true),
        (Tuple::point(-5.0, -1.0, 4.0), Tuple::vector(1.0, 0.0, 0.0), true),
        (Tuple::point(7.0, 6.0, 5.0), Tuple::vector(0.0, -1.0, 0.0), true),
        (Tuple::point(8.0, 2.0, 12.0), Tuple::vector(0.0, 0.0, -1.0), true),
        (Tuple::point(8.0, 1.0, 3.5), Tuple::vector(0.0, 0.0, 1.0), true),
        (Tuple::point(9.0, -1.0, -8.0), Tuple::vector(2.0, 4.0, 6.0), false),
        (Tuple::point(8.0, 3.0, -4.0), Tuple::vector(6.0, 2.0, 4.0), false),
        (Tuple::point(9.0, -1.0, -2.0), Tuple::vector(4.0, 6.0, 2.0), false),
        (Tuple::point(4.0, 0.0, 9.0), Tuple::vector(0.0, 0.0, -1.0), false),
        (Tuple::point(12.0, 5.0, 4.0), Tuple::vector(-1.0, 0.0, 0.0), false),
    ];

    for (origin, direction, expected) in cases.iter() {
        let r = Ray::new(*origin, direction.normalize());
        assert_eq!(b.intersects(&r), *expected, "{:?} {:?}", origin, direction);
    }
}

#[test]
fn splitting_along_longest_axis() {
    let b = Bounds::new(Tuple::point(-1.0, -4.0, -5.0), Tuple::point(9.0, 6.0, 5.0));
    let (left, right) = b.split().unwrap();

    assert_eq!(left.min, Tuple::point(-1.0, -4.0, -5.0));
    assert_eq!(left.max, Tuple::point(4.0, 6.0, 5.0));
    assert_eq!(right.min, Tuple::point(4.0, -4.0, -5.0));
    assert_eq!(right.max, Tuple::point(9.0, 6.0, 5.0));

    let tall = Bounds::new(Tuple::point(-1.0, -2.0, -3.0), Tuple::point(5.0, 8.0, 3.0));
    let (left, right) = tall.split().unwrap();
    assert_eq!(left.max, Tuple::point(5.0, 3.0, 3.0));
    assert_eq!(right.min, Tuple::point(-1.0, 3.0, -3.0));
}

#[test]
fn infinite_box_does_not_split() {
    let b = Bounds::new(
        Tuple::point(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY),
        Tuple::point(f64::INFINITY, 0.0, f64::INFINITY),
    );

    assert!(b.split().is_none());
}
