use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::feq;

/// A homogeneous 4D tuple.
///
/// Points carry `w == 1.0` and vectors carry `w == 0.0`. Arithmetic keeps the
/// `w` component consistent: subtracting two points gives a vector, adding a
/// vector to a point gives a point.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Tuples are compared component-wise within `EPSILON`.
impl PartialEq for Tuple {
    fn eq(&self, other: &Tuple) -> bool {
        feq(self.x, other.x)
            && feq(self.y, other.y)
            && feq(self.z, other.z)
            && feq(self.w, other.w)
    }
}

impl Tuple {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Tuple {
        Tuple { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple {
        Tuple { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple {
        Tuple { x, y, z, w: 0.0 }
    }

    /// The object-space origin, `point(0, 0, 0)`.
    pub fn origin() -> Tuple {
        Tuple::point(0.0, 0.0, 0.0)
    }

    pub fn is_point(&self) -> bool {
        self.w == 1.0
    }

    pub fn is_vector(&self) -> bool {
        self.w == 0.0
    }

    /// Returns this tuple with `w` forced to zero.
    pub fn as_vector(&self) -> Tuple {
        Tuple { w: 0.0, ..*self }
    }

    /// Length of the tuple, taken over all four components.
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Tuple {
        *self / self.magnitude()
    }

    pub fn dot(&self, other: &Tuple) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Cross product of the XYZ parts. The result is always a vector.
    pub fn cross(&self, other: &Tuple) -> Tuple {
        Tuple::vector(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Reflects a vector across a normal: `v - 2 (v . n) n`.
    pub fn reflect(&self, normal: &Tuple) -> Tuple {
        *self - *normal * 2.0 * self.dot(normal)
    }

    /// Component `i` of the XYZ part (0 = x, 1 = y, 2 = z).
    pub fn axis(&self, i: usize) -> f64 {
        match i {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Add for Tuple {
    type Output = Tuple;

    fn add(self, other: Tuple) -> Tuple {
        Tuple::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Tuple {
    type Output = Tuple;

    fn sub(self, other: Tuple) -> Tuple {
        Tuple::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Neg for Tuple {
    type Output = Tuple;

    fn neg(self) -> Tuple {
        Tuple::new(-self.x, -self.y, -self.z, -self.w)
    }
}

/// Scalar right-multiplication.
///
/// ```
/// use whitted::tuple::Tuple;
///
/// let t = Tuple::new(1.0, -2.0, 3.0, -4.0);
/// assert_eq!(t * 0.5, Tuple::new(0.5, -1.0, 1.5, -2.0));
/// ```
impl Mul<f64> for Tuple {
    type Output = Tuple;

    fn mul(self, s: f64) -> Tuple {
        Tuple::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Mul<Tuple> for f64 {
    type Output = Tuple;

    fn mul(self, t: Tuple) -> Tuple {
        t * self
    }
}

impl Div<f64> for Tuple {
    type Output = Tuple;

    fn div(self, s: f64) -> Tuple {
        Tuple::new(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

#[test]
fn point_and_vector_carry_w() {
    let p = Tuple::point(4.3, -4.2, 3.1);
    let v = Tuple::vector(4.3, -4.2, 3.1);

    assert!(p.is_point() && !p.is_vector());
    assert!(v.is_vector() && !v.is_point());
}

#[test]
fn adding_vector_to_point_gives_point() {
    let a1 = Tuple::new(3.0, -2.0, 5.0, 1.0);
    let a2 = Tuple::new(-2.0, 3.0, 1.0, 0.0);

    assert_eq!(a1 + a2, Tuple::point(1.0, 1.0, 6.0));
}

#[test]
fn subtracting_points_gives_vector() {
    let p1 = Tuple::point(3.0, 2.0, 1.0);
    let p2 = Tuple::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple::vector(-2.0, -4.0, -6.0));
}

#[test]
fn subtracting_vector_from_point() {
    let p = Tuple::point(3.0, 2.0, 1.0);
    let v = Tuple::vector(5.0, 6.0, 7.0);

    assert_eq!(p - v, Tuple::point(-2.0, -4.0, -6.0));
}

#[test]
fn negating_and_dividing() {
    let a = Tuple::new(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Tuple::new(-1.0, 2.0, -3.0, 4.0));
    assert_eq!(a / 2.0, Tuple::new(0.5, -1.0, 1.5, -2.0));
    assert_eq!(3.5 * a, Tuple::new(3.5, -7.0, 10.5, -14.0));
}

#[test]
fn magnitude_and_normalization() {
    let v = Tuple::vector(-1.0, -2.0, -3.0);
    assert_eq!(v.magnitude(), 14.0f64.sqrt());

    let n = Tuple::vector(1.0, 2.0, 3.0).normalize();
    assert_eq!(n, Tuple::vector(0.26726, 0.53452, 0.80178));
    assert!(crate::feq(n.magnitude(), 1.0));
}

#[test]
fn dot_and_cross() {
    let a = Tuple::vector(1.0, 2.0, 3.0);
    let b = Tuple::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
    assert_eq!(a.cross(&b), Tuple::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflecting_off_slanted_surface() {
    let v = Tuple::vector(0.0, -1.0, 0.0);
    let n = Tuple::vector(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple::vector(1.0, 0.0, 0.0));
}
