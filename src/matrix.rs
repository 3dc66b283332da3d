use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Matrix2 {
    data: [f64; 4],
}

impl Matrix2 {
    fn determinant(&self) -> f64 {
        self.data[0] * self.data[3] - self.data[1] * self.data[2]
    }
}

/// Only exists to compute 4x4 cofactors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Matrix3 {
    data: [f64; 9],
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * 3 + col]
    }
}

impl Matrix3 {
    fn submatrix(&self, row: usize, col: usize) -> Matrix2 {
        let mut sub = Matrix2::default();
        let mut count = 0;

        for r in (0..3).filter(|&r| r != row) {
            for c in (0..3).filter(|&c| c != col) {
                sub.data[count] = self[(r, c)];
                count += 1;
            }
        }

        sub
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let minor = self.submatrix(row, col).determinant();
        if (row + col) % 2 == 0 { minor } else { -minor }
    }

    fn determinant(&self) -> f64 {
        (0..3).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }
}

/// A 4x4 row-major matrix.
///
/// Every transform in the renderer (shape, pattern, camera) is one of these.
/// Constructors for the common affine transforms live here as associated
/// functions; they compose by multiplication, rightmost applied first.
///
/// ```
/// use std::f64::consts::PI;
/// use whitted::matrix::Matrix;
/// use whitted::tuple::Tuple;
///
/// let m = Matrix::translation(10.0, 5.0, 7.0)
///     * Matrix::scaling(5.0, 5.0, 5.0)
///     * Matrix::rotation_x(PI / 2.0);
/// assert_eq!(m * Tuple::point(1.0, 0.0, 1.0), Tuple::point(15.0, 0.0, 7.0));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Matrix {
    data: [f64; 16],
}

/// Element-wise comparison within `EPSILON`.
impl PartialEq for Matrix {
    fn eq(&self, other: &Matrix) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(a, b)| feq(*a, *b))
    }
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix::identity()
    }
}

impl From<[f64; 16]> for Matrix {
    fn from(data: [f64; 16]) -> Matrix {
        Matrix { data }
    }
}

impl From<[[f64; 4]; 4]> for Matrix {
    fn from(rows: [[f64; 4]; 4]) -> Matrix {
        let mut m = Matrix::zero();
        for (r, row) in rows.iter().enumerate() {
            m.data[r * 4..r * 4 + 4].copy_from_slice(row);
        }

        m
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * 4 + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * 4 + col]
    }
}

impl Matrix {
    pub fn zero() -> Matrix {
        Matrix { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix {
        let mut m = Matrix::zero();
        for i in 0..4 {
            m[(i, i)] = 1.0;
        }

        m
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Matrix {
        let mut m = Matrix::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;

        m
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix {
        let mut m = Matrix::identity();
        m[(0, 0)] = x;
        m[(1, 1)] = y;
        m[(2, 2)] = z;

        m
    }

    /// Rotation about the X axis by `r` radians (left-handed).
    pub fn rotation_x(r: f64) -> Matrix {
        let mut m = Matrix::identity();
        m[(1, 1)] =  r.cos();
        m[(1, 2)] = -r.sin();
        m[(2, 1)] =  r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation about the Y axis by `r` radians (left-handed).
    pub fn rotation_y(r: f64) -> Matrix {
        let mut m = Matrix::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 2)] =  r.sin();
        m[(2, 0)] = -r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation about the Z axis by `r` radians (left-handed).
    pub fn rotation_z(r: f64) -> Matrix {
        let mut m = Matrix::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 1)] = -r.sin();
        m[(1, 0)] =  r.sin();
        m[(1, 1)] =  r.cos();

        m
    }

    /// Shear where each parameter moves one axis in proportion to another,
    /// e.g. `xy` moves x in proportion to y.
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix {
        let mut m = Matrix::identity();
        m[(0, 1)] = xy;
        m[(0, 2)] = xz;
        m[(1, 0)] = yx;
        m[(1, 2)] = yz;
        m[(2, 0)] = zx;
        m[(2, 1)] = zy;

        m
    }

    /// Orients the world relative to an eye at `from` looking towards `to`.
    ///
    /// `up` only needs to be roughly up; the true up vector is recomputed from
    /// the forward and left vectors.
    pub fn view_transform(from: Tuple, to: Tuple, up: Tuple) -> Matrix {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation = Matrix::from([
            [ left.x,     left.y,     left.z,     0.0],
            [ true_up.x,  true_up.y,  true_up.z,  0.0],
            [-forward.x, -forward.y, -forward.z,  0.0],
            [ 0.0,        0.0,        0.0,        1.0],
        ]);

        orientation * Matrix::translation(-from.x, -from.y, -from.z)
    }

    pub fn transpose(&self) -> Matrix {
        let mut m = Matrix::zero();
        for r in 0..4 {
            for c in 0..4 {
                m[(c, r)] = self[(r, c)];
            }
        }

        m
    }

    fn submatrix(&self, row: usize, col: usize) -> Matrix3 {
        let mut sub = Matrix3::default();
        let mut count = 0;

        for r in (0..4).filter(|&r| r != row) {
            for c in (0..4).filter(|&c| c != col) {
                sub.data[count] = self[(r, c)];
                count += 1;
            }
        }

        sub
    }

    /// Determinant of the 3x3 submatrix with `row` and `col` removed.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let minor = self.minor(row, col);
        if (row + col) % 2 == 0 { minor } else { -minor }
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }

    /// A matrix with a zero or non-finite determinant has no inverse.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }

    /// Inverse by cofactor expansion, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix> {
        let det = self.determinant();
        if !det.is_finite() || det == 0.0 {
            return None;
        }

        let mut inv = Matrix::zero();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Some(inv)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, other: Matrix) -> Matrix {
        let mut m = Matrix::zero();
        for r in 0..4 {
            for c in 0..4 {
                m[(r, c)] = (0..4).map(|i| self[(r, i)] * other[(i, c)]).sum::<f64>();
            }
        }

        m
    }
}

impl Mul<Tuple> for Matrix {
    type Output = Tuple;

    fn mul(self, t: Tuple) -> Tuple {
        let row = |r: usize| {
            self[(r, 0)] * t.x + self[(r, 1)] * t.y + self[(r, 2)] * t.z + self[(r, 3)] * t.w
        };

        Tuple::new(row(0), row(1), row(2), row(3))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for r in 0..4 {
            writeln!(
                f,
                "| {:>9.5} {:>9.5} {:>9.5} {:>9.5} |",
                self[(r, 0)], self[(r, 1)], self[(r, 2)], self[(r, 3)]
            )?;
        }

        Ok(())
    }
}

#[test]
fn two_by_two_determinant() {
    let m = Matrix2 { data: [1.0, 5.0, -3.0, 2.0] };
    assert_eq!(m.determinant(), 17.0);
}

#[test]
fn three_by_three_cofactors() {
    let m = Matrix3 { data: [1.0, 2.0, 6.0, -5.0, 8.0, -4.0, 2.0, 6.0, 4.0] };

    assert_eq!(m.submatrix(0, 2), Matrix2 { data: [-5.0, 8.0, 2.0, 6.0] });
    assert_eq!(m.cofactor(0, 0), 56.0);
    assert_eq!(m.cofactor(0, 1), 12.0);
    assert_eq!(m.cofactor(0, 2), -46.0);
    assert_eq!(m.determinant(), -196.0);
}

#[test]
fn four_by_four_determinant() {
    let m = Matrix::from([
        [-2.0, -8.0,  3.0,  5.0],
        [-3.0,  1.0,  7.0,  3.0],
        [ 1.0,  2.0, -9.0,  6.0],
        [-6.0,  7.0,  7.0, -9.0],
    ]);

    assert_eq!(m.cofactor(0, 0), 690.0);
    assert_eq!(m.cofactor(0, 1), 447.0);
    assert_eq!(m.cofactor(0, 2), 210.0);
    assert_eq!(m.cofactor(0, 3), 51.0);
    assert_eq!(m.determinant(), -4071.0);
}

#[test]
fn multiplying_matrices_and_tuples() {
    let a = Matrix::from([
        [1.0, 2.0, 3.0, 4.0],
        [5.0, 6.0, 7.0, 8.0],
        [9.0, 8.0, 7.0, 6.0],
        [5.0, 4.0, 3.0, 2.0],
    ]);
    let b = Matrix::from([
        [-2.0, 1.0, 2.0,  3.0],
        [ 3.0, 2.0, 1.0, -1.0],
        [ 4.0, 3.0, 6.0,  5.0],
        [ 1.0, 2.0, 7.0,  8.0],
    ]);
    let expected = Matrix::from([
        [20.0, 22.0,  50.0,  48.0],
        [44.0, 54.0, 114.0, 108.0],
        [40.0, 58.0, 110.0, 102.0],
        [16.0, 26.0,  46.0,  42.0],
    ]);
    assert_eq!(a * b, expected);

    let m = Matrix::from([
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 4.0, 4.0, 2.0],
        [8.0, 6.0, 4.0, 1.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    assert_eq!(m * Tuple::new(1.0, 2.0, 3.0, 1.0), Tuple::new(18.0, 24.0, 33.0, 1.0));
    assert_eq!(Matrix::identity() * m, m);
}

#[test]
fn transposing() {
    let m = Matrix::from([
        [0.0, 9.0, 3.0, 0.0],
        [9.0, 8.0, 0.0, 8.0],
        [1.0, 8.0, 5.0, 3.0],
        [0.0, 0.0, 5.0, 8.0],
    ]);
    let t = Matrix::from([
        [0.0, 9.0, 1.0, 0.0],
        [9.0, 8.0, 8.0, 0.0],
        [3.0, 0.0, 5.0, 5.0],
        [0.0, 8.0, 3.0, 8.0],
    ]);

    assert_eq!(m.transpose(), t);
    assert_eq!(Matrix::identity().transpose(), Matrix::identity());
}

#[test]
fn inverting() {
    let a = Matrix::from([
        [-5.0,  2.0,  6.0, -8.0],
        [ 1.0, -5.0,  1.0,  8.0],
        [ 7.0,  7.0, -6.0, -7.0],
        [ 1.0, -3.0,  7.0,  4.0],
    ]);
    let expected = Matrix::from([
        [ 0.21805,  0.45113,  0.24060, -0.04511],
        [-0.80827, -1.45677, -0.44361,  0.52068],
        [-0.07895, -0.22368, -0.05263,  0.19737],
        [-0.52256, -0.81391, -0.30075,  0.30639],
    ]);

    let inv = a.inverse().unwrap();
    assert_eq!(a.determinant(), 532.0);
    assert_eq!(inv[(3, 2)], -160.0 / 532.0);
    assert_eq!(inv, expected);

    let b = Matrix::from([
        [3.0, -9.0,  7.0,  3.0],
        [3.0, -8.0,  2.0, -9.0],
        [-4.0, 4.0,  4.0,  1.0],
        [-6.0, 5.0, -1.0,  1.0],
    ]);
    assert_eq!((a * b) * b.inverse().unwrap(), a);
}

#[test]
fn singular_matrix_has_no_inverse() {
    let m = Matrix::from([
        [-4.0,  2.0, -2.0, -3.0],
        [ 9.0,  6.0,  2.0,  6.0],
        [ 0.0, -5.0,  1.0, -5.0],
        [ 0.0,  0.0,  0.0,  0.0],
    ]);

    assert!(!m.is_invertible());
    assert!(m.inverse().is_none());
}

#[test]
fn non_finite_matrix_has_no_inverse() {
    let eye = Tuple::point(1.0, 2.0, 3.0);
    let view = Matrix::view_transform(eye, eye, Tuple::vector(0.0, 1.0, 0.0));

    assert!(view.determinant().is_nan());
    assert!(!view.is_invertible());
    assert!(view.inverse().is_none());

    let m = Matrix::scaling(f64::INFINITY, 1.0, 1.0);
    assert!(!m.is_invertible());
    assert!(m.inverse().is_none());
}

#[test]
fn transforming_points_and_vectors() {
    use std::f64::consts::PI;

    let p = Tuple::point(-3.0, 4.0, 5.0);
    let v = Tuple::vector(-3.0, 4.0, 5.0);
    let t = Matrix::translation(5.0, -3.0, 2.0);
    assert_eq!(t * p, Tuple::point(2.0, 1.0, 7.0));
    assert_eq!(t * v, v);

    let s = Matrix::scaling(-1.0, 1.0, 1.0);
    assert_eq!(s * Tuple::point(2.0, 3.0, 4.0), Tuple::point(-2.0, 3.0, 4.0));

    let half = Matrix::rotation_x(PI / 4.0);
    let h = 2.0f64.sqrt() / 2.0;
    assert_eq!(half * Tuple::point(0.0, 1.0, 0.0), Tuple::point(0.0, h, h));
    assert_eq!(Matrix::rotation_y(PI / 2.0) * Tuple::point(0.0, 0.0, 1.0), Tuple::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix::rotation_z(PI / 2.0) * Tuple::point(0.0, 1.0, 0.0), Tuple::point(-1.0, 0.0, 0.0));

    let shear = Matrix::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    assert_eq!(shear * Tuple::point(2.0, 3.0, 4.0), Tuple::point(2.0, 3.0, 7.0));
}

#[test]
fn view_transforms() {
    let look_positive_z = Matrix::view_transform(
        Tuple::point(0.0, 0.0, 0.0),
        Tuple::point(0.0, 0.0, 1.0),
        Tuple::vector(0.0, 1.0, 0.0),
    );
    assert_eq!(look_positive_z, Matrix::scaling(-1.0, 1.0, -1.0));

    let moves_world = Matrix::view_transform(
        Tuple::point(0.0, 0.0, 8.0),
        Tuple::point(0.0, 0.0, 0.0),
        Tuple::vector(0.0, 1.0, 0.0),
    );
    assert_eq!(moves_world, Matrix::translation(0.0, 0.0, -8.0));

    let arbitrary = Matrix::view_transform(
        Tuple::point(1.0, 3.0, 2.0),
        Tuple::point(4.0, -2.0, 8.0),
        Tuple::vector(1.0, 1.0, 0.0),
    );
    let expected = Matrix::from([
        [-0.50709, 0.50709,  0.67612, -2.36643],
        [ 0.76772, 0.60609,  0.12122, -2.82843],
        [-0.35857, 0.59761, -0.71714,  0.00000],
        [ 0.00000, 0.00000,  0.00000,  1.00000],
    ]);
    assert_eq!(arbitrary, expected);
}
