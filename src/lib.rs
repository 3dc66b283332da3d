pub mod consts;

pub mod tuple;
pub mod matrix;
pub mod ray;

pub mod color;
pub mod canvas;
pub mod pattern;
pub mod light;

pub mod bounds;
pub mod geometry;
pub mod shape;
pub mod intersect;

pub mod world;
pub mod camera;
pub mod parallel;

pub mod obj;
pub mod scene;

use consts::EPSILON;

/// Approximate equality for the floating point values used across the tracer.
///
/// Equal infinities compare equal, so unbounded boxes can be compared too.
pub fn feq(left: f64, right: f64) -> bool {
    left == right || (left - right).abs() < EPSILON
}

#[test]
fn feq_tolerates_rounding_and_infinity() {
    assert!(feq(1.0, 1.0 + EPSILON / 2.0));
    assert!(!feq(1.0, 1.0 + EPSILON * 2.0));
    assert!(feq(f64::INFINITY, f64::INFINITY));
    assert!(!feq(f64::INFINITY, f64::NEG_INFINITY));
}
