use std::ops::{ Add, AddAssign, Sub, Mul };

use crate::consts::PPM_MAX_VALUE;
use crate::feq;

/// A linear RGB color.
///
/// Components nominally range over `[0, 1]` but intermediate shading results
/// may exceed that; values are only clamped when quantised for output.
///
/// ```
/// use whitted::color::Color;
///
/// let c = Color::rgb(0.9, 0.6, 0.75) * Color::rgb(0.7, 0.1, 0.25);
/// assert_eq!(c, Color::rgb(0.63, 0.06, 0.1875));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) && feq(self.g, other.g) && feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from([r, g, b]: [f64; 3]) -> Color {
        Color { r, g, b }
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Component-wise product of two colors.
    pub fn hadamard(&self, other: &Color) -> Color {
        Color::rgb(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    /// Quantises each channel to `0..=255`, rounding to nearest.
    pub fn to_bytes(&self) -> [u8; 3] {
        let scale = |c: f64| (c * PPM_MAX_VALUE as f64).round().clamp(0.0, PPM_MAX_VALUE as f64) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Color {
        Color::rgb(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, s: f64) -> Color {
        Color::rgb(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, c: Color) -> Color {
        c * self
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Color {
        self.hadamard(&other)
    }
}

#[test]
fn add_and_subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn scale_colors() {
    assert_eq!(Color::rgb(0.2, 0.3, 0.4) * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(0.5 * Color::white(), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn quantisation_clamps_and_rounds() {
    assert_eq!(Color::rgb(1.5, 0.0, 0.0).to_bytes(), [255, 0, 0]);
    assert_eq!(Color::rgb(0.0, 0.5, 0.0).to_bytes(), [0, 128, 0]);
    assert_eq!(Color::rgb(-0.5, 0.0, 1.0).to_bytes(), [0, 0, 255]);
}
