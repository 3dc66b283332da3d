use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::color::Color;
use crate::consts::{ PPM_MAX_LINE, PPM_MAX_VALUE };

/// Errors raised while reading or writing PPM images.
#[derive(Error, Debug)]
pub enum PpmError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported image format (expected P3 magic, found {0:?})")]
    BadMagic(String),

    #[error("invalid number {0:?} in PPM data")]
    BadNumber(String),

    #[error("PPM dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },

    #[error("PPM data ended early: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },
}

/// A grid of colors, the output of a render.
///
/// Pixels are addressed by column `x` and row `y`, both zero-indexed with
/// the origin in the top-left corner.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,

    /// Row-major pixel storage, `width * height` long.
    pixels: Vec<Color>,
}

impl Canvas {
    /// A `width` by `height` canvas filled with black.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height],
        }
    }

    /// Writes a color to column `x`, row `y`. Out-of-bounds writes are
    /// ignored.
    ///
    /// ```
    /// use whitted::color::Color;
    /// use whitted::canvas::Canvas;
    ///
    /// let mut canvas = Canvas::new(10, 20);
    /// canvas.write_pixel(2, 3, &Color::red());
    /// assert_eq!(canvas.read_pixel(2, 3), Some(Color::red()));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[y * self.width + x] = *pixel;
    }

    /// Reads the color at column `x`, row `y`, or `None` when out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[y * self.width + x])
    }

    /// Mutable access to the raw row-major buffer for the parallel renderer.
    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Serialises the canvas as a plain (P3) PPM.
    ///
    /// Every pixel row starts on a new line; lines longer than 70 characters
    /// are wrapped at the last space before the limit.
    pub fn to_ppm(&self) -> String {
        let mut out = format!("P3\n{} {}\n{}\n", self.width, self.height, PPM_MAX_VALUE);

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut line = String::new();
            for value in row.iter().flat_map(|p| p.to_bytes()) {
                let token = value.to_string();
                if !line.is_empty() && line.len() + 1 + token.len() > PPM_MAX_LINE {
                    out.push_str(&line);
                    out.push('\n');
                    line.clear();
                }

                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&token);
            }

            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    /// Writes the canvas to `path` as a P3 PPM.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PpmError> {
        fs::write(path, self.to_ppm())?;
        Ok(())
    }

    /// Parses P3 PPM text.
    ///
    /// `#` comments may appear anywhere and run to the end of the line.
    /// Channel values are scaled by the declared maximum value, so a file
    /// with max value 100 maps `100` to `1.0`.
    pub fn from_ppm(text: &str) -> Result<Canvas, PpmError> {
        let mut tokens = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace);

        match tokens.next() {
            Some("P3") => {}
            other => return Err(PpmError::BadMagic(other.unwrap_or("").to_string())),
        }

        let mut header = [0usize; 3];
        for (i, slot) in header.iter_mut().enumerate() {
            let token = tokens.next().ok_or(PpmError::Truncated { expected: 3, found: i })?;
            *slot = token.parse().map_err(|_| PpmError::BadNumber(token.to_string()))?;
        }
        let [width, height, max_value] = header;
        let scale = max_value.max(1) as f64;

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(PpmError::TooLarge { width, height })?;

        // Never reserve more values than the text could hold.
        let mut values = Vec::with_capacity(expected.min(text.len()));
        for token in tokens.take(expected) {
            let v: f64 = token.parse().map_err(|_| PpmError::BadNumber(token.to_string()))?;
            values.push(v / scale);
        }

        if values.len() < expected {
            return Err(PpmError::Truncated { expected, found: values.len() });
        }

        let pixels = values.chunks_exact(3).map(|c| Color::rgb(c[0], c[1], c[2])).collect();
        Ok(Canvas { width, height, pixels })
    }

    /// Reads a P3 PPM from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Canvas, PpmError> {
        Canvas::from_ppm(&fs::read_to_string(path)?)
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert!(c.pixels.iter().all(|p| *p == Color::black()));
    assert_eq!(c.read_pixel(10, 0), None);
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = c.to_ppm();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(&lines[0..3], &["P3", "5 3", "255"]);
    assert_eq!(lines[3], "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0");
    assert_eq!(lines[5], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255");
    assert!(ppm.ends_with('\n'));
}

#[test]
fn ppm_long_lines_are_split() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let ppm = c.to_ppm();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[3], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[4], "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert_eq!(lines[5], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[6], "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert!(lines.iter().all(|l| l.len() <= 70));
}

#[test]
fn reading_ppm_with_comments_and_scaling() {
    let text = "P3\n# made by hand\n2 1\n# max\n100\n100 100 100 # white\n  0\n50 0\n";
    let c = Canvas::from_ppm(text).unwrap();

    assert_eq!(c.width, 2);
    assert_eq!(c.height, 1);
    assert_eq!(c.read_pixel(0, 0), Some(Color::white()));
    assert_eq!(c.read_pixel(1, 0), Some(Color::rgb(0.0, 0.5, 0.0)));
}

#[test]
fn reading_pixels_across_lines() {
    let text = "P3\n4 3\n255\n255 127 0 0 127 255 127 255 0 255 255 255\n\
                0 0 0 255 0 0 0 255 0 0 0 255\n255 255 0 0 255 255 255 0 255 127 127 127\n";
    let c = Canvas::from_ppm(text).unwrap();

    assert_eq!(c.read_pixel(0, 0), Some(Color::rgb(1.0, 127.0 / 255.0, 0.0)));
    assert_eq!(c.read_pixel(1, 1), Some(Color::red()));
    assert_eq!(c.read_pixel(3, 2), Some(Color::rgb(127.0 / 255.0, 127.0 / 255.0, 127.0 / 255.0)));
}

#[test]
fn reading_bad_ppm_fails() {
    assert!(matches!(Canvas::from_ppm("P32\n1 1\n255\n0 0 0\n"), Err(PpmError::BadMagic(_))));
    assert!(matches!(Canvas::from_ppm("P3\n1 x\n255\n"), Err(PpmError::BadNumber(_))));
    assert!(matches!(
        Canvas::from_ppm("P3\n2 1\n255\n0 0 0 1\n"),
        Err(PpmError::Truncated { expected: 6, found: 4 })
    ));
}

#[test]
fn oversized_ppm_header_fails() {
    let overflowing = format!("P3\n{} 2\n255\n0 0 0\n", usize::MAX);
    assert!(matches!(Canvas::from_ppm(&overflowing), Err(PpmError::TooLarge { height: 2, .. })));

    assert!(matches!(
        Canvas::from_ppm("P3\n100000 100000\n255\n0 0 0\n"),
        Err(PpmError::Truncated { found: 3, .. }) | Err(PpmError::TooLarge { .. })
    ));
}

#[test]
fn ppm_round_trip() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(1, 1, &Color::rgb(1.0, 0.0, 1.0));
    c.write_pixel(2, 0, &Color::rgb(0.0, 1.0, 0.0));

    assert_eq!(Canvas::from_ppm(&c.to_ppm()).unwrap(), c);
}
