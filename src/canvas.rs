use std::fs::File;
use std::io::{ self, BufWriter, Write };
use std::path::Path;

use log::info;

use crate::color::Color;
use crate::error::Result;

/// Maximum length of a line in a PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// Holds one color per pixel of the rendered image. Once rendering finishes
/// the canvas can be saved as a plain-text PPM image.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, row by row.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `y` is the row and `x` the column,
    /// both zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cull_trace::color::Color;
    /// # use cull_trace::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2), Some(purple));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Copies a whole row of pixels. Extra colors are ignored, as is a row
    /// index past the bottom of the canvas.
    pub fn write_row(&mut self, y: usize, row: &[Color]) {
        if y >= self.height {
            return;
        }

        let start = y * self.width;
        let len = row.len().min(self.width);
        self.pixels[start..start + len].copy_from_slice(&row[..len]);
    }

    /// Reads a color, or `None` if the location is out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Writes the canvas as a PPM (P3) image.
    ///
    /// Every image row starts on a new line, and no line exceeds 70 columns;
    /// a value that would cross the limit is moved to the next line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut col = 0;
            for pixel in row {
                for value in pixel.to_rgb8().iter() {
                    let s = value.to_string();

                    if col == 0 {
                        write!(out, "{}", s)?;
                        col = s.len();
                    } else if col + 1 + s.len() > PPM_LINE_WIDTH {
                        write!(out, "\n{}", s)?;
                        col = s.len();
                    } else {
                        write!(out, " {}", s)?;
                        col += 1 + s.len();
                    }
                }
            }

            writeln!(out)?;
        }

        Ok(())
    }

    /// Saves the canvas to a PPM file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;

        info!("saved {}x{} image to {}", self.width, self.height,
            path.display());
        Ok(())
    }
}

/* Tests */

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::black()));
        }
    }
    assert_eq!(c.read_pixel(10, 0), None);
}

#[test]
fn write_row_copies_pixels() {
    let mut c = Canvas::new(3, 2);
    let red = Color::rgb(1.0, 0.0, 0.0);
    c.write_row(1, &[red, red, red, red]);
    c.write_row(5, &[red]);

    assert_eq!(c.read_pixel(0, 0), Some(Color::black()));
    assert_eq!(c.read_pixel(2, 1), Some(red));
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    let expected = "P3\n5 3\n255\n\
        255 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 128 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 0 0 0 0 0 0 0 255\n";
    assert_eq!(ppm, expected);
}

#[test]
fn ppm_lines_fit_in_seventy_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert!(lines.iter().all(|l| l.len() <= PPM_LINE_WIDTH));
    assert_eq!(lines[3],
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[4],
        "153 255 204 153 255 204 153 255 204 153 255 204 153");
}
