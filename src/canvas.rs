// Persistent ink layer the tracked marker paints on.
// Visual: strokes stay where they were drawn, in the color they were drawn with,
// until the canvas is cleared.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::types::{Point, StrokeSettings};

/// All-zero pixels mean "no ink".
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbImage::new(width, height) }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Replace the ink layer with a fresh blank one of the same size.
    pub fn reset(&mut self) {
        let (w, h) = self.image.dimensions();
        self.image = RgbImage::new(w, h);
    }

    /// Round-capped line of `stroke.width` pixels from `from` to `to`.
    /// Width 0 still leaves a 1 px trace.
    pub fn stroke(&mut self, from: Point, to: Point, stroke: &StrokeSettings) {
        let color = Rgb([stroke.r, stroke.g, stroke.b]);
        let radius = (stroke.width / 2) as i32;
        for (x, y) in Bresenham::new(from, to) {
            if radius == 0 {
                put_pixel(&mut self.image, x, y, color);
            } else {
                draw_filled_circle_mut(&mut self.image, (x, y), radius, color);
            }
        }
    }
}

/// Put a pixel if (x,y) is inside bounds.
#[inline]
fn put_pixel(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

/// Integer points on the segment between two endpoints, both included.
struct Bresenham {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    fn new(from: Point, to: Point) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        Self {
            x: from.x,
            y: from.y,
            x1: to.x,
            y1: to.y,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.done {
            return None;
        }
        let out = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(out);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy { self.err += self.dy; self.x += self.sx; }
        if e2 <= self.dx { self.err += self.dx; self.y += self.sy; }
        Some(out)
    }
}
