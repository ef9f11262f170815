// Core types shared by the tracking, drawing and display steps.

use image::{GrayImage, RgbImage};

/// Packed 0x00RRGGBB pixels, the only layout minifb accepts.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Pack an RGB image into this buffer, resizing the buffer if needed.
    pub fn fill_from_rgb(&mut self, img: &RgbImage) {
        self.resize_to(img.width() as usize, img.height() as usize);
        for (dst, px) in self.pixels.iter_mut().zip(img.pixels()) {
            *dst = pack_rgb(px[0], px[1], px[2]);
        }
    }

    /// Show a single channel image as gray (mask view).
    pub fn fill_from_gray(&mut self, img: &GrayImage) {
        self.resize_to(img.width() as usize, img.height() as usize);
        for (dst, px) in self.pixels.iter_mut().zip(img.pixels()) {
            *dst = pack_rgb(px[0], px[0], px[0]);
        }
    }

    fn resize_to(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0u32; width * height];
        }
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Integer pixel position of a tracked centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Minimal enclosing circle of a blob contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// What the blob locator found in one mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Enclosing circle of the largest blob, kept even when it is too small to track.
    pub circle: Circle,
    /// Moment centroid; `None` when the blob is too small or has zero area.
    pub centroid: Option<Point>,
}

/// Ink color and line width for new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeSettings {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub width: u32, // 0..=100
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self { r: 255, g: 255, b: 255, width: 10 }
    }
}

/// Target color window in 8-bit HSV (hue 0..=180).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSettings {
    pub hue: u8,        // 0..=180, circular
    pub saturation: u8, // lower bound only
    pub value: u8,      // lower bound only
    pub range: u8,      // symmetric hue tolerance, 0..=20
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self { hue: 0, saturation: 255, value: 255, range: 5 }
    }
}
