// Color segmentation: blur, convert to HSV, keep pixels inside the selector window.
// Visual expectation: the mask window shows white where the tracked marker is,
// black everywhere else, with speckles removed by the erode/dilate pass.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};

use crate::types::SelectorSettings;

/// Width of the circular hue axis (8-bit HSV stores half-degrees).
pub const HUE_SPAN: i32 = 180;

/// Sigma a 5x5 Gaussian kernel gets when none is given explicitly.
pub const BLUR_SIGMA: f32 = 1.1;

/// Erode then dilate this many 3x3 steps; a 3x3 square applied twice is a 5x5 square.
const CLEAN_STEPS: u8 = 2;

/// Inclusive lower/upper bounds per channel, ordered (H, S, V).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvBounds {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

/// Hue window `hue ∓ range` on the circular axis.
///
/// When the window crosses 0 only the high end `[180 - range + hue, 180]` is kept,
/// and when it crosses 180 only the low end `[0, hue - 180 + range]`. Both checks
/// run in sequence, so a very wide range can trip the second after the first.
pub fn hue_bounds(hue: i32, range: i32) -> (i32, i32) {
    let mut lower = hue - range;
    let mut upper = hue + range;
    if lower < 0 {
        lower = HUE_SPAN - range + hue;
        upper = HUE_SPAN;
    }
    if upper > HUE_SPAN {
        upper = hue - HUE_SPAN + range;
        lower = 0;
    }
    (lower, upper)
}

impl HsvBounds {
    /// Saturation and value only set the floor; the ceiling is always 255.
    pub fn from_selector(sel: &SelectorSettings) -> Self {
        let (lo, hi) = hue_bounds(sel.hue as i32, sel.range as i32);
        Self {
            lower: [clamp_u8(lo), sel.saturation, sel.value],
            upper: [clamp_u8(hi), 255, 255],
        }
    }

    #[inline]
    pub fn contains(&self, hsv: &Rgb<u8>) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Convert one RGB pixel to 8-bit HSV: H in 0..=180, S and V in 0..=255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().clamp(0.0, HUE_SPAN as f32) as u8,
        s.round().clamp(0.0, 255.0) as u8,
        v as u8,
    ]
}

/// Inverse of [`rgb_to_hsv`], used to preview the selector color.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    let hue = (h as f32 * 2.0) % 360.0;
    let sat = s as f32 / 255.0;
    let val = v as f32 / 255.0;

    let c = val * sat;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = val - c;
    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Blur the frame and convert it to HSV (channels stored as H, S, V).
pub fn preprocess(frame: &RgbImage) -> RgbImage {
    let blurred = gaussian_blur_f32(frame, BLUR_SIGMA);
    let mut hsv = blurred;
    for px in hsv.pixels_mut() {
        *px = Rgb(rgb_to_hsv(px[0], px[1], px[2]));
    }
    hsv
}

/// Binary mask (0 or 255) of pixels inside `bounds`, no cleanup.
pub fn threshold(hsv: &RgbImage, bounds: &HsvBounds) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (dst, src) in mask.pixels_mut().zip(hsv.pixels()) {
        *dst = Luma([if bounds.contains(src) { 255 } else { 0 }]);
    }
    mask
}

/// Two erosions then two dilations to drop blobs thinner than a few pixels.
pub fn clean(mask: &GrayImage) -> GrayImage {
    let eroded = erode(mask, Norm::LInf, CLEAN_STEPS);
    dilate(&eroded, Norm::LInf, CLEAN_STEPS)
}

/// Full segmenter: HSV image + selector settings -> cleaned mask.
pub fn segment(hsv: &RgbImage, sel: &SelectorSettings) -> GrayImage {
    clean(&threshold(hsv, &HsvBounds::from_selector(sel)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_window_without_wrap() {
        assert_eq!(hue_bounds(90, 20), (70, 110));
        assert_eq!(hue_bounds(90, 0), (90, 90));
        assert_eq!(hue_bounds(5, 5), (0, 10));
        assert_eq!(hue_bounds(175, 5), (170, 180));
    }

    #[test]
    fn hue_window_wrapping_below_zero_keeps_high_end() {
        assert_eq!(hue_bounds(0, 5), (175, 180));
        assert_eq!(hue_bounds(10, 20), (170, 180));
        assert_eq!(hue_bounds(0, 20), (160, 180));
    }

    #[test]
    fn hue_window_wrapping_above_span_keeps_low_end() {
        assert_eq!(hue_bounds(180, 5), (0, 5));
        assert_eq!(hue_bounds(170, 20), (0, 10));
        assert_eq!(hue_bounds(180, 20), (0, 20));
    }

    #[test]
    fn hue_window_zero_range_at_edges() {
        assert_eq!(hue_bounds(0, 0), (0, 0));
        assert_eq!(hue_bounds(180, 0), (180, 180));
    }

    #[test]
    fn hue_window_stays_on_axis_for_slider_ranges() {
        for h in 0..=HUE_SPAN {
            for r in 0..=20 {
                let (lo, hi) = hue_bounds(h, r);
                assert!((0..=HUE_SPAN).contains(&lo), "h={h} r={r} lo={lo}");
                assert!((0..=HUE_SPAN).contains(&hi), "h={h} r={r} hi={hi}");
                assert!(lo <= hi, "h={h} r={r}");
            }
        }
    }

    #[test]
    fn wide_range_trips_both_wrap_rules() {
        // lower wraps to 180 - 100 + 10 = 90, then upper 180 > 180 is false, so stays
        assert_eq!(hue_bounds(10, 100), (90, 180));
        // upper 200 > 180 after no lower wrap
        assert_eq!(hue_bounds(100, 100), (0, 20));
    }

    #[test]
    fn saturation_and_value_only_set_floor() {
        let sel = SelectorSettings { hue: 60, saturation: 40, value: 90, range: 5 };
        let b = HsvBounds::from_selector(&sel);
        assert_eq!(b.lower, [55, 40, 90]);
        assert_eq!(b.upper, [65, 255, 255]);
    }

    #[test]
    fn primary_colors_convert_to_expected_hsv() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(255, 255, 255), [0, 0, 255]);
        assert_eq!(rgb_to_hsv(255, 0, 255), [150, 255, 255]);
    }

    #[test]
    fn hsv_preview_round_trips_primaries() {
        assert_eq!(hsv_to_rgb(0, 255, 255), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(60, 255, 255), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(120, 255, 255), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(180, 255, 255), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(77, 0, 200), [200, 200, 200]);
    }

    #[test]
    fn threshold_selects_only_in_window_pixels() {
        let mut hsv = RgbImage::new(3, 1);
        hsv.put_pixel(0, 0, Rgb([60, 255, 255]));
        hsv.put_pixel(1, 0, Rgb([60, 100, 255])); // too pale
        hsv.put_pixel(2, 0, Rgb([90, 255, 255])); // wrong hue
        let sel = SelectorSettings { hue: 60, saturation: 200, value: 200, range: 5 };
        let mask = threshold(&hsv, &HsvBounds::from_selector(&sel));
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn hue_zero_window_misses_pure_red_but_180_catches_it() {
        let mut hsv = RgbImage::new(1, 1);
        hsv.put_pixel(0, 0, Rgb(rgb_to_hsv(255, 0, 0)));
        let at_zero = SelectorSettings { hue: 0, saturation: 100, value: 100, range: 5 };
        let at_top = SelectorSettings { hue: 180, ..at_zero };
        assert_eq!(threshold(&hsv, &HsvBounds::from_selector(&at_zero)).get_pixel(0, 0)[0], 0);
        assert_eq!(threshold(&hsv, &HsvBounds::from_selector(&at_top)).get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn clean_removes_specks_and_keeps_large_blobs() {
        let mut mask = GrayImage::new(60, 60);
        mask.put_pixel(5, 5, Luma([255])); // lone speck
        for y in 20..40 {
            for x in 20..40 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let out = clean(&mask);
        assert_eq!(out.get_pixel(5, 5)[0], 0);
        assert_eq!(out.get_pixel(30, 30)[0], 255);
        assert_eq!(out.get_pixel(20, 20)[0], 255);
        assert_eq!(out.get_pixel(45, 45)[0], 0);
    }

    #[test]
    fn segment_finds_green_square_in_frame() {
        let mut frame = RgbImage::new(80, 80);
        for y in 20..60 {
            for x in 20..60 {
                frame.put_pixel(x, y, Rgb([0, 255, 0]));
            }
        }
        let sel = SelectorSettings { hue: 60, saturation: 100, value: 100, range: 10 };
        let mask = segment(&preprocess(&frame), &sel);
        assert_eq!(mask.get_pixel(40, 40)[0], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
    }
}
