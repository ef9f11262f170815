// Cut-and-paste overlay of the ink layer onto the live frame.
// Visual: ink is fully opaque where drawn; the camera shows through everywhere else.

use image::{GrayImage, Luma, RgbImage};

use crate::error::{Error, Result};

/// 255 where the canvas has ink (any non-zero channel), 0 elsewhere.
pub fn ink_mask(canvas: &RgbImage) -> GrayImage {
    let mut mask = GrayImage::new(canvas.width(), canvas.height());
    for (dst, px) in mask.pixels_mut().zip(canvas.pixels()) {
        *dst = Luma([if px.0 != [0, 0, 0] { 255 } else { 0 }]);
    }
    mask
}

/// Replace frame pixels with canvas pixels wherever there is ink.
///
/// The canvas may be smaller than the frame (it covers the top-left corner) but
/// never larger.
pub fn overlay(frame: &mut RgbImage, canvas: &RgbImage) -> Result<()> {
    let (fw, fh) = frame.dimensions();
    let (cw, ch) = canvas.dimensions();
    if cw > fw || ch > fh {
        return Err(Error::DimensionMismatch {
            what: "canvas",
            got: (cw, ch),
            expected: (fw, fh),
        });
    }

    let mask = ink_mask(canvas);
    for (x, y, ink) in mask.enumerate_pixels() {
        if ink[0] != 0 {
            frame.put_pixel(x, y, *canvas.get_pixel(x, y));
        }
    }
    Ok(())
}
