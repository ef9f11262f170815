// Opens the camera and hands out decoded RGB frames.
// Visual expectation: when the loop calls `next_frame()`, you get the image the
// camera sees right now, ready for blurring, thresholding and drawing on.

use crate::error::{Error, Result};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use image::RgbImage;

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` near a target resolution (falls back if not exact).
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> Result<Self> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            fps.max(1),
        );

        // Ask for RGB frames, closest to what we requested.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("create camera {index}: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("open stream: {e}")))?;

        // The stream might choose a slightly different resolution; that one wins.
        let actual = cam.resolution();
        tracing::info!(
            index,
            width = actual.width(),
            height = actual.height(),
            "camera opened"
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Grab one frame (blocks until the camera delivers) and decode it to RGB.
    pub fn next_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("fetch frame: {e}")))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("decode RGB: {e}")))?;

        // Rebuild from raw bytes so we own the buffer type regardless of nokhwa's `image`.
        let (w, h) = decoded.dimensions();
        RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| Error::CameraFrame(format!("short RGB buffer for {w}x{h}")))
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            tracing::warn!("stopping camera stream: {e}");
        }
    }
}
