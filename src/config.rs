// Command line knobs. Everything else is adjusted live with the sliders.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Parser)]
#[command(name = "hue-brush", about = "Draw in the air with a colored marker tracked by your webcam")]
pub struct Args {
    /// Camera device index (0 = primary camera)
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture width; the device may pick another
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Requested capture height; the device may pick another
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Upper bound on loop iterations per second (0 = unpaced)
    #[arg(long, default_value_t = 30)]
    pub max_fps: u32,

    /// Existing directory that receives screenshots
    #[arg(long, default_value = "images/screenshots")]
    pub screenshot_dir: PathBuf,

    /// tracing filter, e.g. "info" or "hue_brush=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "capture size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Minimum time one loop iteration may take.
    pub fn min_frame_time(&self) -> Option<Duration> {
        (self.max_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.max_fps as f64))
    }
}
