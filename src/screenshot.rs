// Saves what the main window shows as a timestamped PNG.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbImage};

use crate::error::{Error, Result};

/// `<dir>/<YYYY-MM-DD-HH-MM-SS>.png`
pub fn file_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}.png", now.format("%Y-%m-%d-%H-%M-%S")))
}

/// Write `image` under `dir`. The directory must already exist.
pub fn save(dir: &Path, image: &RgbImage, now: DateTime<Local>) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::Screenshot(format!("{} is not a directory", dir.display())));
    }
    let path = file_path(dir, now);
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::Screenshot(format!("{}: {e}", path.display())))?;
    Ok(path)
}
