// One error type for the whole toy.
// Every variant states *where* things went wrong.
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String), // Command line values that make no sense
    #[error("logging init error: {0}")]
    Logging(String),
    #[error("window init error: {0}")]
    WindowInit(String), // Creating a window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // Pushing a buffer to a window failed
    #[error("camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("screenshot error: {0}")]
    Screenshot(String),
    #[error("dimension mismatch: {what} is {got:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        got: (u32, u32),
        expected: (u32, u32),
    },
}
