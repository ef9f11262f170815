// One frame of the drawing toy, without any windows attached.
// Visual expectation of `Session::process`: the returned view is the camera image,
// mirrored, with the tracked marker ringed and your ink pasted on top.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use image::{imageops, GrayImage, Rgb, RgbImage};

use crate::canvas::Canvas;
use crate::compositor::overlay;
use crate::error::Result;
use crate::screenshot;
use crate::segment::{preprocess, segment};
use crate::tracker::{annotate, draw_dot, locate_blob, TrackerState};
use crate::types::{SelectorSettings, StrokeSettings};

/// User intents gathered from keys and mouse each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ClearCanvas,
    ToggleDraw,
    SetDraw(bool),
    Screenshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Quit,
}

/// What one iteration produced for display.
pub struct Processed {
    pub mask: GrayImage,
    /// Composited and mirrored, exactly what the main window shows.
    pub view: RgbImage,
}

/// Everything that survives from one frame to the next.
pub struct Session {
    canvas: Canvas,
    tracker: TrackerState,
    drawing: bool,
    screenshot_dir: PathBuf,
    last_view: Option<RgbImage>,
}

impl Session {
    pub fn new(width: u32, height: u32, screenshot_dir: PathBuf) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            tracker: TrackerState::new(),
            drawing: false,
            screenshot_dir,
            last_view: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    pub fn drawing(&self) -> bool {
        self.drawing
    }

    /// Run the full pipeline on one camera frame.
    pub fn process(
        &mut self,
        mut frame: RgbImage,
        selector: &SelectorSettings,
        stroke: &StrokeSettings,
    ) -> Result<Processed> {
        let hsv = preprocess(&frame);
        let mask = segment(&hsv, selector);

        let detection = locate_blob(&mask);
        let was_tracking = self.tracker.current.is_some();
        self.tracker.advance(detection.and_then(|d| d.centroid));
        match (was_tracking, self.tracker.current) {
            (false, Some(c)) => tracing::debug!(x = c.x, y = c.y, "tracking acquired"),
            (true, None) => tracing::debug!("tracking lost"),
            _ => {}
        }

        if let Some(det) = &detection {
            annotate(&mut frame, det);
        }

        if self.drawing {
            if let Some((from, to)) = self.tracker.segment() {
                self.canvas.stroke(from, to, stroke);
            }
        }

        overlay(&mut frame, self.canvas.image())?;

        // Keep the centroid visible even over fresh ink.
        if let Some(c) = self.tracker.current {
            draw_dot(&mut frame, c, Rgb([0, 0, 0]));
        }

        let view = imageops::flip_horizontal(&frame);
        self.last_view = Some(view.clone());
        Ok(Processed { mask, view })
    }

    /// Apply one user command. Screenshot failures are logged, never fatal.
    pub fn apply(&mut self, command: Command) -> LoopState {
        match command {
            Command::Quit => return LoopState::Quit,
            Command::ClearCanvas => {
                self.canvas.reset();
                tracing::info!("canvas cleared");
            }
            Command::ToggleDraw => self.set_drawing(!self.drawing),
            Command::SetDraw(on) => self.set_drawing(on),
            Command::Screenshot => self.save_screenshot(),
        }
        LoopState::Running
    }

    fn set_drawing(&mut self, on: bool) {
        if self.drawing != on {
            tracing::debug!(drawing = on, "draw toggled");
        }
        self.drawing = on;
    }

    fn save_screenshot(&self) {
        let Some(view) = &self.last_view else {
            tracing::warn!("no frame to save yet");
            return;
        };
        match screenshot::save(&self.screenshot_dir, view, Local::now()) {
            Ok(path) => tracing::info!(path = %path.display(), "screenshot saved"),
            Err(e) => tracing::warn!("{e}"),
        }
    }
}

/// Turns held-button state into press/release commands.
#[derive(Debug, Default)]
pub struct MouseEdge {
    was_down: bool,
}

impl MouseEdge {
    pub fn update(&mut self, down: bool) -> Option<Command> {
        let edge = match (self.was_down, down) {
            (false, true) => Some(Command::SetDraw(true)),
            (true, false) => Some(Command::SetDraw(false)),
            _ => None,
        };
        self.was_down = down;
        edge
    }
}

/// Key presses seen this iteration, across every window.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keys {
    pub quit: bool,
    pub clear: bool,
    pub toggle: bool,
    pub save: bool,
}

impl Keys {
    /// At most one key command per iteration, in priority order.
    pub fn command(&self) -> Option<Command> {
        if self.quit {
            Some(Command::Quit)
        } else if self.clear {
            Some(Command::ClearCanvas)
        } else if self.toggle {
            Some(Command::ToggleDraw)
        } else if self.save {
            Some(Command::Screenshot)
        } else {
            None
        }
    }
}

/// Sleeps so the loop never runs faster than the configured rate.
pub struct FramePacer {
    min_frame: Option<Duration>,
    last: Instant,
}

impl FramePacer {
    pub fn new(min_frame: Option<Duration>) -> Self {
        Self { min_frame, last: Instant::now() }
    }

    pub fn wait(&mut self) {
        if let Some(min) = self.min_frame {
            let spent = self.last.elapsed();
            if spent < min {
                std::thread::sleep(min - spent);
            }
        }
        self.last = Instant::now();
    }
}

/// Reports the achieved frame rate once per second.
pub struct FpsMeter {
    since: Instant,
    frames: u32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self { since: Instant::now(), frames: 0 }
    }

    pub fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            tracing::debug!("FPS: {:.1}", fps);
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}
