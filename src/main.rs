// What you SEE:
// • "Hue Brush" shows the mirrored camera with your ink pasted on top.
//   A yellow ring follows the tracked marker; a dot marks its center.
// • "Mask" shows which pixels match the selected color (white = match).
// • "Settings" sets ink color + line width, "Selector" sets the tracked color.
// • Hold Left Mouse in the main window to draw; Space toggles drawing.
// • Esc clears the ink, S saves a screenshot, Q quits.

mod app;
mod camera;
mod canvas;
mod compositor;
mod config;
mod controls;
mod draw;
mod error;
mod screenshot;
mod segment;
mod tracker;
mod types;

use app::{FpsMeter, FramePacer, Keys, LoopState, MouseEdge, Session};
use camera::CameraCapture;
use clap::Parser;
use config::Args;
use controls::ControlPanel;
use draw::Drawer;
use error::{Error, Result};
use minifb::Key;
use tracing_subscriber::{fmt, EnvFilter};
use types::{FrameBuffer, SelectorSettings, StrokeSettings};

/// Gap between windows placed side by side.
const WINDOW_GAP: isize = 30;

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| Error::Logging(format!("failed to create log filter: {e}")))?;
    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Logging(format!("tracing init error: {e}")))
}

/// The four on-screen panels.
struct Windows {
    view: Drawer,
    mask: Drawer,
    settings: Drawer,
    selector: Drawer,
}

impl Windows {
    fn open(w: usize, h: usize, settings: &ControlPanel, selector: &ControlPanel) -> Result<Self> {
        let right = w as isize + WINDOW_GAP;
        Ok(Self {
            view: Drawer::new("Hue Brush", w, h, 0, 0)?,
            mask: Drawer::new("Mask", w, h, 0, h as isize + WINDOW_GAP)?,
            selector: Drawer::new("Selector", selector.width(), selector.height(), right, 0)?,
            settings: Drawer::new(
                "Settings",
                settings.width(),
                settings.height(),
                right,
                selector.height() as isize + 2 * WINDOW_GAP,
            )?,
        })
    }

    fn all(&self) -> [&Drawer; 4] {
        [&self.view, &self.mask, &self.settings, &self.selector]
    }

    fn all_open(&self) -> bool {
        self.all().iter().all(|d| d.is_open())
    }

    /// Keys are read from whichever window has focus.
    fn keys(&self) -> Keys {
        let mut keys = Keys::default();
        for d in self.all() {
            keys.quit |= d.pressed_once(Key::Q);
            keys.clear |= d.pressed_once(Key::Escape);
            keys.toggle |= d.pressed_once(Key::Space);
            keys.save |= d.pressed_once(Key::S);
        }
        keys
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;
    args.validate()?;

    /* --- Camera + windows ---
       Visual: four windows open; the main one shows the live camera. */
    let mut cam = CameraCapture::new(args.camera, args.width, args.height, args.max_fps)?;
    let (w, h) = cam.resolution();

    let mut settings_panel = ControlPanel::stroke();
    let mut selector_panel = ControlPanel::selector();
    let mut windows = Windows::open(w as usize, h as usize, &settings_panel, &selector_panel)?;

    /* --- Reusable screen buffers --- */
    let mut view_fb = FrameBuffer::new(w as usize, h as usize);
    let mut mask_fb = FrameBuffer::new(w as usize, h as usize);
    let mut settings_fb = FrameBuffer::new(settings_panel.width(), settings_panel.height());
    let mut selector_fb = FrameBuffer::new(selector_panel.width(), selector_panel.height());

    let mut session = Session::new(w, h, args.screenshot_dir.clone());
    tracing::debug!(size = ?session.canvas().dimensions(), "canvas ready");
    let mut mouse = MouseEdge::default();
    let mut pacer = FramePacer::new(args.min_frame_time());
    let mut fps = FpsMeter::new();

    /* ------------------------------ Main loop ------------------------------ */
    let mut state = LoopState::Running;
    while state == LoopState::Running {
        if !windows.all_open() {
            break;
        }

        /* 1) Sliders: read-on-demand, dragged with the left mouse button. */
        settings_panel.handle_mouse(windows.settings.mouse_pos(), windows.settings.left_mouse_down());
        selector_panel.handle_mouse(windows.selector.mouse_pos(), windows.selector.left_mouse_down());
        let selector = SelectorSettings::from_panel(&selector_panel);
        let stroke = StrokeSettings::from_panel(&settings_panel);

        /* 2) Camera frame -> mask, tracking, ink, composite. */
        let frame = cam.next_frame()?;
        let out = session.process(frame, &selector, &stroke)?;

        /* 3) Present every panel. */
        mask_fb.fill_from_gray(&out.mask);
        view_fb.fill_from_rgb(&out.view);
        settings_panel.render(&mut settings_fb, stroke.swatch());
        selector_panel.render(&mut selector_fb, selector.swatch());

        windows.view.present(&view_fb)?;
        windows.mask.present(&mask_fb)?;
        windows.settings.present(&settings_fb)?;
        windows.selector.present(&selector_fb)?;

        /* 4) Input: mouse in the main window, then at most one key command. */
        if let Some(cmd) = mouse.update(windows.view.left_mouse_down()) {
            session.apply(cmd);
        }
        if let Some(cmd) = windows.keys().command() {
            state = session.apply(cmd);
        }

        fps.tick();
        pacer.wait();
    }

    // Dropping the camera stops the stream; windows close with their owners.
    tracing::info!("quitting");
    drop(windows);
    drop(cam);
    Ok(())
}
