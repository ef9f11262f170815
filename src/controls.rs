// Slider panels: a color swatch on top, one draggable slider per row below.
// Visual: hold the left mouse button on a row and the knob follows the cursor;
// the swatch shows the resulting stroke color or selector color.

use crate::draw::{draw_text_5x7, fill_rect};
use crate::segment::hsv_to_rgb;
use crate::types::{pack_rgb, FrameBuffer, SelectorSettings, StrokeSettings};

pub const PANEL_WIDTH: usize = 500;
pub const SWATCH_HEIGHT: usize = 120;
const ROW_HEIGHT: usize = 24;
const TRACK_X0: i32 = 96;
const TRACK_X1: i32 = 440;

const BACKGROUND: u32 = 0x00_20_20_20;
const TRACK: u32 = 0x00_70_70_70;
const KNOB: u32 = 0x00_E0_E0_E0;
const TEXT: u32 = 0x00_FF_FF_FF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    pub label: &'static str,
    pub value: u32,
    pub max: u32,
}

impl Slider {
    pub fn new(label: &'static str, value: u32, max: u32) -> Self {
        Self { label, value: value.min(max), max }
    }

    /// Map a window x coordinate on the track to a value in `0..=max`.
    pub fn set_from_x(&mut self, x: i32) {
        let span = (TRACK_X1 - TRACK_X0) as f32;
        let t = ((x - TRACK_X0) as f32 / span).clamp(0.0, 1.0);
        self.value = (t * self.max as f32).round() as u32;
    }

    fn knob_x(&self) -> i32 {
        if self.max == 0 {
            return TRACK_X0;
        }
        TRACK_X0 + ((TRACK_X1 - TRACK_X0) as u64 * self.value as u64 / self.max as u64) as i32
    }
}

/// A swatch plus a column of sliders, polled every frame.
pub struct ControlPanel {
    sliders: Vec<Slider>,
}

impl ControlPanel {
    pub fn new(sliders: Vec<Slider>) -> Self {
        Self { sliders }
    }

    /// Red, green, blue and line width, all defaulting to bright white 10 px ink.
    pub fn stroke() -> Self {
        let d = StrokeSettings::default();
        Self::new(vec![
            Slider::new("R", d.r as u32, 255),
            Slider::new("G", d.g as u32, 255),
            Slider::new("B", d.b as u32, 255),
            Slider::new("Line Width", d.width, 100),
        ])
    }

    /// Hue, saturation, value and hue tolerance.
    pub fn selector() -> Self {
        let d = SelectorSettings::default();
        Self::new(vec![
            Slider::new("Hue", d.hue as u32, 180),
            Slider::new("Saturation", d.saturation as u32, 255),
            Slider::new("Value", d.value as u32, 255),
            Slider::new("Range", d.range as u32, 20),
        ])
    }

    pub fn width(&self) -> usize {
        PANEL_WIDTH
    }

    pub fn height(&self) -> usize {
        SWATCH_HEIGHT + self.sliders.len() * ROW_HEIGHT + 8
    }

    /// Current value of the slider with this label; 0 for unknown labels.
    pub fn value(&self, label: &str) -> u32 {
        self.sliders
            .iter()
            .find(|s| s.label == label)
            .map_or(0, |s| s.value)
    }

    /// While the button is held over a slider row, move that slider to the cursor.
    /// Returns true when a value changed.
    pub fn handle_mouse(&mut self, pos: Option<(usize, usize)>, down: bool) -> bool {
        let Some((x, y)) = pos else { return false };
        if !down || y < SWATCH_HEIGHT {
            return false;
        }
        let row = (y - SWATCH_HEIGHT) / ROW_HEIGHT;
        let Some(slider) = self.sliders.get_mut(row) else { return false };
        let before = slider.value;
        slider.set_from_x(x as i32);
        if slider.value != before {
            tracing::trace!(label = slider.label, value = slider.value, "slider moved");
        }
        slider.value != before
    }

    /// Paint the swatch and every slider row into `fb`.
    pub fn render(&self, fb: &mut FrameBuffer, swatch: u32) {
        fb.pixels.fill(BACKGROUND);
        fill_rect(fb, 0, 0, PANEL_WIDTH as i32, SWATCH_HEIGHT as i32, swatch);

        for (i, s) in self.sliders.iter().enumerate() {
            let y = (SWATCH_HEIGHT + i * ROW_HEIGHT) as i32;
            draw_text_5x7(fb, 8, y + 8, s.label, TEXT);
            fill_rect(fb, TRACK_X0, y + 11, TRACK_X1 - TRACK_X0, 2, TRACK);
            fill_rect(fb, s.knob_x() - 3, y + 5, 6, 14, KNOB);
            draw_text_5x7(fb, TRACK_X1 + 12, y + 8, &s.value.to_string(), TEXT);
        }
    }
}

impl StrokeSettings {
    pub fn from_panel(panel: &ControlPanel) -> Self {
        Self {
            r: panel.value("R") as u8,
            g: panel.value("G") as u8,
            b: panel.value("B") as u8,
            width: panel.value("Line Width"),
        }
    }

    /// Packed swatch color for the settings panel.
    pub fn swatch(&self) -> u32 {
        pack_rgb(self.r, self.g, self.b)
    }
}

impl SelectorSettings {
    pub fn from_panel(panel: &ControlPanel) -> Self {
        Self {
            hue: panel.value("Hue") as u8,
            saturation: panel.value("Saturation") as u8,
            value: panel.value("Value") as u8,
            range: panel.value("Range") as u8,
        }
    }

    /// The selected HSV color shown as RGB.
    pub fn swatch(&self) -> u32 {
        let [r, g, b] = hsv_to_rgb(self.hue, self.saturation, self.value);
        pack_rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_controls() {
        assert_eq!(StrokeSettings::from_panel(&ControlPanel::stroke()), StrokeSettings::default());
        assert_eq!(
            SelectorSettings::from_panel(&ControlPanel::selector()),
            SelectorSettings { hue: 0, saturation: 255, value: 255, range: 5 }
        );
        let maxima: Vec<u32> = ControlPanel::selector().sliders.iter().map(|s| s.max).collect();
        assert_eq!(maxima, vec![180, 255, 255, 20]);
    }

    #[test]
    fn dragging_clamps_to_track_ends() {
        let mut s = Slider::new("Range", 5, 20);
        s.set_from_x(0);
        assert_eq!(s.value, 0);
        s.set_from_x(10_000);
        assert_eq!(s.value, 20);
        s.set_from_x((TRACK_X0 + TRACK_X1) / 2);
        assert_eq!(s.value, 10);
    }

    #[test]
    fn mouse_only_moves_the_row_under_the_cursor() {
        let mut p = ControlPanel::stroke();
        let row_y = SWATCH_HEIGHT + 3 * ROW_HEIGHT + 5; // "Line Width"
        assert!(p.handle_mouse(Some((TRACK_X0 as usize, row_y)), true));
        assert_eq!(p.value("Line Width"), 0);
        assert_eq!(p.value("R"), 255);

        // released, or over the swatch: nothing moves
        assert!(!p.handle_mouse(Some((TRACK_X1 as usize, row_y)), false));
        assert!(!p.handle_mouse(Some((TRACK_X0 as usize, 10)), true));
        assert!(!p.handle_mouse(None, true));
        assert_eq!(p.value("Line Width"), 0);
    }

    #[test]
    fn render_fills_swatch_and_fits_buffer() {
        let p = ControlPanel::selector();
        let mut fb = FrameBuffer::new(p.width(), p.height());
        let sel = SelectorSettings::from_panel(&p);
        p.render(&mut fb, sel.swatch());
        assert_eq!(fb.pixels[0], pack_rgb(255, 0, 0));
        assert_eq!(fb.pixels.len(), p.width() * p.height());
    }
}
