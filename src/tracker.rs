// Blob locator + tracker state.
// Visual expectation: a yellow ring hugs the tracked marker and a red dot sits on
// its center; when the marker leaves the frame both disappear.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use imageproc::geometry::convex_hull;
use imageproc::point::Point as GridPoint;

use crate::types::{Circle, Detection, Point};

/// Blobs whose enclosing circle is smaller than this are treated as noise.
pub const MIN_RADIUS: f32 = 10.0;

const RING_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const DOT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const DOT_RADIUS: i32 = 5;
const EPS: f64 = 1e-7;

/// Previous and current centroid, advanced once per frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackerState {
    pub previous: Option<Point>,
    pub current: Option<Point>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift `current` into `previous`, then store this frame's result.
    pub fn advance(&mut self, next: Option<Point>) {
        self.previous = self.current;
        self.current = next;
    }

    /// The segment to ink this frame, when both ends were detected.
    pub fn segment(&self) -> Option<(Point, Point)> {
        Some((self.previous?, self.current?))
    }
}

/// Area and first-order moments of a closed polygon (Green's theorem).
/// Returned as (m00, m10, m01); m00 is made non-negative.
pub fn polygon_moments(points: &[GridPoint<i32>]) -> (f64, f64, f64) {
    let n = points.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }
    let (mut a, mut mx, mut my) = (0.0f64, 0.0f64, 0.0f64);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let (x0, y0, x1, y1) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        mx += (x0 + x1) * cross;
        my += (y0 + y1) * cross;
    }
    let (m00, m10, m01) = (a / 2.0, mx / 6.0, my / 6.0);
    if m00 < 0.0 { (-m00, -m10, -m01) } else { (m00, m10, m01) }
}

/// Enclosed area of a contour polygon.
pub fn contour_area(contour: &Contour<i32>) -> f64 {
    polygon_moments(&contour.points).0
}

/// Smallest circle containing every point (incremental Welzl over the hull).
pub fn min_enclosing_circle(points: &[GridPoint<i32>]) -> Circle {
    let hull = convex_hull(points);
    // collinear contours can collapse the hull; the raw points are still exact
    let source = if hull.len() >= 3 { &hull[..] } else { points };
    let pts: Vec<(f64, f64)> = source.iter().map(|p| (p.x as f64, p.y as f64)).collect();

    let Some(&first) = pts.first() else {
        return Circle { cx: 0.0, cy: 0.0, radius: 0.0 };
    };

    let mut c = (first.0, first.1, 0.0);
    for i in 1..pts.len() {
        if inside(c, pts[i]) { continue; }
        c = (pts[i].0, pts[i].1, 0.0);
        for j in 0..i {
            if inside(c, pts[j]) { continue; }
            c = diameter_circle(pts[i], pts[j]);
            for k in 0..j {
                if !inside(c, pts[k]) {
                    c = circumcircle(pts[i], pts[j], pts[k]);
                }
            }
        }
    }
    Circle { cx: c.0 as f32, cy: c.1 as f32, radius: c.2 as f32 }
}

#[inline]
fn inside(c: (f64, f64, f64), p: (f64, f64)) -> bool {
    let (dx, dy) = (p.0 - c.0, p.1 - c.1);
    (dx * dx + dy * dy).sqrt() <= c.2 + EPS
}

fn diameter_circle(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64) {
    let (cx, cy) = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let r = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
    (cx, cy, r)
}

fn circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> (f64, f64, f64) {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < EPS {
        // Collinear: the widest pair spans all three.
        let candidates = [diameter_circle(a, b), diameter_circle(a, c), diameter_circle(b, c)];
        return candidates
            .into_iter()
            .fold((0.0, 0.0, -1.0), |best, cand| if cand.2 > best.2 { cand } else { best });
    }
    let sa = a.0 * a.0 + a.1 * a.1;
    let sb = b.0 * b.0 + b.1 * b.1;
    let sc = c.0 * c.0 + c.1 * c.1;
    let ux = (sa * (b.1 - c.1) + sb * (c.1 - a.1) + sc * (a.1 - b.1)) / d;
    let uy = (sa * (c.0 - b.0) + sb * (a.0 - c.0) + sc * (b.0 - a.0)) / d;
    let r = ((a.0 - ux).powi(2) + (a.1 - uy).powi(2)).sqrt();
    (ux, uy, r)
}

/// Outer borders that are not nested inside another blob's hole.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect()
}

/// Find the largest blob in `mask` and compute its enclosing circle and centroid.
///
/// Returns `None` when the mask has no foreground. A returned detection carries
/// `centroid: None` when the blob is smaller than [`MIN_RADIUS`] or has zero area.
pub fn locate_blob(mask: &GrayImage) -> Option<Detection> {
    let contours = external_contours(mask);

    // First-found wins ties, so compare strictly.
    let mut best: Option<(&Contour<i32>, f64)> = None;
    for c in &contours {
        let area = contour_area(c);
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((c, area));
        }
    }
    let (contour, _) = best?;

    let circle = min_enclosing_circle(&contour.points);
    let (m00, m10, m01) = polygon_moments(&contour.points);

    let centroid = if m00 == 0.0 || circle.radius < MIN_RADIUS {
        None
    } else {
        Some(Point::new((m10 / m00).floor() as i32, (m01 / m00).floor() as i32))
    };

    Some(Detection { circle, centroid })
}

/// Yellow ring at the enclosing circle plus a red dot on the centroid.
pub fn annotate(frame: &mut RgbImage, det: &Detection) {
    if det.circle.radius >= MIN_RADIUS {
        let center = (det.circle.cx as i32, det.circle.cy as i32);
        let r = det.circle.radius as i32;
        // two 1px rings make a 2px outline
        draw_hollow_circle_mut(frame, center, r, RING_COLOR);
        draw_hollow_circle_mut(frame, center, r - 1, RING_COLOR);
    }
    if let Some(c) = det.centroid {
        draw_dot(frame, c, DOT_COLOR);
    }
}

/// Filled dot the size of the centroid marker.
pub fn draw_dot(frame: &mut RgbImage, at: Point, color: Rgb<u8>) {
    draw_filled_circle_mut(frame, (at.x, at.y), DOT_RADIUS, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn disc_mask(w: u32, h: u32, cx: i32, cy: i32, r: i32) -> GrayImage {
        let mut m = GrayImage::new(w, h);
        draw_filled_circle_mut(&mut m, (cx, cy), r, Luma([255u8]));
        m
    }

    #[test]
    fn solid_disc_reports_its_center() {
        let mask = disc_mask(200, 200, 100, 80, 20);
        let det = locate_blob(&mask).expect("blob");
        let c = det.centroid.expect("present");
        assert!((c.x - 100).abs() <= 1, "x={}", c.x);
        assert!((c.y - 80).abs() <= 1, "y={}", c.y);
        assert!((det.circle.radius - 20.0).abs() <= 1.5, "r={}", det.circle.radius);
    }

    #[test]
    fn rectangle_centroid_is_floored() {
        let mut mask = GrayImage::new(120, 140);
        for y in 60..100 {
            for x in 40..80 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let det = locate_blob(&mask).expect("blob");
        // boundary polygon runs through pixel centers 40..=79, 60..=99
        assert_eq!(det.centroid, Some(Point::new(59, 79)));
    }

    #[test]
    fn empty_mask_has_no_detection() {
        let mask = GrayImage::new(64, 48);
        assert!(locate_blob(&mask).is_none());
    }

    #[test]
    fn small_blob_is_rejected() {
        let mask = disc_mask(100, 100, 50, 50, 5);
        let det = locate_blob(&mask).expect("contour exists");
        assert!(det.circle.radius < MIN_RADIUS);
        assert_eq!(det.centroid, None);
    }

    #[test]
    fn zero_area_contour_is_absent() {
        // a one pixel wide line has a degenerate polygon but a wide circle
        let mut mask = GrayImage::new(100, 10);
        for x in 10..90 {
            mask.put_pixel(x, 5, Luma([255]));
        }
        let det = locate_blob(&mask).expect("contour exists");
        assert!(det.circle.radius >= MIN_RADIUS);
        assert_eq!(det.centroid, None);
    }

    #[test]
    fn largest_blob_wins() {
        let mut mask = disc_mask(300, 200, 60, 100, 15);
        draw_filled_circle_mut(&mut mask, (200, 100), 40, Luma([255u8]));
        let c = locate_blob(&mask).and_then(|d| d.centroid).expect("present");
        assert!((c.x - 200).abs() <= 1 && (c.y - 100).abs() <= 1, "{c:?}");
    }

    #[test]
    fn hole_inside_blob_is_ignored() {
        let mut mask = disc_mask(200, 200, 100, 100, 50);
        draw_filled_circle_mut(&mut mask, (100, 100), 20, Luma([0u8]));
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn enclosing_circle_of_square_corners() {
        let pts = [
            GridPoint::new(0, 0),
            GridPoint::new(10, 0),
            GridPoint::new(10, 10),
            GridPoint::new(0, 10),
            GridPoint::new(5, 5),
        ];
        let c = min_enclosing_circle(&pts);
        assert!((c.cx - 5.0).abs() < 1e-4 && (c.cy - 5.0).abs() < 1e-4);
        assert!((c.radius - 50f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn tracker_shifts_current_into_previous() {
        let mut t = TrackerState::new();
        assert_eq!(t.segment(), None);
        t.advance(Some(Point::new(1, 2)));
        assert_eq!(t.segment(), None);
        t.advance(Some(Point::new(3, 4)));
        assert_eq!(t.segment(), Some((Point::new(1, 2), Point::new(3, 4))));
        t.advance(None);
        assert_eq!(t.previous, Some(Point::new(3, 4)));
        assert_eq!(t.segment(), None);
        t.advance(Some(Point::new(5, 6)));
        assert_eq!(t.previous, None);
        assert_eq!(t.segment(), None);
    }

    #[test]
    fn annotate_draws_ring_and_dot() {
        let mut frame = RgbImage::new(200, 200);
        let det = Detection {
            circle: Circle { cx: 100.0, cy: 100.0, radius: 30.0 },
            centroid: Some(Point::new(100, 100)),
        };
        annotate(&mut frame, &det);
        assert_eq!(*frame.get_pixel(100, 100), DOT_COLOR);
        assert_eq!(*frame.get_pixel(130, 100), RING_COLOR);
        assert_eq!(*frame.get_pixel(115, 100), Rgb([0, 0, 0]));
    }
}
