//! Screen-space geometry shared by the renderers.

use crate::layout::{Bounds, Point};
use crate::scene::{node_radius_pt, EdgeMark};
use crate::style::ArrowHead;

const POINTS_PER_INCH: f32 = 72.0;
/// Arrowhead length in points.
const ARROW_SIZE: f32 = 10.0;

/// Maps layout units to pixels (y down) and back. Axes scale independently,
/// matching how a stretched plot canvas behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub data: Bounds,
    pub width: f32,
    pub height: f32,
    pub px_per_pt: f32,
}

impl Viewport {
    /// `data` shown on a `width` x `height` canvas standing in for a square
    /// figure of `figure_inches`.
    pub fn new(data: Bounds, width: f32, height: f32, figure_inches: f32) -> Self {
        let px_per_pt = width.min(height).max(1.0) / (figure_inches * POINTS_PER_INCH);
        Self {
            data,
            width: width.max(1.0),
            height: height.max(1.0),
            px_per_pt,
        }
    }

    /// Square window `[-half, half]` on both axes.
    pub fn centered(half: f64, width: f32, height: f32, figure_inches: f32) -> Self {
        let data = Bounds {
            min: Point::new(-half, -half),
            max: Point::new(half, half),
        };
        Self::new(data, width, height, figure_inches)
    }

    /// `bounds` grown by `margin` (fraction of the larger side) on every side.
    pub fn fit(bounds: Bounds, margin: f64, width: f32, height: f32, figure_inches: f32) -> Self {
        let span = bounds.width().max(bounds.height()).max(1e-6);
        let pad = span * margin;
        let data = Bounds {
            min: Point::new(bounds.min.x - pad, bounds.min.y - pad),
            max: Point::new(bounds.max.x + pad, bounds.max.y + pad),
        };
        Self::new(data, width, height, figure_inches)
    }

    pub fn to_px(&self, p: Point) -> (f32, f32) {
        let fx = (p.x - self.data.min.x) / self.data.width().max(1e-12);
        let fy = (self.data.max.y - p.y) / self.data.height().max(1e-12);
        (fx as f32 * self.width, fy as f32 * self.height)
    }

    pub fn to_data(&self, px: f32, py: f32) -> Point {
        let x = self.data.min.x + (px / self.width) as f64 * self.data.width();
        let y = self.data.max.y - (py / self.height) as f64 * self.data.height();
        Point::new(x, y)
    }

    pub fn pt(&self, points: f32) -> f32 {
        points * self.px_per_pt
    }
}

/// An edge resolved to pixels: straight or quadratic, trimmed to the node
/// rims, with its arrowhead.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub start: (f32, f32),
    pub ctrl: Option<(f32, f32)>,
    pub end: (f32, f32),
    pub width: f32,
    /// Tip, then the two barbs.
    pub head: [(f32, f32); 3],
    pub filled_head: bool,
}

fn sub(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    (a.0 - b.0, a.1 - b.1)
}

fn norm(v: (f32, f32)) -> Option<(f32, f32)> {
    let len = (v.0 * v.0 + v.1 * v.1).sqrt();
    if len < 1e-6 {
        None
    } else {
        Some((v.0 / len, v.1 / len))
    }
}

/// arc3 control point in pixel space (y down).
pub fn arc_control(a: (f32, f32), b: (f32, f32), rad: f32) -> (f32, f32) {
    let mid = ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5);
    let (dx, dy) = sub(b, a);
    (mid.0 - rad * dy, mid.1 + rad * dx)
}

impl EdgePath {
    /// `None` when both ends coincide.
    pub fn resolve(edge: &EdgeMark, vp: &Viewport) -> Option<Self> {
        let a = vp.to_px(edge.from);
        let b = vp.to_px(edge.to);
        norm(sub(b, a))?;

        let ctrl = (edge.curvature != 0.0).then(|| arc_control(a, b, edge.curvature));
        let out_dir = norm(sub(ctrl.unwrap_or(b), a))?;
        let in_dir = norm(sub(b, ctrl.unwrap_or(a)))?;

        let rim = vp.pt(node_radius_pt(edge.node_area));
        let start = (a.0 + out_dir.0 * rim, a.1 + out_dir.1 * rim);
        let end = (b.0 - in_dir.0 * rim, b.1 - in_dir.1 * rim);

        let len = vp.pt(ARROW_SIZE).max(3.0);
        let half = match edge.arrow {
            ArrowHead::Wedge => len * 0.5,
            ArrowHead::Open => len * 0.35,
        };
        let base = (end.0 - in_dir.0 * len, end.1 - in_dir.1 * len);
        let perp = (-in_dir.1, in_dir.0);
        let head = [
            end,
            (base.0 + perp.0 * half, base.1 + perp.1 * half),
            (base.0 - perp.0 * half, base.1 - perp.1 * half),
        ];

        Some(Self {
            start,
            ctrl,
            end,
            width: vp.pt(edge.width).max(0.5),
            head,
            filled_head: edge.arrow == ArrowHead::Wedge,
        })
    }

    /// Points along the path, both ends included.
    pub fn sample(&self, segments: usize) -> Vec<(f32, f32)> {
        let Some(c) = self.ctrl else {
            return vec![self.start, self.end];
        };
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                let u = 1.0 - t;
                (
                    u * u * self.start.0 + 2.0 * u * t * c.0 + t * t * self.end.0,
                    u * u * self.start.1 + 2.0 * u * t * c.1 + t * t * self.end.1,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgba;

    fn edge(curvature: f32) -> EdgeMark {
        EdgeMark {
            from: Point::new(-2.0, 0.0),
            to: Point::new(2.0, 0.0),
            width: 1.0,
            color: Rgba::BLACK,
            curvature,
            arrow: ArrowHead::Wedge,
            node_area: 400.0,
        }
    }

    #[test]
    fn pixel_mapping_matches_fixed_window() {
        let vp = Viewport::centered(3.0, 600.0, 300.0, 12.0);
        assert_eq!(vp.to_px(Point::new(-3.0, 3.0)), (0.0, 0.0));
        assert_eq!(vp.to_px(Point::new(0.0, 0.0)), (300.0, 150.0));
        // x = px*6/W - 3, y = -(py*6/H) + 3
        let p = vp.to_data(450.0, 75.0);
        assert!((p.x - 1.5).abs() < 1e-9);
        assert!((p.y - 1.5).abs() < 1e-9);
    }

    #[test]
    fn fit_adds_margin() {
        let b = Bounds {
            min: Point::new(-1.0, -1.0),
            max: Point::new(1.0, 1.0),
        };
        let vp = Viewport::fit(b, 0.1, 100.0, 100.0, 10.0);
        assert!((vp.data.min.x + 1.2).abs() < 1e-9);
        assert!((vp.data.max.y - 1.2).abs() < 1e-9);
    }

    #[test]
    fn straight_edge_is_trimmed_to_rims() {
        // 864 px for a 12 inch figure: one point is one pixel.
        let vp = Viewport::centered(3.0, 864.0, 864.0, 12.0);
        let p = EdgePath::resolve(&edge(0.0), &vp).unwrap();
        let (ax, _) = vp.to_px(Point::new(-2.0, 0.0));
        let (bx, _) = vp.to_px(Point::new(2.0, 0.0));
        assert!((p.start.0 - (ax + 10.0)).abs() < 1e-3);
        assert!((p.end.0 - (bx - 10.0)).abs() < 1e-3);
        assert_eq!(p.ctrl, None);
        assert_eq!(p.sample(8).len(), 2);
        assert!(p.filled_head);
    }

    #[test]
    fn curved_edge_bends_off_the_chord() {
        let vp = Viewport::centered(3.0, 600.0, 600.0, 12.0);
        let p = EdgePath::resolve(&edge(0.3), &vp).unwrap();
        let c = p.ctrl.unwrap();
        // Left to right, a positive bend drops below the chord (larger y).
        assert!((c.0 - 300.0).abs() < 1e-3);
        assert!((c.1 - 420.0).abs() < 1e-3);
        let pts = p.sample(10);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], p.start);
        assert_eq!(pts[10], p.end);
    }

    #[test]
    fn coincident_ends_yield_nothing() {
        let vp = Viewport::centered(3.0, 600.0, 600.0, 12.0);
        let mut e = edge(0.0);
        e.to = e.from;
        assert!(EdgePath::resolve(&e, &vp).is_none());
    }
}
