//! Coordinate mapping between screen, canvas and overlay-local space.
//!
//! ```text
//! screen = canvas * zoom + viewportCenter + offset
//! canvas = (screen - viewportCenter - offset) / zoom
//! ```
//!
//! Overlay-local coordinates are measured from the unrotated top-left of an
//! [`OverlayBounds`]; they are rotated about the overlay pivot to reach
//! canvas space.

use serde::{Deserialize, Serialize};

use crate::bounds::OverlayBounds;
use crate::geometry::{Point, Rect};
use crate::transform::Transform;

/// Smallest zoom used for division, regardless of configuration.
pub const ZOOM_EPSILON: f64 = 0.0001;

/// Pan/zoom state of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Viewport width in screen pixels.
    pub width: f64,
    /// Viewport height in screen pixels.
    pub height: f64,
    /// Horizontal pan offset in screen pixels.
    pub offset_x: f64,
    /// Vertical pan offset in screen pixels.
    pub offset_y: f64,
    /// Zoom factor (1.0 = 100%).
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    /// Create an unpanned, unzoomed viewport of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }

    /// Zoom with the division-safe floor applied.
    #[must_use]
    pub fn effective_zoom(&self) -> f64 {
        if self.zoom.is_finite() {
            self.zoom.max(ZOOM_EPSILON)
        } else {
            1.0
        }
    }

    /// Center of the viewport in screen pixels.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether the viewport has a finite, positive size.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Convert a screen point to canvas coordinates.
    #[must_use]
    pub fn viewport_to_canvas(&self, screen: Point) -> Point {
        let zoom = self.effective_zoom();
        let center = self.center();
        Point::new(
            (screen.x - center.x - self.offset_x) / zoom,
            (screen.y - center.y - self.offset_y) / zoom,
        )
    }

    /// Convert a canvas point to screen coordinates.
    #[must_use]
    pub fn canvas_to_viewport(&self, canvas: Point) -> Point {
        let zoom = self.effective_zoom();
        let center = self.center();
        Point::new(
            canvas.x * zoom + center.x + self.offset_x,
            canvas.y * zoom + center.y + self.offset_y,
        )
    }

    /// Convert a screen-space distance to canvas units.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, distance: f64) -> f64 {
        distance / self.effective_zoom()
    }

    /// The canvas-space rectangle currently visible.
    #[must_use]
    pub fn visible_canvas_rect(&self) -> Rect {
        Rect::from_corners(
            self.viewport_to_canvas(Point::new(0.0, 0.0)),
            self.viewport_to_canvas(Point::new(self.width, self.height)),
        )
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Multiply the zoom by `factor`, clamped to `[min_zoom, max_zoom]`,
    /// keeping the canvas point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64, min_zoom: f64, max_zoom: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::debug!("Ignoring zoom factor {factor}");
            return;
        }
        let anchor = self.viewport_to_canvas(screen);
        let upper = max_zoom.max(ZOOM_EPSILON);
        let lower = min_zoom.max(ZOOM_EPSILON).min(upper);
        let zoom = (self.effective_zoom() * factor).clamp(lower, upper);
        let center = self.center();
        self.zoom = zoom;
        self.offset_x = screen.x - center.x - anchor.x * zoom;
        self.offset_y = screen.y - center.y - anchor.y * zoom;
    }

    /// Resize the viewport, keeping pan and zoom.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

/// Map an overlay-local point to canvas space.
///
/// `delta = local - overlaySize * origin`, rotated by `transform.rotate`
/// and added to the pivot.
#[must_use]
pub fn overlay_local_to_canvas(local: Point, overlay: &OverlayBounds, transform: &Transform) -> Point {
    let delta = local - overlay.size().scaled(transform.origin_x, transform.origin_y);
    overlay.pivot() + delta.rotated(transform.rotate)
}

/// Inverse of [`overlay_local_to_canvas`].
#[must_use]
pub fn canvas_to_overlay_local(canvas: Point, overlay: &OverlayBounds, transform: &Transform) -> Point {
    let delta = (canvas - overlay.pivot()).rotated(-transform.rotate);
    delta + overlay.size().scaled(transform.origin_x, transform.origin_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::compute_overlay_bounds;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_center_maps_to_canvas_origin() {
        let vp = Viewport::new(800.0, 600.0);
        let c = vp.viewport_to_canvas(Point::new(400.0, 300.0));
        assert!(c.x.abs() < EPS && c.y.abs() < EPS);
    }

    #[test]
    fn test_offset_and_zoom() {
        let vp = Viewport {
            offset_x: 100.0,
            offset_y: -50.0,
            zoom: 2.0,
            ..Viewport::new(800.0, 600.0)
        };
        let c = vp.viewport_to_canvas(Point::new(700.0, 250.0));
        assert!((c.x - 100.0).abs() < EPS);
        assert!(c.y.abs() < EPS);
    }

    #[test]
    fn test_zero_zoom_is_floored() {
        let vp = Viewport {
            zoom: 0.0,
            ..Viewport::new(100.0, 100.0)
        };
        let c = vp.viewport_to_canvas(Point::new(60.0, 50.0));
        assert!(c.x.is_finite());
        assert!((c.x - 10.0 / ZOOM_EPSILON).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_at_with_range_below_floor() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom_at(Point::new(400.0, 300.0), 1.1, 1e-5, 5e-5);
        assert!((vp.zoom - ZOOM_EPSILON).abs() < f64::EPSILON);
        vp.zoom_at(Point::new(400.0, 300.0), 1.1, 2.0, 1.0);
        assert!(vp.zoom.is_finite());
        vp.zoom_at(Point::new(400.0, 300.0), 1.1, f64::NAN, f64::NAN);
        assert!((vp.zoom - ZOOM_EPSILON).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::new(800.0, 600.0);
        let cursor = Point::new(620.0, 140.0);
        let before = vp.viewport_to_canvas(cursor);
        vp.zoom_at(cursor, 1.5, 0.1, 10.0);
        let after = vp.viewport_to_canvas(cursor);
        assert!((vp.zoom - 1.5).abs() < EPS);
        assert!((before.x - after.x).abs() < EPS);
        assert!((before.y - after.y).abs() < EPS);
    }

    #[test]
    fn test_zoom_at_clamps() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom_at(Point::new(0.0, 0.0), 1000.0, 0.1, 8.0);
        assert!((vp.zoom - 8.0).abs() < EPS);
        vp.zoom_at(Point::new(0.0, 0.0), -1.0, 0.1, 8.0);
        assert!((vp.zoom - 8.0).abs() < EPS);
    }

    #[test]
    fn test_visible_canvas_rect() {
        let vp = Viewport {
            zoom: 2.0,
            ..Viewport::new(800.0, 600.0)
        };
        let r = vp.visible_canvas_rect();
        assert_eq!(r, Rect::new(-200.0, -150.0, 400.0, 300.0));
    }

    #[test]
    fn test_overlay_local_origin_point_is_pivot() {
        let geometry = Rect::new(0.0, 0.0, 100.0, 40.0);
        let transform = Transform {
            rotate: 30.0,
            origin_x: 0.25,
            origin_y: 0.75,
            ..Transform::identity()
        };
        let overlay = compute_overlay_bounds(&geometry, &transform).expect("valid");
        let p = overlay_local_to_canvas(Point::new(25.0, 30.0), &overlay, &transform);
        assert!((p.x - overlay.pivot_x).abs() < EPS);
        assert!((p.y - overlay.pivot_y).abs() < EPS);
    }

    proptest! {
        #[test]
        fn prop_screen_canvas_roundtrip(
            sx in -4000.0f64..4000.0,
            sy in -4000.0f64..4000.0,
            ox in -2000.0f64..2000.0,
            oy in -2000.0f64..2000.0,
            zoom in 0.001f64..50.0,
        ) {
            let vp = Viewport { offset_x: ox, offset_y: oy, zoom, ..Viewport::new(1920.0, 1080.0) };
            let p = Point::new(sx, sy);
            let back = vp.canvas_to_viewport(vp.viewport_to_canvas(p));
            prop_assert!((back.x - p.x).abs() < 1e-6);
            prop_assert!((back.y - p.y).abs() < 1e-6);
        }

        #[test]
        fn prop_overlay_local_roundtrip(
            lx in -500.0f64..500.0,
            ly in -500.0f64..500.0,
            rotate in -360.0f64..360.0,
            sx in 0.1f64..4.0,
            sy in 0.1f64..4.0,
            ox in 0.0f64..=1.0,
            oy in 0.0f64..=1.0,
        ) {
            let geometry = Rect::new(-30.0, 12.0, 75.0, 40.0);
            let transform = Transform {
                translate_x: 11.0,
                translate_y: -4.0,
                rotate,
                scale_x: sx,
                scale_y: sy,
                origin_x: ox,
                origin_y: oy,
            };
            let overlay = compute_overlay_bounds(&geometry, &transform).expect("valid");
            let local = Point::new(lx, ly);
            let back = canvas_to_overlay_local(
                overlay_local_to_canvas(local, &overlay, &transform),
                &overlay,
                &transform,
            );
            prop_assert!((back.x - local.x).abs() < 1e-6);
            prop_assert!((back.y - local.y).abs() < 1e-6);
        }
    }
}
