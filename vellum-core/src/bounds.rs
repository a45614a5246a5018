//! Displayed (post-transform) bounding geometry for selection overlays.

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryBounds, Point, Rect};
use crate::transform::Transform;

/// Post-scale bounding box of an item plus the canvas-space pivot its
/// rotation is applied around.
///
/// This is a derived value: recompute it whenever geometry or transform
/// changes and never persist it. A negative scale produces a negative
/// width or height; [`OverlayBounds::displayed_rect`] normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBounds {
    /// Left edge before rotation.
    pub x: f64,
    /// Top edge before rotation.
    pub y: f64,
    /// Displayed width (`geometry width * scaleX`).
    pub width: f64,
    /// Displayed height (`geometry height * scaleY`).
    pub height: f64,
    /// Pivot x in canvas space.
    pub pivot_x: f64,
    /// Pivot y in canvas space.
    pub pivot_y: f64,
}

impl OverlayBounds {
    /// Top-left corner before rotation.
    #[must_use]
    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Displayed size as a vector.
    #[must_use]
    pub const fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Rotation pivot in canvas space.
    #[must_use]
    pub const fn pivot(&self) -> Point {
        Point::new(self.pivot_x, self.pivot_y)
    }

    /// The unrotated displayed box with non-negative extent.
    #[must_use]
    pub fn displayed_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height).normalized()
    }

    /// Canvas-space corners after rotating by `rotate` degrees about the
    /// pivot, clockwise from top-left.
    #[must_use]
    pub fn rotated_corners(&self, rotate: f64) -> [Point; 4] {
        let pivot = self.pivot();
        let corners = [
            self.top_left(),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ];
        corners.map(|c| pivot + (c - pivot).rotated(rotate))
    }

    /// Axis-aligned box enclosing the rotated overlay.
    #[must_use]
    pub fn bounding_box(&self, rotate: f64) -> Rect {
        if rotate == 0.0 {
            return self.displayed_rect();
        }
        Rect::from_points(self.rotated_corners(rotate)).unwrap_or_else(|| self.displayed_rect())
    }
}

/// Compute overlay bounds from raw geometry bounds and a transform.
///
/// The origin-fraction point of the geometry stays fixed while scale is
/// applied around it:
///
/// ```text
/// displayed = geomSize * scale
/// topLeft   = geomOrigin + translate + geomSize * origin - displayed * origin
/// pivot     = topLeft + displayed * origin
/// ```
///
/// Returns `None` for invalid (zero, negative or non-finite) bounds so
/// callers skip hit-testing and handle placement.
#[must_use]
pub fn compute_overlay_bounds(
    geometry: &GeometryBounds,
    transform: &Transform,
) -> Option<OverlayBounds> {
    if !geometry.is_valid() {
        tracing::trace!("Skipping overlay for degenerate bounds {geometry:?}");
        return None;
    }
    let displayed = geometry.size().scaled(transform.scale_x, transform.scale_y);
    let origin = transform.origin();
    let top_left = geometry.origin() + transform.translation() + geometry.size().scaled(origin.x, origin.y)
        - displayed.scaled(origin.x, origin.y);
    let pivot = top_left + displayed.scaled(origin.x, origin.y);
    Some(OverlayBounds {
        x: top_left.x,
        y: top_left.y,
        width: displayed.x,
        height: displayed.y,
        pivot_x: pivot.x,
        pivot_y: pivot.y,
    })
}

/// Displayed bounding box of an item: the overlay box, rotated about its
/// pivot and re-enclosed axis-aligned.
#[must_use]
pub fn displayed_bounds(geometry: &GeometryBounds, transform: &Transform) -> Option<Rect> {
    compute_overlay_bounds(geometry, transform).map(|o| o.bounding_box(transform.rotate))
}
