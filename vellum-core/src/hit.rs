//! Hit-testing of items, overlay handles and path points.

use serde::{Deserialize, Serialize};

use crate::bounds::OverlayBounds;
use crate::config::EditorConfig;
use crate::geometry::{point_in_ellipse, GeometryBounds, Point, Rect};
use crate::item::{Geometry, Item, ItemKind, PathPoint};
use crate::mapper::{overlay_local_to_canvas, Viewport};
use crate::transform::Transform;

/// One of the eight resize handles around an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAnchor {
    /// Top-left corner.
    Nw,
    /// Top edge midpoint.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge midpoint.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge midpoint.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge midpoint.
    W,
}

impl ResizeAnchor {
    /// All anchors, clockwise from the top-left.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
    ];

    /// Position as a fraction of the overlay box.
    #[must_use]
    pub const fn fraction(self) -> (f64, f64) {
        match self {
            Self::Nw => (0.0, 0.0),
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
        }
    }

    /// The anchor across the box.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Nw => Self::Se,
            Self::N => Self::S,
            Self::Ne => Self::Sw,
            Self::E => Self::W,
            Self::Se => Self::Nw,
            Self::S => Self::N,
            Self::Sw => Self::Ne,
            Self::W => Self::E,
        }
    }

    /// Whether dragging this handle resizes horizontally.
    #[must_use]
    pub const fn resizes_x(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }

    /// Whether dragging this handle resizes vertically.
    #[must_use]
    pub const fn resizes_y(self) -> bool {
        !matches!(self, Self::E | Self::W)
    }

    /// Whether this is a corner handle.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        self.resizes_x() && self.resizes_y()
    }
}

/// Which overlay handle is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "anchor", rename_all = "lowercase")]
pub enum HandleHit {
    /// The rotation grip above the top edge.
    Rotate,
    /// A resize handle.
    Resize(ResizeAnchor),
}

/// Handle dimensions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Side length of a handle square.
    pub handle_size: f64,
    /// Distance from the top edge to the rotation grip.
    pub rotation_arm: f64,
}

impl From<&EditorConfig> for HandleMetrics {
    fn from(config: &EditorConfig) -> Self {
        Self {
            handle_size: config.handle_size_px,
            rotation_arm: config.rotation_arm_px,
        }
    }
}

impl Default for HandleMetrics {
    fn default() -> Self {
        Self {
            handle_size: 8.0,
            rotation_arm: 24.0,
        }
    }
}

/// Does `item` contain the canvas point `p`?
///
/// `displayed` is the item's post-transform bounding box (from the store's
/// bounds lookup). Containers never hit.
#[must_use]
pub fn hit_test_item(item: &Item, displayed: Option<Rect>, p: Point, path_tolerance: f64) -> bool {
    match item.kind {
        ItemKind::Group | ItemKind::Layer => false,
        ItemKind::Rectangle | ItemKind::Text => displayed.is_some_and(|r| r.contains(p)),
        ItemKind::Ellipse => {
            let Geometry::Ellipse {
                center_x,
                center_y,
                radius_x,
                radius_y,
            } = item.geometry
            else {
                return false;
            };
            let Some(bounds) = item.geometry_bounds() else {
                return false;
            };
            // Test in geometry space so rotation and scale are honored.
            item.transform
                .unmap_point(&bounds, p)
                .is_some_and(|local| point_in_ellipse(local, Point::new(center_x, center_y), radius_x, radius_y))
        }
        ItemKind::Path => displayed.is_some_and(|r| {
            r.expanded(item.stroke_width() / 2.0 + path_tolerance)
                .contains(p)
        }),
    }
}

/// Topmost item under the canvas point `p`, or `None`.
///
/// Items are visited from last (top of paint order) to first. Hidden and
/// locked items are skipped.
pub fn hit_test<F>(items: &[Item], p: Point, bounds_lookup: F, path_tolerance: f64) -> Option<usize>
where
    F: Fn(usize) -> Option<Rect>,
{
    items
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, item)| item.visible && !item.locked)
        .find(|(index, item)| hit_test_item(item, bounds_lookup(*index), p, path_tolerance))
        .map(|(index, _)| index)
}

/// Canvas position of the rotation grip.
#[must_use]
pub fn rotation_handle_position(overlay: &OverlayBounds, transform: &Transform, metrics: &HandleMetrics) -> Point {
    let local = Point::new(
        overlay.width / 2.0,
        -metrics.rotation_arm - metrics.handle_size / 2.0,
    );
    overlay_local_to_canvas(local, overlay, transform)
}

/// Canvas position of a resize handle.
#[must_use]
pub fn resize_handle_position(anchor: ResizeAnchor, overlay: &OverlayBounds, transform: &Transform) -> Point {
    let (fx, fy) = anchor.fraction();
    overlay_local_to_canvas(overlay.size().scaled(fx, fy), overlay, transform)
}

/// Whether the screen point is within the rotation grip's hit radius,
/// `(handleSize + armLength) * zoom`.
#[must_use]
pub fn is_near_rotation_handle(
    screen: Point,
    overlay: &OverlayBounds,
    transform: &Transform,
    viewport: &Viewport,
    metrics: &HandleMetrics,
) -> bool {
    let grip = viewport.canvas_to_viewport(rotation_handle_position(overlay, transform, metrics));
    let radius = (metrics.handle_size + metrics.rotation_arm) * viewport.effective_zoom();
    screen.distance_to(grip) <= radius
}

/// Nearest resize handle within `handleSize * zoom * 2` of the screen point.
#[must_use]
pub fn resize_handle_at(
    screen: Point,
    overlay: &OverlayBounds,
    transform: &Transform,
    viewport: &Viewport,
    metrics: &HandleMetrics,
) -> Option<ResizeAnchor> {
    let radius = metrics.handle_size * viewport.effective_zoom() * 2.0;
    ResizeAnchor::ALL
        .iter()
        .map(|anchor| {
            let pos = viewport.canvas_to_viewport(resize_handle_position(*anchor, overlay, transform));
            (*anchor, screen.distance_to(pos))
        })
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(anchor, _)| anchor)
}

/// Whether any resize handle is under the screen point.
#[must_use]
pub fn is_near_resize_handle(
    screen: Point,
    overlay: &OverlayBounds,
    transform: &Transform,
    viewport: &Viewport,
    metrics: &HandleMetrics,
) -> bool {
    resize_handle_at(screen, overlay, transform, viewport, metrics).is_some()
}

/// Which handle, if any, is under the screen point.
///
/// Resize handles win over the rotation grip: the grip's radius reaches
/// down over the top-edge handle.
#[must_use]
pub fn hit_handle(
    screen: Point,
    overlay: &OverlayBounds,
    transform: &Transform,
    viewport: &Viewport,
    metrics: &HandleMetrics,
) -> Option<HandleHit> {
    if let Some(anchor) = resize_handle_at(screen, overlay, transform, viewport, metrics) {
        return Some(HandleHit::Resize(anchor));
    }
    is_near_rotation_handle(screen, overlay, transform, viewport, metrics).then_some(HandleHit::Rotate)
}

/// Part of a path point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathPart {
    /// The anchor itself.
    Anchor,
    /// The incoming control point.
    HandleIn,
    /// The outgoing control point.
    HandleOut,
}

/// A path point part under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathHit {
    /// Point index.
    pub index: usize,
    /// Which part.
    pub part: PathPart,
}

/// Nearest anchor or handle within `radius` (canvas units) of `p`.
///
/// Points are mapped through the item's transform first. On equal
/// distance, handles win over anchors, later points over earlier ones.
#[must_use]
pub fn hit_path_point(
    points: &[PathPoint],
    bounds: &GeometryBounds,
    transform: &Transform,
    p: Point,
    radius: f64,
) -> Option<PathHit> {
    let mut best: Option<(PathHit, f64)> = None;
    for (index, point) in points.iter().enumerate().rev() {
        let parts = [
            (PathPart::HandleOut, point.handle_out),
            (PathPart::HandleIn, point.handle_in),
            (PathPart::Anchor, Some(point.anchor())),
        ];
        for (part, position) in parts {
            let Some(position) = position else { continue };
            let distance = transform.map_point(bounds, position).distance_to(p);
            if distance <= radius && best.map_or(true, |(_, d)| distance < d) {
                best = Some((PathHit { index, part }, distance));
            }
        }
    }
    best.map(|(hit, _)| hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::compute_overlay_bounds;
    use crate::item::Appearance;

    fn overlay_for(rect: Rect, transform: &Transform) -> OverlayBounds {
        compute_overlay_bounds(&rect, transform).expect("valid")
    }

    fn displayed(item: &Item) -> Option<Rect> {
        crate::bounds::displayed_bounds(&item.geometry_bounds()?, &item.transform)
    }

    fn lookup(items: &[Item]) -> impl Fn(usize) -> Option<Rect> + '_ {
        move |i| items.get(i).and_then(displayed)
    }

    #[test]
    fn test_topmost_item_wins() {
        let items = vec![
            Item::rectangle(0.0, 0.0, 100.0, 100.0),
            Item::rectangle(50.0, 50.0, 100.0, 100.0),
        ];
        assert_eq!(hit_test(&items, Point::new(75.0, 75.0), lookup(&items), 2.0), Some(1));
        assert_eq!(hit_test(&items, Point::new(25.0, 25.0), lookup(&items), 2.0), Some(0));
        assert_eq!(hit_test(&items, Point::new(500.0, 5.0), lookup(&items), 2.0), None);
    }

    #[test]
    fn test_containers_hidden_and_locked_are_skipped() {
        let mut hidden = Item::rectangle(0.0, 0.0, 10.0, 10.0);
        hidden.visible = false;
        let mut locked = Item::rectangle(0.0, 0.0, 10.0, 10.0);
        locked.locked = true;
        let items = vec![Item::rectangle(0.0, 0.0, 10.0, 10.0), Item::group(), hidden, locked];
        assert_eq!(hit_test(&items, Point::new(5.0, 5.0), lookup(&items), 2.0), Some(0));
    }

    #[test]
    fn test_ellipse_excludes_bounding_box_corners() {
        let items = vec![Item::ellipse(50.0, 50.0, 20.0, 10.0)];
        assert_eq!(hit_test(&items, Point::new(50.0, 50.0), lookup(&items), 2.0), Some(0));
        assert_eq!(hit_test(&items, Point::new(68.0, 58.0), lookup(&items), 2.0), None);
    }

    #[test]
    fn test_rotated_ellipse_uses_transform() {
        let item = Item::ellipse(0.0, 0.0, 20.0, 5.0).with_transform(Transform {
            rotate: 90.0,
            origin_x: 0.5,
            origin_y: 0.5,
            ..Transform::identity()
        });
        let items = vec![item];
        // The long axis is now vertical.
        assert_eq!(hit_test(&items, Point::new(0.0, 15.0), lookup(&items), 2.0), Some(0));
        assert_eq!(hit_test(&items, Point::new(15.0, 0.0), lookup(&items), 2.0), None);
    }

    #[test]
    fn test_path_tolerance_uses_stroke_width() {
        let path = Item::path(
            vec![PathPoint::new(0.0, 0.0), PathPoint::new(100.0, 50.0)],
            false,
        )
        .with_appearances(vec![Appearance::Stroke {
            color: "#000".to_string(),
            width: 10.0,
            opacity: 1.0,
            visible: true,
        }]);
        let items = vec![path];
        // 5 (half stroke) + 2 tolerance = 7 beyond the box.
        assert_eq!(hit_test(&items, Point::new(106.5, 25.0), lookup(&items), 2.0), Some(0));
        assert_eq!(hit_test(&items, Point::new(107.5, 25.0), lookup(&items), 2.0), None);
    }

    #[test]
    fn test_text_has_no_expansion() {
        let items = vec![Item::text(0.0, 0.0, 50.0, 20.0)];
        assert_eq!(hit_test(&items, Point::new(50.0, 20.0), lookup(&items), 2.0), Some(0));
        assert_eq!(hit_test(&items, Point::new(51.0, 10.0), lookup(&items), 2.0), None);
    }

    #[test]
    fn test_resize_handles_at_grid_positions() {
        let t = Transform::identity();
        let overlay = overlay_for(Rect::new(0.0, 0.0, 100.0, 50.0), &t);
        let vp = Viewport::new(800.0, 600.0);
        let metrics = HandleMetrics::default();
        // Canvas (100, 50) is screen (500, 350).
        assert_eq!(
            resize_handle_at(Point::new(500.0, 350.0), &overlay, &t, &vp, &metrics),
            Some(ResizeAnchor::Se)
        );
        assert_eq!(
            resize_handle_at(Point::new(450.0, 326.0), &overlay, &t, &vp, &metrics),
            None
        );
        assert!(is_near_resize_handle(Point::new(400.0, 325.0), &overlay, &t, &vp, &metrics));
    }

    #[test]
    fn test_rotation_grip_above_top_edge() {
        let t = Transform::identity();
        let overlay = overlay_for(Rect::new(0.0, 0.0, 100.0, 50.0), &t);
        let metrics = HandleMetrics::default();
        let grip = rotation_handle_position(&overlay, &t, &metrics);
        assert!((grip.x - 50.0).abs() < 1e-9);
        assert!((grip.y + 28.0).abs() < 1e-9);

        let vp = Viewport::new(800.0, 600.0);
        let screen_grip = vp.canvas_to_viewport(grip);
        assert_eq!(hit_handle(screen_grip, &overlay, &t, &vp, &metrics), Some(HandleHit::Rotate));
        // The top-edge handle wins where both overlap.
        assert_eq!(
            hit_handle(Point::new(450.0, 300.0), &overlay, &t, &vp, &metrics),
            Some(HandleHit::Resize(ResizeAnchor::N))
        );
        assert_eq!(hit_handle(Point::new(425.0, 325.0), &overlay, &t, &vp, &metrics), None);
    }

    #[test]
    fn test_rotation_grip_follows_rotation() {
        let t = Transform {
            rotate: 90.0,
            origin_x: 0.5,
            origin_y: 0.5,
            ..Transform::identity()
        };
        let overlay = overlay_for(Rect::new(0.0, 0.0, 100.0, 100.0), &t);
        let grip = rotation_handle_position(&overlay, &t, &HandleMetrics::default());
        // Rotated a quarter turn clockwise, the grip sits right of the box.
        assert!((grip.x - 128.0).abs() < 1e-9);
        assert!((grip.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_radius_scales_with_zoom() {
        let t = Transform::identity();
        let overlay = overlay_for(Rect::new(0.0, 0.0, 100.0, 50.0), &t);
        let metrics = HandleMetrics::default();
        let mut vp = Viewport::new(800.0, 600.0);
        let corner = vp.canvas_to_viewport(Point::new(100.0, 50.0));
        let probe = corner + Point::new(20.0, 0.0);
        assert!(resize_handle_at(probe, &overlay, &t, &vp, &metrics).is_none());
        vp.zoom = 2.0;
        let corner = vp.canvas_to_viewport(Point::new(100.0, 50.0));
        assert!(resize_handle_at(corner + Point::new(20.0, 0.0), &overlay, &t, &vp, &metrics).is_some());
    }

    #[test]
    fn test_hit_path_point_prefers_nearest() {
        let points = vec![
            PathPoint::new(0.0, 0.0).with_handles(Point::new(-10.0, 0.0), Point::new(10.0, 0.0)),
            PathPoint::new(30.0, 0.0),
        ];
        let bounds = Rect::new(-10.0, 0.0, 40.0, 0.0);
        let t = Transform::identity();
        assert_eq!(
            hit_path_point(&points, &bounds, &t, Point::new(9.0, 1.0), 6.0),
            Some(PathHit { index: 0, part: PathPart::HandleOut })
        );
        assert_eq!(
            hit_path_point(&points, &bounds, &t, Point::new(1.0, 0.0), 6.0),
            Some(PathHit { index: 0, part: PathPart::Anchor })
        );
        assert_eq!(
            hit_path_point(&points, &bounds, &t, Point::new(29.0, 2.0), 6.0),
            Some(PathHit { index: 1, part: PathPart::Anchor })
        );
        assert_eq!(hit_path_point(&points, &bounds, &t, Point::new(20.0, 20.0), 6.0), None);
    }

    #[test]
    fn test_hit_path_point_through_transform() {
        let points = vec![PathPoint::new(0.0, 0.0), PathPoint::new(10.0, 0.0)];
        let bounds = Rect::new(0.0, 0.0, 10.0, 0.0);
        let t = Transform {
            translate_x: 100.0,
            scale_x: 3.0,
            ..Transform::identity()
        };
        assert_eq!(
            hit_path_point(&points, &bounds, &t, Point::new(130.0, 0.0), 2.0),
            Some(PathHit { index: 1, part: PathPart::Anchor })
        );
    }
}
