//! Resize and rotate gestures on the selection overlay handles.
//!
//! A gesture starts when a primary press lands on a handle of the cached
//! overlay, runs inside its own transaction and ends on release. All
//! geometry is computed from the press-time snapshot so pointer jitter
//! never accumulates.

use crate::event::{Button, PointerInput};
use crate::geometry::{scale_for_resize, GeometryBounds, Point};
use crate::hit::{hit_handle, HandleHit, ResizeAnchor};
use crate::store::ItemStore;
use crate::tools::{end_transaction, ToolContext};
use crate::transform::{Transform, TransformKey};

/// Pointer distances from the pivot below this give no usable angle.
const MIN_ROTATION_RADIUS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Resize {
        index: usize,
        anchor: ResizeAnchor,
        bounds: GeometryBounds,
        original_origin: Point,
        // Same visual transform, re-anchored on the opposite handle.
        working: Transform,
        start: Point,
    },
    Rotate {
        index: usize,
        pivot: Point,
        start_angle: f64,
        start_rotate: f64,
    },
}

/// Overlay handle manipulation in progress.
#[derive(Debug, Clone, Default)]
pub struct HandleGesture {
    active: Option<Gesture>,
}

impl HandleGesture {
    /// Create an idle gesture tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resize or rotation is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Handle being dragged, if any.
    #[must_use]
    pub fn active_handle(&self) -> Option<HandleHit> {
        self.active.map(|gesture| match gesture {
            Gesture::Resize { anchor, .. } => HandleHit::Resize(anchor),
            Gesture::Rotate { .. } => HandleHit::Rotate,
        })
    }

    /// Start a gesture if the press lands on a handle. Returns whether the
    /// press was consumed.
    pub fn press(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> bool {
        if input.button != Button::Primary || self.active.is_some() {
            return false;
        }
        let Some(snap) = ctx.overlay.copied() else {
            return false;
        };
        let Some(hit) = hit_handle(
            input.position(),
            &snap.bounds,
            &snap.transform,
            ctx.viewport,
            &ctx.handle_metrics(),
        ) else {
            return false;
        };
        if !ctx.begin_transaction() {
            return false;
        }

        let start = ctx.canvas(input.position());
        let transform = snap.transform;
        let gesture = match hit {
            HandleHit::Resize(anchor) => {
                let (ox, oy) = anchor.opposite().fraction();
                Gesture::Resize {
                    index: snap.index,
                    anchor,
                    bounds: snap.geometry_bounds,
                    original_origin: transform.origin(),
                    working: transform.with_origin_preserved(&snap.geometry_bounds, Point::new(ox, oy)),
                    start,
                }
            }
            HandleHit::Rotate => {
                let pivot = transform.pivot(&snap.geometry_bounds);
                Gesture::Rotate {
                    index: snap.index,
                    pivot,
                    start_angle: angle_degrees(start - pivot),
                    start_rotate: transform.rotate,
                }
            }
        };
        tracing::debug!("Handle gesture {hit:?} on item {}", snap.index);
        self.active = Some(gesture);
        true
    }

    /// Apply pointer movement to the active gesture. Returns whether a
    /// gesture is active.
    pub fn drag(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> bool {
        let Some(gesture) = self.active else {
            return false;
        };
        let current = ctx.canvas(input.position());
        let result = match gesture {
            Gesture::Resize {
                index,
                anchor,
                bounds,
                original_origin,
                working,
                start,
            } => {
                let transform = resized(
                    &working,
                    &bounds,
                    anchor,
                    current - start,
                    input.modifiers.shift,
                    ctx.config.min_displayed_size,
                )
                .with_origin_preserved(&bounds, original_origin);
                ctx.store.set_item_transform(index, transform)
            }
            Gesture::Rotate {
                index,
                pivot,
                start_angle,
                start_rotate,
            } => {
                let arm = current - pivot;
                if arm.length() < MIN_ROTATION_RADIUS {
                    tracing::trace!("Pointer on pivot, rotation unchanged");
                    return true;
                }
                let mut rotate = start_rotate + angle_degrees(arm) - start_angle;
                let snap = ctx.config.rotation_snap_degrees;
                if input.modifiers.shift && snap > 0.0 {
                    rotate = (rotate / snap).round() * snap;
                }
                ctx.store
                    .update_transform_property(index, TransformKey::Rotate, rotate)
            }
        };
        if let Err(e) = result {
            tracing::debug!("Dropping handle update: {e}");
        }
        true
    }

    /// Finish the gesture and close its transaction.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        ctx.end_transaction();
        true
    }

    /// Abandon the gesture, closing its transaction.
    pub fn reset(&mut self, store: &mut dyn ItemStore) {
        if self.active.take().is_some() {
            tracing::warn!("Closing transaction of an interrupted handle gesture");
            end_transaction(store);
        }
    }
}

fn angle_degrees(v: Point) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

/// New scale for `working` after dragging `anchor` by a canvas `delta`.
///
/// The delta is measured in the overlay's unrotated frame. A flipped axis
/// has its handle on the other side of the pivot, so the delta is mirrored
/// before resizing. With `uniform`, corner handles apply the larger of the
/// two relative changes to both axes.
fn resized(
    working: &Transform,
    bounds: &GeometryBounds,
    anchor: ResizeAnchor,
    delta: Point,
    uniform: bool,
    min_displayed: f64,
) -> Transform {
    let local = delta.rotated(-working.rotate);
    let (fx, fy) = anchor.fraction();
    let axis = |scale: f64, size: f64, d: f64, from_min: bool| {
        let sign = if scale < 0.0 { -1.0 } else { 1.0 };
        sign * scale_for_resize(scale.abs(), size, d * sign, from_min, min_displayed)
    };

    let mut scale_x = working.scale_x;
    let mut scale_y = working.scale_y;
    if anchor.resizes_x() {
        scale_x = axis(working.scale_x, bounds.width, local.x, fx == 0.0);
    }
    if anchor.resizes_y() {
        scale_y = axis(working.scale_y, bounds.height, local.y, fy == 0.0);
    }
    if uniform && anchor.is_corner() && working.scale_x != 0.0 && working.scale_y != 0.0 {
        let kx = scale_x / working.scale_x;
        let ky = scale_y / working.scale_y;
        let k = if (kx - 1.0).abs() >= (ky - 1.0).abs() { kx } else { ky };
        scale_x = working.scale_x * k;
        scale_y = working.scale_y * k;
    }
    Transform {
        scale_x,
        scale_y,
        ..*working
    }
}
