//! Path point and bezier handle editing.
//!
//! Only active while the selection is in edit mode on a path item. Point
//! and handle drags are bracketed in one transaction each.

use std::collections::BTreeSet;

use crate::event::{Button, PointerInput};
use crate::geometry::Point;
use crate::hit::{hit_path_point, PathHit, PathPart};
use crate::item::{Geometry, ItemKind, PathPoint};
use crate::selection::SelectionState;
use crate::store::{ItemPatch, ItemStore};
use crate::tools::{end_transaction, ToolContext};

/// Which control point of a path point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleSide {
    /// `handle_in`.
    In,
    /// `handle_out`.
    Out,
}

impl HandleSide {
    const fn from_part(part: PathPart) -> Option<Self> {
        match part {
            PathPart::Anchor => None,
            PathPart::HandleIn => Some(Self::In),
            PathPart::HandleOut => Some(Self::Out),
        }
    }
}

/// Move point `index` by `delta`. When it belongs to `selected`, every
/// selected point moves with it; handles always travel with their anchor.
pub fn move_points(points: &mut [PathPoint], index: usize, delta: Point, selected: &BTreeSet<usize>) {
    if selected.contains(&index) {
        for i in selected {
            if let Some(point) = points.get_mut(*i) {
                point.translate(delta);
            }
        }
    } else if let Some(point) = points.get_mut(index) {
        point.translate(delta);
    }
}

/// Place one handle of `point` at `position`.
///
/// With `mirror`, the opposite handle is turned to stay collinear through
/// the anchor while keeping its own length. Handles shorter than `epsilon`
/// give no direction, and a missing opposite handle is not created; both
/// leave the opposite side untouched.
pub fn move_handle(point: &mut PathPoint, side: HandleSide, position: Point, mirror: bool, epsilon: f64) {
    let anchor = point.anchor();
    let (moved, opposite) = match side {
        HandleSide::In => (&mut point.handle_in, &mut point.handle_out),
        HandleSide::Out => (&mut point.handle_out, &mut point.handle_in),
    };
    *moved = Some(position);
    if !mirror {
        return;
    }
    let direction = position - anchor;
    let length = direction.length();
    if length < epsilon {
        tracing::trace!("Handle too short to mirror ({length})");
        return;
    }
    if let Some(other) = opposite.as_mut() {
        let other_length = (*other - anchor).length();
        *other = anchor - direction * (other_length / length);
    }
}

/// Result of deleting path points.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The path survives with these points.
    Kept {
        /// Remaining points in order.
        points: Vec<PathPoint>,
        /// Whether the remaining path is closed.
        closed: bool,
    },
    /// Fewer than two points would remain; the item goes.
    RemoveItem,
}

/// Drop the `selected` points from a path.
#[must_use]
pub fn delete_points(points: &[PathPoint], closed: bool, selected: &BTreeSet<usize>) -> DeleteOutcome {
    let remaining: Vec<PathPoint> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| !selected.contains(i))
        .map(|(_, p)| *p)
        .collect();
    if remaining.len() < 2 {
        return DeleteOutcome::RemoveItem;
    }
    let closed = closed && remaining.len() >= 3;
    DeleteOutcome::Kept {
        points: remaining,
        closed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PointDrag {
    item: usize,
    hit: PathHit,
    last: Point,
}

/// Pointer-driven editing of the selected path's points and handles.
#[derive(Debug, Clone, Default)]
pub struct PathEditController {
    drag: Option<PointDrag>,
}

impl PathEditController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether edit mode is on and the selected item is a path.
    #[must_use]
    pub fn is_active(selection: &SelectionState, store: &dyn ItemStore) -> bool {
        selection.edit_mode_active()
            && selection
                .selected_index()
                .and_then(|index| store.item(index))
                .is_some_and(|item| item.kind == ItemKind::Path)
    }

    /// Whether a point or handle drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pick a point part under the pointer. Anchors update the point
    /// selection (shift toggles). A miss clears the point selection and is
    /// not consumed.
    pub fn press(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> bool {
        if input.button != Button::Primary || !Self::is_active(ctx.selection, ctx.store) {
            return false;
        }
        let Some(index) = ctx.selection.selected_index() else {
            return false;
        };
        let canvas = ctx.canvas(input.position());
        let radius = ctx.canvas_dist(ctx.config.point_hit_radius_px);
        let hit = ctx.store.item(index).and_then(|item| {
            let bounds = item.geometry_bounds()?;
            let points = item.geometry.path_points()?;
            hit_path_point(points, &bounds, &item.transform, canvas, radius)
        });
        let Some(hit) = hit else {
            ctx.selection.clear_points();
            return false;
        };

        if hit.part == PathPart::Anchor {
            if input.modifiers.shift {
                ctx.selection.select_point(hit.index, true);
            } else if !ctx.selection.is_point_selected(hit.index) {
                ctx.selection.select_point(hit.index, false);
            }
        }
        self.begin_point_drag(ctx, index, hit, canvas)
    }

    /// Start dragging `hit` of item `item` from canvas point `at`, opening
    /// the drag's transaction.
    pub fn begin_point_drag(&mut self, ctx: &mut ToolContext<'_>, item: usize, hit: PathHit, at: Point) -> bool {
        if self.drag.is_some() || !ctx.begin_transaction() {
            return false;
        }
        tracing::debug!("Dragging {:?} of point {} on item {item}", hit.part, hit.index);
        self.drag = Some(PointDrag { item, hit, last: at });
        true
    }

    /// Finish the drag and close its transaction.
    pub fn end_point_drag(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        ctx.end_transaction();
        true
    }

    /// Move the dragged part. Alt breaks handle symmetry.
    pub fn drag(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let canvas = ctx.canvas(input.position());
        let Some(item) = ctx.store.item(drag.item) else {
            tracing::debug!("Dragged path {} no longer exists", drag.item);
            return true;
        };
        let Some(delta) = item.transform.unmap_vector(canvas - drag.last) else {
            tracing::trace!("Path transform is not invertible");
            return true;
        };
        let Geometry::Path { points, closed } = &item.geometry else {
            return true;
        };
        let mut points = points.clone();
        let closed = *closed;

        let hit = drag.hit;
        match HandleSide::from_part(hit.part) {
            None => move_points(&mut points, hit.index, delta, ctx.selection.selected_points()),
            Some(side) => {
                if let Some(point) = points.get_mut(hit.index) {
                    let current = match side {
                        HandleSide::In => point.handle_in,
                        HandleSide::Out => point.handle_out,
                    };
                    if let Some(current) = current {
                        move_handle(
                            point,
                            side,
                            current + delta,
                            !input.modifiers.alt,
                            ctx.config.mirror_epsilon,
                        );
                    }
                }
            }
        }
        drag.last = canvas;
        let item_index = drag.item;
        if let Err(e) = ctx
            .store
            .update_item(item_index, &ItemPatch::geometry(Geometry::Path { points, closed }))
        {
            tracing::debug!("Dropping path edit: {e}");
        }
        true
    }

    /// End any drag.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        self.end_point_drag(ctx)
    }

    /// Abandon any drag, closing its transaction.
    pub fn reset(&mut self, store: &mut dyn ItemStore) {
        if self.drag.take().is_some() {
            tracing::warn!("Closing transaction of an interrupted point drag");
            end_transaction(store);
        }
    }

    /// Delete the selected points of the edited path in one transaction.
    /// Deleting down to fewer than two points removes the item, which also
    /// leaves edit mode.
    pub fn delete_selected_points(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if self.drag.is_some() || !Self::is_active(ctx.selection, ctx.store) {
            return false;
        }
        let Some(index) = ctx.selection.selected_index() else {
            return false;
        };
        if ctx.selection.selected_points().is_empty() {
            return false;
        }
        let Some(Geometry::Path { points, closed }) = ctx.store.item(index).map(|item| &item.geometry) else {
            return false;
        };
        let outcome = delete_points(points, *closed, ctx.selection.selected_points());
        if !ctx.begin_transaction() {
            return false;
        }
        match outcome {
            DeleteOutcome::Kept { points, closed } => {
                tracing::debug!("Path {index} keeps {} points", points.len());
                if let Err(e) = ctx
                    .store
                    .update_item(index, &ItemPatch::geometry(Geometry::Path { points, closed }))
                {
                    tracing::debug!("Dropping point deletion: {e}");
                }
                ctx.selection.clear_points();
            }
            DeleteOutcome::RemoveItem => {
                tracing::debug!("Removing path {index}: too few points left");
                match ctx.store.remove_item(index) {
                    Ok(_) => ctx.selection.on_item_removed(index),
                    Err(e) => tracing::debug!("Dropping path removal: {e}"),
                }
            }
        }
        ctx.end_transaction();
        true
    }
}
