//! Select tool: pan, click-to-select and object dragging.
//!
//! ```text
//! Idle --middle press--> Panning --release--> Idle
//! Idle --primary press--> Selecting --move >= threshold on selected--> Dragging
//! Selecting --release--> Idle (click if under threshold)
//! Dragging  --release--> Idle (transaction closed)
//! ```

use std::collections::VecDeque;

use crate::event::{Button, CursorShape, EditorEvent, Modifiers, PointerInput};
use crate::geometry::Point;
use crate::hit::{hit_handle, hit_test};
use crate::store::ItemStore;
use crate::tools::{end_transaction, ToolContext};

/// Fixed-window moving average over recent pan deltas, per axis.
#[derive(Debug, Clone)]
pub struct PanSmoother {
    window: usize,
    dx: VecDeque<f64>,
    dy: VecDeque<f64>,
}

impl PanSmoother {
    /// Create a smoother averaging the last `window` samples.
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            dx: VecDeque::with_capacity(window),
            dy: VecDeque::with_capacity(window),
        }
    }

    /// Push a delta and return the mean of the buffered samples.
    pub fn push(&mut self, delta: Point) -> Point {
        if self.dx.len() == self.window {
            self.dx.pop_front();
            self.dy.pop_front();
        }
        self.dx.push_back(delta.x);
        self.dy.push_back(delta.y);
        #[allow(clippy::cast_precision_loss)]
        let n = self.dx.len() as f64;
        Point::new(self.dx.iter().sum::<f64>() / n, self.dy.iter().sum::<f64>() / n)
    }

    /// Drop all samples.
    pub fn reset(&mut self) {
        self.dx.clear();
        self.dy.clear();
    }

    /// Number of buffered samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dx.len()
    }

    /// Whether no samples are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dx.is_empty()
    }
}

/// Observable state of the [`SelectTool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPhase {
    /// No button held.
    Idle,
    /// Middle button held.
    Panning,
    /// Primary button held, not dragging.
    Selecting,
    /// Dragging the selected object.
    Dragging,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Panning {
        last: Point,
    },
    Selecting {
        press: Point,
        on_selected: bool,
        on_handle: bool,
    },
    Dragging {
        last: Point,
    },
}

/// The select/pan/drag state machine.
#[derive(Debug, Clone)]
pub struct SelectTool {
    state: State,
    smoother: PanSmoother,
}

impl SelectTool {
    /// Create an idle tool whose pan smoothing averages `window` samples.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            state: State::Idle,
            smoother: PanSmoother::new(window),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SelectPhase {
        match self.state {
            State::Idle => SelectPhase::Idle,
            State::Panning { .. } => SelectPhase::Panning,
            State::Selecting { .. } => SelectPhase::Selecting,
            State::Dragging { .. } => SelectPhase::Dragging,
        }
    }

    /// Handle a button press.
    pub fn press(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        let position = input.position();
        match input.button {
            Button::Middle => {
                self.state = State::Panning { last: position };
                self.smoother.reset();
                vec![EditorEvent::CursorChanged {
                    cursor: CursorShape::ClosedHand,
                }]
            }
            Button::Primary => {
                let on_handle = ctx.overlay.is_some_and(|snap| {
                    hit_handle(
                        position,
                        &snap.bounds,
                        &snap.transform,
                        ctx.viewport,
                        &ctx.handle_metrics(),
                    )
                    .is_some()
                });
                let on_selected = !on_handle && clicked_on_selected(ctx, position);
                tracing::trace!("Select press at {position:?}, on_selected={on_selected}, on_handle={on_handle}");
                self.state = State::Selecting {
                    press: position,
                    on_selected,
                    on_handle,
                };
                Vec::new()
            }
            Button::Secondary => Vec::new(),
        }
    }

    /// Handle pointer movement.
    pub fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        let position = input.position();
        match self.state {
            State::Idle => Vec::new(),
            State::Panning { last } => {
                let clamp = ctx.config.pan_clamp_px;
                let raw = position - last;
                let clamped = Point::new(raw.x.clamp(-clamp, clamp), raw.y.clamp(-clamp, clamp));
                let smoothed = self.smoother.push(clamped);
                self.state = State::Panning { last: position };
                vec![EditorEvent::PanDelta {
                    dx: smoothed.x,
                    dy: smoothed.y,
                }]
            }
            State::Selecting {
                press,
                on_selected,
                on_handle,
            } => {
                if !on_selected || on_handle || !exceeds_threshold(position - press, ctx.config.click_threshold_px) {
                    return Vec::new();
                }
                if !ctx.begin_transaction() {
                    return Vec::new();
                }
                self.state = State::Dragging { last: position };
                vec![dragged(ctx, position - press)]
            }
            State::Dragging { last } => {
                self.state = State::Dragging { last: position };
                vec![dragged(ctx, position - last)]
            }
        }
    }

    /// Handle a button release.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        let position = input.position();
        let state = std::mem::replace(&mut self.state, State::Idle);
        match state {
            State::Idle => Vec::new(),
            State::Panning { .. } => {
                self.smoother.reset();
                vec![EditorEvent::CursorChanged {
                    cursor: CursorShape::Arrow,
                }]
            }
            State::Selecting { press, on_handle, .. } => {
                if on_handle || exceeds_threshold(position - press, ctx.config.click_threshold_px) {
                    return Vec::new();
                }
                vec![clicked(position, input.modifiers)]
            }
            State::Dragging { .. } => {
                ctx.end_transaction();
                Vec::new()
            }
        }
    }

    /// Cancel any in-flight gesture without emitting events, closing a
    /// transaction left open by an interrupted drag.
    pub fn reset(&mut self, store: &mut dyn ItemStore) {
        if matches!(self.state, State::Dragging { .. }) {
            tracing::warn!("Closing transaction of an interrupted drag");
            end_transaction(store);
        }
        self.state = State::Idle;
        self.smoother.reset();
    }
}

fn exceeds_threshold(delta: Point, threshold: f64) -> bool {
    delta.x.abs() >= threshold || delta.y.abs() >= threshold
}

fn dragged(ctx: &ToolContext<'_>, screen_delta: Point) -> EditorEvent {
    EditorEvent::ObjectDragged {
        dx: ctx.canvas_dist(screen_delta.x),
        dy: ctx.canvas_dist(screen_delta.y),
    }
}

fn clicked(position: Point, modifiers: Modifiers) -> EditorEvent {
    EditorEvent::ObjectClicked {
        x: position.x,
        y: position.y,
        modifiers: modifiers.mask(),
    }
}

/// Whether a press at `screen` grabs the selected item: a precise hit, or
/// (as a forgiving re-grab) anywhere inside its displayed bounding box.
fn clicked_on_selected(ctx: &ToolContext<'_>, screen: Point) -> bool {
    let Some(selected) = ctx.selection.selected_index() else {
        return false;
    };
    let canvas = ctx.canvas(screen);
    let store = &*ctx.store;
    let precise = hit_test(
        store.items(),
        canvas,
        |index| store.bounding_box(index),
        ctx.canvas_dist(ctx.config.path_hit_tolerance_px),
    );
    precise == Some(selected)
        || store
            .bounding_box(selected)
            .is_some_and(|bounds| bounds.contains(canvas))
}
