//! Rubber-band drawing of rectangles and ellipses.
//!
//! Both shapes share one [`ShapeStrategy`]; only the item built on release
//! differs per [`ShapeKind`].

use serde::{Deserialize, Serialize};

use crate::event::{Button, EditorEvent, PointerInput};
use crate::geometry::{Point, Rect};
use crate::item::{Appearance, Item, DEFAULT_STROKE_WIDTH};
use crate::tools::ToolContext;

/// Shape produced by a [`DrawTool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed in the dragged box.
    Ellipse,
}

/// Appearance applied to newly drawn shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawStyle {
    /// Stroke color.
    pub stroke_color: String,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color.
    pub fill_color: String,
    /// Fill opacity.
    pub fill_opacity: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#ffffff".to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_color: "#ffffff".to_string(),
            fill_opacity: 0.0,
        }
    }
}

impl DrawStyle {
    /// Appearance stack for a new item.
    #[must_use]
    pub fn appearances(&self) -> Vec<Appearance> {
        vec![
            Appearance::Fill {
                color: self.fill_color.clone(),
                opacity: self.fill_opacity,
                visible: true,
            },
            Appearance::Stroke {
                color: self.stroke_color.clone(),
                width: self.stroke_width,
                opacity: 1.0,
                visible: true,
            },
        ]
    }
}

/// Drawing state shared by every shape kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStrategy {
    /// Shape being drawn.
    pub kind: ShapeKind,
    /// Whether a press started a shape.
    pub is_drawing: bool,
    /// Canvas point of the press.
    pub start: Point,
    /// Latest canvas point.
    pub current: Point,
    /// Style for the finished item.
    pub style: DrawStyle,
}

impl ShapeStrategy {
    /// Create an idle strategy.
    #[must_use]
    pub fn new(kind: ShapeKind, style: DrawStyle) -> Self {
        Self {
            kind,
            is_drawing: false,
            start: Point::default(),
            current: Point::default(),
            style,
        }
    }

    /// Start a shape at `start`.
    pub fn begin(&mut self, start: Point) {
        self.is_drawing = true;
        self.start = start;
        self.current = start;
    }

    /// Track the pointer.
    pub fn update(&mut self, current: Point) {
        self.current = current;
    }

    /// Abandon the shape.
    pub fn cancel(&mut self) {
        self.is_drawing = false;
    }

    /// The dragged box. With `constrain` the shorter side grows to match
    /// the longer one (square or circle), keeping the drag direction.
    #[must_use]
    pub fn rect(&self, constrain: bool) -> Rect {
        let mut delta = self.current - self.start;
        if constrain {
            let side = delta.x.abs().max(delta.y.abs());
            delta = Point::new(side.copysign(delta.x), side.copysign(delta.y));
        }
        Rect::from_corners(self.start, self.start + delta)
    }

    /// Item for a finished box.
    #[must_use]
    pub fn build(&self, rect: Rect) -> Item {
        let item = match self.kind {
            ShapeKind::Rectangle => Item::rectangle(rect.x, rect.y, rect.width, rect.height),
            ShapeKind::Ellipse => {
                let center = rect.center();
                Item::ellipse(center.x, center.y, rect.width / 2.0, rect.height / 2.0)
            }
        };
        item.with_appearances(self.style.appearances())
    }
}

/// Press-drag-release drawing tool.
#[derive(Debug, Clone)]
pub struct DrawTool {
    strategy: ShapeStrategy,
    press_screen: Point,
}

impl DrawTool {
    /// Create a tool drawing `kind` with `style`.
    #[must_use]
    pub fn new(kind: ShapeKind, style: DrawStyle) -> Self {
        Self {
            strategy: ShapeStrategy::new(kind, style),
            press_screen: Point::default(),
        }
    }

    /// Shape being drawn.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.strategy.kind
    }

    /// Switch shape kind, abandoning any shape in progress.
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.strategy.cancel();
        self.strategy.kind = kind;
    }

    /// Current style.
    #[must_use]
    pub const fn style(&self) -> &DrawStyle {
        &self.strategy.style
    }

    /// Replace the style used for the next shape.
    pub fn set_style(&mut self, style: DrawStyle) {
        self.strategy.style = style;
    }

    /// Whether a shape is in progress.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.strategy.is_drawing
    }

    /// Start a shape on primary press.
    pub fn press(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        if input.button != Button::Primary {
            return Vec::new();
        }
        self.press_screen = input.position();
        self.strategy.begin(ctx.canvas(input.position()));
        Vec::new()
    }

    /// Update the preview.
    pub fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        if !self.strategy.is_drawing {
            return Vec::new();
        }
        self.strategy.update(ctx.canvas(input.position()));
        vec![EditorEvent::DrawPreview {
            rect: Some(self.strategy.rect(input.modifiers.shift)),
        }]
    }

    /// Commit the shape in its own transaction, unless the drag was too
    /// small to be intentional.
    pub fn release(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) -> Vec<EditorEvent> {
        if !self.strategy.is_drawing {
            return Vec::new();
        }
        self.strategy.update(ctx.canvas(input.position()));
        self.strategy.cancel();
        let events = vec![EditorEvent::DrawPreview { rect: None }];

        let travel = input.position() - self.press_screen;
        let threshold = ctx.config.click_threshold_px;
        if travel.x.abs() < threshold && travel.y.abs() < threshold {
            tracing::debug!("Discarding {:?} smaller than the click threshold", self.strategy.kind);
            return events;
        }
        let item = self.strategy.build(self.strategy.rect(input.modifiers.shift));
        if !ctx.begin_transaction() {
            return events;
        }
        let index = ctx.store.add_item(item);
        ctx.end_transaction();
        tracing::debug!("Drew {:?} at index {index}", self.strategy.kind);
        events
    }

    /// Abandon any shape in progress.
    pub fn reset(&mut self) {
        self.strategy.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use crate::item::{Geometry, ItemKind};
    use crate::store::{InMemoryStore, ItemStore};
    use crate::tools::testing::Harness;

    #[test]
    fn test_constrained_rect_keeps_direction() {
        let mut s = ShapeStrategy::new(ShapeKind::Rectangle, DrawStyle::default());
        s.begin(Point::new(10.0, 10.0));
        s.update(Point::new(-20.0, 15.0));
        assert_eq!(s.rect(false), Rect::new(-20.0, 10.0, 30.0, 5.0));
        assert_eq!(s.rect(true), Rect::new(-20.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn test_draw_rectangle_commits_one_transaction() {
        let mut h = Harness::new(InMemoryStore::new());
        let mut tool = DrawTool::new(ShapeKind::Rectangle, DrawStyle::default());
        tool.press(&mut h.ctx(), &PointerInput::at(400.0, 300.0));
        let preview = tool.pointer_move(&mut h.ctx(), &PointerInput::at(450.0, 320.0));
        assert_eq!(
            preview,
            vec![EditorEvent::DrawPreview {
                rect: Some(Rect::new(0.0, 0.0, 50.0, 20.0))
            }]
        );
        let events = tool.release(&mut h.ctx(), &PointerInput::at(460.0, 330.0));
        assert_eq!(events, vec![EditorEvent::DrawPreview { rect: None }]);
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.store.committed_transactions(), 1);
        assert_eq!(h.store.geometry_bounds(0), Some(Rect::new(0.0, 0.0, 60.0, 30.0)));
        assert!(!tool.is_drawing());
    }

    #[test]
    fn test_draw_circle_with_shift() {
        let mut h = Harness::new(InMemoryStore::new());
        let mut tool = DrawTool::new(ShapeKind::Ellipse, DrawStyle::default());
        tool.press(&mut h.ctx(), &PointerInput::at(400.0, 300.0));
        tool.release(
            &mut h.ctx(),
            &PointerInput::at(440.0, 320.0).with_modifiers(Modifiers::SHIFT),
        );
        let item = h.store.item(0).expect("item");
        assert_eq!(item.kind, ItemKind::Ellipse);
        assert_eq!(
            item.geometry,
            Geometry::Ellipse {
                center_x: 20.0,
                center_y: 20.0,
                radius_x: 20.0,
                radius_y: 20.0
            }
        );
    }

    #[test]
    fn test_tiny_drag_creates_nothing() {
        let mut h = Harness::new(InMemoryStore::new());
        let mut tool = DrawTool::new(ShapeKind::Rectangle, DrawStyle::default());
        tool.press(&mut h.ctx(), &PointerInput::at(400.0, 300.0));
        tool.release(&mut h.ctx(), &PointerInput::at(403.0, 302.0));
        assert!(h.store.is_empty());
        assert_eq!(h.store.committed_transactions(), 0);
    }

    #[test]
    fn test_style_reaches_item() {
        let mut h = Harness::new(InMemoryStore::new());
        let style = DrawStyle {
            stroke_width: 4.0,
            ..DrawStyle::default()
        };
        let mut tool = DrawTool::new(ShapeKind::Rectangle, style);
        tool.press(&mut h.ctx(), &PointerInput::at(0.0, 0.0));
        tool.release(&mut h.ctx(), &PointerInput::at(100.0, 100.0));
        assert!((h.store.item(0).expect("item").stroke_width() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_secondary_button_does_not_draw() {
        let mut h = Harness::new(InMemoryStore::new());
        let mut tool = DrawTool::new(ShapeKind::Rectangle, DrawStyle::default());
        tool.press(
            &mut h.ctx(),
            &PointerInput::at(0.0, 0.0).with_button(Button::Secondary),
        );
        assert!(!tool.is_drawing());
        assert!(tool.release(&mut h.ctx(), &PointerInput::at(100.0, 100.0)).is_empty());
    }
}
