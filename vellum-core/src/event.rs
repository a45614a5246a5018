//! Input events consumed by the editor and events it emits to the host.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::tiles::Tile;
use crate::tools::ToolKind;

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left button, pen tip or single touch.
    #[default]
    Primary,
    /// Middle button or wheel press.
    Middle,
    /// Right button.
    Secondary,
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/Option held.
    pub alt: bool,
    /// Meta/Command held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Only alt held.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Pack into a bit mask: shift=1, ctrl=2, alt=4, meta=8.
    #[must_use]
    pub const fn mask(self) -> u8 {
        (self.shift as u8) | (self.ctrl as u8) << 1 | (self.alt as u8) << 2 | (self.meta as u8) << 3
    }

    /// Unpack a mask produced by [`Modifiers::mask`].
    #[must_use]
    pub const fn from_mask(mask: u8) -> Self {
        Self {
            shift: mask & 1 != 0,
            ctrl: mask & 2 != 0,
            alt: mask & 4 != 0,
            meta: mask & 8 != 0,
        }
    }
}

/// A pointer sample in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    /// Screen x.
    pub x: f64,
    /// Screen y.
    pub y: f64,
    /// Button involved.
    #[serde(default)]
    pub button: Button,
    /// Modifier state.
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerInput {
    /// A primary-button sample without modifiers.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            button: Button::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    /// Same sample with a different button.
    #[must_use]
    pub const fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    /// Same sample with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Editing keys the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// Delete the selection (or the selected path points in edit mode).
    Delete,
    /// Leave edit mode, or deselect.
    Escape,
    /// Enter path edit mode on a selected path.
    Enter,
}

/// An input event addressed to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Button pressed.
    Press(PointerInput),
    /// Pointer moved.
    Move(PointerInput),
    /// Button released.
    Release(PointerInput),
    /// Wheel scrolled; negative `deltaY` zooms in.
    #[serde(rename_all = "camelCase")]
    Wheel {
        /// Screen x of the cursor.
        x: f64,
        /// Screen y of the cursor.
        y: f64,
        /// Scroll amount.
        delta_y: f64,
    },
    /// Viewport resized.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },
    /// Key pressed.
    Key {
        /// Which key.
        key: Key,
    },
    /// Active tool switched.
    Tool {
        /// The new tool.
        tool: ToolKind,
    },
}

/// Cursor shape requested by the active interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorShape {
    /// Default pointer.
    Arrow,
    /// Pan available.
    OpenHand,
    /// Panning.
    ClosedHand,
    /// Drawing.
    Cross,
}

/// Everything the editor reports to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Smoothed pan delta in screen pixels.
    PanDelta {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
    /// Cursor shape change.
    CursorChanged {
        /// New cursor.
        cursor: CursorShape,
    },
    /// Press/release without meaningful movement.
    ObjectClicked {
        /// Screen x at release.
        x: f64,
        /// Screen y at release.
        y: f64,
        /// Modifier bit mask, see [`Modifiers::mask`].
        modifiers: u8,
    },
    /// One frame of an object drag, in canvas units.
    ObjectDragged {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
    /// Selected item index changed.
    SelectionChanged {
        /// New selection, `None` when nothing is selected.
        index: Option<usize>,
    },
    /// An item was created.
    ItemCreated {
        /// Index of the new item.
        index: usize,
    },
    /// An item was modified.
    ItemModified {
        /// Index of the item.
        index: usize,
    },
    /// An item was removed.
    ItemRemoved {
        /// Former index of the item.
        index: usize,
    },
    /// The visible tile set was recomputed.
    TilesUpdated {
        /// Tiles in row-major order.
        tiles: Vec<Tile>,
    },
    /// Path edit mode toggled.
    EditModeChanged {
        /// Whether edit mode is now active.
        active: bool,
    },
    /// The selected path point set changed.
    PointsSelected {
        /// Selected point indices, ascending.
        indices: Vec<usize>,
    },
    /// Rubber-band preview of a shape being drawn, `None` when cleared.
    DrawPreview {
        /// Canvas-space rectangle.
        rect: Option<Rect>,
    },
    /// Active tool changed.
    ToolChanged {
        /// The new tool.
        tool: ToolKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_mask_roundtrip() {
        let m = Modifiers {
            shift: true,
            alt: true,
            ..Modifiers::NONE
        };
        assert_eq!(m.mask(), 0b0101);
        assert_eq!(Modifiers::from_mask(m.mask()), m);
        assert_eq!(Modifiers::NONE.mask(), 0);
    }

    #[test]
    fn test_input_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{ "type": "press", "x": 10, "y": 20, "button": "middle" }"#)
                .expect("parse");
        match event {
            InputEvent::Press(p) => {
                assert_eq!(p.button, Button::Middle);
                assert_eq!(p.position(), Point::new(10.0, 20.0));
                assert_eq!(p.modifiers, Modifiers::NONE);
            }
            other => panic!("unexpected {other:?}"),
        }

        let wheel: InputEvent =
            serde_json::from_str(r#"{ "type": "wheel", "x": 1, "y": 2, "deltaY": -120 }"#)
                .expect("parse");
        assert!(matches!(wheel, InputEvent::Wheel { delta_y, .. } if delta_y < 0.0));
    }

    #[test]
    fn test_editor_event_json_tag() {
        let json = serde_json::to_value(EditorEvent::SelectionChanged { index: Some(2) })
            .expect("serialize");
        assert_eq!(json["type"], "selectionChanged");
        assert_eq!(json["index"], 2);
    }
}
