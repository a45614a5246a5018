//! Interaction tools and the context they operate on.
//!
//! Tools are state machines fed pointer input in arrival order. They read
//! and mutate items only through [`ToolContext::store`] and report
//! interaction outcomes as [`EditorEvent`](crate::event::EditorEvent)s.

pub mod draw;
pub mod handles;
pub mod select;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::geometry::Point;
use crate::hit::HandleMetrics;
use crate::mapper::Viewport;
use crate::overlay::OverlaySnapshot;
use crate::selection::SelectionState;
use crate::store::ItemStore;

pub use draw::{DrawStyle, DrawTool, ShapeKind, ShapeStrategy};
pub use handles::HandleGesture;
pub use select::{PanSmoother, SelectPhase, SelectTool};

/// The active primary-button tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Select, drag, pan and manipulate handles.
    #[default]
    Select,
    /// Draw rectangles.
    Rectangle,
    /// Draw ellipses.
    Ellipse,
}

impl ToolKind {
    /// Shape drawn by this tool, if it is a drawing tool.
    #[must_use]
    pub const fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::Select => None,
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Ellipse => Some(ShapeKind::Ellipse),
        }
    }
}

/// Everything a tool may read or mutate while handling one event.
pub struct ToolContext<'a> {
    /// The item store.
    pub store: &'a mut dyn ItemStore,
    /// The active selection.
    pub selection: &'a mut SelectionState,
    /// Current pan/zoom.
    pub viewport: &'a Viewport,
    /// Overlay snapshot of the selected item, if any.
    pub overlay: Option<&'a OverlaySnapshot>,
    /// Tunables.
    pub config: &'a EditorConfig,
}

impl ToolContext<'_> {
    /// Screen point to canvas space.
    #[must_use]
    pub fn canvas(&self, screen: Point) -> Point {
        self.viewport.viewport_to_canvas(screen)
    }

    /// Screen distance to canvas units.
    #[must_use]
    pub fn canvas_dist(&self, screen_distance: f64) -> f64 {
        self.viewport.screen_dist_to_canvas(screen_distance)
    }

    /// Handle dimensions from configuration.
    #[must_use]
    pub fn handle_metrics(&self) -> HandleMetrics {
        HandleMetrics::from(self.config)
    }

    /// Open a transaction, logging instead of failing.
    pub fn begin_transaction(&mut self) -> bool {
        match self.store.begin_transaction() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not open transaction: {e}");
                false
            }
        }
    }

    /// Close the open transaction, logging an imbalance.
    pub fn end_transaction(&mut self) {
        end_transaction(self.store);
    }
}

/// Close the store's open transaction, logging an imbalance.
pub(crate) fn end_transaction(store: &mut dyn ItemStore) {
    if let Err(e) = store.end_transaction() {
        tracing::warn!("Could not close transaction: {e}");
    }
}
