//! # Vellum Core
//!
//! Transform, selection-geometry and adaptive-tiling engine for a vector
//! design canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Tools              │  Derived state        │
//! │  - Select/pan/drag  │  - Selection          │
//! │  - Draw shapes      │  - Overlay snapshot   │
//! │  - Handle gestures  │  - Render tiles       │
//! │  - Path editing     │                       │
//! ├─────────────────────────────────────────────┤
//! │  Geometry, transforms, bounds, hit-testing  │
//! ├─────────────────────────────────────────────┤
//! │  ItemStore (external, transactional)        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Coordinates live in three spaces: screen pixels, canvas units (screen
//! through the viewport's pan and zoom) and each item's geometry space
//! (canvas through the item's [`Transform`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bounds;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit;
pub mod item;
pub mod mapper;
pub mod overlay;
pub mod path_edit;
pub mod selection;
pub mod store;
pub mod tiles;
pub mod tools;
pub mod transform;

pub use bounds::{compute_overlay_bounds, displayed_bounds, OverlayBounds};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{CanvasError, CanvasResult};
pub use event::{Button, CursorShape, EditorEvent, InputEvent, Key, Modifiers, PointerInput};
pub use geometry::{GeometryBounds, Point, Rect};
pub use hit::{hit_handle, hit_test, HandleHit, HandleMetrics, ResizeAnchor};
pub use item::{bake_item, Appearance, Geometry, Item, ItemId, ItemKind, PathPoint};
pub use mapper::{canvas_to_overlay_local, overlay_local_to_canvas, Viewport};
pub use overlay::{OverlayCache, OverlaySnapshot};
pub use path_edit::{delete_points, move_handle, move_points, DeleteOutcome, HandleSide, PathEditController};
pub use selection::{SelectionChange, SelectionState, SubscriptionId};
pub use store::{InMemoryStore, ItemPatch, ItemStore, StoreChange};
pub use tiles::{compute_tiles, Tile, TileManager, TilingConfig};
pub use tools::{DrawStyle, DrawTool, HandleGesture, SelectTool, ShapeKind, ToolContext, ToolKind};
pub use transform::{translate_for_origin_change, Transform, TransformKey};

/// Vellum core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
