//! The editor facade: owns the store, selection, viewport and tools, and
//! turns input events into [`EditorEvent`]s.
//!
//! Every entry point runs to completion. After a tool has handled the
//! input, the editor applies the tool's requests (pan, drag, click-select),
//! drains the store's change queue and the selection notifications, and
//! refreshes the overlay snapshot if anything invalidated it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::config::EditorConfig;
use crate::error::CanvasResult;
use crate::event::{Button, CursorShape, EditorEvent, InputEvent, Key, PointerInput};
use crate::geometry::Point;
use crate::hit::hit_test;
use crate::mapper::Viewport;
use crate::overlay::{OverlayCache, OverlaySnapshot};
use crate::path_edit::PathEditController;
use crate::selection::{SelectionChange, SelectionState};
use crate::store::{InMemoryStore, ItemStore, StoreChange};
use crate::tiles::{Tile, TileManager};
use crate::tools::{DrawStyle, DrawTool, HandleGesture, SelectTool, ShapeKind, ToolContext, ToolKind};

/// Borrow the editor's fields as a [`ToolContext`], leaving the tool
/// fields free for the call.
macro_rules! tool_ctx {
    ($editor:ident) => {
        ToolContext {
            store: &mut $editor.store,
            selection: &mut $editor.selection,
            viewport: &$editor.viewport,
            overlay: $editor.overlay.snapshot(),
            config: &$editor.config,
        }
    };
}

/// Which component owns the current press-move-release gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Select,
    Draw,
    Handles,
    PathEdit,
}

/// Interactive editing session over an [`ItemStore`].
pub struct Editor<S: ItemStore = InMemoryStore> {
    config: EditorConfig,
    store: S,
    selection: SelectionState,
    viewport: Viewport,
    overlay: OverlayCache,
    select_tool: SelectTool,
    draw_tool: DrawTool,
    path_edit: PathEditController,
    handles: HandleGesture,
    tiles: TileManager,
    tool: ToolKind,
    route: Option<Route>,
    route_button: Button,
    selection_log: Rc<RefCell<Vec<SelectionChange>>>,
}

impl<S: ItemStore> std::fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("tool", &self.tool)
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("items", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl<S: ItemStore> Editor<S> {
    /// Create an editor over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`](crate::CanvasError::InvalidConfig)
    /// if `config` fails validation.
    pub fn new(store: S, config: EditorConfig, viewport: Viewport) -> CanvasResult<Self> {
        config.validate()?;
        let mut selection = SelectionState::new();
        let selection_log = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&selection_log);
        selection.subscribe(move |change| log.borrow_mut().push(change.clone()));

        let mut overlay = OverlayCache::new();
        overlay.attach(&mut selection);
        overlay.refresh(&selection, &store);

        let mut tiles = TileManager::from_config(&config);
        tiles.viewport_changed(&viewport);

        tracing::debug!(
            "Editor ready: {} items, viewport {}x{}",
            store.len(),
            viewport.width,
            viewport.height
        );
        Ok(Self {
            select_tool: SelectTool::new(config.pan_smoothing_window),
            draw_tool: DrawTool::new(ShapeKind::Rectangle, DrawStyle::default()),
            path_edit: PathEditController::new(),
            handles: HandleGesture::new(),
            tool: ToolKind::Select,
            route: None,
            route_button: Button::Primary,
            config,
            store,
            selection,
            viewport,
            overlay,
            tiles,
            selection_log,
        })
    }

    /// The item store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Current pan and zoom.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Overlay snapshot of the selected item.
    #[must_use]
    pub const fn overlay(&self) -> Option<&OverlaySnapshot> {
        self.overlay.snapshot()
    }

    /// Current tile set.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        self.tiles.tiles()
    }

    /// Active tool.
    #[must_use]
    pub const fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// When [`Editor::tick`] next has work to do.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.tiles.next_deadline()
    }

    /// Style used for newly drawn shapes.
    pub fn set_draw_style(&mut self, style: DrawStyle) {
        self.draw_tool.set_style(style);
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> Vec<EditorEvent> {
        let mut events = self.tick(now);
        events.extend(match event {
            InputEvent::Press(input) => self.press(input),
            InputEvent::Move(input) => self.pointer_move(input),
            InputEvent::Release(input) => self.release(input),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(Point::new(*x, *y), *delta_y, now),
            InputEvent::Resize { width, height } => self.resize(*width, *height),
            InputEvent::Key { key } => self.key(*key),
            InputEvent::Tool { tool } => self.set_tool(*tool),
        });
        events
    }

    /// Button press.
    pub fn press(&mut self, input: &PointerInput) -> Vec<EditorEvent> {
        if self.route.is_some() {
            tracing::trace!("Ignoring {:?} press during an active gesture", input.button);
            return Vec::new();
        }
        self.route_button = input.button;
        let mut out = Vec::new();
        if input.button == Button::Middle {
            let events = self.select_tool.press(&mut tool_ctx!(self), input);
            self.route = Some(Route::Select);
            self.apply_tool_events(events, &mut out);
        } else if self.tool.shape().is_some() {
            let events = self.draw_tool.press(&mut tool_ctx!(self), input);
            if self.draw_tool.is_drawing() {
                self.route = Some(Route::Draw);
            }
            self.apply_tool_events(events, &mut out);
        } else if self.path_edit.press(&mut tool_ctx!(self), input) {
            self.route = Some(Route::PathEdit);
        } else if self.handles.press(&mut tool_ctx!(self), input) {
            self.route = Some(Route::Handles);
        } else {
            let events = self.select_tool.press(&mut tool_ctx!(self), input);
            self.route = Some(Route::Select);
            self.apply_tool_events(events, &mut out);
        }
        self.finish(&mut out);
        out
    }

    /// Pointer movement, with or without a button held.
    pub fn pointer_move(&mut self, input: &PointerInput) -> Vec<EditorEvent> {
        let mut out = Vec::new();
        match self.route {
            Some(Route::PathEdit) => {
                self.path_edit.drag(&mut tool_ctx!(self), input);
            }
            Some(Route::Handles) => {
                self.handles.drag(&mut tool_ctx!(self), input);
            }
            Some(Route::Draw) => {
                let events = self.draw_tool.pointer_move(&mut tool_ctx!(self), input);
                self.apply_tool_events(events, &mut out);
            }
            Some(Route::Select) => {
                let events = self.select_tool.pointer_move(&mut tool_ctx!(self), input);
                self.apply_tool_events(events, &mut out);
            }
            None => {}
        }
        self.finish(&mut out);
        out
    }

    /// Button release. Only the button that started the gesture ends it.
    pub fn release(&mut self, input: &PointerInput) -> Vec<EditorEvent> {
        if self.route.is_some() && input.button != self.route_button {
            tracing::trace!("Ignoring {:?} release during a {:?} gesture", input.button, self.route_button);
            return Vec::new();
        }
        let mut out = Vec::new();
        match self.route.take() {
            Some(Route::PathEdit) => {
                self.path_edit.release(&mut tool_ctx!(self));
            }
            Some(Route::Handles) => {
                self.handles.release(&mut tool_ctx!(self));
            }
            Some(Route::Draw) => {
                let events = self.draw_tool.release(&mut tool_ctx!(self), input);
                self.apply_tool_events(events, &mut out);
            }
            Some(Route::Select) => {
                let events = self.select_tool.release(&mut tool_ctx!(self), input);
                self.apply_tool_events(events, &mut out);
            }
            None => {}
        }
        self.finish(&mut out);
        out
    }

    /// Wheel zoom about the cursor. The tile rebuild is debounced.
    pub fn wheel(&mut self, screen: Point, delta_y: f64, now: Instant) -> Vec<EditorEvent> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return Vec::new();
        }
        let step = self.config.wheel_zoom_step;
        let factor = if delta_y < 0.0 { step } else { step.recip() };
        self.viewport
            .zoom_at(screen, factor, self.config.min_zoom, self.config.max_zoom);
        tracing::trace!("Zoom {} at {screen:?}", self.viewport.zoom);
        self.tiles.zoom_changed(&self.viewport, now);
        Vec::new()
    }

    /// Viewport resized. Tiles are rebuilt immediately.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<EditorEvent> {
        self.viewport.set_size(width, height);
        vec![EditorEvent::TilesUpdated {
            tiles: self.tiles.viewport_changed(&self.viewport).to_vec(),
        }]
    }

    /// Editing keys.
    pub fn key(&mut self, key: Key) -> Vec<EditorEvent> {
        let mut out = Vec::new();
        match key {
            Key::Delete => self.delete_selection(),
            Key::Escape => {
                self.cancel_gestures();
                if self.selection.edit_mode_active() {
                    self.selection.set_edit_mode(false);
                } else {
                    self.selection.clear();
                }
            }
            Key::Enter => {
                self.selection.set_edit_mode(true);
            }
        }
        self.finish(&mut out);
        out
    }

    /// Run a due debounced tile rebuild.
    pub fn tick(&mut self, now: Instant) -> Vec<EditorEvent> {
        self.tiles
            .poll(now)
            .map(|tiles| EditorEvent::TilesUpdated {
                tiles: tiles.to_vec(),
            })
            .into_iter()
            .collect()
    }

    /// Switch tools. Any gesture in flight is cancelled and its
    /// transaction closed.
    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<EditorEvent> {
        self.cancel_gestures();
        self.tool = tool;
        if let Some(kind) = tool.shape() {
            self.draw_tool.set_kind(kind);
        }
        tracing::debug!("Tool {tool:?}");
        let cursor = if tool.shape().is_some() {
            CursorShape::Cross
        } else {
            CursorShape::Arrow
        };
        let mut out = vec![
            EditorEvent::ToolChanged { tool },
            EditorEvent::CursorChanged { cursor },
        ];
        self.finish(&mut out);
        out
    }

    /// Fold the selected item's transform into its geometry.
    pub fn bake_selected(&mut self) -> Vec<EditorEvent> {
        let mut out = Vec::new();
        if let Some(index) = self.selection.selected_index() {
            if self.begin_transaction() {
                if let Err(e) = self.store.bake_transform(index) {
                    tracing::debug!("Dropping bake: {e}");
                }
                crate::tools::end_transaction(&mut self.store);
            }
        }
        self.finish(&mut out);
        out
    }

    /// Move the selected item's origin fraction without moving the shape.
    pub fn set_origin_selected(&mut self, origin: Point) -> Vec<EditorEvent> {
        let mut out = Vec::new();
        let target = self.selection.selected_index().and_then(|index| {
            let item = self.store.item(index)?;
            let bounds = item.geometry_bounds()?;
            Some((index, item.transform.with_origin_preserved(&bounds, origin)))
        });
        if let Some((index, transform)) = target {
            if self.begin_transaction() {
                if let Err(e) = self.store.set_item_transform(index, transform) {
                    tracing::debug!("Dropping origin change: {e}");
                }
                crate::tools::end_transaction(&mut self.store);
            }
        }
        self.finish(&mut out);
        out
    }

    fn begin_transaction(&mut self) -> bool {
        match self.store.begin_transaction() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not open transaction: {e}");
                false
            }
        }
    }

    fn cancel_gestures(&mut self) {
        self.select_tool.reset(&mut self.store);
        self.handles.reset(&mut self.store);
        self.path_edit.reset(&mut self.store);
        self.draw_tool.reset();
        self.route = None;
    }

    fn delete_selection(&mut self) {
        if self.route.is_some() {
            return;
        }
        if PathEditController::is_active(&self.selection, &self.store)
            && !self.selection.selected_points().is_empty()
        {
            self.path_edit.delete_selected_points(&mut tool_ctx!(self));
            return;
        }
        let Some(index) = self.selection.selected_index() else {
            return;
        };
        if self.begin_transaction() {
            if let Err(e) = self.store.remove_item(index) {
                tracing::debug!("Dropping delete: {e}");
            }
            crate::tools::end_transaction(&mut self.store);
        }
    }

    fn apply_tool_events(&mut self, events: Vec<EditorEvent>, out: &mut Vec<EditorEvent>) {
        for event in events {
            match event {
                EditorEvent::PanDelta { dx, dy } => {
                    self.viewport.pan_by(dx, dy);
                    out.push(event);
                    out.push(EditorEvent::TilesUpdated {
                        tiles: self.tiles.viewport_changed(&self.viewport).to_vec(),
                    });
                }
                EditorEvent::ObjectDragged { dx, dy } => {
                    self.translate_selected(dx, dy);
                    out.push(event);
                }
                EditorEvent::ObjectClicked { x, y, .. } => {
                    out.push(event);
                    self.click_select(Point::new(x, y));
                }
                other => out.push(other),
            }
        }
    }

    fn translate_selected(&mut self, dx: f64, dy: f64) {
        let Some(index) = self.selection.selected_index() else {
            return;
        };
        let Some(item) = self.store.item(index) else {
            return;
        };
        if item.locked {
            tracing::debug!("Item {index} is locked");
            return;
        }
        let mut transform = item.transform;
        transform.translate_x += dx;
        transform.translate_y += dy;
        if let Err(e) = self.store.set_item_transform(index, transform) {
            tracing::debug!("Dropping drag: {e}");
        }
    }

    fn click_select(&mut self, screen: Point) {
        let canvas = self.viewport.viewport_to_canvas(screen);
        let store = &self.store;
        let hit = hit_test(
            store.items(),
            canvas,
            |index| store.bounding_box(index),
            self.viewport.screen_dist_to_canvas(self.config.path_hit_tolerance_px),
        );
        match hit {
            Some(index) => {
                self.selection.select(index, &self.store);
            }
            None => self.selection.clear(),
        }
    }

    /// Turn queued store and selection changes into events and bring the
    /// overlay up to date.
    fn finish(&mut self, out: &mut Vec<EditorEvent>) {
        for change in self.store.drain_changes() {
            match change {
                StoreChange::Added(index) => {
                    out.push(EditorEvent::ItemCreated { index });
                    self.selection.select(index, &self.store);
                }
                StoreChange::Modified(index) => {
                    out.push(EditorEvent::ItemModified { index });
                    self.selection.notify_item_modified(index, &self.store);
                }
                StoreChange::Removed(index) => {
                    out.push(EditorEvent::ItemRemoved { index });
                    self.selection.on_item_removed(index);
                }
            }
        }

        let changes: Vec<SelectionChange> = self.selection_log.borrow_mut().drain(..).collect();
        for change in changes {
            match change {
                SelectionChange::SelectionChanged { index } => {
                    out.push(EditorEvent::SelectionChanged { index });
                }
                SelectionChange::Cleared => out.push(EditorEvent::SelectionChanged { index: None }),
                SelectionChange::PointsChanged => out.push(EditorEvent::PointsSelected {
                    indices: self.selection.selected_points().iter().copied().collect(),
                }),
                SelectionChange::EditModeChanged { active } => {
                    out.push(EditorEvent::EditModeChanged { active });
                }
                SelectionChange::ItemModified { .. } => {}
            }
        }

        self.overlay.refresh_if_dirty(&self.selection, &self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanvasError;
    use crate::event::Modifiers;
    use crate::geometry::Rect;
    use crate::item::{Item, PathPoint};
    use std::time::Duration;

    // Canvas (0,0) is screen (400,300) at zoom 1.
    fn editor(items: Vec<Item>) -> Editor {
        Editor::new(
            InMemoryStore::from_items(items),
            EditorConfig::default(),
            Viewport::new(800.0, 600.0),
        )
        .expect("editor")
    }

    fn at(x: f64, y: f64) -> PointerInput {
        PointerInput::at(x, y)
    }

    fn click(editor: &mut Editor, x: f64, y: f64) -> Vec<EditorEvent> {
        let mut events = editor.press(&at(x, y));
        events.extend(editor.release(&at(x, y)));
        events
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EditorConfig {
            pan_smoothing_window: 0,
            ..EditorConfig::default()
        };
        let result = Editor::new(InMemoryStore::new(), config, Viewport::default());
        assert!(matches!(result, Err(CanvasError::InvalidConfig(_))));
    }

    #[test]
    fn test_initial_tiles() {
        let editor = editor(Vec::new());
        assert!(!editor.tiles().is_empty());
        assert!(editor.tiles().len() <= 16);
    }

    #[test]
    fn test_click_selects_topmost_and_empty_click_clears() {
        let mut editor = editor(vec![
            Item::rectangle(0.0, 0.0, 100.0, 100.0),
            Item::rectangle(50.0, 50.0, 100.0, 100.0),
        ]);
        let events = click(&mut editor, 475.0, 375.0);
        assert!(events.contains(&EditorEvent::SelectionChanged { index: Some(1) }));
        assert_eq!(editor.selection().selected_index(), Some(1));
        assert_eq!(editor.overlay().map(|s| s.index), Some(1));

        let events = click(&mut editor, 700.0, 100.0);
        assert!(events.contains(&EditorEvent::SelectionChanged { index: None }));
        assert!(editor.overlay().is_none());
    }

    #[test]
    fn test_drag_selected_item_in_one_transaction() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 100.0)]);
        click(&mut editor, 450.0, 350.0);
        editor.press(&at(450.0, 350.0));
        let events = editor.pointer_move(&at(460.0, 350.0));
        assert_eq!(
            events,
            vec![
                EditorEvent::ObjectDragged { dx: 10.0, dy: 0.0 },
                EditorEvent::ItemModified { index: 0 }
            ]
        );
        editor.pointer_move(&at(470.0, 360.0));
        editor.release(&at(470.0, 360.0));
        assert_eq!(editor.store().committed_transactions(), 1);
        let t = editor.store().item_transform(0).expect("transform");
        assert!((t.translate_x - 20.0).abs() < 1e-9);
        assert!((t.translate_y - 10.0).abs() < 1e-9);
        let snap = editor.overlay().expect("overlay");
        assert!((snap.bounds.x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_middle_drag_pans_and_retiles() {
        let mut editor = editor(Vec::new());
        editor.press(&at(400.0, 300.0).with_button(Button::Middle));
        let events = editor.pointer_move(&at(430.0, 300.0));
        assert!(matches!(events[0], EditorEvent::PanDelta { .. }));
        assert!(matches!(events[1], EditorEvent::TilesUpdated { .. }));
        assert!((editor.viewport().offset_x - 30.0).abs() < 1e-9);
        let events = editor.release(&at(430.0, 300.0).with_button(Button::Middle));
        assert_eq!(
            events,
            vec![EditorEvent::CursorChanged {
                cursor: CursorShape::Arrow
            }]
        );
    }

    #[test]
    fn test_wheel_zoom_retiles_once_after_debounce() {
        let mut editor = editor(Vec::new());
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        assert!(editor.wheel(Point::new(400.0, 300.0), 1.0, t0).is_empty());
        assert!(editor.tick(t0 + ms(10)).is_empty());
        editor.wheel(Point::new(400.0, 300.0), 1.0, t0 + ms(30));
        assert!(editor.tick(t0 + ms(60)).is_empty());
        assert_eq!(editor.next_deadline(), Some(t0 + ms(80)));
        let events = editor.tick(t0 + ms(80));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EditorEvent::TilesUpdated { .. }));
        assert!(editor.tick(t0 + ms(200)).is_empty());
        assert!(editor.viewport().zoom < 1.0);
    }

    #[test]
    fn test_draw_rectangle_selects_new_item() {
        let mut editor = editor(Vec::new());
        let events = editor.set_tool(ToolKind::Rectangle);
        assert_eq!(
            events,
            vec![
                EditorEvent::ToolChanged {
                    tool: ToolKind::Rectangle
                },
                EditorEvent::CursorChanged {
                    cursor: CursorShape::Cross
                }
            ]
        );
        editor.press(&at(400.0, 300.0));
        editor.pointer_move(&at(450.0, 350.0));
        let events = editor.release(&at(450.0, 350.0));
        assert_eq!(
            events,
            vec![
                EditorEvent::DrawPreview { rect: None },
                EditorEvent::ItemCreated { index: 0 },
                EditorEvent::SelectionChanged { index: Some(0) }
            ]
        );
        assert_eq!(editor.store().bounding_box(0), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_tool_switch_mid_drag_closes_transaction() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 100.0)]);
        click(&mut editor, 450.0, 350.0);
        editor.press(&at(450.0, 350.0));
        editor.pointer_move(&at(480.0, 350.0));
        assert!(editor.store().in_transaction());
        editor.set_tool(ToolKind::Ellipse);
        assert!(!editor.store().in_transaction());
        assert!(editor.release(&at(480.0, 350.0)).is_empty());
    }

    #[test]
    fn test_resize_handle_does_not_drag_or_click() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 100.0)]);
        click(&mut editor, 450.0, 350.0);
        editor.press(&at(500.0, 400.0));
        let events = editor.pointer_move(&at(550.0, 400.0));
        assert_eq!(events, vec![EditorEvent::ItemModified { index: 0 }]);
        let events = editor.release(&at(550.0, 400.0));
        assert!(events.is_empty());
        let bounds = editor.store().bounding_box(0).expect("bounds");
        assert!((bounds.width - 150.0).abs() < 1e-9);
        assert!((editor.overlay().expect("overlay").bounds.width - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_editing_through_keys() {
        let mut editor = editor(vec![Item::path(
            vec![PathPoint::new(0.0, 0.0), PathPoint::new(100.0, 50.0)],
            false,
        )]);
        click(&mut editor, 450.0, 325.0);
        assert_eq!(editor.selection().selected_index(), Some(0));
        let events = editor.key(Key::Enter);
        assert_eq!(events, vec![EditorEvent::EditModeChanged { active: true }]);

        let events = editor.press(&at(400.0, 300.0));
        assert_eq!(events, vec![EditorEvent::PointsSelected { indices: vec![0] }]);
        editor.release(&at(400.0, 300.0));
        editor.press(&at(500.0, 350.0).with_modifiers(Modifiers::SHIFT));
        editor.release(&at(500.0, 350.0));

        let events = editor.key(Key::Delete);
        assert!(events.contains(&EditorEvent::ItemRemoved { index: 0 }));
        assert!(events.contains(&EditorEvent::EditModeChanged { active: false }));
        assert!(events.contains(&EditorEvent::SelectionChanged { index: None }));
        assert!(editor.store().is_empty());
        assert!(!editor.selection().edit_mode_active());
    }

    #[test]
    fn test_escape_leaves_edit_mode_then_deselects() {
        let mut editor = editor(vec![Item::path(
            vec![PathPoint::new(0.0, 0.0), PathPoint::new(100.0, 50.0)],
            false,
        )]);
        click(&mut editor, 450.0, 325.0);
        editor.key(Key::Enter);
        assert_eq!(
            editor.key(Key::Escape),
            vec![EditorEvent::EditModeChanged { active: false }]
        );
        assert_eq!(
            editor.key(Key::Escape),
            vec![EditorEvent::SelectionChanged { index: None }]
        );
    }

    #[test]
    fn test_delete_removes_selected_item() {
        let mut editor = editor(vec![
            Item::rectangle(0.0, 0.0, 10.0, 10.0),
            Item::rectangle(50.0, 50.0, 10.0, 10.0),
        ]);
        click(&mut editor, 455.0, 355.0);
        let events = editor.key(Key::Delete);
        assert_eq!(
            events,
            vec![
                EditorEvent::ItemRemoved { index: 1 },
                EditorEvent::SelectionChanged { index: None }
            ]
        );
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn test_set_origin_keeps_rendered_bounds() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 50.0)]);
        click(&mut editor, 450.0, 320.0);
        editor.set_origin_selected(Point::new(0.5, 0.5));
        let t = editor.store().item_transform(0).expect("transform");
        assert!((t.origin_x - 0.5).abs() < 1e-9);
        assert_eq!(editor.store().bounding_box(0), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn test_other_button_release_does_not_end_drag() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 100.0)]);
        click(&mut editor, 450.0, 350.0);
        editor.press(&at(450.0, 350.0));
        editor.pointer_move(&at(470.0, 350.0));
        assert!(editor.store().in_transaction());

        let middle = at(470.0, 350.0).with_button(Button::Middle);
        assert!(editor.press(&middle).is_empty());
        assert!(editor.release(&middle).is_empty());
        assert!(editor.store().in_transaction());

        let events = editor.pointer_move(&at(500.0, 350.0));
        assert!(events.contains(&EditorEvent::ObjectDragged { dx: 30.0, dy: 0.0 }));
        editor.release(&at(500.0, 350.0));
        assert!(!editor.store().in_transaction());
        assert_eq!(editor.store().committed_transactions(), 1);
        let t = editor.store().item_transform(0).expect("transform");
        assert!((t.translate_x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_button_release_does_not_click() {
        let mut editor = editor(vec![Item::rectangle(0.0, 0.0, 100.0, 100.0)]);
        editor.press(&at(450.0, 350.0));
        let events = editor.release(&at(450.0, 350.0).with_button(Button::Secondary));
        assert!(events.is_empty());
        assert_eq!(editor.selection().selected_index(), None);
        let events = editor.release(&at(450.0, 350.0));
        assert!(events.contains(&EditorEvent::SelectionChanged { index: Some(0) }));
    }

    #[test]
    fn test_path_tolerance_scales_with_zoom() {
        let zoomed = |zoom: f64, items: Vec<Item>| {
            let viewport = Viewport {
                zoom,
                ..Viewport::new(800.0, 600.0)
            };
            Editor::new(InMemoryStore::from_items(items), EditorConfig::default(), viewport).expect("editor")
        };

        // Zoomed out, 2px of tolerance covers 4 canvas units.
        let path = Item::path(vec![PathPoint::new(0.0, 0.0), PathPoint::new(100.0, 50.0)], false);
        let mut editor = zoomed(0.5, vec![path]);
        click(&mut editor, 451.5, 312.5);
        assert_eq!(editor.selection().selected_index(), Some(0));

        // Zoomed in, the same 2px shrink to half a canvas unit.
        let path = Item::path(vec![PathPoint::new(0.0, 0.0), PathPoint::new(40.0, 20.0)], false);
        let mut editor = zoomed(4.0, vec![path]);
        click(&mut editor, 566.0, 340.0);
        assert_eq!(editor.selection().selected_index(), None);
        click(&mut editor, 560.0, 340.0);
        assert_eq!(editor.selection().selected_index(), Some(0));
    }

    #[test]
    fn test_handle_dispatches_input_events() {
        let mut editor = editor(Vec::new());
        let now = Instant::now();
        let events = editor.handle(
            &InputEvent::Resize {
                width: 1024.0,
                height: 768.0,
            },
            now,
        );
        assert!(matches!(events[0], EditorEvent::TilesUpdated { .. }));
        assert!((editor.viewport().width - 1024.0).abs() < f64::EPSILON);
        let events = editor.handle(
            &InputEvent::Tool {
                tool: ToolKind::Ellipse,
            },
            now,
        );
        assert_eq!(events[0], EditorEvent::ToolChanged { tool: ToolKind::Ellipse });
    }
}
