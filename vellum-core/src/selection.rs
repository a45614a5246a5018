//! The single active selection, with explicit change notification.

use std::collections::BTreeSet;

use crate::item::{Item, ItemKind};
use crate::store::ItemStore;

/// Handle returned by [`SelectionState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What changed in a [`SelectionState`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    /// A different item (or none) is selected.
    SelectionChanged {
        /// The new selection.
        index: Option<usize>,
    },
    /// The selected item was modified in the store; the cached snapshot has
    /// been refreshed.
    ItemModified {
        /// The selected index.
        index: usize,
    },
    /// Selection was reset to none.
    Cleared,
    /// The set of selected path points changed.
    PointsChanged,
    /// Path edit mode was entered or left.
    EditModeChanged {
        /// Whether edit mode is now active.
        active: bool,
    },
}

type Listener = Box<dyn FnMut(&SelectionChange)>;

/// Selected item index, a cached snapshot of that item, the selected path
/// points and the edit-mode flag.
///
/// The snapshot is only refreshed through [`SelectionState::select`] and
/// [`SelectionState::notify_item_modified`]; consumers subscribe to learn
/// when to recompute derived state.
#[derive(Default)]
pub struct SelectionState {
    selected_index: Option<usize>,
    selected_item: Option<Item>,
    selected_points: BTreeSet<usize>,
    edit_mode: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionState")
            .field("selected_index", &self.selected_index)
            .field("selected_points", &self.selected_points)
            .field("edit_mode", &self.edit_mode)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SelectionState {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected item index.
    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Cached snapshot of the selected item.
    #[must_use]
    pub const fn selected_item(&self) -> Option<&Item> {
        self.selected_item.as_ref()
    }

    /// Whether anything is selected.
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.selected_index.is_some()
    }

    /// Selected path point indices.
    #[must_use]
    pub const fn selected_points(&self) -> &BTreeSet<usize> {
        &self.selected_points
    }

    /// Whether path point `index` is selected.
    #[must_use]
    pub fn is_point_selected(&self, index: usize) -> bool {
        self.selected_points.contains(&index)
    }

    /// Whether path edit mode is active.
    #[must_use]
    pub const fn edit_mode_active(&self) -> bool {
        self.edit_mode
    }

    /// Whether the selected item is a path.
    #[must_use]
    pub fn selected_is_path(&self) -> bool {
        self.selected_item
            .as_ref()
            .is_some_and(|item| item.kind == ItemKind::Path)
    }

    /// Register a listener. Listeners run synchronously, in subscription
    /// order, after the state has changed.
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: &SelectionChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    /// Select the item at `index`, caching its snapshot. Selecting a
    /// different item leaves edit mode and clears the point selection.
    ///
    /// Returns `false` (and changes nothing) for an unknown index.
    pub fn select(&mut self, index: usize, store: &dyn ItemStore) -> bool {
        let Some(item) = store.item(index) else {
            tracing::debug!("Ignoring selection of missing item {index}");
            return false;
        };
        self.selected_item = Some(item.clone());
        if self.selected_index == Some(index) {
            return true;
        }
        self.set_edit_mode(false);
        self.selected_points.clear();
        self.selected_index = Some(index);
        self.notify(&SelectionChange::SelectionChanged { index: Some(index) });
        true
    }

    /// Reset to no selection.
    pub fn clear(&mut self) {
        if self.selected_index.is_none() {
            return;
        }
        self.set_edit_mode(false);
        self.selected_points.clear();
        self.selected_index = None;
        self.selected_item = None;
        self.notify(&SelectionChange::Cleared);
    }

    /// Refresh the snapshot if `index` is the selected item.
    pub fn notify_item_modified(&mut self, index: usize, store: &dyn ItemStore) {
        if self.selected_index != Some(index) {
            return;
        }
        match store.item(index) {
            Some(item) => {
                self.selected_item = Some(item.clone());
                self.notify(&SelectionChange::ItemModified { index });
            }
            None => self.clear(),
        }
    }

    /// Keep the selection consistent after the item at `index` was removed.
    pub fn on_item_removed(&mut self, index: usize) {
        match self.selected_index {
            Some(selected) if selected == index => self.clear(),
            Some(selected) if selected > index => {
                self.selected_index = Some(selected - 1);
                self.notify(&SelectionChange::SelectionChanged {
                    index: Some(selected - 1),
                });
            }
            _ => {}
        }
    }

    /// Enter or leave path edit mode. Entering requires a selected path.
    ///
    /// Returns whether the mode is now `active`.
    pub fn set_edit_mode(&mut self, active: bool) -> bool {
        if active && !self.selected_is_path() {
            tracing::debug!("Edit mode requires a selected path");
            return false;
        }
        if self.edit_mode != active {
            self.edit_mode = active;
            if !active && !self.selected_points.is_empty() {
                self.selected_points.clear();
                self.notify(&SelectionChange::PointsChanged);
            }
            self.notify(&SelectionChange::EditModeChanged { active });
        }
        true
    }

    /// Select path point `index`. Additive selection toggles membership,
    /// otherwise the point replaces the current set.
    pub fn select_point(&mut self, index: usize, additive: bool) {
        if additive {
            if !self.selected_points.remove(&index) {
                self.selected_points.insert(index);
            }
        } else {
            self.selected_points.clear();
            self.selected_points.insert(index);
        }
        self.notify(&SelectionChange::PointsChanged);
    }

    /// Replace the point selection.
    pub fn set_points(&mut self, points: impl IntoIterator<Item = usize>) {
        self.selected_points = points.into_iter().collect();
        self.notify(&SelectionChange::PointsChanged);
    }

    /// Deselect all path points.
    pub fn clear_points(&mut self) {
        if self.selected_points.is_empty() {
            return;
        }
        self.selected_points.clear();
        self.notify(&SelectionChange::PointsChanged);
    }
}
