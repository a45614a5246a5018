//! Cached overlay geometry for the selected item.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::bounds::{compute_overlay_bounds, OverlayBounds};
use crate::geometry::GeometryBounds;
use crate::selection::{SelectionChange, SelectionState, SubscriptionId};
use crate::store::ItemStore;
use crate::transform::Transform;

/// Immutable snapshot of everything the overlay and handle hit-testing
/// need for the selected item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    /// Paint-order index of the selected item.
    pub index: usize,
    /// Unscaled geometry bounds.
    pub geometry_bounds: GeometryBounds,
    /// Transform at snapshot time.
    pub transform: Transform,
    /// Displayed bounds and pivot.
    pub bounds: OverlayBounds,
}

/// Holds the current [`OverlaySnapshot`] and recomputes it when the
/// selection reports a change.
#[derive(Debug, Default)]
pub struct OverlayCache {
    snapshot: Option<OverlaySnapshot>,
    dirty: Rc<Cell<bool>>,
    subscription: Option<SubscriptionId>,
}

impl OverlayCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `selection` so every change marks the cache dirty.
    pub fn attach(&mut self, selection: &mut SelectionState) {
        if let Some(id) = self.subscription.take() {
            selection.unsubscribe(id);
        }
        let dirty = Rc::clone(&self.dirty);
        self.subscription = Some(selection.subscribe(move |change| {
            if !matches!(change, SelectionChange::PointsChanged) {
                dirty.set(true);
            }
        }));
        self.dirty.set(true);
    }

    /// Stop listening to `selection`.
    pub fn detach(&mut self, selection: &mut SelectionState) {
        if let Some(id) = self.subscription.take() {
            selection.unsubscribe(id);
        }
    }

    /// Whether a refresh is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Force the next [`OverlayCache::refresh_if_dirty`] to recompute.
    pub fn invalidate(&self) {
        self.dirty.set(true);
    }

    /// Current snapshot, possibly stale if [`OverlayCache::is_dirty`].
    #[must_use]
    pub const fn snapshot(&self) -> Option<&OverlaySnapshot> {
        self.snapshot.as_ref()
    }

    /// Recompute from the store for the current selection.
    pub fn refresh(&mut self, selection: &SelectionState, store: &dyn ItemStore) -> Option<&OverlaySnapshot> {
        self.dirty.set(false);
        self.snapshot = selection.selected_index().and_then(|index| {
            let item = store.item(index)?;
            let geometry_bounds = item.geometry_bounds()?;
            let bounds = compute_overlay_bounds(&geometry_bounds, &item.transform)?;
            Some(OverlaySnapshot {
                index,
                geometry_bounds,
                transform: item.transform,
                bounds,
            })
        });
        self.snapshot.as_ref()
    }

    /// Recompute only when a notification arrived since the last refresh.
    pub fn refresh_if_dirty(&mut self, selection: &SelectionState, store: &dyn ItemStore) -> bool {
        if !self.dirty.get() {
            return false;
        }
        self.refresh(selection, store);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::store::InMemoryStore;
    use crate::transform::TransformKey;

    #[test]
    fn test_refresh_follows_selection_and_modification() {
        let mut store = InMemoryStore::from_items(vec![
            Item::rectangle(0.0, 0.0, 100.0, 50.0),
            Item::group(),
        ]);
        let mut selection = SelectionState::new();
        let mut cache = OverlayCache::new();
        cache.attach(&mut selection);
        assert!(cache.refresh_if_dirty(&selection, &store));
        assert!(cache.snapshot().is_none());
        assert!(!cache.refresh_if_dirty(&selection, &store));

        selection.select(0, &store);
        assert!(cache.is_dirty());
        cache.refresh_if_dirty(&selection, &store);
        let snap = cache.snapshot().expect("snapshot");
        assert!((snap.bounds.width - 100.0).abs() < f64::EPSILON);

        store
            .update_transform_property(0, TransformKey::ScaleX, 2.0)
            .expect("update");
        selection.notify_item_modified(0, &store);
        cache.refresh_if_dirty(&selection, &store);
        let snap = cache.snapshot().expect("snapshot");
        assert!((snap.bounds.width - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_container_selection_has_no_snapshot() {
        let store = InMemoryStore::from_items(vec![Item::layer()]);
        let mut selection = SelectionState::new();
        let mut cache = OverlayCache::new();
        cache.attach(&mut selection);
        selection.select(0, &store);
        cache.refresh_if_dirty(&selection, &store);
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn test_detach_stops_invalidation() {
        let store = InMemoryStore::from_items(vec![Item::rectangle(0.0, 0.0, 1.0, 1.0)]);
        let mut selection = SelectionState::new();
        let mut cache = OverlayCache::new();
        cache.attach(&mut selection);
        cache.refresh_if_dirty(&selection, &store);
        cache.detach(&mut selection);
        selection.select(0, &store);
        assert!(!cache.is_dirty());
    }
}
