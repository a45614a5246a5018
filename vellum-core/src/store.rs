//! Item storage contract and an in-memory reference store.
//!
//! The editing core never owns items. It reaches them through [`ItemStore`],
//! addressing each by its paint-order index (0 is bottommost), and brackets
//! grouped mutations with [`ItemStore::begin_transaction`] /
//! [`ItemStore::end_transaction`].

use serde::{Deserialize, Serialize};

use crate::bounds::displayed_bounds;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{GeometryBounds, Rect};
use crate::item::{Appearance, Geometry, Item, ItemId};
use crate::transform::{Transform, TransformKey};

/// Notification queued by a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum StoreChange {
    /// An item was inserted at this index.
    Added(usize),
    /// The item at this index changed geometry, transform or data.
    Modified(usize),
    /// The item previously at this index was removed.
    Removed(usize),
}

/// A partial update for [`ItemStore::update_item`]. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Replacement transform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Replacement appearance stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearances: Option<Vec<Appearance>>,
    /// New parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New lock state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl ItemPatch {
    /// Patch that only replaces geometry.
    #[must_use]
    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields to `item`.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(geometry) = &self.geometry {
            item.geometry = geometry.clone();
        }
        if let Some(transform) = self.transform {
            item.transform = transform;
        }
        if let Some(appearances) = &self.appearances {
            item.appearances.clone_from(appearances);
        }
        if let Some(parent_id) = self.parent_id {
            item.parent_id = Some(parent_id);
        }
        if let Some(visible) = self.visible {
            item.visible = visible;
        }
        if let Some(locked) = self.locked {
            item.locked = locked;
        }
    }
}

/// Accessor contract between the editing core and whatever owns the items.
///
/// Indices are paint order. Mutating calls fail with
/// [`CanvasError::ItemNotFound`] for stale indices; callers in the core log
/// and drop those errors.
pub trait ItemStore {
    /// Items in paint order.
    fn items(&self) -> &[Item];

    /// Number of items.
    fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether the store holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item data at `index`.
    fn item(&self, index: usize) -> Option<&Item> {
        self.items().get(index)
    }

    /// Unscaled geometry bounds, or `None` for containers and stale indices.
    fn geometry_bounds(&self, index: usize) -> Option<GeometryBounds> {
        self.item(index).and_then(Item::geometry_bounds)
    }

    /// Post-transform axis-aligned bounds, or `None` when the geometry is
    /// degenerate.
    fn bounding_box(&self, index: usize) -> Option<Rect> {
        let item = self.item(index)?;
        displayed_bounds(&item.geometry_bounds()?, &item.transform)
    }

    /// Current transform of the item.
    fn item_transform(&self, index: usize) -> Option<Transform> {
        self.item(index).map(|item| item.transform)
    }

    /// Replace the item's transform.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ItemNotFound`] for an unknown index.
    fn set_item_transform(&mut self, index: usize, transform: Transform) -> CanvasResult<()>;

    /// Set a single transform property.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ItemNotFound`] for an unknown index.
    fn update_transform_property(
        &mut self,
        index: usize,
        key: TransformKey,
        value: f64,
    ) -> CanvasResult<()> {
        let mut transform = self
            .item_transform(index)
            .ok_or(CanvasError::ItemNotFound(index))?;
        key.set(&mut transform, value);
        self.set_item_transform(index, transform)
    }

    /// Fold the item's transform into its geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ItemNotFound`] for an unknown index.
    fn bake_transform(&mut self, index: usize) -> CanvasResult<()>;

    /// Open an undo group.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::TransactionAlreadyOpen`] if one is open.
    fn begin_transaction(&mut self) -> CanvasResult<()>;

    /// Close the open undo group.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoOpenTransaction`] if none is open.
    fn end_transaction(&mut self) -> CanvasResult<()>;

    /// Whether an undo group is open.
    fn in_transaction(&self) -> bool;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ItemNotFound`] for an unknown index.
    fn update_item(&mut self, index: usize, patch: &ItemPatch) -> CanvasResult<()>;

    /// Append an item on top of the paint order, returning its index.
    fn add_item(&mut self, item: Item) -> usize;

    /// Remove and return the item at `index`. Later items shift down.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ItemNotFound`] for an unknown index.
    fn remove_item(&mut self, index: usize) -> CanvasResult<Item>;

    /// Take the changes queued since the last call, oldest first.
    fn drain_changes(&mut self) -> Vec<StoreChange>;
}

/// `Vec`-backed [`ItemStore`] with single-level transactions.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    items: Vec<Item>,
    transaction_open: bool,
    committed: usize,
    changes: Vec<StoreChange>,
    min_displayed: f64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            transaction_open: false,
            committed: 0,
            changes: Vec::new(),
            min_displayed: 1.0,
        }
    }

    /// Create a store holding `items` in paint order, clamping each into
    /// range.
    #[must_use]
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        store.items = items
            .into_iter()
            .map(|item| item.validated(store.min_displayed))
            .collect();
        store
    }

    /// Set the smallest displayed size transforms are clamped to.
    #[must_use]
    pub fn with_min_displayed(mut self, min_displayed: f64) -> Self {
        self.min_displayed = min_displayed;
        self
    }

    /// Number of transactions closed so far.
    #[must_use]
    pub const fn committed_transactions(&self) -> usize {
        self.committed
    }

    /// Find an item's index by id.
    #[must_use]
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn item_mut(&mut self, index: usize) -> CanvasResult<&mut Item> {
        self.items
            .get_mut(index)
            .ok_or(CanvasError::ItemNotFound(index))
    }
}

impl ItemStore for InMemoryStore {
    fn items(&self) -> &[Item] {
        &self.items
    }

    fn set_item_transform(&mut self, index: usize, transform: Transform) -> CanvasResult<()> {
        let min_displayed = self.min_displayed;
        let item = self.item_mut(index)?;
        item.transform = match item.geometry_bounds() {
            Some(bounds) => transform.clamped(&bounds, min_displayed),
            None => transform,
        };
        self.changes.push(StoreChange::Modified(index));
        Ok(())
    }

    fn bake_transform(&mut self, index: usize) -> CanvasResult<()> {
        let item = self.item_mut(index)?;
        *item = item.baked();
        tracing::debug!("Baked transform of item {index}");
        self.changes.push(StoreChange::Modified(index));
        Ok(())
    }

    fn begin_transaction(&mut self) -> CanvasResult<()> {
        if self.transaction_open {
            return Err(CanvasError::TransactionAlreadyOpen);
        }
        self.transaction_open = true;
        tracing::trace!("Transaction opened");
        Ok(())
    }

    fn end_transaction(&mut self) -> CanvasResult<()> {
        if !self.transaction_open {
            return Err(CanvasError::NoOpenTransaction);
        }
        self.transaction_open = false;
        self.committed += 1;
        tracing::trace!("Transaction committed ({} total)", self.committed);
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.transaction_open
    }

    fn update_item(&mut self, index: usize, patch: &ItemPatch) -> CanvasResult<()> {
        let min_displayed = self.min_displayed;
        let item = self.item_mut(index)?;
        let mut updated = item.clone();
        patch.apply_to(&mut updated);
        *item = updated.validated(min_displayed);
        self.changes.push(StoreChange::Modified(index));
        Ok(())
    }

    fn add_item(&mut self, item: Item) -> usize {
        self.items.push(item.validated(self.min_displayed));
        let index = self.items.len() - 1;
        self.changes.push(StoreChange::Added(index));
        index
    }

    fn remove_item(&mut self, index: usize) -> CanvasResult<Item> {
        if index >= self.items.len() {
            return Err(CanvasError::ItemNotFound(index));
        }
        let item = self.items.remove(index);
        self.changes.push(StoreChange::Removed(index));
        Ok(item)
    }

    fn drain_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PathPoint;

    fn store_with_rect() -> InMemoryStore {
        InMemoryStore::from_items(vec![Item::rectangle(0.0, 0.0, 100.0, 50.0)])
    }

    #[test]
    fn test_bounding_box_uses_transform() {
        let mut store = store_with_rect();
        store
            .set_item_transform(
                0,
                Transform {
                    scale_x: 2.0,
                    translate_x: 10.0,
                    translate_y: 5.0,
                    ..Transform::identity()
                },
            )
            .expect("set");
        assert_eq!(store.bounding_box(0), Some(Rect::new(10.0, 5.0, 200.0, 50.0)));
        assert_eq!(store.geometry_bounds(0), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn test_single_open_transaction() {
        let mut store = InMemoryStore::new();
        store.begin_transaction().expect("begin");
        assert!(matches!(
            store.begin_transaction(),
            Err(CanvasError::TransactionAlreadyOpen)
        ));
        store.end_transaction().expect("end");
        assert!(matches!(
            store.end_transaction(),
            Err(CanvasError::NoOpenTransaction)
        ));
        assert_eq!(store.committed_transactions(), 1);
    }

    #[test]
    fn test_update_transform_property() {
        let mut store = store_with_rect();
        store
            .update_transform_property(0, TransformKey::Rotate, 30.0)
            .expect("update");
        let t = store.item_transform(0).expect("transform");
        assert!((t.rotate - 30.0).abs() < f64::EPSILON);
        assert!(matches!(
            store.update_transform_property(4, TransformKey::Rotate, 1.0),
            Err(CanvasError::ItemNotFound(4))
        ));
    }

    #[test]
    fn test_set_transform_clamps_input() {
        let mut store = store_with_rect();
        store
            .set_item_transform(
                0,
                Transform {
                    rotate: 400.0,
                    origin_x: 2.0,
                    ..Transform::identity()
                },
            )
            .expect("set");
        let t = store.item_transform(0).expect("transform");
        assert!((t.rotate - 40.0).abs() < 1e-9);
        assert!((t.origin_x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_changes_are_queued_and_drained() {
        let mut store = InMemoryStore::new();
        let index = store.add_item(Item::ellipse(0.0, 0.0, 5.0, 5.0));
        store
            .update_item(index, &ItemPatch {
                name: Some("Dot".to_string()),
                ..ItemPatch::default()
            })
            .expect("update");
        store.remove_item(index).expect("remove");
        assert_eq!(
            store.drain_changes(),
            vec![
                StoreChange::Added(0),
                StoreChange::Modified(0),
                StoreChange::Removed(0)
            ]
        );
        assert!(store.drain_changes().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_bake_transform_resets_path_transform() {
        let mut store = InMemoryStore::from_items(vec![Item::path(
            vec![PathPoint::new(0.0, 0.0), PathPoint::new(10.0, 10.0)],
            false,
        )
        .with_transform(Transform {
            translate_x: 5.0,
            ..Transform::identity()
        })]);
        store.bake_transform(0).expect("bake");
        let item = store.item(0).expect("item");
        assert!(item.transform.is_identity());
        assert_eq!(store.geometry_bounds(0), Some(Rect::new(5.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_patch_deserializes_partial_json() {
        let patch: ItemPatch = serde_json::from_str(r#"{ "visible": false }"#).expect("parse");
        assert_eq!(patch.visible, Some(false));
        assert!(patch.geometry.is_none());
        assert!(!patch.is_empty());
        assert!(ItemPatch::default().is_empty());
    }

    #[test]
    fn test_index_of() {
        let store = store_with_rect();
        let id = store.item(0).expect("item").id;
        assert_eq!(store.index_of(id), Some(0));
        assert_eq!(store.index_of(ItemId::new()), None);
    }
}
