#![forbid(unsafe_code)]

//! The array controller: stable identities for dynamic list items.
//!
//! List indices shift whenever an element other than the last is removed,
//! so index-as-identity corrupts per-element state. Each item instead gets
//! an [`ItemIdentity`] minted at creation and never reused within the
//! array's lifetime; index-derived paths are recomputed on every
//! structural change while identities stay put.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::defaults::build_defaults;
use crate::path::{FieldPath, Segment};
use crate::schema::SchemaNode;

// ---------------------------------------------------------------------------
// ItemIdentity
// ---------------------------------------------------------------------------

/// An opaque stable token distinguishing one array element independent of
/// its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIdentity(u64);

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ArrayModel
// ---------------------------------------------------------------------------

/// Per-array controller tracking item identities in display order.
#[derive(Debug)]
pub struct ArrayModel {
    item: Arc<SchemaNode>,
    items: Vec<ItemIdentity>,
    next: u64,
}

/// One current item of an array: its stable identity plus its
/// index-derived path for this render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayItemRef {
    /// Stable identity token.
    pub identity: ItemIdentity,
    /// Current position in display order.
    pub index: usize,
    /// Path for value/error lookups this render.
    pub path: FieldPath,
}

impl ArrayModel {
    /// A controller for an array whose items conform to `item`.
    #[must_use]
    pub fn new(item: Arc<SchemaNode>) -> Self {
        Self {
            item,
            items: Vec::new(),
            next: 0,
        }
    }

    /// The item schema.
    #[must_use]
    pub fn item_schema(&self) -> &Arc<SchemaNode> {
        &self.item
    }

    /// Current item count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the array has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Synthesize a default item, mint a fresh identity, and append.
    ///
    /// Returns the new identity together with the synthesized value; the
    /// caller writes the value into the form-state store. The new item is
    /// not focused or selected.
    pub fn append(&mut self) -> (ItemIdentity, Value) {
        let identity = self.mint();
        self.items.push(identity);
        (identity, build_defaults(&self.item))
    }

    /// Remove the element with the given identity.
    ///
    /// Returns the index it occupied so the caller can mirror the removal
    /// in the value store. Removing an unknown identity is a no-op and
    /// returns `None`; all surviving identities are unchanged.
    pub fn remove(&mut self, identity: ItemIdentity) -> Option<usize> {
        let index = self.items.iter().position(|id| *id == identity)?;
        self.items.remove(index);
        Some(index)
    }

    /// Reconcile the tracked length with an externally observed one.
    ///
    /// Initial values may already contain array entries the controller has
    /// never seen; those get fresh identities appended at the tail. A
    /// shorter observed length truncates, retiring the dropped identities.
    pub fn sync_len(&mut self, len: usize) {
        while self.items.len() < len {
            let identity = self.mint();
            self.items.push(identity);
        }
        self.items.truncate(len);
    }

    /// The identity at `index`, if in range.
    #[must_use]
    pub fn identity_at(&self, index: usize) -> Option<ItemIdentity> {
        self.items.get(index).copied()
    }

    /// Current items in display order, with paths derived from `base`.
    #[must_use]
    pub fn items(&self, base: &FieldPath) -> Vec<ArrayItemRef> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, identity)| ArrayItemRef {
                identity: *identity,
                index,
                path: base.index(index),
            })
            .collect()
    }

    fn mint(&mut self) -> ItemIdentity {
        let identity = ItemIdentity(self.next);
        self.next += 1;
        identity
    }
}

// ---------------------------------------------------------------------------
// ArrayRegistry
// ---------------------------------------------------------------------------

/// Owns the per-array controllers for one form, keyed by the array's path.
///
/// Nested arrays (an array inside an array's items) get one controller per
/// concrete path, so `rows[0].cells` and `rows[1].cells` track identities
/// independently.
#[derive(Debug, Default)]
pub struct ArrayRegistry {
    arrays: HashMap<FieldPath, ArrayModel>,
}

impl ArrayRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The controller for the array at `path`, created on first use.
    pub fn model(&mut self, path: &FieldPath, item: &Arc<SchemaNode>) -> &mut ArrayModel {
        self.arrays
            .entry(path.clone())
            .or_insert_with(|| ArrayModel::new(Arc::clone(item)))
    }

    /// The controller at `path`, if one exists yet.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&ArrayModel> {
        self.arrays.get(path)
    }

    /// Mutable access to the controller at `path`, if one exists yet.
    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut ArrayModel> {
        self.arrays.get_mut(path)
    }

    /// Rekey nested controllers after the item at `index` of the array at
    /// `parent` was removed.
    ///
    /// Controllers under `parent[index]` are retired with the removed
    /// item; controllers under `parent[j]` for `j > index` shift down to
    /// `parent[j-1]`, so each surviving item keeps the nested identities
    /// it had before the removal.
    pub fn reindex_removed(&mut self, parent: &FieldPath, index: usize) {
        let depth = parent.segments().len();
        let mut affected: Vec<(FieldPath, usize)> = self
            .arrays
            .keys()
            .filter_map(|path| {
                if !path.segments().starts_with(parent.segments()) {
                    return None;
                }
                let i = path.segments().get(depth)?.as_index()?;
                (i >= index).then(|| (path.clone(), i))
            })
            .collect();
        // Ascending by index: each shift target was vacated by the drop
        // or by the shift just before it.
        affected.sort_by_key(|(_, i)| *i);
        for (path, i) in affected {
            let Some(model) = self.arrays.remove(&path) else {
                continue;
            };
            if i == index {
                continue;
            }
            let mut segments = path.segments().to_vec();
            segments[depth] = Segment::Index(i - 1);
            self.arrays.insert(FieldPath::from_segments(segments), model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LeafSchema;
    use serde_json::json;

    fn text_array() -> ArrayModel {
        ArrayModel::new(Arc::new(LeafSchema::text().into()))
    }

    #[test]
    fn append_synthesizes_default_and_mints_identity() {
        let mut model = text_array();
        let (id_a, value_a) = model.append();
        let (id_b, value_b) = model.append();
        assert_eq!(value_a, json!(""));
        assert_eq!(value_b, json!(""));
        assert_ne!(id_a, id_b);
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn append_then_remove_restores_count_without_disturbing_others() {
        let mut model = text_array();
        let (keep_a, _) = model.append();
        let (keep_b, _) = model.append();
        let (temp, _) = model.append();

        assert_eq!(model.remove(temp), Some(2));
        assert_eq!(model.len(), 2);
        assert_eq!(model.identity_at(0), Some(keep_a));
        assert_eq!(model.identity_at(1), Some(keep_b));
    }

    #[test]
    fn remove_middle_shifts_paths_not_identities() {
        let mut model = text_array();
        let (a, _) = model.append();
        let (b, _) = model.append();
        let (c, _) = model.append();

        assert_eq!(model.remove(b), Some(1));

        let base = FieldPath::root().child("tags");
        let items = model.items(&base);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].identity, a);
        assert_eq!(items[0].path, base.index(0));
        assert_eq!(items[1].identity, c);
        assert_eq!(items[1].path, base.index(1));
    }

    #[test]
    fn removing_unknown_identity_is_a_noop() {
        let mut model = text_array();
        let (id, _) = model.append();
        assert_eq!(model.remove(id), Some(0));
        assert_eq!(model.remove(id), None);
        assert_eq!(model.len(), 0);
    }

    #[test]
    fn identities_are_never_reused_after_removal() {
        let mut model = text_array();
        let (first, _) = model.append();
        model.remove(first);
        let (second, _) = model.append();
        assert_ne!(first, second);
    }

    #[test]
    fn sync_len_mints_for_seeded_values_and_truncates() {
        let mut model = text_array();
        model.sync_len(3);
        assert_eq!(model.len(), 3);
        let ids: Vec<_> = (0..3).filter_map(|i| model.identity_at(i)).collect();
        assert_eq!(ids.len(), 3);

        // Growing keeps existing identities.
        model.sync_len(4);
        assert_eq!(model.identity_at(0), Some(ids[0]));
        assert_eq!(model.identity_at(2), Some(ids[2]));

        // Shrinking truncates from the tail.
        model.sync_len(1);
        assert_eq!(model.len(), 1);
        assert_eq!(model.identity_at(0), Some(ids[0]));
    }

    #[test]
    fn registry_keys_controllers_by_path() {
        let mut registry = ArrayRegistry::new();
        let item: Arc<SchemaNode> = Arc::new(LeafSchema::text().into());
        let first = FieldPath::root().child("rows").index(0).child("cells");
        let second = FieldPath::root().child("rows").index(1).child("cells");

        registry.model(&first, &item).append();
        assert_eq!(registry.get(&first).map(ArrayModel::len), Some(1));
        assert!(registry.get(&second).is_none());
    }

    #[test]
    fn reindex_removed_retires_and_shifts_nested_controllers() {
        let mut registry = ArrayRegistry::new();
        let item: Arc<SchemaNode> = Arc::new(LeafSchema::text().into());
        let rows = FieldPath::root().child("rows");
        let first = rows.index(0).child("cells");
        let second = rows.index(1).child("cells");
        let unrelated = FieldPath::root().child("tags");

        // Advance the first controller's counter past the second's.
        let (temp, _) = registry.model(&first, &item).append();
        registry.model(&first, &item).remove(temp);
        let (stale, _) = registry.model(&first, &item).append();
        let (kept, _) = registry.model(&second, &item).append();
        registry.model(&unrelated, &item).append();

        registry.reindex_removed(&rows, 0);

        // The removed row's controller is gone; the survivor shifted down
        // with its identities intact.
        assert!(registry.get(&second).is_none());
        let shifted = registry.get(&first).expect("controller shifted down");
        assert_eq!(shifted.identity_at(0), Some(kept));
        assert_ne!(kept, stale);
        assert_eq!(registry.get(&unrelated).map(ArrayModel::len), Some(1));
    }
}
