#![forbid(unsafe_code)]

//! The form-state store contract, plus a reference implementation.
//!
//! The resolver never mutates live values directly; every write goes
//! through a [`FormState`], which an embedder typically backs with its own
//! reactive store. [`ValueState`] is a plain tree-backed implementation
//! for tests and for embedders without such a store.

use serde_json::Value;

use crate::path::{FieldPath, Segment};

/// Read/write access to the live-value tree, keyed by field path.
pub trait FormState {
    /// The current value at `path`, or `None` for a not-yet-touched path.
    fn value_at(&self, path: &FieldPath) -> Option<&Value>;

    /// Write `value` at `path`. Returns `false` when the path cannot be
    /// addressed in the current tree (wrong container kind along the way,
    /// or an index past the end of an array).
    fn set_value(&mut self, path: &FieldPath, value: Value) -> bool;

    /// Remove the element at `index` from the array at `path`, shifting
    /// later elements down. Returns `false` when there is no such element.
    fn remove_index(&mut self, path: &FieldPath, index: usize) -> bool;
}

// ---------------------------------------------------------------------------
// ValueState
// ---------------------------------------------------------------------------

/// A [`FormState`] backed by an owned `serde_json::Value` tree.
///
/// # Example
///
/// ```rust
/// use formwork::{FieldPath, FormState, ValueState};
/// use serde_json::json;
///
/// let mut state = ValueState::new(json!({"name": "", "tags": []}));
/// let name = FieldPath::root().child("name");
/// assert!(state.set_value(&name, json!("ada")));
/// assert_eq!(state.value_at(&name), Some(&json!("ada")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValueState {
    root: Value,
}

impl ValueState {
    /// Wrap an existing value tree, typically one built by
    /// [`build_defaults`](crate::build_defaults).
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// The whole tree, for handing to a validator or submitting.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume the store, yielding the tree.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.root
    }

    fn node_mut(&mut self, segments: &[Segment]) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for segment in segments {
            current = match segment {
                Segment::Key(name) => current.as_object_mut()?.get_mut(name)?,
                Segment::Index(i) => current.as_array_mut()?.get_mut(*i)?,
            };
        }
        Some(current)
    }
}

impl FormState for ValueState {
    fn value_at(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.root)
    }

    fn set_value(&mut self, path: &FieldPath, value: Value) -> bool {
        let Some((last, parents)) = path.segments().split_last() else {
            self.root = value;
            return true;
        };
        let Some(parent) = self.node_mut(parents) else {
            return false;
        };
        match last {
            Segment::Key(name) => {
                let Some(map) = parent.as_object_mut() else {
                    return false;
                };
                map.insert(name.clone(), value);
                true
            }
            Segment::Index(i) => {
                let Some(items) = parent.as_array_mut() else {
                    return false;
                };
                // Writing one past the end appends, which is how array
                // append lands a synthesized item.
                match (*i).cmp(&items.len()) {
                    std::cmp::Ordering::Less => {
                        items[*i] = value;
                        true
                    }
                    std::cmp::Ordering::Equal => {
                        items.push(value);
                        true
                    }
                    std::cmp::Ordering::Greater => false,
                }
            }
        }
    }

    fn remove_index(&mut self, path: &FieldPath, index: usize) -> bool {
        let Some(node) = self.node_mut(path.segments()) else {
            return false;
        };
        let Some(items) = node.as_array_mut() else {
            return false;
        };
        if index < items.len() {
            items.remove(index);
            true
        } else {
            false
        }
    }
}
