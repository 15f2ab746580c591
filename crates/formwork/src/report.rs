#![forbid(unsafe_code)]

//! The validation error tree: path-addressable messages produced by a
//! validator and joined back onto the field-model tree at render time.
//!
//! The tree mirrors the value tree's shape. Array nodes hold their
//! array-wide message (for example "At least one item is required")
//! separately from per-index messages, as a typed field rather than a
//! reserved string key, so an item message can never shadow the array's
//! own message.

use crate::path::{FieldPath, Segment};

/// A tree of validation messages keyed by the same path grammar as the
/// value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorTree {
    /// A message for a single leaf field.
    Message(String),
    /// Messages for the fields of a record.
    Object(Vec<(String, ErrorTree)>),
    /// Messages for a dynamic list: the array's own message plus
    /// per-index subtrees.
    Array {
        /// The array-wide message, attached at the array's own path.
        own: Option<String>,
        /// Per-item subtrees keyed by index.
        items: Vec<(usize, ErrorTree)>,
    },
}

impl Default for ErrorTree {
    fn default() -> Self {
        Self::Object(Vec::new())
    }
}

impl ErrorTree {
    /// An empty tree (no messages anywhere).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf message.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Returns `true` when the tree carries no message at any path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Message(_) => false,
            Self::Object(fields) => fields.iter().all(|(_, t)| t.is_empty()),
            Self::Array { own, items } => {
                own.is_none() && items.iter().all(|(_, t)| t.is_empty())
            }
        }
    }

    /// The message attached exactly at `path`, if any.
    ///
    /// For a path addressing an array node this returns the array-wide
    /// message, not any item message. Misses resolve to `None`.
    #[must_use]
    pub fn message_at(&self, path: &FieldPath) -> Option<&str> {
        match self.subtree(path)? {
            Self::Message(text) => Some(text),
            Self::Array { own, .. } => own.as_deref(),
            Self::Object(_) => None,
        }
    }

    /// The subtree at `path`, if present.
    #[must_use]
    pub fn subtree(&self, path: &FieldPath) -> Option<&ErrorTree> {
        let mut current = self;
        for segment in path.segments() {
            current = match (current, segment) {
                (Self::Object(fields), Segment::Key(name)) => fields
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, tree)| tree)?,
                (Self::Array { items, .. }, Segment::Index(i)) => items
                    .iter()
                    .find(|(n, _)| n == i)
                    .map(|(_, tree)| tree)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Attach a leaf message at `path`, creating intermediate containers
    /// to match the path's segment kinds. A second insert at the same
    /// path replaces the earlier message.
    pub fn insert(&mut self, path: &FieldPath, message: impl Into<String>) {
        self.node_at_mut(path.segments()).set_message(message.into());
    }

    /// Attach an array-wide message at the array addressed by `path`.
    pub fn insert_array_own(&mut self, path: &FieldPath, message: impl Into<String>) {
        let node = self.node_at_mut(path.segments());
        if !matches!(node, Self::Array { .. }) {
            *node = Self::Array {
                own: None,
                items: Vec::new(),
            };
        }
        if let Self::Array { own, .. } = node {
            *own = Some(message.into());
        }
    }

    fn set_message(&mut self, message: String) {
        *self = Self::Message(message);
    }

    fn node_at_mut(&mut self, segments: &[Segment]) -> &mut ErrorTree {
        let Some((head, rest)) = segments.split_first() else {
            return self;
        };
        match head {
            Segment::Key(name) => {
                if !matches!(self, Self::Object(_)) {
                    *self = Self::Object(Vec::new());
                }
                let Self::Object(fields) = self else {
                    unreachable!()
                };
                let pos = match fields.iter().position(|(n, _)| n == name) {
                    Some(pos) => pos,
                    None => {
                        fields.push((name.clone(), Self::Object(Vec::new())));
                        fields.len() - 1
                    }
                };
                fields[pos].1.node_at_mut(rest)
            }
            Segment::Index(i) => {
                if !matches!(self, Self::Array { .. }) {
                    *self = Self::Array {
                        own: None,
                        items: Vec::new(),
                    };
                }
                let Self::Array { items, .. } = self else {
                    unreachable!()
                };
                let pos = match items.iter().position(|(n, _)| n == i) {
                    Some(pos) => pos,
                    None => {
                        items.push((*i, Self::Object(Vec::new())));
                        items.len() - 1
                    }
                };
                items[pos].1.node_at_mut(rest)
            }
        }
    }
}
