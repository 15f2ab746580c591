#![forbid(unsafe_code)]

//! Default-value synthesis: building a value tree isomorphic to a
//! schema tree.
//!
//! The same function serves whole-form initialization and per-append array
//! item synthesis; sharing one code path is what keeps array items from
//! silently diverging from object-field defaults.
//!
//! Zero values per primitive kind: text → `""`, number → `null`,
//! boolean → `false`. An explicit default on the leaf always wins over the
//! zero value. Objects always recurse into every child; arrays default to
//! empty, with pre-population to `min_items` available as a separate
//! opt-in for callers that want it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::schema::{PrimitiveKind, SchemaNode};

/// Build the default-value tree for a schema tree.
///
/// Pure and total over well-formed schemas: the result always has the same
/// shape as the schema, recursively.
///
/// # Example
///
/// ```rust
/// use formwork::{ArraySchema, LeafSchema, ObjectSchema, SchemaNode, build_defaults};
/// use serde_json::json;
///
/// let schema: SchemaNode = ObjectSchema::new()
///     .with_field("name", LeafSchema::text())
///     .with_field("age", LeafSchema::number())
///     .with_field("tags", ArraySchema::new(LeafSchema::text()))
///     .into();
///
/// assert_eq!(build_defaults(&schema), json!({"name": "", "age": null, "tags": []}));
/// ```
#[must_use]
pub fn build_defaults(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Leaf(leaf) => leaf.default.clone().unwrap_or(match leaf.kind {
            PrimitiveKind::Text => Value::String(String::new()),
            PrimitiveKind::Number => Value::Null,
            PrimitiveKind::Boolean => Value::Bool(false),
        }),
        SchemaNode::Object(object) => {
            let mut map = Map::new();
            for (name, child) in &object.children {
                map.insert(name.clone(), build_defaults(child));
            }
            Value::Object(map)
        }
        SchemaNode::Array(_) => Value::Array(Vec::new()),
    }
}

/// Like [`build_defaults`], but fills every array up to its `min_items`
/// with synthesized items instead of leaving it empty.
#[must_use]
pub fn build_defaults_prepopulated(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Leaf(_) => build_defaults(node),
        SchemaNode::Object(object) => {
            let mut map = Map::new();
            for (name, child) in &object.children {
                map.insert(name.clone(), build_defaults_prepopulated(child));
            }
            Value::Object(map)
        }
        SchemaNode::Array(array) => {
            let count = array.min_items.unwrap_or(0);
            let items = (0..count)
                .map(|_| build_defaults_prepopulated(&array.item))
                .collect();
            Value::Array(items)
        }
    }
}

// ---------------------------------------------------------------------------
// DefaultCache
// ---------------------------------------------------------------------------

/// Memoizes default trees per schema identity.
///
/// Identity is `Arc` pointer identity: two clones of the same `Arc` share
/// one cache entry, while a structurally equal but separately constructed
/// schema gets its own. The cached tree is cloned out on every hit, so the
/// memoized copy is never aliased by callers.
#[derive(Debug, Default)]
pub struct DefaultCache {
    entries: HashMap<usize, Value>,
}

impl DefaultCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default tree for `schema`, building it on first request.
    pub fn defaults_for(&mut self, schema: &Arc<SchemaNode>) -> Value {
        let key = Arc::as_ptr(schema) as usize;
        self.entries
            .entry(key)
            .or_insert_with(|| build_defaults(schema))
            .clone()
    }

    /// Drop all memoized trees.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
