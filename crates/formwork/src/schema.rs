#![forbid(unsafe_code)]

//! The schema model: a tagged, immutable tree describing form shape.
//!
//! A [`SchemaNode`] is one of three variants: a [`LeafSchema`] for a single
//! scalar field, an [`ObjectSchema`] for a nested record (child insertion
//! order is render order), or an [`ArraySchema`] for a dynamic list of
//! homogeneous items. Everything the resolver derives — defaults, widget
//! types, field models — is a pure function of this tree, so a tree is
//! never mutated after construction.
//!
//! # Example
//!
//! ```rust
//! use formwork::{ArraySchema, LeafSchema, ObjectSchema, SchemaNode};
//!
//! let schema: SchemaNode = ObjectSchema::new()
//!     .with_field("name", LeafSchema::text().required("Name is required"))
//!     .with_field(
//!         "tags",
//!         ArraySchema::new(LeafSchema::text()).with_min_items(1),
//!     )
//!     .into();
//!
//! assert!(schema.validate().is_ok());
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::error::SchemaError;
use crate::path::FieldPath;
use crate::widget::{WidgetHint, resolve};

// ---------------------------------------------------------------------------
// PrimitiveKind
// ---------------------------------------------------------------------------

/// The scalar kind a leaf field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PrimitiveKind {
    /// A string-valued field.
    Text,
    /// A numeric field. Its empty state is JSON `null`, not zero.
    Number,
    /// A boolean field.
    Boolean,
}

// ---------------------------------------------------------------------------
// SelectOption
// ---------------------------------------------------------------------------

/// One choice in a `select` or `radio` field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectOption {
    /// The stored value.
    pub value: String,
    /// The human-readable label.
    pub label: String,
}

impl SelectOption {
    /// Create an option with distinct value and label.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Declared validation constraints on a leaf.
///
/// The resolver carries these untouched; executing them is the validator's
/// concern. `required` holds the message to surface when the field is left
/// empty — `None` means the field is optional.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraints {
    /// Lower bound for numeric fields.
    pub min: Option<f64>,
    /// Upper bound for numeric fields.
    pub max: Option<f64>,
    /// A pattern the value must contain.
    pub pattern: Option<String>,
    /// Required-field message; `None` means optional.
    pub required: Option<String>,
}

impl Constraints {
    /// Returns `true` when no constraint is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.pattern.is_none()
            && self.required.is_none()
    }
}

// ---------------------------------------------------------------------------
// LeafSchema
// ---------------------------------------------------------------------------

/// A single scalar field: primitive kind, optional presentation hint,
/// constraints, and an optional explicit default.
///
/// Labels come in two flavors with distinct precedence: `label` is the
/// field-level presentation label, `validation_label` the schema-level
/// semantic name. The assembler prefers `label`, then `validation_label`,
/// then the raw field name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeafSchema {
    /// The scalar kind.
    pub kind: PrimitiveKind,
    /// Explicit widget hint; always wins over kind-based inference.
    pub hint: Option<WidgetHint>,
    /// Choices for `select`/`radio` fields, in display order.
    pub options: Vec<SelectOption>,
    /// Declared validation constraints.
    pub constraints: Constraints,
    /// Explicit default value; wins over the kind's zero value.
    pub default: Option<Value>,
    /// Field-level presentation label.
    pub label: Option<String>,
    /// Schema-level semantic label, also used in generated messages.
    pub validation_label: Option<String>,
    /// Forward-compatible metadata, passed through untouched for the
    /// rendering layer (e.g. textarea rows).
    pub meta: Vec<(String, Value)>,
}

impl LeafSchema {
    fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            hint: None,
            options: Vec::new(),
            constraints: Constraints::default(),
            default: None,
            label: None,
            validation_label: None,
            meta: Vec::new(),
        }
    }

    /// A string field.
    #[must_use]
    pub fn text() -> Self {
        Self::new(PrimitiveKind::Text)
    }

    /// A numeric field.
    #[must_use]
    pub fn number() -> Self {
        Self::new(PrimitiveKind::Number)
    }

    /// A boolean field.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(PrimitiveKind::Boolean)
    }

    /// A string field rendered as a dropdown with the given options.
    #[must_use]
    pub fn select(options: Vec<SelectOption>) -> Self {
        Self::text().with_hint(WidgetHint::Select).with_options(options)
    }

    /// A string field rendered as a radio group with the given options.
    #[must_use]
    pub fn radio(options: Vec<SelectOption>) -> Self {
        Self::text().with_hint(WidgetHint::Radio).with_options(options)
    }

    /// Set the widget hint.
    #[must_use]
    pub fn with_hint(mut self, hint: WidgetHint) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Set the option list.
    #[must_use]
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Set the field-level presentation label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the schema-level semantic label.
    #[must_use]
    pub fn with_validation_label(mut self, label: impl Into<String>) -> Self {
        self.validation_label = Some(label.into());
        self
    }

    /// Set an explicit default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Mark the field required, with the message to show when empty.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.constraints.required = Some(message.into());
        self
    }

    /// Set a numeric lower bound.
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    /// Set a numeric upper bound.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// Set a pattern constraint.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Attach a metadata entry passed through to the rendering layer.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.push((key.into(), value.into()));
        self
    }
}

// ---------------------------------------------------------------------------
// ObjectSchema
// ---------------------------------------------------------------------------

/// A nested record of named fields. Insertion order is render order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectSchema {
    /// Group label for nested objects.
    pub label: Option<String>,
    /// Child fields in declaration order.
    pub children: Vec<(String, SchemaNode)>,
}

impl ObjectSchema {
    /// An empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the group label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a child field. Re-adding an existing name replaces it in place,
    /// keeping its original position.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        let name = name.into();
        let node = node.into();
        if let Some(slot) = self.children.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = node;
        } else {
            self.children.push((name, node));
        }
        self
    }

    /// Look up a child by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }
}

// ---------------------------------------------------------------------------
// ArraySchema
// ---------------------------------------------------------------------------

/// A dynamic list of items sharing one item schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArraySchema {
    /// Label for the array as a whole; leaf items carry no label of
    /// their own.
    pub label: Option<String>,
    /// The schema every item conforms to.
    pub item: Arc<SchemaNode>,
    /// Minimum item count enforced by the validator.
    pub min_items: Option<usize>,
}

impl ArraySchema {
    /// A list whose items conform to `item`.
    #[must_use]
    pub fn new(item: impl Into<SchemaNode>) -> Self {
        Self {
            label: None,
            item: Arc::new(item.into()),
            min_items: None,
        }
    }

    /// Set the array-level label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Require at least `min` items.
    #[must_use]
    pub fn with_min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }
}

// ---------------------------------------------------------------------------
// SchemaNode
// ---------------------------------------------------------------------------

/// A node in the schema tree: leaf, record, or list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SchemaNode {
    /// A single scalar field.
    Leaf(LeafSchema),
    /// A nested record.
    Object(ObjectSchema),
    /// A dynamic list.
    Array(ArraySchema),
}

impl SchemaNode {
    /// Returns the leaf schema if this node is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafSchema> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Returns the object schema if this node is a record.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the array schema if this node is a list.
    #[must_use]
    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Resolve the sub-schema addressed by `path`, following object keys
    /// into children and array indices into the item schema.
    #[must_use]
    pub fn node_at(&self, path: &FieldPath) -> Option<&SchemaNode> {
        let mut current = self;
        for segment in path.segments() {
            current = match (current, segment.as_key()) {
                (Self::Object(object), Some(name)) => object.field(name)?,
                (Self::Array(array), None) => &array.item,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Walk the whole tree and fail fast on authoring defects.
    ///
    /// Intended to run once when the schema is constructed, so that a
    /// select field with no options aborts at startup rather than at
    /// render time.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_at(&FieldPath::root())
    }

    fn validate_at(&self, path: &FieldPath) -> Result<(), SchemaError> {
        match self {
            Self::Leaf(leaf) => {
                resolve(leaf).map_err(|e| e.at(path.clone()))?;
                Ok(())
            }
            Self::Object(object) => {
                for (name, child) in &object.children {
                    child.validate_at(&path.child(name.clone()))?;
                }
                Ok(())
            }
            Self::Array(array) => array.item.validate_at(&path.index(0)),
        }
    }
}

impl From<LeafSchema> for SchemaNode {
    fn from(leaf: LeafSchema) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        Self::Object(object)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(array: ArraySchema) -> Self {
        Self::Array(array)
    }
}
