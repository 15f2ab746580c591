#![forbid(unsafe_code)]

//! The field-model assembler: joining schema, live values, and errors
//! into the per-render descriptor tree the rendering layer consumes.
//!
//! One recursive [`assemble`] walker handles all three schema variants;
//! object fields and array items go through the same code path, so label,
//! default, and path logic cannot drift between them. A [`FieldModel`]
//! tree is rebuilt for every render and never patched in place, so the
//! rendering layer can never observe a half-applied structural edit.

use std::sync::Arc;

use serde_json::Value;

use crate::array::{ArrayRegistry, ItemIdentity};
use crate::defaults::{DefaultCache, build_defaults};
use crate::error::SchemaError;
use crate::path::FieldPath;
use crate::report::ErrorTree;
use crate::schema::{SchemaNode, SelectOption};
use crate::state::FormState;
use crate::widget::{WidgetType, resolve};

// ---------------------------------------------------------------------------
// FieldModel
// ---------------------------------------------------------------------------

/// Per-render descriptor for one node: resolved widget type, label,
/// current value, error message, and child descriptors for containers.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    /// Where this field lives in the value and error trees.
    pub path: FieldPath,
    /// Display label. Never empty for named fields; empty only for leaf
    /// array items, whose label belongs to the array as a whole.
    pub label: String,
    /// The validation message attached exactly at this node's path.
    pub error: Option<String>,
    /// The stable identity token, present only on array items.
    pub identity: Option<ItemIdentity>,
    /// What kind of node this is, with the variant-specific payload.
    pub kind: FieldKind,
}

/// The variant-specific payload of a [`FieldModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A single rendered control.
    Input {
        /// Which external widget renders this field.
        widget: WidgetType,
        /// The current value (the leaf's default when untouched).
        value: Value,
        /// Choices for select/radio widgets; empty otherwise.
        options: Vec<SelectOption>,
    },
    /// A nested record's fields, in declaration order.
    Group {
        /// One model per child field.
        children: Vec<FieldModel>,
    },
    /// A dynamic list's items, in display order. The list-level error
    /// (e.g. a minimum-items violation) sits on this model's `error`,
    /// distinct from the items' own errors.
    Collection {
        /// One model per item, each carrying its identity token.
        children: Vec<FieldModel>,
    },
}

impl FieldModel {
    /// Child models for containers; empty for inputs.
    #[must_use]
    pub fn children(&self) -> &[FieldModel] {
        match &self.kind {
            FieldKind::Input { .. } => &[],
            FieldKind::Group { children } | FieldKind::Collection { children } => children,
        }
    }

    /// The resolved widget type, for inputs.
    #[must_use]
    pub fn widget(&self) -> Option<WidgetType> {
        match &self.kind {
            FieldKind::Input { widget, .. } => Some(*widget),
            _ => None,
        }
    }

    /// The current value, for inputs.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            FieldKind::Input { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn label_for(node: &SchemaNode, path: &FieldPath) -> String {
    // Last-resort fallback: the raw field name. Array items have an index
    // as their final segment, which yields the empty label on purpose.
    let fallback = || {
        path.last()
            .and_then(|segment| segment.as_key())
            .unwrap_or("")
            .to_string()
    };
    match node {
        SchemaNode::Leaf(leaf) => leaf
            .label
            .clone()
            .or_else(|| leaf.validation_label.clone())
            .unwrap_or_else(fallback),
        SchemaNode::Object(object) => object.label.clone().unwrap_or_else(fallback),
        SchemaNode::Array(array) => array.label.clone().unwrap_or_else(fallback),
    }
}

/// Assemble the field-model tree for `node` at `path`.
///
/// `values` and `errors` are the externally owned live-value and error
/// trees; `arrays` tracks item identities across renders. Lookup misses in
/// either tree are absorbed (untouched fields fall back to their
/// synthesized default and carry no error).
///
/// # Errors
///
/// Returns [`SchemaError`] for schema-authoring defects discovered during
/// widget resolution, located by path.
pub fn assemble(
    node: &SchemaNode,
    path: FieldPath,
    values: &Value,
    errors: &ErrorTree,
    arrays: &mut ArrayRegistry,
) -> Result<FieldModel, SchemaError> {
    let label = label_for(node, &path);
    let error = errors.message_at(&path).map(str::to_string);

    let kind = match node {
        SchemaNode::Leaf(leaf) => {
            let widget = resolve(leaf).map_err(|e| e.at(path.clone()))?;
            let value = path
                .lookup(values)
                .cloned()
                .unwrap_or_else(|| build_defaults(node));
            FieldKind::Input {
                widget,
                value,
                options: leaf.options.clone(),
            }
        }
        SchemaNode::Object(object) => {
            let mut children = Vec::with_capacity(object.children.len());
            for (name, child) in &object.children {
                children.push(assemble(
                    child,
                    path.child(name.clone()),
                    values,
                    errors,
                    arrays,
                )?);
            }
            FieldKind::Group { children }
        }
        SchemaNode::Array(array) => {
            let item_schema = Arc::clone(&array.item);
            let observed_len = path
                .lookup(values)
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            let model = arrays.model(&path, &item_schema);
            model.sync_len(observed_len);
            let refs = model.items(&path);

            let mut children = Vec::with_capacity(refs.len());
            for item in refs {
                let mut child = assemble(&item_schema, item.path, values, errors, arrays)?;
                child.identity = Some(item.identity);
                children.push(child);
            }
            FieldKind::Collection { children }
        }
    };

    Ok(FieldModel {
        path,
        label,
        error,
        identity: None,
        kind,
    })
}

// ---------------------------------------------------------------------------
// FormModel
// ---------------------------------------------------------------------------

/// The composed per-form facade: schema, array controllers, and memoized
/// defaults behind one surface.
///
/// # Example
///
/// ```rust
/// use formwork::{
///     ArraySchema, ErrorTree, FieldPath, FormModel, LeafSchema, ObjectSchema, ValueState,
/// };
///
/// let schema = ObjectSchema::new()
///     .with_field("name", LeafSchema::text().required("Name is required"))
///     .with_field("tags", ArraySchema::new(LeafSchema::text()).with_min_items(1))
///     .into();
/// let mut form = FormModel::new(schema)?;
///
/// let mut state = ValueState::new(form.defaults());
/// let tags = FieldPath::root().child("tags");
/// form.append(&tags, &mut state).expect("tags is an array");
///
/// let tree = form.render(state.root(), &ErrorTree::new())?;
/// assert_eq!(tree.children().len(), 2);
/// # Ok::<(), formwork::SchemaError>(())
/// ```
#[derive(Debug)]
pub struct FormModel {
    schema: Arc<SchemaNode>,
    arrays: ArrayRegistry,
    cache: DefaultCache,
}

impl FormModel {
    /// Validate the schema and build the facade around it.
    ///
    /// # Errors
    ///
    /// Fails fast on schema-authoring defects, so a bad schema aborts at
    /// construction rather than at first render.
    pub fn new(schema: SchemaNode) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self {
            schema: Arc::new(schema),
            arrays: ArrayRegistry::new(),
            cache: DefaultCache::new(),
        })
    }

    /// The schema this form is built from.
    #[must_use]
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// The default-value tree, memoized per schema identity.
    pub fn defaults(&mut self) -> Value {
        self.cache.defaults_for(&self.schema)
    }

    /// Assemble the field-model tree for one render.
    ///
    /// # Errors
    ///
    /// Propagates schema-authoring defects; see [`assemble`].
    pub fn render(&mut self, values: &Value, errors: &ErrorTree) -> Result<FieldModel, SchemaError> {
        assemble(
            &self.schema,
            FieldPath::root(),
            values,
            errors,
            &mut self.arrays,
        )
    }

    /// Append a synthesized default item to the array at `path`, writing
    /// it through the form-state store.
    ///
    /// Returns the new item's identity, or `None` when `path` does not
    /// address an array in this schema or the store rejects the write.
    pub fn append(&mut self, path: &FieldPath, state: &mut dyn FormState) -> Option<ItemIdentity> {
        let array = self.schema.node_at(path)?.as_array()?;
        let item_schema = Arc::clone(&array.item);

        if state.value_at(path).is_none() {
            // Seed the array container itself for stores starting from an
            // incomplete tree.
            if !state.set_value(path, Value::Array(Vec::new())) {
                return None;
            }
        }
        let observed_len = state
            .value_at(path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        let model = self.arrays.model(path, &item_schema);
        model.sync_len(observed_len);
        let (identity, value) = model.append();

        if !state.set_value(&path.index(observed_len), value) {
            model.remove(identity);
            return None;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path, identity = %identity, "array item appended");
        Some(identity)
    }

    /// Remove the array item with the given identity, mirroring the
    /// removal in the form-state store. Unknown identities are a no-op.
    pub fn remove(
        &mut self,
        path: &FieldPath,
        identity: ItemIdentity,
        state: &mut dyn FormState,
    ) -> bool {
        let observed_len = state
            .value_at(path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let Some(model) = self.arrays.get_mut(path) else {
            return false;
        };
        model.sync_len(observed_len);
        let Some(index) = model.remove(identity) else {
            return false;
        };
        if !state.remove_index(path, index) {
            return false;
        }
        // Nested controllers are keyed by concrete index paths; rekey them
        // so surviving items keep their nested identities.
        self.arrays.reindex_removed(path, index);
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path, identity = %identity, index, "array item removed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArraySchema, LeafSchema, ObjectSchema};
    use crate::state::ValueState;
    use crate::widget::WidgetHint;
    use serde_json::json;

    fn signup_schema() -> SchemaNode {
        ObjectSchema::new()
            .with_field(
                "name",
                LeafSchema::text()
                    .with_label("Full name")
                    .required("Name is required"),
            )
            .with_field("age", LeafSchema::number())
            .with_field(
                "tags",
                ArraySchema::new(LeafSchema::text())
                    .with_label("Tags")
                    .with_min_items(1),
            )
            .into()
    }

    #[test]
    fn leaf_uses_live_value_over_default() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let values = json!({"name": "ada", "age": null, "tags": []});
        let tree = form.render(&values, &ErrorTree::new()).unwrap();
        assert_eq!(tree.children()[0].value(), Some(&json!("ada")));
    }

    #[test]
    fn untouched_leaf_falls_back_to_default() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        // Value tree missing "age" entirely: still renders with null.
        let values = json!({"name": ""});
        let tree = form.render(&values, &ErrorTree::new()).unwrap();
        assert_eq!(tree.children()[1].value(), Some(&json!(null)));
    }

    #[test]
    fn label_precedence_field_then_semantic_then_name() {
        let schema: SchemaNode = ObjectSchema::new()
            .with_field(
                "a",
                LeafSchema::text()
                    .with_label("Field label")
                    .with_validation_label("Semantic"),
            )
            .with_field("b", LeafSchema::text().with_validation_label("Semantic"))
            .with_field("c", LeafSchema::text())
            .into();
        let mut form = FormModel::new(schema).unwrap();
        let tree = form.render(&json!({}), &ErrorTree::new()).unwrap();
        let labels: Vec<_> = tree.children().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Field label", "Semantic", "c"]);
    }

    #[test]
    fn children_preserve_declaration_order() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let tree = form.render(&json!({}), &ErrorTree::new()).unwrap();
        let paths: Vec<_> = tree
            .children()
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(paths, ["name", "age", "tags"]);
    }

    #[test]
    fn array_items_get_identities_and_indexed_paths() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut state = ValueState::new(form.defaults());
        let tags = FieldPath::root().child("tags");
        form.append(&tags, &mut state).unwrap();
        form.append(&tags, &mut state).unwrap();

        let tree = form.render(state.root(), &ErrorTree::new()).unwrap();
        let collection = &tree.children()[2];
        assert_eq!(collection.label, "Tags");
        let items = collection.children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path.to_string(), "tags[0]");
        assert_eq!(items[1].path.to_string(), "tags[1]");
        assert!(items[0].identity.is_some());
        assert_ne!(items[0].identity, items[1].identity);
        // Leaf array items carry no label of their own.
        assert_eq!(items[0].label, "");
    }

    #[test]
    fn append_synthesizes_item_into_state() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut state = ValueState::new(form.defaults());
        let tags = FieldPath::root().child("tags");
        form.append(&tags, &mut state).unwrap();
        assert_eq!(
            state.root(),
            &json!({"name": "", "age": null, "tags": [""]})
        );
    }

    #[test]
    fn remove_shifts_paths_but_not_identities() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut state = ValueState::new(form.defaults());
        let tags = FieldPath::root().child("tags");
        form.append(&tags, &mut state).unwrap();
        form.append(&tags, &mut state).unwrap();
        form.append(&tags, &mut state).unwrap();

        let before = form.render(state.root(), &ErrorTree::new()).unwrap();
        let ids_before: Vec<_> = before.children()[2]
            .children()
            .iter()
            .map(|c| c.identity.unwrap())
            .collect();

        assert!(form.remove(&tags, ids_before[1], &mut state));

        let after = form.render(state.root(), &ErrorTree::new()).unwrap();
        let items = after.children()[2].children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].identity, Some(ids_before[0]));
        assert_eq!(items[1].identity, Some(ids_before[2]));
        assert_eq!(items[0].path.to_string(), "tags[0]");
        assert_eq!(items[1].path.to_string(), "tags[1]");
    }

    #[test]
    fn nested_array_identities_survive_parent_item_removal() {
        let schema: SchemaNode = ObjectSchema::new()
            .with_field(
                "rows",
                ArraySchema::new(
                    ObjectSchema::new().with_field("cells", ArraySchema::new(LeafSchema::text())),
                ),
            )
            .into();
        let mut form = FormModel::new(schema).unwrap();
        let mut state = ValueState::new(form.defaults());
        let rows = FieldPath::root().child("rows");

        let row_a = form.append(&rows, &mut state).unwrap();
        form.append(&rows, &mut state).unwrap();

        // Churn the first row's cells so its identity counter runs ahead
        // of the second row's.
        let first_cells = rows.index(0).child("cells");
        let churn = form.append(&first_cells, &mut state).unwrap();
        assert!(form.remove(&first_cells, churn, &mut state));
        form.append(&first_cells, &mut state).unwrap();

        let second_cells = rows.index(1).child("cells");
        let kept = form.append(&second_cells, &mut state).unwrap();

        assert!(form.remove(&rows, row_a, &mut state));

        // The surviving row shifted to index 0; its cell still carries
        // the identity minted before the removal.
        let tree = form.render(state.root(), &ErrorTree::new()).unwrap();
        let surviving_row = &tree.children()[0].children()[0];
        let cells = surviving_row.children()[0].children();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].identity, Some(kept));
    }

    #[test]
    fn remove_unknown_identity_is_noop() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut state = ValueState::new(form.defaults());
        let tags = FieldPath::root().child("tags");
        let id = form.append(&tags, &mut state).unwrap();
        assert!(form.remove(&tags, id, &mut state));
        assert!(!form.remove(&tags, id, &mut state));
    }

    #[test]
    fn append_to_non_array_path_returns_none() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut state = ValueState::new(form.defaults());
        assert!(
            form.append(&FieldPath::root().child("name"), &mut state)
                .is_none()
        );
    }

    #[test]
    fn object_items_assemble_full_subtrees() {
        let schema: SchemaNode = ObjectSchema::new()
            .with_field(
                "contacts",
                ArraySchema::new(
                    ObjectSchema::new()
                        .with_field("email", LeafSchema::text().with_hint(WidgetHint::Email))
                        .with_field("primary", LeafSchema::boolean()),
                ),
            )
            .into();
        let mut form = FormModel::new(schema).unwrap();
        let mut state = ValueState::new(form.defaults());
        let contacts = FieldPath::root().child("contacts");
        form.append(&contacts, &mut state).unwrap();

        let tree = form.render(state.root(), &ErrorTree::new()).unwrap();
        let item = &tree.children()[0].children()[0];
        assert!(matches!(item.kind, FieldKind::Group { .. }));
        let fields = item.children();
        assert_eq!(fields[0].path.to_string(), "contacts[0].email");
        assert_eq!(fields[0].widget(), Some(WidgetType::Email));
        assert_eq!(fields[1].widget(), Some(WidgetType::Checkbox));
    }

    #[test]
    fn errors_attach_by_path() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let mut errors = ErrorTree::new();
        errors.insert(&FieldPath::root().child("name"), "Name is required");
        errors.insert_array_own(
            &FieldPath::root().child("tags"),
            "At least one item is required",
        );

        let tree = form.render(&json!({}), &errors).unwrap();
        assert_eq!(tree.children()[0].error.as_deref(), Some("Name is required"));
        assert_eq!(tree.children()[1].error, None);
        assert_eq!(
            tree.children()[2].error.as_deref(),
            Some("At least one item is required")
        );
    }

    #[test]
    fn construction_fails_fast_on_bad_schema() {
        let schema: SchemaNode = ObjectSchema::new()
            .with_field("role", LeafSchema::text().with_hint(WidgetHint::Select))
            .into();
        assert!(FormModel::new(schema).is_err());
    }

    #[test]
    fn rerender_is_stable_for_unchanged_inputs() {
        let mut form = FormModel::new(signup_schema()).unwrap();
        let values = json!({"name": "x", "age": 3, "tags": ["a"]});
        let first = form.render(&values, &ErrorTree::new()).unwrap();
        let second = form.render(&values, &ErrorTree::new()).unwrap();
        assert_eq!(first, second);
    }
}
