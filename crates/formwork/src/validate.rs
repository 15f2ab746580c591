#![forbid(unsafe_code)]

//! The validator contract, plus a constraint-driven checker.
//!
//! The resolver does not own a validation-rule DSL; it consumes any
//! validator through [`FormValidator`] and joins the resulting
//! [`ErrorTree`] back onto the field models by path. What it does ship is
//! [`ConstraintValidator`], which executes exactly the constraints the
//! schema itself declares (required, numeric bounds, option membership,
//! minimum items, and the format heuristics implied by widget hints).
//! Anything richer belongs in an external validator.

use std::sync::Arc;

use serde_json::Value;

use crate::path::FieldPath;
use crate::report::ErrorTree;
use crate::schema::{LeafSchema, SchemaNode};
use crate::widget::WidgetHint;

/// A validator producing an error tree shaped like the value tree.
pub trait FormValidator {
    /// Validate a whole value tree. An empty [`ErrorTree`] means valid.
    fn validate(&self, values: &Value) -> ErrorTree;
}

// ---------------------------------------------------------------------------
// ConstraintValidator
// ---------------------------------------------------------------------------

/// Executes the constraints declared on a schema tree.
///
/// Empty optional fields are valid: apart from the required check itself,
/// every check passes on an empty value.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    schema: Arc<SchemaNode>,
}

impl ConstraintValidator {
    /// A validator for the given schema.
    #[must_use]
    pub fn new(schema: Arc<SchemaNode>) -> Self {
        Self { schema }
    }

    fn check_node(&self, node: &SchemaNode, path: &FieldPath, values: &Value, out: &mut ErrorTree) {
        match node {
            SchemaNode::Leaf(leaf) => {
                if let Some(message) = check_leaf(leaf, path.lookup(values)) {
                    out.insert(path, message);
                }
            }
            SchemaNode::Object(object) => {
                for (name, child) in &object.children {
                    self.check_node(child, &path.child(name.clone()), values, out);
                }
            }
            SchemaNode::Array(array) => {
                let len = path.lookup(values).and_then(Value::as_array).map_or(0, Vec::len);
                if let Some(min) = array.min_items
                    && len < min
                {
                    out.insert_array_own(path, min_items_message(min));
                }
                for index in 0..len {
                    self.check_node(&array.item, &path.index(index), values, out);
                }
            }
        }
    }
}

impl FormValidator for ConstraintValidator {
    fn validate(&self, values: &Value) -> ErrorTree {
        let mut out = ErrorTree::new();
        self.check_node(&self.schema, &FieldPath::root(), values, &mut out);
        out
    }
}

fn min_items_message(min: usize) -> String {
    if min == 1 {
        "At least one item is required".to_string()
    } else {
        format!("At least {min} items are required")
    }
}

// Whole bounds render without a trailing ".0" so messages read naturally.
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_leaf(leaf: &LeafSchema, value: Option<&Value>) -> Option<String> {
    if is_empty_value(value) {
        return leaf.constraints.required.clone();
    }
    let value = value?;

    if let Some(n) = value.as_f64() {
        if let Some(min) = leaf.constraints.min
            && n < min
        {
            return Some(format!("Must be at least {}", format_bound(min)));
        }
        if let Some(max) = leaf.constraints.max
            && n > max
        {
            return Some(format!("Must be at most {}", format_bound(max)));
        }
    }

    if let Some(text) = value.as_str() {
        if !leaf.options.is_empty() && !leaf.options.iter().any(|o| o.value == text) {
            return Some("Please select a valid option".to_string());
        }
        if let Some(pattern) = &leaf.constraints.pattern
            && !text.contains(pattern.as_str())
        {
            return Some("Invalid format".to_string());
        }
        match leaf.hint {
            Some(WidgetHint::Email) if !looks_like_email(text) => {
                return Some("Please enter a valid email address".to_string());
            }
            Some(WidgetHint::Url) if !looks_like_url(text) => {
                return Some("Please enter a valid URL".to_string());
            }
            _ => {}
        }
    }

    None
}

// Heuristic only: text on both sides of a single '@', with a dotted domain.
fn looks_like_email(text: &str) -> bool {
    let trimmed = text.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.contains('@')
}

fn looks_like_url(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        && trimmed.len() > "https://".len()
}
