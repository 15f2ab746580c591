#![forbid(unsafe_code)]

//! Schema configuration errors.
//!
//! These represent authoring defects in the schema itself (for example a
//! select field declared without options). They surface when the schema is
//! first validated or assembled, typically at application startup, and are
//! never suppressed or retried. User-input problems are not errors at this
//! level; those travel as data in the error tree.

use std::fmt;

use crate::path::FieldPath;
use crate::widget::WidgetHint;

/// A construction-time defect in a schema definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A `select` or `radio` leaf was declared with no options.
    MissingOptions {
        /// The offending hint.
        hint: WidgetHint,
        /// Where in the tree the leaf sits, when known.
        path: Option<FieldPath>,
    },
}

impl SchemaError {
    /// Attach a location to an error raised without path context.
    #[must_use]
    pub fn at(self, path: FieldPath) -> Self {
        match self {
            Self::MissingOptions { hint, .. } => Self::MissingOptions {
                hint,
                path: Some(path),
            },
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOptions { hint, path } => {
                match path {
                    Some(path) if !path.is_root() => {
                        write!(f, "{hint} field at `{path}` has no options")
                    }
                    _ => write!(f, "{hint} field has no options"),
                }
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_when_known() {
        let err = SchemaError::MissingOptions {
            hint: WidgetHint::Select,
            path: None,
        }
        .at(FieldPath::root().child("role"));
        assert_eq!(err.to_string(), "select field at `role` has no options");
    }

    #[test]
    fn display_without_path() {
        let err = SchemaError::MissingOptions {
            hint: WidgetHint::Radio,
            path: None,
        };
        assert_eq!(err.to_string(), "radio field has no options");
    }
}
