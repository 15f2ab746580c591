#![forbid(unsafe_code)]

//! Widget-type resolution: classifying a leaf into the control that
//! renders it.
//!
//! Precedence is fixed and explicit: a declared [`WidgetHint`] always wins
//! over the primitive kind; absent a hint, the kind maps text→text,
//! number→number, boolean→checkbox. A `select` or `radio` hint with no
//! options is a schema-authoring bug and fails with
//! [`SchemaError::MissingOptions`] rather than silently degrading.

use std::fmt;

use crate::error::SchemaError;
use crate::schema::{LeafSchema, PrimitiveKind};

// ---------------------------------------------------------------------------
// WidgetHint
// ---------------------------------------------------------------------------

/// An explicit presentation hint on a leaf.
///
/// The seconds-precision date/time variants exist because HTML-style
/// datetime inputs distinguish minute and second resolution; both resolve
/// to the same widget type as their minute-precision counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WidgetHint {
    Select,
    Radio,
    Textarea,
    Range,
    Password,
    Email,
    Url,
    Date,
    DateTime,
    DateTimeSeconds,
    Time,
    TimeSeconds,
}

impl fmt::Display for WidgetHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Textarea => "textarea",
            Self::Range => "range",
            Self::Password => "password",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeSeconds => "datetime-seconds",
            Self::Time => "time",
            Self::TimeSeconds => "time-seconds",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// WidgetType
// ---------------------------------------------------------------------------

/// The resolved classification driving which external widget renders
/// a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WidgetType {
    Text,
    Number,
    Checkbox,
    Select,
    Radio,
    Textarea,
    Range,
    Password,
    Email,
    Url,
    Date,
    DateTime,
    Time,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Textarea => "textarea",
            Self::Range => "range",
            Self::Password => "password",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the widget type for a leaf.
///
/// # Errors
///
/// Returns [`SchemaError::MissingOptions`] when a `select` or `radio` hint
/// is declared with an empty option list.
pub fn resolve(leaf: &LeafSchema) -> Result<WidgetType, SchemaError> {
    if let Some(hint) = leaf.hint {
        let widget = match hint {
            WidgetHint::Select | WidgetHint::Radio => {
                if leaf.options.is_empty() {
                    return Err(SchemaError::MissingOptions { hint, path: None });
                }
                if hint == WidgetHint::Select {
                    WidgetType::Select
                } else {
                    WidgetType::Radio
                }
            }
            WidgetHint::Textarea => WidgetType::Textarea,
            WidgetHint::Range => WidgetType::Range,
            WidgetHint::Password => WidgetType::Password,
            WidgetHint::Email => WidgetType::Email,
            WidgetHint::Url => WidgetType::Url,
            WidgetHint::Date => WidgetType::Date,
            WidgetHint::DateTime | WidgetHint::DateTimeSeconds => WidgetType::DateTime,
            WidgetHint::Time | WidgetHint::TimeSeconds => WidgetType::Time,
        };
        return Ok(widget);
    }

    Ok(match leaf.kind {
        PrimitiveKind::Text => WidgetType::Text,
        PrimitiveKind::Number => WidgetType::Number,
        PrimitiveKind::Boolean => WidgetType::Checkbox,
    })
}
