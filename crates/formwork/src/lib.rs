//! Schema-driven field-model resolution for dynamic forms.
//!
//! Given a declarative, recursively nested schema (records, dynamic lists,
//! and typed leaves carrying optional presentation metadata), `formwork`
//! derives everything a rendering layer needs short of the widgets
//! themselves:
//!
//! - A default-value tree matching the schema's shape ([`build_defaults`])
//! - A per-field widget classification with explicit precedence
//!   ([`WidgetType`], hint wins over primitive kind)
//! - Stable field paths joining live values and validation errors back
//!   onto the schema structure at render time ([`FieldPath`])
//! - Stable identity tokens for dynamic-list items, so removing an element
//!   in the middle never corrupts the state of the elements after it
//!   ([`ItemIdentity`])
//!
//! Everything is a synchronous, pure tree transformation: a [`FieldModel`]
//! tree is rebuilt per render and never patched in place.
//!
//! # Example
//!
//! ```rust
//! use formwork::{
//!     ArraySchema, ConstraintValidator, FieldPath, FormModel, FormValidator, LeafSchema,
//!     ObjectSchema, ValueState,
//! };
//! use std::sync::Arc;
//!
//! let schema = ObjectSchema::new()
//!     .with_field("name", LeafSchema::text().required("Name is required"))
//!     .with_field("tags", ArraySchema::new(LeafSchema::text()).with_min_items(1))
//!     .into();
//! let mut form = FormModel::new(schema)?;
//!
//! let mut state = ValueState::new(form.defaults());
//! let validator = ConstraintValidator::new(Arc::new(form.schema().clone()));
//! let errors = validator.validate(state.root());
//!
//! let tree = form.render(state.root(), &errors)?;
//! assert_eq!(tree.children()[0].error.as_deref(), Some("Name is required"));
//! # Ok::<(), formwork::SchemaError>(())
//! ```
//!
//! # Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` derives on the schema model and paths |
//! | `tracing` | Structured events for structural edits |

#![forbid(unsafe_code)]

pub mod array;
pub mod defaults;
pub mod error;
pub mod model;
pub mod path;
pub mod report;
pub mod schema;
pub mod state;
pub mod validate;
pub mod widget;

pub use array::{ArrayItemRef, ArrayModel, ArrayRegistry, ItemIdentity};
pub use defaults::{DefaultCache, build_defaults, build_defaults_prepopulated};
pub use error::SchemaError;
pub use model::{FieldKind, FieldModel, FormModel, assemble};
pub use path::{FieldPath, Segment};
pub use report::ErrorTree;
pub use schema::{
    ArraySchema, Constraints, LeafSchema, ObjectSchema, PrimitiveKind, SchemaNode, SelectOption,
};
pub use state::{FormState, ValueState};
pub use validate::{ConstraintValidator, FormValidator};
pub use widget::{WidgetHint, WidgetType, resolve};
