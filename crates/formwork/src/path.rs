#![forbid(unsafe_code)]

//! Field paths: stable addressing for every node in a schema tree.
//!
//! A [`FieldPath`] is an ordered sequence of segments, each either an object
//! key or an array index. Paths are the sole join key between the schema
//! tree, the live-value tree, and the validation error tree. Segments are
//! distinguished by variant rather than by string parsing, so a field whose
//! name happens to be numeric never collides with an index.

use std::fmt;

use serde_json::Value;

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    /// An object-field name.
    Key(String),
    /// An array index.
    Index(usize),
}

impl Segment {
    /// Returns the field name if this is a [`Segment::Key`].
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// Returns the index if this is a [`Segment::Index`].
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(_) => None,
            Self::Index(i) => Some(*i),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// An ordered address locating one node within value and error trees.
///
/// Two paths are equal iff their segment sequences are equal. Paths are
/// cheap to extend and are recomputed from scratch on every render, so they
/// never go stale when array elements shift.
///
/// # Example
///
/// ```rust
/// use formwork::FieldPath;
///
/// let path = FieldPath::root().child("tags").index(0);
/// assert_eq!(path.to_string(), "tags[0]");
/// assert_eq!(path.segments().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path, addressing the root of the tree.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from raw segments.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Extend with an object-key segment.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(name.into()));
        Self(segments)
    }

    /// Extend with an array-index segment.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// The segment sequence.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// The path with the final segment removed, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Resolve this path against a value tree.
    ///
    /// A miss (absent key, out-of-range index, container-kind mismatch)
    /// resolves to `None`. Misses are routine for not-yet-touched optional
    /// fields and are never an error.
    #[must_use]
    pub fn lookup<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        let mut current = tree;
        for segment in &self.0 {
            current = match segment {
                Segment::Key(name) => current.as_object()?.get(name)?,
                Segment::Index(i) => current.as_array()?.get(*i)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(name) => {
                    if pos > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}
