//! Paths locating nodes inside a tree.
//!
//! A path is an ordered list of segments walked from the tree root. Key
//! segments step into maps, index segments step into lists. Entities stored
//! in a plain table sit at `[table, i]`; registered entities may live deeper,
//! e.g. `[table, 1, "children", 0]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step of a [`Path`].
///
/// Serializes untagged, so a path round-trips through JSON as a plain array
/// such as `["people", 0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Position inside an ordered list.
    Index(usize),
    /// Field or table name inside a map.
    Key(String),
}

impl Segment {
    /// Returns the key if this is a key segment.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    /// Returns the list position if this is an index segment.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            Segment::Key(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Key(key) => write!(f, "{key}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// An owned path from the tree root to a node.
///
/// Paths order lexicographically by segment, so sorting a set of paths in
/// descending order visits later list positions (and deeper nodes) first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path, pointing at the tree root.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A single-segment path pointing at a top-level table.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self(vec![Segment::Key(name.into())])
    }

    /// Builder-style append of a key segment.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Builder-style append of an index segment.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Into<Segment>) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment, or `None` for the root path.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Everything but the last segment, or `None` for the root path.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        self.0
            .split_last()
            .map(|(_, parent)| Path(parent.to_vec()))
    }

    /// The table a path belongs to: its first segment, when that is a key.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.0.first().and_then(Segment::as_key)
    }

    /// True if `prefix` is equal to or an ancestor of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Mutable access to the segment at `position`.
    pub fn segment_mut(&mut self, position: usize) -> Option<&mut Segment> {
        self.0.get_mut(position)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
