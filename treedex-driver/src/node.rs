//! The node contract shared by every driver's tree representation.

use std::fmt;
use treedex_types::{FieldValue, Path, Scalar, Segment};

/// The shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Map,
    List,
}

impl NodeKind {
    /// The container kind a segment steps into.
    pub(crate) fn for_segment(segment: &Segment) -> Self {
        match segment {
            Segment::Key(_) => NodeKind::Map,
            Segment::Index(_) => NodeKind::List,
        }
    }
}

/// A handle to a value inside a tree.
///
/// Cloning a node clones the handle, never the subtree. Whether two handles
/// alias the same storage is answered by [`TreeNode::same`].
pub trait TreeNode: Clone + fmt::Debug + From<Scalar> + From<serde_json::Value> {
    fn kind(&self) -> NodeKind;

    /// The leaf value, or `None` for containers.
    fn as_scalar(&self) -> Option<&Scalar>;

    /// The child addressed by `segment`, if this node is a matching container.
    fn child(&self, segment: &Segment) -> Option<Self>;

    /// Children of a list in order. Empty for maps and scalars.
    fn items(&self) -> Vec<Self>;

    /// Keys of a map in order. Empty for lists and scalars.
    fn keys(&self) -> Vec<String>;

    /// Number of children. Zero for scalars.
    fn len(&self) -> usize;

    /// Builds a list in this representation.
    fn list(items: Vec<Self>) -> Self;

    /// Builds a map in this representation.
    fn map(entries: Vec<(String, Self)>) -> Self;

    /// A shallow copy of this map with one field replaced.
    ///
    /// Non-map nodes are treated as an empty map. The receiver is never
    /// modified, so this is safe to call from an updater on any driver.
    fn with_field(&self, name: &str, value: impl Into<Self>) -> Self;

    /// Reference identity: true when both handles point at the same storage.
    /// Scalars compare by value.
    ///
    /// A persistent list small enough to be stored inline (an empty one, at
    /// least) owns no allocation, so [`crate::PersistentNode`] compares such
    /// lists element by element. Two separately built inline lists with
    /// equal scalars are therefore `same` there, while on the other drivers
    /// they are not.
    fn same(&self, other: &Self) -> bool;

    fn to_json(&self) -> serde_json::Value;

    fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }

    fn is_map(&self) -> bool {
        self.kind() == NodeKind::Map
    }

    fn is_list(&self) -> bool {
        self.kind() == NodeKind::List
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn field(&self, name: &str) -> Option<Self> {
        self.child(&Segment::Key(name.to_string()))
    }

    /// The index key of a scalar field. `None` when the field is missing,
    /// null, or not a scalar.
    fn field_value(&self, name: &str) -> Option<FieldValue> {
        self.field(name)
            .and_then(|node| node.as_scalar().and_then(Scalar::field_value))
    }

    /// Walks `path` from this node.
    fn get_in(&self, path: &Path) -> Option<Self> {
        let mut node = self.clone();
        for segment in path {
            node = node.child(segment)?;
        }
        Some(node)
    }
}

/// Implements `From<Scalar>` and the common leaf conversions for a node type
/// with a `Scalar(Scalar)` variant.
macro_rules! scalar_conversions {
    ($node:ident) => {
        impl From<treedex_types::Scalar> for $node {
            fn from(scalar: treedex_types::Scalar) -> Self {
                $node::Scalar(scalar)
            }
        }

        scalar_conversions!(@leaf $node, &str, String, bool, i64, i32, f64);
    };
    (@leaf $node:ident, $($ty:ty),*) => {
        $(
            impl From<$ty> for $node {
                fn from(value: $ty) -> Self {
                    $node::Scalar(treedex_types::Scalar::from(value))
                }
            }
        )*
    };
}
