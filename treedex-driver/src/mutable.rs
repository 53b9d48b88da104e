//! In-place mutable tree.
//!
//! Containers are shared `Rc<RefCell<..>>` cells. A write borrows the parent
//! container and replaces one child, so the root, every ancestor and the
//! table lists keep their identity. Any handle a caller holds is a live view.

use crate::error::prefix;
use crate::{
    DriverError, DriverResult, EntityRegistry, NodeKind, TreeDriver, TreeNode,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;
use treedex_types::{Path, Scalar, Segment};

/// A node of a [`MutableDriver`] tree.
#[derive(Debug, Clone)]
pub enum MutableNode {
    Scalar(Scalar),
    Map(Rc<RefCell<BTreeMap<String, MutableNode>>>),
    List(Rc<RefCell<Vec<MutableNode>>>),
}

scalar_conversions!(MutableNode);

impl MutableNode {
    fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Map => Self::map(Vec::new()),
            NodeKind::List => Self::list(Vec::new()),
            NodeKind::Scalar => MutableNode::Scalar(Scalar::Null),
        }
    }

    /// Writes `value` into this container. `path` is the container's own
    /// location, used for errors.
    fn put_child(&self, segment: &Segment, value: MutableNode, path: &Path) -> DriverResult<()> {
        match (self, segment) {
            (MutableNode::Map(map), Segment::Key(key)) => {
                map.borrow_mut().insert(key.clone(), value);
                Ok(())
            }
            (MutableNode::List(list), Segment::Index(index)) => {
                let mut list = list.borrow_mut();
                let len = list.len();
                if *index < len {
                    list[*index] = value;
                } else if *index == len {
                    list.push(value);
                } else {
                    return Err(DriverError::IndexOutOfBounds {
                        path: path.clone(),
                        index: *index,
                        len,
                    });
                }
                Ok(())
            }
            (MutableNode::Scalar(_), _) => Err(DriverError::NotAContainer { path: path.clone() }),
            _ => Err(DriverError::SegmentMismatch {
                path: path.clone(),
                segment: segment.clone(),
            }),
        }
    }

    /// Removes a child in place. Returns false when there was nothing to remove.
    fn remove_child(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (MutableNode::Map(map), Segment::Key(key)) => map.borrow_mut().remove(key).is_some(),
            (MutableNode::List(list), Segment::Index(index)) => {
                let mut list = list.borrow_mut();
                if *index < list.len() {
                    list.remove(*index);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

impl TreeNode for MutableNode {
    fn kind(&self) -> NodeKind {
        match self {
            MutableNode::Scalar(_) => NodeKind::Scalar,
            MutableNode::Map(_) => NodeKind::Map,
            MutableNode::List(_) => NodeKind::List,
        }
    }

    fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            MutableNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    fn child(&self, segment: &Segment) -> Option<Self> {
        match (self, segment) {
            (MutableNode::Map(map), Segment::Key(key)) => map.borrow().get(key).cloned(),
            (MutableNode::List(list), Segment::Index(index)) => list.borrow().get(*index).cloned(),
            _ => None,
        }
    }

    fn items(&self) -> Vec<Self> {
        match self {
            MutableNode::List(list) => list.borrow().clone(),
            _ => Vec::new(),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            MutableNode::Map(map) => map.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn len(&self) -> usize {
        match self {
            MutableNode::Scalar(_) => 0,
            MutableNode::Map(map) => map.borrow().len(),
            MutableNode::List(list) => list.borrow().len(),
        }
    }

    fn list(items: Vec<Self>) -> Self {
        MutableNode::List(Rc::new(RefCell::new(items)))
    }

    fn map(entries: Vec<(String, Self)>) -> Self {
        MutableNode::Map(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    fn with_field(&self, name: &str, value: impl Into<Self>) -> Self {
        let mut fields = match self {
            MutableNode::Map(map) => map.borrow().clone(),
            _ => BTreeMap::new(),
        };
        fields.insert(name.to_string(), value.into());
        MutableNode::Map(Rc::new(RefCell::new(fields)))
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (MutableNode::Scalar(a), MutableNode::Scalar(b)) => a == b,
            (MutableNode::Map(a), MutableNode::Map(b)) => Rc::ptr_eq(a, b),
            (MutableNode::List(a), MutableNode::List(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            MutableNode::Scalar(scalar) => scalar.to_json(),
            MutableNode::Map(map) => serde_json::Value::Object(
                map.borrow()
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            MutableNode::List(list) => {
                serde_json::Value::Array(list.borrow().iter().map(TreeNode::to_json).collect())
            }
        }
    }
}

impl From<serde_json::Value> for MutableNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                Self::list(items.into_iter().map(MutableNode::from).collect())
            }
            serde_json::Value::Object(fields) => Self::map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, MutableNode::from(value)))
                    .collect(),
            ),
            leaf => MutableNode::Scalar(Scalar::from_json(&leaf).unwrap_or(Scalar::Null)),
        }
    }
}

/// Driver that mutates its tree in place.
///
/// The root handle never changes, and `get_in_path` of a table returns the
/// same list handle before and after any write to that table.
#[derive(Debug, Clone)]
pub struct MutableDriver {
    root: MutableNode,
    registry: EntityRegistry,
}

impl MutableDriver {
    #[must_use]
    pub fn new(root: MutableNode) -> Self {
        Self {
            root,
            registry: EntityRegistry::new(),
        }
    }

    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::new(MutableNode::from(value))
    }

    /// A driver whose entities are served from `registry`.
    #[must_use]
    pub fn with_registry(root: MutableNode, registry: EntityRegistry) -> Self {
        Self { root, registry }
    }

    /// Walks `segments` from the root, creating missing containers. The kind
    /// of each created container follows from the segment after it.
    fn ensure_container(&self, path: &Path) -> DriverResult<MutableNode> {
        let segments = path.segments();
        let mut node = self.root.clone();
        for (depth, segment) in segments.iter().enumerate().take(segments.len() - 1) {
            let next = match node.child(segment) {
                Some(child) if !child.is_scalar() => child,
                Some(_) => {
                    return Err(DriverError::NotAContainer {
                        path: prefix(path, depth + 1),
                    });
                }
                None => {
                    let created = MutableNode::empty(NodeKind::for_segment(&segments[depth + 1]));
                    node.put_child(segment, created.clone(), &prefix(path, depth))?;
                    created
                }
            };
            node = next;
        }
        Ok(node)
    }
}

impl TreeDriver for MutableDriver {
    type Node = MutableNode;

    fn tree(&self) -> MutableNode {
        self.root.clone()
    }

    fn update_in_path_with<F>(&mut self, path: &Path, updater: F) -> DriverResult<MutableNode>
    where
        F: FnOnce(Option<&MutableNode>) -> MutableNode,
    {
        let Some(last) = path.last() else {
            self.root = updater(Some(&self.root));
            return Ok(self.tree());
        };

        let parent = self.ensure_container(path)?;
        let current = parent.child(last);
        let next = updater(current.as_ref());
        parent.put_child(last, next, &prefix(path, path.len() - 1))?;

        debug!("Updated node in place at {}", path);
        Ok(self.tree())
    }

    fn delete_in_path(&mut self, path: &Path) -> DriverResult<MutableNode> {
        let (Some(parent_path), Some(last)) = (path.parent(), path.last()) else {
            return Ok(self.tree());
        };
        let Some(parent) = self.root.get_in(&parent_path) else {
            return Ok(self.tree());
        };

        if parent.remove_child(last) {
            debug!("Deleted node in place at {}", path);
            self.registry.forget(path);
        }
        Ok(self.tree())
    }

    fn add_in_path(&mut self, path: &Path, entity: MutableNode) -> DriverResult<MutableNode> {
        match self.get_in_path(path) {
            Some(MutableNode::List(list)) => {
                let index = {
                    let mut list = list.borrow_mut();
                    list.push(entity);
                    list.len() - 1
                };
                self.registry.appended(path, index);
            }
            Some(_) => return Err(DriverError::NotAList { path: path.clone() }),
            None => {
                self.update_in_path(path, MutableNode::list(vec![entity]))?;
                self.registry.appended(path, 0);
            }
        }
        debug!("Appended entity at {}", path);
        Ok(self.tree())
    }

    fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }
}
