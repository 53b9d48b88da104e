//! Copy-on-write tree.
//!
//! Containers are immutable `Rc` values. A write rebuilds the chain of
//! ancestors from the root down to the written node, shallow-copying each one
//! and reusing every untouched child by reference. Old roots stay valid and
//! unchanged.

use crate::error::prefix;
use crate::{DriverError, DriverResult, EntityRegistry, NodeKind, TreeDriver, TreeNode};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;
use treedex_types::{Path, Scalar, Segment};

/// A node of a [`CowDriver`] tree.
#[derive(Debug, Clone)]
pub enum CowNode {
    Scalar(Scalar),
    Map(Rc<BTreeMap<String, CowNode>>),
    List(Rc<Vec<CowNode>>),
}

scalar_conversions!(CowNode);

impl CowNode {
    fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Map => Self::map(Vec::new()),
            NodeKind::List => Self::list(Vec::new()),
            NodeKind::Scalar => CowNode::Scalar(Scalar::Null),
        }
    }

    /// A copy of this container with `segment` set to `value`.
    fn replaced(&self, segment: &Segment, value: CowNode, path: &Path) -> DriverResult<CowNode> {
        match (self, segment) {
            (CowNode::Map(map), Segment::Key(key)) => {
                let mut map = (**map).clone();
                map.insert(key.clone(), value);
                Ok(CowNode::Map(Rc::new(map)))
            }
            (CowNode::List(list), Segment::Index(index)) => {
                let len = list.len();
                let mut list = (**list).clone();
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
                Ok(CowNode::List(Rc::new(list)))
            }
            (CowNode::Scalar(_), _) => Err(DriverError::NotAContainer { path: path.clone() }),
            _ => Err(DriverError::SegmentMismatch {
                path: path.clone(),
                segment: segment.clone(),
            }),
        }
    }

    /// A copy of this container without `segment`.
    fn without(&self, segment: &Segment) -> CowNode {
        match (self, segment) {
            (CowNode::Map(map), Segment::Key(key)) => {
                let mut map = (**map).clone();
                map.remove(key);
                CowNode::Map(Rc::new(map))
            }
            (CowNode::List(list), Segment::Index(index)) if *index < list.len() => {
                let mut list = (**list).clone();
                list.remove(*index);
                CowNode::List(Rc::new(list))
            }
            _ => self.clone(),
        }
    }

    /// Rebuilds the ancestor chain below `node` for a write at `path[depth..]`.
    fn rebuild<F>(node: Option<&CowNode>, path: &Path, depth: usize, updater: F) -> DriverResult<CowNode>
    where
        F: FnOnce(Option<&CowNode>) -> CowNode,
    {
        let Some(segment) = path.segments().get(depth) else {
            return Ok(updater(node));
        };

        let container = match node {
            Some(CowNode::Scalar(_)) => {
                return Err(DriverError::NotAContainer {
                    path: prefix(path, depth),
                });
            }
            Some(container) => container.clone(),
            None => CowNode::empty(NodeKind::for_segment(segment)),
        };

        let child = container.child(segment);
        let next = Self::rebuild(child.as_ref(), path, depth + 1, updater)?;
        container.replaced(segment, next, &prefix(path, depth))
    }
}

impl TreeNode for CowNode {
    fn kind(&self) -> NodeKind {
        match self {
            CowNode::Scalar(_) => NodeKind::Scalar,
            CowNode::Map(_) => NodeKind::Map,
            CowNode::List(_) => NodeKind::List,
        }
    }

    fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            CowNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    fn child(&self, segment: &Segment) -> Option<Self> {
        match (self, segment) {
            (CowNode::Map(map), Segment::Key(key)) => map.get(key).cloned(),
            (CowNode::List(list), Segment::Index(index)) => list.get(*index).cloned(),
            _ => None,
        }
    }

    fn items(&self) -> Vec<Self> {
        match self {
            CowNode::List(list) => list.as_ref().clone(),
            _ => Vec::new(),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            CowNode::Map(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn len(&self) -> usize {
        match self {
            CowNode::Scalar(_) => 0,
            CowNode::Map(map) => map.len(),
            CowNode::List(list) => list.len(),
        }
    }

    fn list(items: Vec<Self>) -> Self {
        CowNode::List(Rc::new(items))
    }

    fn map(entries: Vec<(String, Self)>) -> Self {
        CowNode::Map(Rc::new(entries.into_iter().collect()))
    }

    fn with_field(&self, name: &str, value: impl Into<Self>) -> Self {
        let mut fields = match self {
            CowNode::Map(map) => map.as_ref().clone(),
            _ => BTreeMap::new(),
        };
        fields.insert(name.to_string(), value.into());
        CowNode::Map(Rc::new(fields))
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (CowNode::Scalar(a), CowNode::Scalar(b)) => a == b,
            (CowNode::Map(a), CowNode::Map(b)) => Rc::ptr_eq(a, b),
            (CowNode::List(a), CowNode::List(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            CowNode::Scalar(scalar) => scalar.to_json(),
            CowNode::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            CowNode::List(list) => {
                serde_json::Value::Array(list.iter().map(TreeNode::to_json).collect())
            }
        }
    }
}

impl From<serde_json::Value> for CowNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                Self::list(items.into_iter().map(CowNode::from).collect())
            }
            serde_json::Value::Object(fields) => Self::map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, CowNode::from(value)))
                    .collect(),
            ),
            leaf => CowNode::Scalar(Scalar::from_json(&leaf).unwrap_or(Scalar::Null)),
        }
    }
}

/// Driver that copies the ancestor chain on every write.
///
/// Every write that changes something installs a new root. Siblings of the
/// written path are reused, so `same` holds between an untouched table of
/// the old root and the same table of the new root.
#[derive(Debug, Clone)]
pub struct CowDriver {
    root: CowNode,
    registry: EntityRegistry,
}

impl CowDriver {
    #[must_use]
    pub fn new(root: CowNode) -> Self {
        Self {
            root,
            registry: EntityRegistry::new(),
        }
    }

    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::new(CowNode::from(value))
    }

    /// A driver whose entities are served from `registry`.
    #[must_use]
    pub fn with_registry(root: CowNode, registry: EntityRegistry) -> Self {
        Self { root, registry }
    }
}

impl TreeDriver for CowDriver {
    type Node = CowNode;

    fn tree(&self) -> CowNode {
        self.root.clone()
    }

    fn update_in_path_with<F>(&mut self, path: &Path, updater: F) -> DriverResult<CowNode>
    where
        F: FnOnce(Option<&CowNode>) -> CowNode,
    {
        self.root = CowNode::rebuild(Some(&self.root), path, 0, updater)?;
        debug!("Rebuilt ancestors of {}", path);
        Ok(self.tree())
    }

    /// Writing a value that is already in place keeps the current root.
    fn update_in_path(&mut self, path: &Path, value: CowNode) -> DriverResult<CowNode> {
        if self
            .get_in_path(path)
            .is_some_and(|current| current.same(&value))
        {
            return Ok(self.tree());
        }
        self.update_in_path_with(path, |_| value)
    }

    fn delete_in_path(&mut self, path: &Path) -> DriverResult<CowNode> {
        let (Some(parent_path), Some(last)) = (path.parent(), path.last()) else {
            return Ok(self.tree());
        };
        if self.get_in_path(path).is_none() {
            return Ok(self.tree());
        }

        let last = last.clone();
        self.root = CowNode::rebuild(Some(&self.root), &parent_path, 0, |parent| {
            parent.map_or_else(|| CowNode::empty(NodeKind::Map), |p| p.without(&last))
        })?;
        self.registry.forget(path);
        debug!("Deleted node at {}", path);
        Ok(self.tree())
    }

    fn add_in_path(&mut self, path: &Path, entity: CowNode) -> DriverResult<CowNode> {
        let mut items = match self.get_in_path(path) {
            Some(CowNode::List(list)) => list.as_ref().clone(),
            Some(_) => return Err(DriverError::NotAList { path: path.clone() }),
            None => Vec::new(),
        };
        items.push(entity);
        let index = items.len() - 1;

        self.update_in_path_with(path, |_| CowNode::list(items))?;
        self.registry.appended(path, index);
        Ok(self.tree())
    }

    fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }
}
