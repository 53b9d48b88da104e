//! Persistent-collection tree backed by `imbl`.
//!
//! Maps are `imbl::OrdMap`s and lists are `imbl::Vector`s. Path writes use
//! the collections' own persistent updates, so a write copies only the
//! internal chunks it touches, even inside a very wide table.

use crate::error::prefix;
use crate::{DriverError, DriverResult, EntityRegistry, NodeKind, TreeDriver, TreeNode};
use imbl::{OrdMap, Vector};
use tracing::debug;
use treedex_types::{Path, Scalar, Segment};

/// A node of a [`PersistentDriver`] tree.
#[derive(Debug, Clone)]
pub enum PersistentNode {
    Scalar(Scalar),
    Map(OrdMap<String, PersistentNode>),
    List(Vector<PersistentNode>),
}

scalar_conversions!(PersistentNode);

impl PersistentNode {
    fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Map => PersistentNode::Map(OrdMap::new()),
            NodeKind::List => PersistentNode::List(Vector::new()),
            NodeKind::Scalar => PersistentNode::Scalar(Scalar::Null),
        }
    }

    fn replaced(
        &self,
        segment: &Segment,
        value: PersistentNode,
        path: &Path,
    ) -> DriverResult<PersistentNode> {
        match (self, segment) {
            (PersistentNode::Map(map), Segment::Key(key)) => {
                Ok(PersistentNode::Map(map.update(key.clone(), value)))
            }
            (PersistentNode::List(list), Segment::Index(index)) => {
                let len = list.len();
                if *index < len {
                    Ok(PersistentNode::List(list.update(*index, value)))
                } else if *index == len {
                    let mut list = list.clone();
                    list.push_back(value);
                    Ok(PersistentNode::List(list))
                } else {
                    Err(DriverError::IndexOutOfBounds {
                        path: path.clone(),
                        index: *index,
                        len,
                    })
                }
            }
            (PersistentNode::Scalar(_), _) => {
                Err(DriverError::NotAContainer { path: path.clone() })
            }
            _ => Err(DriverError::SegmentMismatch {
                path: path.clone(),
                segment: segment.clone(),
            }),
        }
    }

    fn without(&self, segment: &Segment) -> PersistentNode {
        match (self, segment) {
            (PersistentNode::Map(map), Segment::Key(key)) => PersistentNode::Map(map.without(key)),
            (PersistentNode::List(list), Segment::Index(index)) if *index < list.len() => {
                let mut list = list.clone();
                list.remove(*index);
                PersistentNode::List(list)
            }
            _ => self.clone(),
        }
    }

    fn rebuild<F>(
        node: Option<&PersistentNode>,
        path: &Path,
        depth: usize,
        updater: F,
    ) -> DriverResult<PersistentNode>
    where
        F: FnOnce(Option<&PersistentNode>) -> PersistentNode,
    {
        let Some(segment) = path.segments().get(depth) else {
            return Ok(updater(node));
        };

        let container = match node {
            Some(PersistentNode::Scalar(_)) => {
                return Err(DriverError::NotAContainer {
                    path: prefix(path, depth),
                });
            }
            Some(container) => container.clone(),
            None => PersistentNode::empty(NodeKind::for_segment(segment)),
        };

        let child = container.child(segment);
        let next = Self::rebuild(child.as_ref(), path, depth + 1, updater)?;
        container.replaced(segment, next, &prefix(path, depth))
    }
}

impl TreeNode for PersistentNode {
    fn kind(&self) -> NodeKind {
        match self {
            PersistentNode::Scalar(_) => NodeKind::Scalar,
            PersistentNode::Map(_) => NodeKind::Map,
            PersistentNode::List(_) => NodeKind::List,
        }
    }

    fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            PersistentNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    fn child(&self, segment: &Segment) -> Option<Self> {
        match (self, segment) {
            (PersistentNode::Map(map), Segment::Key(key)) => map.get(key).cloned(),
            (PersistentNode::List(list), Segment::Index(index)) => list.get(*index).cloned(),
            _ => None,
        }
    }

    fn items(&self) -> Vec<Self> {
        match self {
            PersistentNode::List(list) => list.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            PersistentNode::Map(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn len(&self) -> usize {
        match self {
            PersistentNode::Scalar(_) => 0,
            PersistentNode::Map(map) => map.len(),
            PersistentNode::List(list) => list.len(),
        }
    }

    fn list(items: Vec<Self>) -> Self {
        PersistentNode::List(items.into_iter().collect())
    }

    fn map(entries: Vec<(String, Self)>) -> Self {
        PersistentNode::Map(entries.into_iter().collect())
    }

    fn with_field(&self, name: &str, value: impl Into<Self>) -> Self {
        let fields = match self {
            PersistentNode::Map(map) => map.clone(),
            _ => OrdMap::new(),
        };
        PersistentNode::Map(fields.update(name.to_string(), value.into()))
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (PersistentNode::Scalar(a), PersistentNode::Scalar(b)) => a == b,
            (PersistentNode::Map(a), PersistentNode::Map(b)) => a.ptr_eq(b),
            // Inline vectors own no allocation, so pointer comparison says
            // nothing about them; fall back to comparing their elements.
            (PersistentNode::List(a), PersistentNode::List(b)) => {
                if a.is_inline() {
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same(y))
                } else {
                    a.ptr_eq(b)
                }
            }
            _ => false,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            PersistentNode::Scalar(scalar) => scalar.to_json(),
            PersistentNode::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            PersistentNode::List(list) => {
                serde_json::Value::Array(list.iter().map(TreeNode::to_json).collect())
            }
        }
    }
}

impl From<serde_json::Value> for PersistentNode {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                PersistentNode::List(items.into_iter().map(PersistentNode::from).collect())
            }
            serde_json::Value::Object(fields) => PersistentNode::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, PersistentNode::from(value)))
                    .collect(),
            ),
            leaf => PersistentNode::Scalar(Scalar::from_json(&leaf).unwrap_or(Scalar::Null)),
        }
    }
}

/// Driver over a structurally shared persistent tree.
///
/// Gives the same history guarantees as [`crate::CowDriver`]: each write
/// installs a new root and leaves previous roots intact.
#[derive(Debug, Clone)]
pub struct PersistentDriver {
    root: PersistentNode,
    registry: EntityRegistry,
}

impl PersistentDriver {
    #[must_use]
    pub fn new(root: PersistentNode) -> Self {
        Self {
            root,
            registry: EntityRegistry::new(),
        }
    }

    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::new(PersistentNode::from(value))
    }

    /// A driver whose entities are served from `registry`.
    #[must_use]
    pub fn with_registry(root: PersistentNode, registry: EntityRegistry) -> Self {
        Self { root, registry }
    }
}

impl TreeDriver for PersistentDriver {
    type Node = PersistentNode;

    fn tree(&self) -> PersistentNode {
        self.root.clone()
    }

    fn update_in_path_with<F>(&mut self, path: &Path, updater: F) -> DriverResult<PersistentNode>
    where
        F: FnOnce(Option<&PersistentNode>) -> PersistentNode,
    {
        self.root = PersistentNode::rebuild(Some(&self.root), path, 0, updater)?;
        debug!("Persistent update at {}", path);
        Ok(self.tree())
    }

    fn delete_in_path(&mut self, path: &Path) -> DriverResult<PersistentNode> {
        let (Some(parent_path), Some(last)) = (path.parent(), path.last()) else {
            return Ok(self.tree());
        };
        if self.get_in_path(path).is_none() {
            return Ok(self.tree());
        }

        let last = last.clone();
        self.root = PersistentNode::rebuild(Some(&self.root), &parent_path, 0, |parent| {
            parent.map_or_else(|| PersistentNode::empty(NodeKind::Map), |p| p.without(&last))
        })?;
        self.registry.forget(path);
        debug!("Persistent delete at {}", path);
        Ok(self.tree())
    }

    fn add_in_path(&mut self, path: &Path, entity: PersistentNode) -> DriverResult<PersistentNode> {
        let mut list = match self.get_in_path(path) {
            Some(PersistentNode::List(list)) => list,
            Some(_) => return Err(DriverError::NotAList { path: path.clone() }),
            None => Vector::new(),
        };
        list.push_back(entity);
        let index = list.len() - 1;

        self.update_in_path_with(path, |_| PersistentNode::List(list))?;
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
