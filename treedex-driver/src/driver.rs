use crate::{DriverResult, EntityMap, EntityRegistry, TreeNode};
use tracing::debug;
use treedex_types::Path;

/// Owns a tree root and performs every read and write on it.
///
/// Write methods return the root as it is after the write. For the mutable
/// driver that is always the same handle; for the copy-on-write and
/// persistent drivers it is a new root whenever something changed.
pub trait TreeDriver {
    type Node: TreeNode;

    /// The current root. A handle, not a copy.
    fn tree(&self) -> Self::Node;

    /// The node at `path`, or `None` when nothing is there. Never fails.
    fn get_in_path(&self, path: &Path) -> Option<Self::Node> {
        self.tree().get_in(path)
    }

    /// Replaces the node at `path` with `updater(current)`.
    ///
    /// Missing containers along the way are created: a map for a key
    /// segment, a list for an index segment.
    fn update_in_path_with<F>(&mut self, path: &Path, updater: F) -> DriverResult<Self::Node>
    where
        F: FnOnce(Option<&Self::Node>) -> Self::Node;

    /// Writes `value` at `path`.
    fn update_in_path(&mut self, path: &Path, value: Self::Node) -> DriverResult<Self::Node> {
        self.update_in_path_with(path, |_| value)
    }

    /// Removes the node at `path`. A no-op when nothing is there.
    fn delete_in_path(&mut self, path: &Path) -> DriverResult<Self::Node>;

    /// Appends `entity` to the list at `path`, creating the list if needed.
    fn add_in_path(&mut self, path: &Path, entity: Self::Node) -> DriverResult<Self::Node>;

    fn registry(&self) -> &EntityRegistry;

    fn registry_mut(&mut self) -> &mut EntityRegistry;

    /// Records an entity of `table` stored at `path`.
    fn register_entity(&mut self, table: &str, path: Path) {
        debug!("Registering entity of table '{}' at {}", table, path);
        self.registry_mut().register(table, path);
    }

    /// Registered entities resolved against the current root, or `None` when
    /// nothing was registered and tables should be scanned directly.
    fn entity_map(&self) -> Option<EntityMap<Self::Node>> {
        let registry = self.registry();
        if registry.is_empty() {
            None
        } else {
            Some(registry.resolve(&self.tree()))
        }
    }

    /// Shapes a result sequence as this driver's native list.
    fn as_array(&self, items: Vec<Self::Node>) -> Self::Node {
        Self::Node::list(items)
    }
}
