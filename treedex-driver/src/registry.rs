//! Registered entity locations.
//!
//! Some trees keep entities somewhere other than directly in a top-level
//! list, e.g. children nested inside a parent entity. A driver records those
//! locations in an [`EntityRegistry`]; the index builder then reads entities
//! from the registry instead of scanning the table.

use crate::TreeNode;
use std::collections::BTreeMap;
use treedex_types::{Path, Segment};

/// An entity together with the path it was found at.
#[derive(Debug, Clone)]
pub struct EntityRecord<N> {
    pub path: Path,
    pub entity: N,
}

/// Registered entities resolved against a tree, grouped by table.
pub type EntityMap<N> = BTreeMap<String, Vec<EntityRecord<N>>>;

/// Per-table list of registered entity paths.
///
/// Paths are kept valid across driver writes: deleting a node forgets every
/// registration at or below it, and deleting a list element shifts the
/// registrations of its later siblings down by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRegistry {
    tables: BTreeMap<String, Vec<Path>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as an entity of `table`. Re-registering is a no-op.
    pub fn register(&mut self, table: impl Into<String>, path: Path) {
        let paths = self.tables.entry(table.into()).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    #[must_use]
    pub fn paths(&self, table: &str) -> Option<&[Path]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Resolves every registered path against `root`. Paths that no longer
    /// lead anywhere are skipped.
    pub fn resolve<N: TreeNode>(&self, root: &N) -> EntityMap<N> {
        self.tables
            .iter()
            .map(|(table, paths)| {
                let records = paths
                    .iter()
                    .filter_map(|path| {
                        root.get_in(path).map(|entity| EntityRecord {
                            path: path.clone(),
                            entity,
                        })
                    })
                    .collect();
                (table.clone(), records)
            })
            .collect()
    }

    /// Updates registrations after the node at `deleted` was removed.
    pub(crate) fn forget(&mut self, deleted: &Path) {
        let shifted = match (deleted.parent(), deleted.last()) {
            (Some(parent), Some(Segment::Index(removed))) => Some((parent, *removed)),
            _ => None,
        };

        for paths in self.tables.values_mut() {
            paths.retain(|path| !path.starts_with(deleted));

            let Some((parent, removed)) = &shifted else {
                continue;
            };
            let depth = parent.len();
            for path in paths.iter_mut() {
                if !path.starts_with(parent) {
                    continue;
                }
                if let Some(Segment::Index(position)) = path.segment_mut(depth) {
                    if *position > *removed {
                        *position -= 1;
                    }
                }
            }
        }
    }

    /// Registers the element appended at `list.index` when the list's table
    /// is tracked.
    pub(crate) fn appended(&mut self, list: &Path, index: usize) {
        let Some(table) = list.table_name() else {
            return;
        };
        if let Some(paths) = self.tables.get_mut(table) {
            paths.push(list.join(index));
        }
    }
}
