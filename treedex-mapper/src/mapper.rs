use crate::resolve::paths_for;
use crate::{MapperConfig, MapperError, MapperResult};
use tracing::{debug, warn};
use treedex_driver::{EntityRecord, TreeDriver, TreeNode};
use treedex_index::{build_table_index, ensure_primary_key, table_records, Index, TableIndex};
use treedex_types::{FieldValue, Path, Query, Scalar, Selector};

/// Builds a mapper over `driver`.
///
/// `tables` limits indexing to the named top-level keys; `None` indexes every
/// key of the root map. The primary key is always indexed.
pub fn create_mapper<D: TreeDriver>(
    driver: D,
    index_keys: Vec<String>,
    tables: Option<Vec<String>>,
    primary_key: &str,
) -> MapperResult<IndexedTreeMapper<D>> {
    IndexedTreeMapper::with_config(
        driver,
        MapperConfig {
            index_keys,
            tables,
            primary_key: primary_key.to_string(),
        },
    )
}

/// Key-based access to the tables of a driver-managed tree.
///
/// Reads go through the index to find paths and through the driver to load
/// the nodes at those paths. Every write made through the mapper updates the
/// index as well, so lookups always reflect the current tree.
#[derive(Debug)]
pub struct IndexedTreeMapper<D: TreeDriver> {
    driver: D,
    index: Index,
    index_keys: Vec<String>,
    primary_key: String,
}

impl<D: TreeDriver> IndexedTreeMapper<D> {
    /// A mapper with the default configuration: primary key `id`, no
    /// secondary keys, every top-level key a table.
    pub fn new(driver: D) -> MapperResult<Self> {
        Self::with_config(driver, MapperConfig::default())
    }

    pub fn with_config(driver: D, config: MapperConfig) -> MapperResult<Self> {
        let MapperConfig {
            mut index_keys,
            tables,
            primary_key,
        } = config;
        ensure_primary_key(&mut index_keys, &primary_key);

        let tables = tables.unwrap_or_else(|| driver.tree().keys());
        let mut mapper = Self {
            driver,
            index: Index::new(),
            index_keys,
            primary_key,
        };
        for table in &tables {
            mapper.reindex_table(table)?;
        }

        debug!(
            "Created mapper over {} tables keyed by '{}'",
            tables.len(),
            mapper.primary_key
        );
        Ok(mapper)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The table container, straight from the driver.
    pub fn get_table(&self, table: &str) -> Option<D::Node> {
        self.driver.get_in_path(&Path::table(table))
    }

    /// The entity of `table` whose primary key is `key`.
    pub fn get(&self, table: &str, key: impl Into<FieldValue>) -> MapperResult<Option<D::Node>> {
        self.get_first_by(table, Query::Key(key.into()))
    }

    /// Every entity matched by `query`, in match order.
    pub fn get_by(&self, table: &str, query: impl Into<Query>) -> MapperResult<Vec<D::Node>> {
        Ok(self
            .matches(table, query.into())?
            .into_iter()
            .map(|(_, entity)| entity)
            .collect())
    }

    pub fn get_first_by(
        &self,
        table: &str,
        query: impl Into<Query>,
    ) -> MapperResult<Option<D::Node>> {
        Ok(self
            .matches(table, query.into())?
            .into_iter()
            .next()
            .map(|(_, entity)| entity))
    }

    /// Like [`Self::get_by`], shaped as the driver's native list.
    pub fn get_by_as_array(&self, table: &str, query: impl Into<Query>) -> MapperResult<D::Node> {
        let entities = self.get_by(table, query)?;
        Ok(self.driver.as_array(entities))
    }

    /// Paths of the entities matched by `query`.
    pub fn paths_by_selector(&self, table: &str, query: impl Into<Query>) -> MapperResult<Vec<Path>> {
        let selector = self.selector(query.into());
        paths_for(&self.index, table, &selector, &self.index_keys)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Replaces every matched entity with `value`. Returns how many were
    /// written.
    pub fn update(
        &mut self,
        table: &str,
        query: impl Into<Query>,
        value: D::Node,
    ) -> MapperResult<usize> {
        self.update_with(table, query, |_| value.clone())
    }

    /// Replaces every matched entity with `updater(entity)`.
    ///
    /// An updater result with a different primary key fails with
    /// [`MapperError::PrimaryKeyMutation`] and nothing is written for that
    /// entity. Entities written before the failure stay written and indexed.
    pub fn update_with<F>(
        &mut self,
        table: &str,
        query: impl Into<Query>,
        mut updater: F,
    ) -> MapperResult<usize>
    where
        F: FnMut(&D::Node) -> D::Node,
    {
        let matches = self.matches(table, query.into())?;

        let mut written = 0;
        for (path, current) in matches {
            let next = updater(&current);

            let from = key_scalar(&current, &self.primary_key);
            let to = key_scalar(&next, &self.primary_key);
            if !same_key(from.as_ref(), to.as_ref()) {
                return Err(MapperError::PrimaryKeyMutation {
                    table: table.to_string(),
                    field: self.primary_key.clone(),
                    from: from.and_then(|key| key.field_value()),
                    to: to.and_then(|key| key.field_value()),
                });
            }

            self.driver.update_in_path(&path, next.clone())?;
            self.index
                .reindex_entity(table, &path, &current, &next, &self.index_keys, &self.primary_key);
            written += 1;
        }

        debug!("Updated {} entities of '{}'", written, table);
        Ok(written)
    }

    /// Writes `value` at `path` through the driver.
    ///
    /// The write bypasses selector matching. Afterwards every indexed table
    /// the write can reach is reindexed: the table `path` starts in, every
    /// table served from the entity registry, or all tables for a root
    /// write. When reindexing fails (say the new value repeats a primary
    /// key) the previous value is written back and the index is left as it
    /// was.
    pub fn update_in_path(&mut self, path: &Path, value: D::Node) -> MapperResult<D::Node> {
        let previous = self.driver.get_in_path(path);
        let root = self.driver.update_in_path(path, value)?;

        let rebuilt = self
            .reached_tables(path)
            .into_iter()
            .map(|table| {
                let table_index = self.table_index(&table)?;
                Ok((table, table_index))
            })
            .collect::<MapperResult<Vec<_>>>();

        match rebuilt {
            Ok(indexes) => {
                for (table, table_index) in indexes {
                    self.index.merge_table(table, table_index);
                }
                Ok(root)
            }
            Err(err) => {
                warn!("Reverting write at {}: {}", path, err);
                match previous {
                    Some(node) => self.driver.update_in_path(path, node)?,
                    None => self.driver.delete_in_path(path)?,
                };
                Err(err)
            }
        }
    }

    /// Removes every matched entity. Returns how many were removed.
    pub fn delete(&mut self, table: &str, query: impl Into<Query>) -> MapperResult<usize> {
        let mut paths = self.paths_by_selector(table, query)?;
        // Later list positions first, so earlier ones stay valid.
        paths.sort_by(|a, b| b.cmp(a));

        let driver = &mut self.driver;
        let outcome = paths
            .iter()
            .try_for_each(|path| driver.delete_in_path(path).map(drop));

        self.reindex_table(table)?;
        self.reindex_registered(table)?;
        outcome?;

        debug!("Deleted {} entities of '{}'", paths.len(), table);
        Ok(paths.len())
    }

    /// Appends `entity` to `table`, creating the table if needed.
    ///
    /// The entity is validated before the tree is touched: on error neither
    /// the tree nor the index changes. A table that exists but was never
    /// indexed gets indexed in full, its existing entities together with the
    /// new one.
    pub fn add(&mut self, table: &str, entity: D::Node) -> MapperResult<()> {
        let list = Path::table(table);
        let position = self.get_table(table).map_or(0, |node| node.len());
        let registered = self.driver.registry().contains_table(table);

        let staged = if self.index.contains_table(table) {
            self.index
                .check_entity(table, &entity, &self.index_keys, &self.primary_key)?;
            None
        } else {
            let mut records = table_records(&self.driver, table);
            records.push(EntityRecord {
                path: list.clone().index(position),
                entity: entity.clone(),
            });
            Some(build_table_index(
                table,
                &records,
                &self.index_keys,
                &self.primary_key,
            )?)
        };

        self.driver.add_in_path(&list, entity.clone())?;

        if let Some(table_index) = staged {
            self.index.merge_table(table, table_index);
        } else if registered {
            self.reindex_table(table)?;
        } else {
            self.index.insert_entity(
                table,
                list.index(position),
                &entity,
                &self.index_keys,
                &self.primary_key,
            )?;
        }

        debug!("Added entity to '{}' at position {}", table, position);
        Ok(())
    }

    // ── Tree access ──────────────────────────────────────────────

    pub fn tree(&self) -> D::Node {
        self.driver.tree()
    }

    /// A JSON snapshot of the whole tree.
    pub fn to_json(&self) -> serde_json::Value {
        self.driver.tree().to_json()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Indexed fields, primary key included.
    pub fn index_keys(&self) -> &[String] {
        &self.index_keys
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    // ── Internals ────────────────────────────────────────────────

    fn selector(&self, query: Query) -> Selector {
        query.into_selector(&self.primary_key)
    }

    fn matches(&self, table: &str, query: Query) -> MapperResult<Vec<(Path, D::Node)>> {
        let selector = self.selector(query);
        let paths = paths_for(&self.index, table, &selector, &self.index_keys)?;
        Ok(paths
            .into_iter()
            .filter_map(|path| {
                let entity = self.driver.get_in_path(&path)?;
                Some((path, entity))
            })
            .collect())
    }

    fn table_index(&self, table: &str) -> MapperResult<TableIndex> {
        let records = table_records(&self.driver, table);
        Ok(build_table_index(
            table,
            &records,
            &self.index_keys,
            &self.primary_key,
        )?)
    }

    fn reindex_table(&mut self, table: &str) -> MapperResult<()> {
        let table_index = self.table_index(table)?;
        self.index.merge_table(table, table_index);
        Ok(())
    }

    /// Indexed tables a write at `path` can change.
    fn reached_tables(&self, path: &Path) -> Vec<String> {
        let Some(first) = path.table_name() else {
            return self.index.tables().map(|(table, _)| table.to_string()).collect();
        };
        let mut tables: Vec<String> = self
            .driver
            .registry()
            .tables()
            .filter(|table| *table != first && self.index.contains_table(table))
            .map(str::to_string)
            .collect();
        if self.index.contains_table(first) {
            tables.insert(0, first.to_string());
        }
        tables
    }

    /// Rebuilds the indexed tables served from the entity registry, other
    /// than `done`. A delete may have removed entities nested in the deleted
    /// ones.
    fn reindex_registered(&mut self, done: &str) -> MapperResult<()> {
        let tables: Vec<String> = self
            .driver
            .registry()
            .tables()
            .filter(|table| *table != done && self.index.contains_table(table))
            .map(str::to_string)
            .collect();
        for table in &tables {
            self.reindex_table(table)?;
        }
        Ok(())
    }
}

/// The primary key scalar of `entity`. Null counts as absent.
fn key_scalar<N: TreeNode>(entity: &N, primary_key: &str) -> Option<Scalar> {
    entity
        .field(primary_key)
        .and_then(|node| node.as_scalar().cloned())
        .filter(|scalar| !scalar.is_null())
}

/// Strict key equality: a string never equals a number or a bool, while
/// numbers compare by value so `1` and `1.0` match.
fn same_key(from: Option<&Scalar>, to: Option<&Scalar>) -> bool {
    match (from, to) {
        (None, None) => true,
        (Some(Scalar::String(a)), Some(Scalar::String(b))) => a == b,
        (Some(Scalar::String(_)), Some(_)) | (Some(_), Some(Scalar::String(_))) => false,
        (Some(a), Some(b)) => a.field_value() == b.field_value(),
        _ => false,
    }
}
