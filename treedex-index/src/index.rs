use crate::{IndexError, IndexResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use treedex_driver::TreeNode;
use treedex_types::{FieldValue, Path};

/// The indexes of a single table: `field → value → paths`.
///
/// Every indexed field has an entry, even when no entity carries it, so an
/// empty table still knows which fields may be queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TableIndex {
    fields: BTreeMap<String, HashMap<FieldValue, Vec<Path>>>,
}

impl TableIndex {
    /// An index with an empty bucket map for each of `fields`.
    #[must_use]
    pub fn new(fields: &[String]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|field| (field.clone(), HashMap::new()))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_indexed(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Names of the indexed fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Paths filed under `field == value`. Empty when nothing matches or the
    /// field is not indexed.
    #[must_use]
    pub fn paths(&self, field: &str, value: &FieldValue) -> &[Path] {
        self.fields
            .get(field)
            .and_then(|values| values.get(value))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every `(field, value, path)` triple in the index.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue, &Path)> {
        self.fields.iter().flat_map(|(field, values)| {
            values.iter().flat_map(move |(value, paths)| {
                paths.iter().map(move |path| (field.as_str(), value, path))
            })
        })
    }

    /// Appends `path` to a bucket. Returns the bucket's length before the push.
    pub(crate) fn file(&mut self, field: &str, value: FieldValue, path: Path) -> usize {
        let bucket = self
            .fields
            .entry(field.to_string())
            .or_default()
            .entry(value)
            .or_default();
        let before = bucket.len();
        bucket.push(path);
        before
    }

    fn unfile(&mut self, field: &str, value: &FieldValue, path: &Path) {
        let Some(values) = self.fields.get_mut(field) else {
            return;
        };
        if let Some(bucket) = values.get_mut(value) {
            bucket.retain(|filed| filed != path);
            if bucket.is_empty() {
                values.remove(value);
            }
        }
    }
}

/// Indexes of every table, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Index {
    tables: BTreeMap<String, TableIndex>,
}

impl Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableIndex> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableIndex)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Installs the index of one table, replacing any previous one.
    pub fn merge_table(&mut self, name: impl Into<String>, table: TableIndex) {
        self.tables.insert(name.into(), table);
    }

    /// Checks that `entity` could be filed into `table`: it has a primary key
    /// and no entity of the table already uses it. Returns the `(field,
    /// value)` pairs it would be filed under.
    pub fn check_entity<N: TreeNode>(
        &self,
        table: &str,
        entity: &N,
        index_keys: &[String],
        primary_key: &str,
    ) -> IndexResult<Vec<(String, FieldValue)>> {
        let values = crate::builder::indexed_values(table, entity, index_keys, primary_key)?;
        let Some(table_index) = self.tables.get(table) else {
            return Ok(values);
        };
        if let Some((_, key)) = values.iter().find(|(field, _)| field == primary_key) {
            if !table_index.paths(primary_key, key).is_empty() {
                return Err(IndexError::DuplicatePrimaryKey {
                    table: table.to_string(),
                    field: primary_key.to_string(),
                    value: key.clone(),
                });
            }
        }
        Ok(values)
    }

    /// Files a new entity stored at `path`.
    ///
    /// Every check runs before anything is filed, so on error the index is
    /// unchanged.
    pub fn insert_entity<N: TreeNode>(
        &mut self,
        table: &str,
        path: Path,
        entity: &N,
        index_keys: &[String],
        primary_key: &str,
    ) -> IndexResult<()> {
        let values = self.check_entity(table, entity, index_keys, primary_key)?;

        let table_index = self
            .tables
            .entry(table.to_string())
            .or_insert_with(|| TableIndex::new(index_keys));
        for (field, value) in values {
            table_index.file(&field, value, path.clone());
        }
        debug!("Indexed new entity of '{}' at {}", table, path);
        Ok(())
    }

    /// Moves the entity at `path` between buckets after its fields changed
    /// from `old` to `new`. The primary key is left alone; callers reject
    /// primary key changes before writing.
    pub fn reindex_entity<N: TreeNode>(
        &mut self,
        table: &str,
        path: &Path,
        old: &N,
        new: &N,
        index_keys: &[String],
        primary_key: &str,
    ) {
        let Some(table_index) = self.tables.get_mut(table) else {
            return;
        };
        for field in index_keys.iter().filter(|field| *field != primary_key) {
            let before = old.field_value(field);
            let after = new.field_value(field);
            if before == after {
                continue;
            }
            if let Some(value) = &before {
                table_index.unfile(field, value, path);
            }
            if let Some(value) = after {
                table_index.file(field, value, path.clone());
            }
        }
    }
}
