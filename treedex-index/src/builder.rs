//! Building table indexes from entity records.

use crate::{IndexError, IndexResult, TableIndex};
use tracing::{debug, warn};
use treedex_driver::{EntityRecord, TreeDriver, TreeNode};
use treedex_types::{FieldValue, Path};

/// Appends `primary_key` to `index_keys` unless already present.
pub fn ensure_primary_key(index_keys: &mut Vec<String>, primary_key: &str) {
    if !index_keys.iter().any(|key| key == primary_key) {
        index_keys.push(primary_key.to_string());
    }
}

/// The entity records of `table`.
///
/// Registered entities come from the driver's entity map. Otherwise the
/// table's list is scanned and each element is recorded at `[table, i]`.
pub fn table_records<D: TreeDriver>(driver: &D, table: &str) -> Vec<EntityRecord<D::Node>> {
    if let Some(mut map) = driver.entity_map() {
        if let Some(records) = map.remove(table) {
            return records;
        }
    }

    let Some(node) = driver.get_in_path(&Path::table(table)) else {
        return Vec::new();
    };
    if !node.is_list() {
        warn!("Table '{}' is not a list; indexing it as empty", table);
        return Vec::new();
    }

    node.items()
        .into_iter()
        .enumerate()
        .map(|(i, entity)| EntityRecord {
            path: Path::table(table).index(i),
            entity,
        })
        .collect()
}

/// Builds the index of one table.
///
/// Records are filed in order. Fails on the first entity without a primary
/// key, or the first entity repeating an earlier primary key.
pub fn build_table_index<N: TreeNode>(
    table: &str,
    records: &[EntityRecord<N>],
    index_keys: &[String],
    primary_key: &str,
) -> IndexResult<TableIndex> {
    let mut keys = index_keys.to_vec();
    ensure_primary_key(&mut keys, primary_key);

    let mut table_index = TableIndex::new(&keys);
    for record in records {
        for (field, value) in indexed_values(table, &record.entity, &keys, primary_key)? {
            let is_primary = field == primary_key;
            let filed_before = table_index.file(&field, value.clone(), record.path.clone());
            if is_primary && filed_before > 0 {
                return Err(IndexError::DuplicatePrimaryKey {
                    table: table.to_string(),
                    field,
                    value,
                });
            }
        }
    }

    debug!("Built index for table '{}' over {} entities", table, records.len());
    Ok(table_index)
}

/// The `(field, value)` pairs an entity is filed under.
///
/// A missing, null, empty or non-scalar primary key is an error; other
/// fields without a scalar value are simply not indexed.
pub(crate) fn indexed_values<N: TreeNode>(
    table: &str,
    entity: &N,
    index_keys: &[String],
    primary_key: &str,
) -> IndexResult<Vec<(String, FieldValue)>> {
    let mut values = Vec::with_capacity(index_keys.len());
    for field in index_keys {
        match entity.field_value(field) {
            Some(value) if field == primary_key && value.is_empty() => {
                return Err(missing_primary_key(table, primary_key));
            }
            Some(value) => values.push((field.clone(), value)),
            None if field == primary_key => {
                return Err(missing_primary_key(table, primary_key));
            }
            None => {
                if entity.field(field).is_some_and(|node| !node.is_scalar()) {
                    warn!("Field '{}' of an entity in '{}' is not a scalar; not indexed", field, table);
                }
            }
        }
    }
    Ok(values)
}

fn missing_primary_key(table: &str, primary_key: &str) -> IndexError {
    IndexError::MissingPrimaryKey {
        table: table.to_string(),
        field: primary_key.to_string(),
    }
}
