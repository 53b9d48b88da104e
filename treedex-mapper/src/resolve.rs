//! Selector resolution against a table index.

use crate::{MapperError, MapperResult};
use std::collections::HashSet;
use treedex_index::Index;
use treedex_types::{Path, Selector};

/// Paths of the entities of `table` matched by `selector`.
///
/// Each field contributes the paths filed under its value; the result is
/// their union in selector order, with each path listed once. An empty
/// selector matches nothing.
pub(crate) fn paths_for(
    index: &Index,
    table: &str,
    selector: &Selector,
    index_keys: &[String],
) -> MapperResult<Vec<Path>> {
    let table_index = index.table(table).ok_or_else(|| MapperError::TableNotFound {
        table: table.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for (field, value) in selector.iter() {
        if !table_index.is_indexed(field) {
            return Err(MapperError::FieldNotIndexed {
                table: table.to_string(),
                field: field.to_string(),
                indexed: index_keys.to_vec(),
            });
        }
        for path in table_index.paths(field, value) {
            if seen.insert(path) {
                paths.push(path.clone());
            }
        }
    }
    Ok(paths)
}
