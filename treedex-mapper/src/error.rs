//! Error types for mapper operations.

use thiserror::Error;
use treedex_driver::DriverError;
use treedex_index::IndexError;
use treedex_types::FieldValue;

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors returned by [`crate::IndexedTreeMapper`].
///
/// Nothing is retried or recovered internally. Batch updates are not
/// transactional: entities written before an error stay written.
#[derive(Debug, Error)]
pub enum MapperError {
    /// A query named a table the mapper has no index for.
    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },

    /// A selector used a field that is not indexed.
    #[error(
        "table '{table}' is not indexed by '{field}'; use one of: {}",
        indexed.join(", ")
    )]
    FieldNotIndexed {
        table: String,
        field: String,
        indexed: Vec<String>,
    },

    /// An entity has no usable primary key value.
    #[error("entity in table '{table}' has no value for primary key '{field}'")]
    MissingPrimaryKey { table: String, field: String },

    /// A primary key value is already taken in the table.
    #[error("duplicate primary key '{value}' for '{field}' in table '{table}'")]
    DuplicatePrimaryKey {
        table: String,
        field: String,
        value: FieldValue,
    },

    /// An update tried to change an entity's primary key.
    #[error(
        "cannot change primary key '{field}' in table '{table}' from '{}' to '{}'",
        shown(from),
        shown(to)
    )]
    PrimaryKeyMutation {
        table: String,
        field: String,
        from: Option<FieldValue>,
        to: Option<FieldValue>,
    },

    /// The driver rejected a write.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A configuration could not be parsed.
    #[error("invalid mapper configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<IndexError> for MapperError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::MissingPrimaryKey { table, field } => {
                MapperError::MissingPrimaryKey { table, field }
            }
            IndexError::DuplicatePrimaryKey {
                table,
                field,
                value,
            } => MapperError::DuplicatePrimaryKey {
                table,
                field,
                value,
            },
        }
    }
}

fn shown(value: &Option<FieldValue>) -> String {
    value
        .as_ref()
        .map_or_else(|| "<none>".to_string(), ToString::to_string)
}
