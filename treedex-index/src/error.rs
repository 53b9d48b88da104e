//! Error types for index construction.

use thiserror::Error;
use treedex_types::FieldValue;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while filing entities into an index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// An entity has no usable value for the primary key field.
    #[error("entity in table '{table}' has no value for primary key '{field}'")]
    MissingPrimaryKey { table: String, field: String },

    /// Two entities of one table share a primary key value.
    #[error("duplicate primary key '{value}' for '{field}' in table '{table}'")]
    DuplicatePrimaryKey {
        table: String,
        field: String,
        value: FieldValue,
    },
}
