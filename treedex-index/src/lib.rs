//! Field indexes for treedex.
//!
//! An [`Index`] maps `table → field → value → paths`. It is derived data:
//! every path filed under `(table, field, value)` points at an entity whose
//! `field` currently equals `value`. [`build_table_index`] produces the
//! index of one table from its entity records; [`Index`] keeps tables apart
//! so rebuilding one never disturbs the others.

mod builder;
mod error;
mod index;

pub use builder::{build_table_index, ensure_primary_key, table_records};
pub use error::{IndexError, IndexResult};
pub use index::{Index, TableIndex};
