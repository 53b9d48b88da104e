//! Core type definitions for treedex.
//!
//! This crate defines the plain value types shared by every other crate in
//! the workspace:
//! - [`Path`] and [`Segment`]: locations of nodes inside a tree
//! - [`Scalar`]: leaf values stored in a tree
//! - [`FieldValue`]: the key type entities are indexed under
//! - [`Selector`] and [`Query`]: field/value lookups against an index
//!
//! None of these types know anything about how a tree is stored; that is the
//! job of the drivers in `treedex-driver`.

mod path;
mod scalar;
mod selector;

pub use path::{Path, Segment};
pub use scalar::{FieldValue, Scalar};
pub use selector::{Query, Selector};
