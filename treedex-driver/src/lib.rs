//! Tree drivers for treedex.
//!
//! A driver owns the root of a nested, table-shaped tree and performs every
//! read and write on it. Three variants are provided, differing only in what
//! happens to node identity on a write:
//!
//! - [`MutableDriver`]: writes in place. The root and every container keep
//!   their identity, and handles held by callers observe later writes.
//! - [`CowDriver`]: clones each ancestor along the written path. Every write
//!   yields a new root; untouched subtrees are shared with the previous root.
//! - [`PersistentDriver`]: like [`CowDriver`], but containers are `imbl`
//!   persistent collections, so even wide lists and maps share structure.
//!
//! Only the mutable variant hands out live views. Handles obtained from the
//! other two are snapshots and can be held indefinitely.

#[macro_use]
mod node;
mod cow;
mod driver;
mod error;
mod mutable;
mod persistent;
mod registry;

pub use cow::{CowDriver, CowNode};
pub use driver::TreeDriver;
pub use error::{DriverError, DriverResult};
pub use mutable::{MutableDriver, MutableNode};
pub use node::{NodeKind, TreeNode};
pub use persistent::{PersistentDriver, PersistentNode};
pub use registry::{EntityMap, EntityRecord, EntityRegistry};
