//! Indexed tree mapper.
//!
//! [`IndexedTreeMapper`] gives primary-key and secondary-key access to the
//! tables of a nested tree while a [`TreeDriver`] performs the actual reads
//! and writes. The mapper owns an [`Index`] of `table → field → value →
//! paths` and keeps it in step with every write it makes.
//!
//! ```
//! use serde_json::json;
//! use treedex_mapper::{create_mapper, MutableDriver, TreeNode};
//!
//! let driver = MutableDriver::from_json(json!({
//!     "people": [{"id": 1, "name": "vojta"}, {"id": 2, "name": "honza"}]
//! }));
//! let mut mapper = create_mapper(driver, vec!["name".into()], None, "id")?;
//!
//! mapper.update_with("people", 1, |p| p.with_field("name", "x"))?;
//! let person = mapper.get_first_by("people", treedex_mapper::Selector::by("name", "x"))?;
//! assert_eq!(person.unwrap().field_value("id"), Some(1.into()));
//! # Ok::<(), treedex_mapper::MapperError>(())
//! ```

mod config;
mod error;
mod mapper;
mod resolve;

pub use config::MapperConfig;
pub use error::{MapperError, MapperResult};
pub use mapper::{create_mapper, IndexedTreeMapper};

pub use treedex_driver::{
    CowDriver, CowNode, EntityRegistry, MutableDriver, MutableNode, PersistentDriver,
    PersistentNode, TreeDriver, TreeNode,
};
pub use treedex_index::{Index, TableIndex};
pub use treedex_types::{FieldValue, Path, Query, Scalar, Segment, Selector};
