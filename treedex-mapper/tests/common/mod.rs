//! Shared test helpers for mapper tests.

#![allow(dead_code)]

use serde_json::json;
use treedex_mapper::{
    create_mapper, CowDriver, IndexedTreeMapper, MutableDriver, PersistentDriver,
};

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sample_tree() -> serde_json::Value {
    json!({
        "todos": [
            {"id": 12, "text": "a"},
            {"id": 32, "text": "b"}
        ],
        "people": [
            {"id": 1, "name": "vojta"},
            {"id": 2, "name": "honza"}
        ]
    })
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

pub fn mutable_mapper() -> IndexedTreeMapper<MutableDriver> {
    init_tracing();
    create_mapper(MutableDriver::from_json(sample_tree()), keys(&["name"]), None, "id").unwrap()
}

pub fn cow_mapper() -> IndexedTreeMapper<CowDriver> {
    init_tracing();
    create_mapper(CowDriver::from_json(sample_tree()), keys(&["name"]), None, "id").unwrap()
}

pub fn persistent_mapper() -> IndexedTreeMapper<PersistentDriver> {
    init_tracing();
    create_mapper(PersistentDriver::from_json(sample_tree()), keys(&["name"]), None, "id").unwrap()
}
