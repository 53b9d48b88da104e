//! Shared test helpers for driver tests.

#![allow(dead_code)]

use serde_json::json;

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The todos/people tree used throughout the driver tests.
pub fn sample_tree() -> serde_json::Value {
    json!({
        "todos": [
            {"id": 12, "text": "Todo num 12"},
            {"id": 32, "text": "Todo num 32"},
            {"id": 84, "text": "Todo num 84"}
        ],
        "people": [
            {"id": 1, "name": "vojta"},
            {"id": 2, "name": "honza"}
        ]
    })
}
