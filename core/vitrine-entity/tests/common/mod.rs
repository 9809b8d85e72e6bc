//! Shared test helpers for entity tests.

#![allow(dead_code)]

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use vitrine_entity::{Declarations, Entity};

/// Installs a test-writer subscriber once; set `RUST_LOG=vitrine_entity=trace` to see rule traces.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compiles a single declaration mapping, panicking on configuration errors.
pub fn entity(declarations: Declarations) -> Entity {
    Entity::new([declarations]).expect("declarations should compile")
}

/// Output keys of a projected record, in order.
pub fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .expect("projection of a record is an object")
        .keys()
        .map(String::as_str)
        .collect()
}

/// Reads a string field, empty when missing.
pub fn text<'a>(record: &'a Value, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or_default()
}
