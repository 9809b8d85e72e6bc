//! Structural predicates over JSON values.

use serde_json::{Map, Value};

/// Free-form options forwarded to every predicate, computation and nested
/// projection. The engine never inspects it.
pub type Options = Map<String, Value>;

/// Returns `true` if `value` is a sequence (JSON array).
#[must_use]
pub fn is_sequence(value: &Value) -> bool {
    value.is_array()
}

/// Returns `true` if `value` is a structured record (JSON object).
#[must_use]
pub fn is_record(value: &Value) -> bool {
    value.is_object()
}

/// Reads `key` from a record. Non-records have no fields.
pub(crate) fn field<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.as_object().and_then(|fields| fields.get(key))
}
