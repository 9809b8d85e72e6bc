use serde::Deserialize;
use serde_json::{Map, Value};

/// `using` target that refers to the entity being defined.
pub(crate) const SELF_REFERENCE: &str = "self";

/// One entity in a definitions document.
///
/// ```json
/// {
///   "extends": "BaseUser",
///   "expose": {
///     "id": true,
///     "email": { "if": "is_admin" },
///     "friends": { "using": "self", "default": [] }
///   }
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EntityDefinition {
    #[serde(default)]
    pub extends: Option<String>,
    /// Field declarations in document order.
    #[serde(default)]
    pub expose: Map<String, Value>,
}

impl EntityDefinition {
    /// Whether any declaration projects through the entity itself.
    pub fn is_recursive(&self) -> bool {
        self.expose
            .values()
            .any(|raw| raw.get("using").and_then(Value::as_str) == Some(SELF_REFERENCE))
    }
}
