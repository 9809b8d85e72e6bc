//! Declarative rule-set definitions for Vitrine.
//!
//! Entities can be declared as JSON instead of code. Predicates,
//! computations and nested entities are referenced by name and resolved
//! against a [`Registry`]:
//!
//! ```
//! use vitrine_config::Registry;
//! use vitrine_entity::{Options, Predicate};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_predicate("is_admin", Predicate::new(|_, o| o.contains_key("admin")))
//!     .unwrap();
//! registry
//!     .load_json(r#"{
//!         "Address": { "expose": { "city": true } },
//!         "User": {
//!             "expose": {
//!                 "id": true,
//!                 "email": { "if": "is_admin" },
//!                 "address": { "using": "Address" }
//!             }
//!         }
//!     }"#)
//!     .unwrap();
//!
//! let out = registry
//!     .represent("User", &json!({"id": 1, "email": "e", "address": {"city": "SF", "zip": 1}}), &Options::new())
//!     .unwrap();
//! assert_eq!(out, json!({"id": 1, "address": {"city": "SF"}}));
//! ```

mod definition;
mod error;
mod registry;

pub use error::{DefinitionError, DefinitionResult};
pub use registry::Registry;
