//! Declarative object projection for Vitrine.
//!
//! An [`Entity`] holds an ordered whitelist of [`Rule`]s. Projecting a record
//! through it builds a new record containing only the exposed fields:
//! - [`Declarations`] / [`RuleInput`] — how properties are declared
//!   (`true`, `false`, a [`Computation`], or [`RuleOptions`])
//! - [`Entity::represent`] — applies the rules: guards, aliasing, defaults,
//!   nested projection through other entities, and merging
//! - [`ConfigError`] / [`ProjectionError`] — compile-time and projection-time failures
//!
//! Records are [`serde_json::Value`]s. A missing field is *absent*, which is
//! not the same as `null`.

mod callable;
mod compiler;
mod declaration;
mod entity;
mod error;
mod projector;
mod rule;
pub mod value;

pub use callable::{Computation, Predicate};
pub use declaration::{Declarations, RuleInput};
pub use entity::Entity;
pub use error::{ConfigError, ConfigResult, ProjectionError, ProjectionResult};
pub use rule::{EntityRef, Mode, Rule, RuleOptions, RuleValue};
pub use value::Options;
