use crate::compiler::{self, RuleList};
use crate::declaration::{Declarations, RuleInput};
use crate::error::{ConfigResult, ProjectionResult};
use crate::projector;
use crate::rule::Rule;
use crate::value::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::debug;

/// A compiled, reusable whitelist of output rules for a class of records.
///
/// Projection only ever produces fields named by a rule. Rules are
/// appended by [`Entity::new`], [`Entity::extend`] and [`Entity::expose`];
/// nothing removes them.
///
/// ```
/// use vitrine_entity::{Declarations, Entity, RuleInput};
/// use serde_json::json;
///
/// let user = Entity::new([Declarations::new()
///     .with("id", true)
///     .with("name", RuleInput::computed(|r, _| {
///         json!(format!("{} {}", r["first"].as_str().unwrap_or(""), r["last"].as_str().unwrap_or("")))
///     }))])
///     .unwrap();
///
/// let out = user.represent(&json!({"id": 1, "first": "A", "last": "B", "password": "x"})).unwrap();
/// assert_eq!(out, json!({"id": 1, "name": "A B"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Entity {
    rules: RuleList,
}

impl Entity {
    /// An entity with no rules. Projects every record to `{}`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles `declarations` in argument order.
    pub fn new<I>(declarations: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = Declarations>,
    {
        let mut entity = Self::empty();
        entity.compile_all(declarations)?;
        debug!(rules = entity.len(), "Compiled entity");
        Ok(entity)
    }

    /// Builds an entity that can refer to itself through `using`.
    ///
    /// `build` receives a weak handle to the entity under construction and
    /// returns its compiled form. The handle cannot be upgraded until this
    /// function returns, so it must only be stored (via
    /// [`RuleOptions::using`](crate::RuleOptions::using)), not projected.
    pub fn cyclic<F, E>(build: F) -> Result<Arc<Self>, E>
    where
        F: FnOnce(&Weak<Self>) -> Result<Self, E>,
    {
        let mut failure: Option<E> = None;
        let entity = Arc::new_cyclic(|this| match build(this) {
            Ok(entity) => entity,
            Err(e) => {
                failure = Some(e);
                Self::empty()
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(entity),
        }
    }

    /// Returns a new entity with this entity's rules followed by the rules
    /// compiled from `declarations`. `self` is left untouched.
    pub fn extend<I>(&self, declarations: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = Declarations>,
    {
        let mut extended = self.clone();
        extended.compile_all(declarations)?;
        debug!(
            inherited = self.len(),
            rules = extended.len(),
            "Extended entity"
        );
        Ok(extended)
    }

    /// Appends the rule(s) for a single declaration.
    ///
    /// Prefer declaring everything up front with [`Entity::new`]: there is
    /// no way to take a rule back once exposed.
    pub fn expose(
        &mut self,
        field: impl Into<String>,
        input: impl Into<RuleInput>,
    ) -> ConfigResult<&mut Self> {
        self.compile_all([Declarations::new().with(field, input)])?;
        Ok(self)
    }

    // Compiles into a scratch copy so a failing declaration leaves `self`
    // exactly as it was.
    fn compile_all<I>(&mut self, declarations: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = Declarations>,
    {
        let mut rules = self.rules.clone();
        for batch in declarations {
            compiler::compile(&mut rules, batch)?;
        }
        self.rules = rules;
        Ok(())
    }

    /// Projects `data` with an empty options bag.
    pub fn represent(&self, data: &Value) -> ProjectionResult<Value> {
        self.represent_with(data, &Options::new())
    }

    /// Projects `data`, forwarding `options` to every predicate, computation
    /// and nested entity.
    ///
    /// Arrays are projected element-wise. Anything else is treated as a
    /// single record.
    pub fn represent_with(&self, data: &Value, options: &Options) -> ProjectionResult<Value> {
        projector::project(&self.rules, data, options)
    }

    /// Serializes `data` to JSON and projects it.
    pub fn represent_serialize<T>(&self, data: &T, options: &Options) -> ProjectionResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(data)?;
        self.represent_with(&value, options)
    }

    /// Serializes `data`, projects it and deserializes the result as `U`.
    pub fn represent_as<T, U>(&self, data: &T, options: &Options) -> ProjectionResult<U>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        let projected = self.represent_serialize(data, options)?;
        Ok(serde_json::from_value(projected)?)
    }

    /// The compiled rules, in evaluation order.
    pub fn rules(&self) -> impl ExactSizeIterator<Item = &Rule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.len() == 0
    }

    /// Returns `true` if `value` is an `Entity` or a shared handle to one.
    #[must_use]
    pub fn is_entity(value: &dyn Any) -> bool {
        value.is::<Entity>() || value.is::<Arc<Entity>>()
    }
}
