use crate::callable::{Computation, Predicate};
use crate::entity::Entity;
use crate::error::{ConfigError, ConfigResult, ProjectionError, ProjectionResult};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Weak};

/// How a rule obtains its raw value.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Read the rule's `key` from the input record.
    None,
    /// Invoke a computation with `(record, options)`.
    Computed(Computation),
    /// Always use a fixed value.
    Literal(Value),
}

/// One canonical exposure directive, produced by compiling a declaration.
///
/// Rules are immutable once compiled. They can be inspected through
/// [`Entity::rules`] but never edited or removed.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) key: String,
    pub(crate) alias: String,
    pub(crate) mode: Mode,
    pub(crate) default: Option<Value>,
    pub(crate) condition: Option<Predicate>,
    pub(crate) merge: bool,
    pub(crate) require: bool,
    pub(crate) using: Option<EntityRef>,
}

impl Rule {
    /// Source field read from the input record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Output field written to (the `as` option). Equals `key` unless aliased.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Fallback used when the resolved value is absent.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Guard deciding whether the rule applies.
    #[must_use]
    pub fn condition(&self) -> Option<&Predicate> {
        self.condition.as_ref()
    }

    /// Whether the value is merged into the output instead of assigned.
    #[must_use]
    pub fn merges(&self) -> bool {
        self.merge
    }

    /// Whether the declaration carried `require`. Recorded for introspection;
    /// projection treats an absent value the same either way.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.require
    }

    /// Entity the value is projected through before placement.
    #[must_use]
    pub fn using(&self) -> Option<&EntityRef> {
        self.using.as_ref()
    }
}

/// A link from a rule to the entity its value is projected through.
///
/// `Shared` keeps the target alive. `Cyclic` does not; it exists so an
/// entity can refer to itself (see [`Entity::cyclic`]) without leaking.
#[derive(Clone)]
pub enum EntityRef {
    Shared(Arc<Entity>),
    Cyclic(Weak<Entity>),
}

impl EntityRef {
    pub(crate) fn resolve(&self, field: &str) -> ProjectionResult<Arc<Entity>> {
        match self {
            Self::Shared(entity) => Ok(Arc::clone(entity)),
            Self::Cyclic(weak) => weak.upgrade().ok_or_else(|| ProjectionError::DanglingEntity {
                field: field.to_owned(),
            }),
        }
    }
}

impl fmt::Debug for EntityRef {
    // Never print the target's rules: a cyclic link would recurse forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared(entity) => write!(f, "EntityRef::Shared({} rules)", entity.len()),
            Self::Cyclic(_) => f.write_str("EntityRef::Cyclic"),
        }
    }
}

impl From<Arc<Entity>> for EntityRef {
    fn from(entity: Arc<Entity>) -> Self {
        Self::Shared(entity)
    }
}

impl From<&Arc<Entity>> for EntityRef {
    fn from(entity: &Arc<Entity>) -> Self {
        Self::Shared(Arc::clone(entity))
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self::Shared(Arc::new(entity))
    }
}

impl From<Weak<Entity>> for EntityRef {
    fn from(entity: Weak<Entity>) -> Self {
        Self::Cyclic(entity)
    }
}

impl From<&Weak<Entity>> for EntityRef {
    fn from(entity: &Weak<Entity>) -> Self {
        Self::Cyclic(Weak::clone(entity))
    }
}

/// What an option bag's `value` holds.
#[derive(Debug, Clone)]
pub enum RuleValue {
    Computed(Computation),
    Literal(Value),
}

/// The recognized option set of a declaration: `as`, `key`, `default`,
/// `if`, `merge`, `require`, `using` and `value`.
///
/// Built with chained setters:
///
/// ```
/// use vitrine_entity::RuleOptions;
/// use serde_json::json;
///
/// let opts = RuleOptions::new().alias("display_name").default_value(json!("anonymous"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    pub(crate) key: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) condition: Option<Predicate>,
    pub(crate) merge: bool,
    pub(crate) require: bool,
    pub(crate) using: Option<EntityRef>,
    pub(crate) value: Option<RuleValue>,
}

impl RuleOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source field to read, overriding the declaration's name.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Output field name (the `as` option).
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Fallback used when the resolved value is absent (the `default` option).
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Only apply the rule when `predicate` holds (the `if` option).
    #[must_use]
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.condition = Some(predicate);
        self
    }

    /// Shorthand for `when(Predicate::new(f))`.
    #[must_use]
    pub fn when_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &crate::Options) -> bool + Send + Sync + 'static,
    {
        self.when(Predicate::new(f))
    }

    #[must_use]
    pub fn merge(mut self) -> Self {
        self.merge = true;
        self
    }

    #[must_use]
    pub fn require(mut self) -> Self {
        self.require = true;
        self
    }

    /// Project the value through `entity` before placement.
    #[must_use]
    pub fn using(mut self, entity: impl Into<EntityRef>) -> Self {
        self.using = Some(entity.into());
        self
    }

    /// Always use `value`, ignoring the record.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(RuleValue::Literal(value.into()));
        self
    }

    /// Compute the value from the record.
    #[must_use]
    pub fn compute(mut self, computation: Computation) -> Self {
        self.value = Some(RuleValue::Computed(computation));
        self
    }

    /// Shorthand for `compute(Computation::new(f))`.
    #[must_use]
    pub fn compute_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &crate::Options) -> Value + Send + Sync + 'static,
    {
        self.compute(Computation::new(f))
    }

    /// Builds options from a raw JSON bag.
    ///
    /// Only the recognized options are read; anything else is dropped.
    /// JSON cannot carry a predicate or an entity, so a bag with `if` or
    /// `using` is rejected. Callers that resolve those by name (see
    /// `vitrine-config`) remove them from the bag first.
    pub fn from_json(field: &str, bag: &Map<String, Value>) -> ConfigResult<Self> {
        if bag.contains_key("if") {
            return Err(ConfigError::IfNotCallable {
                field: field.to_owned(),
            });
        }
        if bag.contains_key("using") {
            return Err(ConfigError::UsingNotEntity {
                field: field.to_owned(),
            });
        }

        Ok(Self {
            key: string_option(field, bag, "key")?,
            alias: string_option(field, bag, "as")?,
            default: bag.get("default").cloned(),
            condition: None,
            merge: bool_option(field, bag, "merge")?,
            require: bool_option(field, bag, "require")?,
            using: None,
            value: bag.get("value").cloned().map(RuleValue::Literal),
        })
    }
}

fn string_option(
    field: &str,
    bag: &Map<String, Value>,
    option: &'static str,
) -> ConfigResult<Option<String>> {
    match bag.get(option) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::InvalidOption {
            field: field.to_owned(),
            option,
            expected: "a string",
        }),
    }
}

fn bool_option(field: &str, bag: &Map<String, Value>, option: &'static str) -> ConfigResult<bool> {
    match bag.get(option) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ConfigError::InvalidOption {
            field: field.to_owned(),
            option,
            expected: "a boolean",
        }),
    }
}
