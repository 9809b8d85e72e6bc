use crate::callable::Computation;
use crate::rule::RuleOptions;
use crate::value::Options;
use serde_json::Value;

/// The shape of a single property declaration.
///
/// Decided at the call site; compiling a declaration never probes the
/// type of a stored value.
#[derive(Debug, Clone)]
pub enum RuleInput {
    /// Expose the field as-is (`true`).
    Always,
    /// Do not expose the field (`false`).
    Never,
    /// Expose the result of a computation under the field's name.
    Computed(Computation),
    /// Expose the field with options.
    Options(RuleOptions),
    /// An untyped declaration, dispatched on its JSON shape: booleans act
    /// like `Always`/`Never`, objects like `Options`, anything else is an
    /// error.
    Json(Value),
}

impl RuleInput {
    /// Shorthand for `RuleInput::Computed(Computation::new(f))`.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Computation::new(f))
    }
}

impl From<bool> for RuleInput {
    fn from(expose: bool) -> Self {
        if expose { Self::Always } else { Self::Never }
    }
}

impl From<Computation> for RuleInput {
    fn from(computation: Computation) -> Self {
        Self::Computed(computation)
    }
}

impl From<RuleOptions> for RuleInput {
    fn from(options: RuleOptions) -> Self {
        Self::Options(options)
    }
}

impl From<Value> for RuleInput {
    fn from(raw: Value) -> Self {
        Self::Json(raw)
    }
}

/// An ordered mapping from field name to declaration.
///
/// Iteration order is insertion order; it becomes the rule order.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: Vec<(String, RuleInput)>,
}

impl Declarations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration and returns `self` for chaining.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, input: impl Into<RuleInput>) -> Self {
        self.push(field, input);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, input: impl Into<RuleInput>) {
        self.entries.push((field.into(), input.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleInput)> {
        self.entries.iter().map(|(field, input)| (field.as_str(), input))
    }
}

impl IntoIterator for Declarations {
    type Item = (String, RuleInput);
    type IntoIter = std::vec::IntoIter<(String, RuleInput)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, I> FromIterator<(K, I)> for Declarations
where
    K: Into<String>,
    I: Into<RuleInput>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut declarations = Self::new();
        for (field, input) in iter {
            declarations.push(field, input);
        }
        declarations
    }
}
