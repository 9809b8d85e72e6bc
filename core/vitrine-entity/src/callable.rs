//! User-supplied callables: guards (`if`) and computed values (`value`).
//!
//! Both receive the record being projected and the options bag passed to
//! `represent`. They run synchronously; any error they return aborts the
//! projection and reaches the caller unmodified.

use crate::value::Options;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&Value, &Options) -> anyhow::Result<bool> + Send + Sync;
type ComputeFn = dyn Fn(&Value, &Options) -> anyhow::Result<Option<Value>> + Send + Sync;

/// A guard deciding whether a rule applies to a record.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wraps an infallible guard.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |record: &Value, options: &Options| -> anyhow::Result<bool> {
                Ok(f(record, options))
            },
        ))
    }

    /// Wraps a guard that may fail.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluates the guard against `record`.
    pub fn evaluate(&self, record: &Value, options: &Options) -> anyhow::Result<bool> {
        (self.0)(record, options)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A function computing a field's value from the record.
///
/// Returning `None` means "absent": the rule's default applies, or the
/// field is omitted.
#[derive(Clone)]
pub struct Computation(Arc<ComputeFn>);

impl Computation {
    /// Wraps a computation that always produces a value.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |record: &Value, options: &Options| -> anyhow::Result<Option<Value>> {
                Ok(Some(f(record, options)))
            },
        ))
    }

    /// Wraps a computation that may produce nothing.
    pub fn optional<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> Option<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |record: &Value, options: &Options| -> anyhow::Result<Option<Value>> {
                Ok(f(record, options))
            },
        ))
    }

    /// Wraps a computation that may fail.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&Value, &Options) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs the computation against `record`.
    pub fn call(&self, record: &Value, options: &Options) -> anyhow::Result<Option<Value>> {
        (self.0)(record, options)
    }
}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Computation(..)")
    }
}
