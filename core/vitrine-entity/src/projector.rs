//! Projection: applies a compiled rule list to a record.
//!
//! Rules run strictly in declaration order. For each rule:
//!
//! 1. **Guard** — a failing `if` skips the rule entirely, default included.
//! 2. **Resolve** — computed, literal, or read from the record.
//! 3. **Absence** — an absent value falls back to `default`, else the rule
//!    is skipped and no key is written.
//! 4. **Nested** — `using` projects the value (defaults included).
//! 5. **Place** — assign under `as`, or merge into the output.
//!
//! Later writes to the same output key overwrite earlier ones, except that
//! merging arrays into the same key accumulates.

use crate::compiler::RuleList;
use crate::error::{ProjectionError, ProjectionResult};
use crate::rule::{Mode, Rule};
use crate::value::{self, Options};
use serde_json::{Map, Value};
use tracing::trace;

pub(crate) fn project(rules: &RuleList, data: &Value, options: &Options) -> ProjectionResult<Value> {
    match data {
        Value::Array(items) => items
            .iter()
            .map(|item| project(rules, item, options))
            .collect::<ProjectionResult<Vec<_>>>()
            .map(Value::Array),
        record => project_record(rules, record, options).map(Value::Object),
    }
}

fn project_record(
    rules: &RuleList,
    record: &Value,
    options: &Options,
) -> ProjectionResult<Map<String, Value>> {
    let mut output = Map::new();

    for rule in rules.iter() {
        if let Some(condition) = rule.condition() {
            if !condition.evaluate(record, options)? {
                trace!(field = %rule.key(), "Guard rejected record, skipping rule");
                continue;
            }
        }

        let Some(value) = resolve(rule, record, options)? else {
            trace!(field = %rule.key(), "Value absent, skipping rule");
            continue;
        };

        let value = match rule.using() {
            Some(target) => target
                .resolve(rule.key())?
                .represent_with(&value, options)?,
            None => value,
        };

        place(&mut output, rule, value)?;
    }

    Ok(output)
}

/// Resolves the rule's value, substituting the default for an absent one.
fn resolve(rule: &Rule, record: &Value, options: &Options) -> ProjectionResult<Option<Value>> {
    let resolved = match rule.mode() {
        Mode::Computed(computation) => computation.call(record, options)?,
        Mode::Literal(literal) => Some(literal.clone()),
        Mode::None => value::field(record, rule.key()).cloned(),
    };
    Ok(resolved.or_else(|| rule.default_value().cloned()))
}

fn place(output: &mut Map<String, Value>, rule: &Rule, value: Value) -> ProjectionResult<()> {
    if !rule.merges() {
        output.insert(rule.alias().to_owned(), value);
        return Ok(());
    }

    match value {
        Value::Array(items) => {
            let slot = output
                .entry(rule.alias())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(existing) => existing.extend(items),
                _ => {
                    return Err(ProjectionError::MergeArrayWithNonArray {
                        field: rule.alias().to_owned(),
                    });
                }
            }
        }
        Value::Object(fields) => output.extend(fields),
        // Scalars have nothing to spread.
        _ => trace!(field = %rule.alias(), "Merged scalar ignored"),
    }
    Ok(())
}
