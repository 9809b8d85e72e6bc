//! Rule compilation: normalizes declarations into canonical [`Rule`]s.

use crate::declaration::{Declarations, RuleInput};
use crate::error::{ConfigError, ConfigResult};
use crate::rule::{Mode, Rule, RuleOptions, RuleValue};
use serde_json::Value;
use tracing::trace;

/// An append-only list of compiled rules.
///
/// There is deliberately no way to remove or replace a rule: an entity's
/// whitelist can only grow.
#[derive(Debug, Clone, Default)]
pub(crate) struct RuleList(Vec<Rule>);

impl RuleList {
    pub(crate) fn push(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// Compiles every declaration in order and appends the resulting rules.
///
/// On error, rules compiled from earlier declarations stay in `rules`;
/// callers compile into a scratch list and discard it.
pub(crate) fn compile(rules: &mut RuleList, declarations: Declarations) -> ConfigResult<()> {
    for (name, input) in declarations {
        match input {
            RuleInput::Always => add_rule(rules, name, RuleOptions::new()),
            RuleInput::Never => trace!(field = %name, "Declaration disabled, skipping"),
            RuleInput::Computed(computation) => {
                add_rule(rules, name, RuleOptions::new().compute(computation))
            }
            RuleInput::Options(options) => {
                let field = options.key.clone().unwrap_or(name);
                add_rule(rules, field, options);
            }
            RuleInput::Json(raw) => compile_json(rules, name, raw)?,
        }
    }
    Ok(())
}

fn compile_json(rules: &mut RuleList, name: String, raw: Value) -> ConfigResult<()> {
    match raw {
        Value::Bool(true) => add_rule(rules, name, RuleOptions::new()),
        Value::Bool(false) => trace!(field = %name, "Declaration disabled, skipping"),
        Value::Object(bag) => {
            let options = RuleOptions::from_json(&name, &bag)?;
            let field = options.key.clone().unwrap_or(name);
            add_rule(rules, field, options);
        }
        _ => return Err(ConfigError::UnknownOptionsType { field: name }),
    }
    Ok(())
}

/// Appends the canonical rule for `field`.
///
/// `as` defaults to the field name. The mode follows from `value`: a
/// computation, a literal, or nothing (read the field).
fn add_rule(rules: &mut RuleList, field: String, options: RuleOptions) {
    let mode = match options.value {
        Some(RuleValue::Computed(computation)) => Mode::Computed(computation),
        Some(RuleValue::Literal(value)) => Mode::Literal(value),
        None => Mode::None,
    };

    trace!(field = %field, alias = ?options.alias, merge = options.merge, "Compiled rule");

    rules.push(Rule {
        alias: options.alias.unwrap_or_else(|| field.clone()),
        key: field,
        mode,
        default: options.default,
        condition: options.condition,
        merge: options.merge,
        require: options.require,
        using: options.using,
    });
}
