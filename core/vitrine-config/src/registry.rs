use crate::definition::{EntityDefinition, SELF_REFERENCE};
use crate::error::{DefinitionError, DefinitionResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info};
use vitrine_entity::{
    Computation, ConfigError, Declarations, Entity, EntityRef, Options, Predicate, RuleInput,
    RuleOptions,
};

/// Named predicates, computations and compiled entities.
///
/// JSON cannot hold functions or entity handles, so definitions refer to
/// them by name. Names are resolved when a document is loaded: register
/// predicates and computations first. Each name is registered at most once
/// per kind; re-registering fails and keeps the original.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    predicates: HashMap<String, Predicate>,
    computations: HashMap<String, Computation>,
    entities: HashMap<String, Arc<Entity>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `predicate` available to `"if": "<name>"`.
    pub fn register_predicate(
        &mut self,
        name: impl Into<String>,
        predicate: Predicate,
    ) -> DefinitionResult<&mut Self> {
        let name = name.into();
        if self.predicates.contains_key(&name) {
            return Err(DefinitionError::DuplicatePredicate(name));
        }
        self.predicates.insert(name, predicate);
        Ok(self)
    }

    /// Makes `computation` available to `"compute": "<name>"`.
    pub fn register_computation(
        &mut self,
        name: impl Into<String>,
        computation: Computation,
    ) -> DefinitionResult<&mut Self> {
        let name = name.into();
        if self.computations.contains_key(&name) {
            return Err(DefinitionError::DuplicateComputation(name));
        }
        self.computations.insert(name, computation);
        Ok(self)
    }

    /// Registers an entity built in code so definitions can extend or use it.
    pub fn register_entity(
        &mut self,
        name: impl Into<String>,
        entity: impl Into<Arc<Entity>>,
    ) -> DefinitionResult<&mut Self> {
        let name = name.into();
        check_entity_name(&self.entities, &name)?;
        self.entities.insert(name, entity.into());
        Ok(self)
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<Arc<Entity>> {
        self.entities.get(name).cloned()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Parses and loads a JSON definitions document.
    pub fn load_json(&mut self, source: &str) -> DefinitionResult<Vec<String>> {
        let document: Value = serde_json::from_str(source)?;
        self.load_value(document)
    }

    /// Loads a definitions document, returning the new entity names in
    /// document order.
    ///
    /// Entities are compiled in document order; `extends` and `using` may
    /// refer to entities registered earlier or defined earlier in the same
    /// document, and `using` may be `"self"`. Loading is all-or-nothing: on
    /// error the registry is unchanged.
    pub fn load_value(&mut self, document: Value) -> DefinitionResult<Vec<String>> {
        let Value::Object(definitions) = document else {
            return Err(DefinitionError::NotAnObject);
        };

        let mut staged = self.entities.clone();
        let mut loaded = Vec::with_capacity(definitions.len());

        for (name, raw) in definitions {
            check_entity_name(&staged, &name)?;
            let definition: EntityDefinition = serde_json::from_value(raw)?;
            let entity = self.compile_definition(&staged, &name, &definition)?;
            debug!(entity = %name, rules = entity.len(), "Compiled entity definition");
            staged.insert(name.clone(), entity);
            loaded.push(name);
        }

        self.entities = staged;
        info!(count = loaded.len(), "Loaded entity definitions");
        Ok(loaded)
    }

    /// Projects `data` through the entity registered as `name`.
    pub fn represent(&self, name: &str, data: &Value, options: &Options) -> DefinitionResult<Value> {
        let entity = self
            .entities
            .get(name)
            .ok_or_else(|| DefinitionError::UnknownEntity(name.to_owned()))?;
        Ok(entity.represent_with(data, options)?)
    }

    fn compile_definition(
        &self,
        entities: &HashMap<String, Arc<Entity>>,
        name: &str,
        definition: &EntityDefinition,
    ) -> DefinitionResult<Arc<Entity>> {
        let parent = match &definition.extends {
            Some(parent) => Some(entities.get(parent).ok_or_else(|| {
                DefinitionError::UnknownParent {
                    entity: name.to_owned(),
                    parent: parent.clone(),
                }
            })?),
            None => None,
        };

        if definition.is_recursive() {
            Entity::cyclic(|this| self.build(entities, name, definition, parent, Some(this)))
        } else {
            self.build(entities, name, definition, parent, None).map(Arc::new)
        }
    }

    fn build(
        &self,
        entities: &HashMap<String, Arc<Entity>>,
        name: &str,
        definition: &EntityDefinition,
        parent: Option<&Arc<Entity>>,
        this: Option<&Weak<Entity>>,
    ) -> DefinitionResult<Entity> {
        let declarations = self.declarations(entities, name, &definition.expose, this)?;
        let compiled = match parent {
            Some(parent) => parent.extend([declarations]),
            None => Entity::new([declarations]),
        };
        compiled.map_err(|source| DefinitionError::Config {
            entity: name.to_owned(),
            source,
        })
    }

    fn declarations(
        &self,
        entities: &HashMap<String, Arc<Entity>>,
        entity: &str,
        expose: &Map<String, Value>,
        this: Option<&Weak<Entity>>,
    ) -> DefinitionResult<Declarations> {
        let mut declarations = Declarations::new();
        for (field, raw) in expose {
            let input = match raw {
                Value::Object(bag) => {
                    RuleInput::Options(self.options(entities, entity, field, bag, this)?)
                }
                // Booleans compile directly; anything else is rejected by the compiler.
                other => RuleInput::Json(other.clone()),
            };
            declarations.push(field.clone(), input);
        }
        Ok(declarations)
    }

    /// Resolves the named options (`if`, `using`, `compute`) of one
    /// declaration and reads the rest as plain JSON options.
    fn options(
        &self,
        entities: &HashMap<String, Arc<Entity>>,
        entity: &str,
        field: &str,
        bag: &Map<String, Value>,
        this: Option<&Weak<Entity>>,
    ) -> DefinitionResult<RuleOptions> {
        let config = |source: ConfigError| DefinitionError::Config {
            entity: entity.to_owned(),
            source,
        };

        let mut plain = bag.clone();
        let condition = plain.remove("if");
        let using = plain.remove("using");
        let compute = plain.remove("compute");

        let mut options = RuleOptions::from_json(field, &plain).map_err(config)?;

        if let Some(condition) = condition {
            let predicate = condition
                .as_str()
                .and_then(|name| self.predicates.get(name))
                .ok_or_else(|| {
                    config(ConfigError::IfNotCallable {
                        field: field.to_owned(),
                    })
                })?;
            options = options.when(predicate.clone());
        }

        if let Some(using) = using {
            let target = match using.as_str() {
                Some(SELF_REFERENCE) => this.map(EntityRef::from),
                Some(name) => entities.get(name).map(EntityRef::from),
                None => None,
            }
            .ok_or_else(|| {
                config(ConfigError::UsingNotEntity {
                    field: field.to_owned(),
                })
            })?;
            options = options.using(target);
        }

        // `compute` takes precedence over a literal `value`.
        if let Some(compute) = compute {
            let computation = compute
                .as_str()
                .and_then(|name| self.computations.get(name))
                .ok_or_else(|| DefinitionError::UnknownComputation {
                    entity: entity.to_owned(),
                    field: field.to_owned(),
                    name: compute.to_string(),
                })?;
            options = options.compute(computation.clone());
        }

        Ok(options)
    }
}

/// Rejects names that are taken or that `using` reads as self-reference.
fn check_entity_name(entities: &HashMap<String, Arc<Entity>>, name: &str) -> DefinitionResult<()> {
    if name == SELF_REFERENCE {
        return Err(DefinitionError::ReservedName(name.to_owned()));
    }
    if entities.contains_key(name) {
        return Err(DefinitionError::Duplicate(name.to_owned()));
    }
    Ok(())
}
