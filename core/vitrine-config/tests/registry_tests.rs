use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use vitrine_config::{DefinitionError, Registry};
use vitrine_entity::{
    Computation, ConfigError, Declarations, Entity, Options, Predicate, ProjectionError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_predicate(
            "is_admin",
            Predicate::new(|_, o| o.get("admin") == Some(&json!(true))),
        )
        .unwrap()
        .register_computation(
            "full_name",
            Computation::new(|r, _| {
                json!(format!(
                    "{} {}",
                    r["first"].as_str().unwrap_or_default(),
                    r["last"].as_str().unwrap_or_default()
                ))
            }),
        )
        .unwrap();
    registry
}

fn admin() -> Options {
    let mut options = Options::new();
    options.insert("admin".into(), Value::Bool(true));
    options
}

fn project(registry: &Registry, name: &str, data: Value) -> Value {
    registry.represent(name, &data, &Options::new()).unwrap()
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn load_returns_names_in_document_order() {
    init_tracing();
    let mut r = registry();
    let names = r
        .load_json(r#"{"Zed": {"expose": {"id": true}}, "Abe": {"expose": {"id": true}}}"#)
        .unwrap();
    assert_eq!(names, vec!["Zed", "Abe"]);
    assert!(r.entity("Zed").is_some());
    assert!(r.entity("Abe").is_some());
}

#[test]
fn flags_and_plain_options() {
    let mut r = registry();
    r.load_value(json!({
        "User": {
            "expose": {
                "id": true,
                "password": false,
                "email": {"as": "contact"},
                "role": {"default": "member"},
                "kind": {"value": "user"}
            }
        }
    }))
    .unwrap();

    let out = project(&r, "User", json!({"id": 1, "password": "p", "email": "e"}));
    assert_eq!(
        out,
        json!({"id": 1, "contact": "e", "role": "member", "kind": "user"})
    );
}

#[test]
fn empty_definition_exposes_nothing() {
    let mut r = registry();
    r.load_value(json!({"Nothing": {}})).unwrap();
    assert_eq!(project(&r, "Nothing", json!({"id": 1})), json!({}));
}

#[test]
fn unknown_option_keys_are_dropped() {
    let mut r = registry();
    r.load_value(json!({"User": {"expose": {"id": {"color": "blue"}}}}))
        .unwrap();
    assert_eq!(project(&r, "User", json!({"id": 1})), json!({"id": 1}));
}

#[test]
fn named_predicate_guards_field() {
    let mut r = registry();
    r.load_value(json!({"User": {"expose": {"id": true, "email": {"if": "is_admin"}}}}))
        .unwrap();
    let data = json!({"id": 1, "email": "e"});

    assert_eq!(project(&r, "User", data.clone()), json!({"id": 1}));
    assert_eq!(
        r.represent("User", &data, &admin()).unwrap(),
        json!({"id": 1, "email": "e"})
    );
}

#[test]
fn named_computation_sets_value() {
    let mut r = registry();
    r.load_value(json!({"User": {"expose": {"name": {"compute": "full_name"}}}}))
        .unwrap();
    assert_eq!(
        project(&r, "User", json!({"first": "A", "last": "B"})),
        json!({"name": "A B"})
    );
}

#[test]
fn compute_takes_precedence_over_value() {
    let mut r = registry();
    r.load_value(json!({"User": {"expose": {"name": {"compute": "full_name", "value": "x"}}}}))
        .unwrap();
    assert_eq!(
        project(&r, "User", json!({"first": "A", "last": "B"})),
        json!({"name": "A B"})
    );
}

#[test]
fn using_earlier_definition() {
    let mut r = registry();
    r.load_value(json!({
        "Address": {"expose": {"city": true}},
        "User": {"expose": {"address": {"using": "Address"}, "home": {"using": "Address", "merge": true}}}
    }))
    .unwrap();
    let out = project(
        &r,
        "User",
        json!({"address": {"city": "SF", "zip": 1}, "home": {"city": "LA", "zip": 2}}),
    );
    assert_eq!(out, json!({"address": {"city": "SF"}, "city": "LA"}));
}

#[test]
fn using_entity_registered_in_code() {
    let mut r = registry();
    let tag = Entity::new([Declarations::new().with("label", true)]).unwrap();
    r.register_entity("Tag", tag).unwrap();
    r.load_value(json!({"Post": {"expose": {"tags": {"using": "Tag", "default": []}}}}))
        .unwrap();

    assert_eq!(
        project(&r, "Post", json!({"tags": [{"label": "rust", "id": 1}]})),
        json!({"tags": [{"label": "rust"}]})
    );
    assert_eq!(project(&r, "Post", json!({})), json!({"tags": []}));
}

#[test]
fn self_reference_projects_recursively() {
    let mut r = registry();
    r.load_value(json!({
        "Category": {"expose": {"name": true, "children": {"using": "self", "default": []}}}
    }))
    .unwrap();

    let out = project(
        &r,
        "Category",
        json!({"name": "root", "id": 0, "children": [{"name": "leaf", "id": 1}]}),
    );
    assert_eq!(
        out,
        json!({"name": "root", "children": [{"name": "leaf", "children": []}]})
    );
}

#[test]
fn extends_earlier_definition() {
    let mut r = registry();
    r.load_value(json!({
        "PublicUser": {"expose": {"id": true, "name": true}},
        "AdminUser": {"extends": "PublicUser", "expose": {"email": true}}
    }))
    .unwrap();
    let data = json!({"id": 1, "name": "n", "email": "e"});

    assert_eq!(project(&r, "PublicUser", data.clone()), json!({"id": 1, "name": "n"}));
    assert_eq!(
        project(&r, "AdminUser", data),
        json!({"id": 1, "name": "n", "email": "e"})
    );
    assert_eq!(r.entity("PublicUser").unwrap().len(), 2);
    assert_eq!(r.entity("AdminUser").unwrap().len(), 3);
}

#[test]
fn extends_with_self_reference() {
    let mut r = registry();
    r.load_value(json!({
        "Node": {"expose": {"id": true}},
        "Tree": {"extends": "Node", "expose": {"kids": {"using": "self"}}}
    }))
    .unwrap();
    assert_eq!(
        project(&r, "Tree", json!({"id": 1, "x": 0, "kids": [{"id": 2, "x": 0}]})),
        json!({"id": 1, "kids": [{"id": 2}]})
    );
}

#[test]
fn entity_names_lists_everything() {
    let mut r = registry();
    r.register_entity("Code", Arc::new(Entity::empty())).unwrap();
    r.load_value(json!({"Json": {}})).unwrap();
    let mut names: Vec<&str> = r.entity_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Code", "Json"]);
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn malformed_json_is_parse_error() {
    let err = registry().load_json("{not json").unwrap_err();
    assert!(matches!(err, DefinitionError::Parse(_)));
}

#[test]
fn non_object_document_is_rejected() {
    let err = registry().load_value(json!([1, 2])).unwrap_err();
    assert!(matches!(err, DefinitionError::NotAnObject));
}

#[test]
fn unknown_definition_key_is_parse_error() {
    let err = registry()
        .load_value(json!({"User": {"expoze": {"id": true}}}))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::Parse(_)));
}

#[test]
fn scalar_declaration_is_unknown_options_type() {
    let err = registry()
        .load_value(json!({"User": {"expose": {"id": 1}}}))
        .unwrap_err();
    match err {
        DefinitionError::Config { entity, source } => {
            assert_eq!(entity, "User");
            assert!(matches!(source, ConfigError::UnknownOptionsType { field } if field == "id"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_predicate_is_if_not_callable() {
    let err = registry()
        .load_value(json!({"User": {"expose": {"email": {"if": "nobody"}}}}))
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Config {
            source: ConfigError::IfNotCallable { .. },
            ..
        }
    ));
}

#[test]
fn non_string_if_is_if_not_callable() {
    let err = registry()
        .load_value(json!({"User": {"expose": {"email": {"if": true}}}}))
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Config {
            source: ConfigError::IfNotCallable { .. },
            ..
        }
    ));
}

#[test]
fn forward_using_is_using_not_entity() {
    let err = registry()
        .load_value(json!({
            "User": {"expose": {"address": {"using": "Address"}}},
            "Address": {"expose": {"city": true}}
        }))
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Config {
            source: ConfigError::UsingNotEntity { .. },
            ..
        }
    ));
}

#[test]
fn unknown_computation_is_reported() {
    let err = registry()
        .load_value(json!({"User": {"expose": {"name": {"compute": "nope"}}}}))
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::UnknownComputation { ref field, .. } if field == "name"
    ));
}

#[test]
fn unknown_parent_is_reported() {
    let err = registry()
        .load_value(json!({"Admin": {"extends": "Ghost"}}))
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::UnknownParent { ref parent, .. } if parent == "Ghost"
    ));
}

#[test]
fn duplicate_name_is_rejected() {
    let mut r = registry();
    r.load_value(json!({"User": {}})).unwrap();
    let err = r.load_value(json!({"User": {}})).unwrap_err();
    assert!(matches!(err, DefinitionError::Duplicate(ref name) if name == "User"));
    assert!(r.register_entity("User", Entity::empty()).is_err());
}

#[test]
fn duplicate_predicate_keeps_original() {
    let mut r = registry();
    let err = r
        .register_predicate("is_admin", Predicate::new(|_, _| true))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicatePredicate(ref name) if name == "is_admin"));

    r.load_value(json!({"User": {"expose": {"email": {"if": "is_admin"}}}}))
        .unwrap();
    assert_eq!(
        r.represent("User", &json!({"email": "e"}), &Options::new()).unwrap(),
        json!({})
    );
}

#[test]
fn duplicate_computation_keeps_original() {
    let mut r = registry();
    let err = r
        .register_computation("full_name", Computation::new(|_, _| json!("replaced")))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateComputation(ref name) if name == "full_name"));

    r.load_value(json!({"User": {"expose": {"name": {"compute": "full_name"}}}}))
        .unwrap();
    assert_eq!(
        r.represent("User", &json!({"first": "Ada", "last": "L"}), &Options::new())
            .unwrap(),
        json!({"name": "Ada L"})
    );
}

#[test]
fn self_is_reserved_for_registered_entities() {
    let mut r = registry();
    let err = r.register_entity("self", Entity::empty()).unwrap_err();
    assert!(matches!(err, DefinitionError::ReservedName(ref name) if name == "self"));
    assert!(r.entity("self").is_none());
}

#[test]
fn self_is_reserved_for_loaded_entities() {
    let mut r = registry();
    let err = r
        .load_value(json!({
            "Good": {"expose": {"id": true}},
            "self": {"expose": {"id": true}}
        }))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::ReservedName(ref name) if name == "self"));
    assert_eq!(r.entity_names().count(), 0);
    assert_eq!(
        err.to_string(),
        "`self` is reserved for self-reference and cannot name an entity"
    );
}

#[test]
fn failed_load_leaves_registry_unchanged() {
    let mut r = registry();
    let err = r
        .load_value(json!({
            "Good": {"expose": {"id": true}},
            "Bad": {"expose": {"id": "yes"}}
        }))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::Config { .. }));
    assert!(r.entity("Good").is_none());
    assert_eq!(r.entity_names().count(), 0);
}

#[test]
fn represent_unknown_entity_fails() {
    let err = registry()
        .represent("Ghost", &json!({}), &Options::new())
        .unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownEntity(ref name) if name == "Ghost"));
}

#[test]
fn projection_errors_pass_through() {
    let mut r = registry();
    r.load_value(json!({
        "User": {"expose": {"roles": true, "scopes": {"as": "roles", "merge": true}}}
    }))
    .unwrap();
    let err = r
        .represent("User", &json!({"roles": "a", "scopes": ["b"]}), &Options::new())
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Projection(ProjectionError::MergeArrayWithNonArray { ref field })
            if field == "roles"
    ));
}

#[test]
fn required_property_missing_is_omitted() {
    let mut r = registry();
    r.load_value(json!({"User": {"expose": {"id": true, "nick": {"require": true}}}}))
        .unwrap();
    assert_eq!(
        r.represent("User", &json!({"id": 1}), &Options::new()).unwrap(),
        json!({"id": 1})
    );
}

#[test]
fn error_display_mentions_entity() {
    let err = registry()
        .load_value(json!({"User": {"expose": {"id": 1}}}))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "entity `User`: unknown options type for property `id`"
    );
}
