use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::sync::Arc;
use vitrine_entity::{Declarations, Entity, RuleInput, RuleOptions};

fn user_entity() -> Entity {
    let address = Arc::new(
        Entity::new([Declarations::new().with("city", true).with("region", true)])
            .expect("address entity"),
    );
    Entity::new([Declarations::new()
        .with("id", true)
        .with(
            "name",
            RuleInput::computed(|r, _| {
                json!(format!(
                    "{} {}",
                    r["first"].as_str().unwrap_or_default(),
                    r["last"].as_str().unwrap_or_default()
                ))
            }),
        )
        .with("email", RuleOptions::new().when_fn(|_, o| o.contains_key("admin")))
        .with("role", RuleOptions::new().default_value("member"))
        .with("roles", RuleOptions::new().merge())
        .with("scopes", RuleOptions::new().alias("roles").merge())
        .with("address", RuleOptions::new().using(&address))])
    .expect("user entity")
}

fn user(i: usize) -> Value {
    json!({
        "id": i,
        "first": "Ada",
        "last": "Lovelace",
        "email": "ada@example.com",
        "password_hash": "x",
        "roles": ["admin"],
        "scopes": ["read", "write"],
        "address": {"city": "London", "region": "UK", "street": "private"}
    })
}

fn bench_represent(c: &mut Criterion) {
    let entity = user_entity();
    let single = user(1);
    let batch = Value::Array((0..1_000).map(user).collect());

    c.bench_function("represent_single_record", |b| {
        b.iter(|| entity.represent(black_box(&single)).unwrap())
    });
    c.bench_function("represent_1000_records", |b| {
        b.iter(|| entity.represent(black_box(&batch)).unwrap())
    });
}

criterion_group!(benches, bench_represent);
criterion_main!(benches);
