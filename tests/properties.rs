use proptest::prelude::*;
use serde_json::json;

use shape_guard::types::*;
use shape_guard::{Failure, Parser, Runtype, Value};

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z0-9]{0,6}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Accepts any JSON value, spelled out structurally.
fn any_json() -> Runtype {
    recursive(|json| {
        union([
            null(),
            boolean(),
            number(),
            string(),
            array(json.clone()),
            record(string(), json),
        ])
    })
}

fn decimal() -> Runtype {
    string()
        .with_parser(
            Parser::new(|value| match value {
                Value::String(text) => text
                    .parse::<f64>()
                    .map(Value::from)
                    .map_err(|_| Failure::new(format!("{text:?} is not a decimal"))),
                _ => Err(Failure::new("expected text")),
            })
            .with_serialize(|value| match value {
                Value::Number(n) => Ok(Value::from(format!("{n}"))),
                _ => Err(Failure::new("expected a number")),
            })
            .with_test(number())
            .named("Decimal"),
        )
}

proptest! {
    #[test]
    fn reparsing_parsed_output_is_stable(json in arb_json()) {
        for schema in [unknown(), any_json()] {
            let value = Value::from(json.clone());
            let first = schema.parse(&value).unwrap();
            let second = schema.parse(&first).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn structural_schemas_round_trip(json in arb_json()) {
        let schema = any_json();
        let parsed = schema.parse(&Value::from(json.clone())).unwrap();
        let serialized = schema.serialize(&parsed).unwrap();
        prop_assert_eq!(serialized.to_json().unwrap(), json);
    }

    #[test]
    fn codecs_round_trip(n in any::<i32>()) {
        let schema = object([("amount", decimal())]);
        let raw = Value::from(json!({"amount": n.to_string()}));
        let parsed = schema.parse(&raw).unwrap();
        prop_assert_eq!(&parsed, &Value::from(json!({"amount": n})));
        prop_assert_eq!(schema.serialize(&parsed).unwrap(), raw);
    }

    #[test]
    fn guard_agrees_with_parse_on_plain_schemas(json in arb_json()) {
        let schema = union([
            object([("a", number())]),
            array(string()),
            record(string(), boolean()),
        ]);
        let value = Value::from(json);
        prop_assert_eq!(schema.test(&value), schema.safe_parse(&value).is_ok());
    }
}

#[test]
fn first_invalid_field_wins() {
    let schema = object([("a", number()), ("b", number()), ("c", number())]);
    let failure = schema.safe_parse(&Value::from(json!({"a": 1, "b": "x", "c": "y"}))).unwrap_err();
    assert_eq!(failure.key.as_deref(), Some("b"));
    let failure = schema.safe_parse(&Value::from(json!({"c": "y", "b": "x", "a": "z"}))).unwrap_err();
    assert_eq!(failure.key.as_deref(), Some("a"));
}

#[test]
fn discriminated_unions_report_the_branch() {
    let schema = union([
        object([("kind", literal("a")), ("x", number())]),
        object([("kind", literal("b")), ("y", string())]),
    ]);
    assert!(schema.test(&Value::from(json!({"kind": "a", "x": 5}))));
    let failure = schema.safe_parse(&Value::from(json!({"kind": "a", "x": "bad"}))).unwrap_err();
    assert_eq!(failure.key.as_deref(), Some("<kind: \"a\">.x"));
}

#[test]
fn tuple_discriminators_report_the_branch() {
    let schema = union([
        tuple([literal(1.0), object([("size", number())])]),
        tuple([literal(2.0), object([("width", number()), ("height", number())])]),
    ]);
    let failure = schema.safe_parse(&Value::from(json!([2, {"size": 10}]))).unwrap_err();
    assert_eq!(failure.key.as_deref(), Some("<[0]: 2>.[1].width"));
    assert_eq!(failure.message, "Expected number, but was undefined");
}

#[test]
fn sealed_objects_reject_extra_properties() {
    let schema = sealed(object([("a", string())]));
    assert!(schema.test(&Value::from(json!({"a": "x"}))));
    let failure = schema.safe_parse(&Value::from(json!({"a": "x", "b": "y"}))).unwrap_err();
    assert_eq!(failure.key.as_deref(), Some("b"));
}

#[test]
fn record_keys_follow_the_key_schema() {
    let raw = Value::from(json!({"4": true}));
    assert!(record(number(), boolean()).test(&raw));
    assert_eq!(record(string(), boolean()).parse(&raw).unwrap(), raw);
}

#[test]
fn cyclic_input_terminates() {
    let schema = recursive(|node| object([("next", union([null(), node]))]));
    let a = shape_guard::value::Object::new();
    a.insert("next", Value::Object(a.clone()));
    let Value::Object(out) = schema.parse(&Value::Object(a)).unwrap() else { panic!("expected an object") };
    let Some(Value::Object(next)) = out.get("next") else { panic!("expected a nested object") };
    assert!(next.ptr_eq(&out));
    assert!(schema.test(&Value::Object(out)));
}
