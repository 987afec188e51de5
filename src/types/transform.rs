//! Structural rewrites of existing schemas.
//!
//! These build new nodes; the input schema is never modified. `mutable` and
//! `readonly` only change how a schema is displayed, so schemas they do not
//! understand come back unchanged. `pick`, `omit` and `partial` change what
//! validates and refuse anything but objects.
use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::runtype::{Node, Runtype};
use crate::types::{array, object, record, tuple, wrapper};
use crate::value::{Value, preview};

pub fn mutable(schema: &Runtype) -> Runtype {
    with_readonly(schema, false)
}

pub fn readonly(schema: &Runtype) -> Runtype {
    with_readonly(schema, true)
}

fn with_readonly(schema: &Runtype, readonly: bool) -> Runtype {
    match schema.node() {
        Node::Object(shape) => object::build((*shape.fields).clone(), shape.partial, readonly),
        Node::Array(shape) if readonly => array::readonly_array(shape.element.clone()),
        Node::Array(shape) => array::array(shape.element.clone()),
        Node::Tuple(shape) => tuple::build(shape.components.clone(), readonly),
        Node::Record(shape) => record::build(shape.key.clone(), shape.value.clone(), readonly),
        Node::Named(shape) => wrapper::named(shape.name.clone(), with_readonly(&shape.underlying, readonly)),
        _ => schema.clone(),
    }
}

/// Keeps only the listed fields.
pub fn pick<K: AsRef<str>>(schema: &Runtype, keys: &[K]) -> Result<Runtype, SchemaError> {
    select(schema, keys, "Pick", true)
}

/// Drops the listed fields.
pub fn omit<K: AsRef<str>>(schema: &Runtype, keys: &[K]) -> Result<Runtype, SchemaError> {
    select(schema, keys, "Omit", false)
}

fn select<K: AsRef<str>>(
    schema: &Runtype,
    keys: &[K],
    operation: &'static str,
    keep: bool,
) -> Result<Runtype, SchemaError> {
    match schema.node() {
        Node::Object(shape) => {
            let fields: IndexMap<String, Runtype> = shape
                .fields
                .iter()
                .filter(|(name, _)| keys.iter().any(|key| key.as_ref() == name.as_str()) == keep)
                .map(|(name, field)| (name.clone(), field.clone()))
                .collect();
            Ok(object::build(fields, shape.partial, shape.readonly))
        }
        Node::Named(shape) => {
            let listed = keys
                .iter()
                .map(|key| preview(&Value::String(key.as_ref().to_string())))
                .collect::<Vec<_>>()
                .join(" | ");
            let inner = select(&shape.underlying, keys, operation, keep)?;
            Ok(wrapper::named(format!("{operation}<{}, {listed}>", shape.name), inner))
        }
        _ => Err(SchemaError::Unsupported { operation, tag: schema.tag() }),
    }
}

/// Makes every field optional.
pub fn partial(schema: &Runtype) -> Result<Runtype, SchemaError> {
    match schema.node() {
        Node::Object(shape) => Ok(object::build((*shape.fields).clone(), true, shape.readonly)),
        _ => Err(SchemaError::Unsupported { operation: "Partial", tag: schema.tag() }),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use serde_json::json;

    fn person() -> Runtype {
        named("Person", object([("name", string()), ("age", number()), ("email", string())]))
    }

    #[test]
    fn pick_and_omit_rename_named_schemas() {
        let picked = pick(&person(), &["name", "age"]).unwrap();
        assert_eq!(picked.show(), "Pick<Person, \"name\" | \"age\">");
        assert!(picked.test(&Value::from(json!({"name": "a", "age": 1}))));

        let omitted = omit(&person(), &["email"]).unwrap();
        assert_eq!(omitted.show(), "Omit<Person, \"email\">");
        assert_eq!(
            omitted.parse(&Value::from(json!({"name": "a", "age": 1, "email": "e"}))).unwrap(),
            Value::from(json!({"name": "a", "age": 1}))
        );
    }

    #[test]
    fn unsupported_inputs_are_errors() {
        let error = pick(&number(), &["a"]).unwrap_err();
        assert_eq!(error.to_string(), "Pick: input runtype \"number\" does not support 'pick' operation");
        let error = partial(&array(number())).unwrap_err();
        assert_eq!(error.to_string(), "Partial: input runtype \"array\" does not support 'partial' operation");
    }

    #[test]
    fn readonly_round_trips() {
        let schema = object([("a", string())]);
        assert_eq!(readonly(&schema).show(), "{ readonly a: string }");
        assert_eq!(mutable(&readonly(&schema)).show(), "{ a: string }");
        assert_eq!(readonly(&array(string())).show(), "readonly string[]");
        assert_eq!(readonly(&tuple([string()])).show(), "readonly [string]");
        assert_eq!(readonly(&record(string(), number())).show(), "ReadonlyRecord<string, number>");
        let text = string();
        assert!(readonly(&text).ptr_eq(&text));
    }

    #[test]
    fn partial_objects_accept_missing_fields() {
        let schema = partial(&object([("a", string())])).unwrap();
        assert_eq!(schema.show(), "{ a?: string }");
        assert!(schema.test(&Value::from(json!({}))));
    }
}
