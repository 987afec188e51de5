//! Dictionaries with a key schema and a value schema.
//!
//! Keys always arrive as strings. When the key schema is numeric they are
//! coerced with the host's `+k` before validation and stored in numeric
//! form; a mixed key schema tries the string first, then the number.
use once_cell::sync::OnceCell;

use crate::eval::{Cycle, Step};
use crate::result::{Failure, expected, nested_key, types_are_not_compatible};
use crate::runtype::{Node, Runtype};
use crate::seal::{Seal, for_children};
use crate::types::primitive::Primitive;
use crate::value::{LiteralValue, Value, format_number, to_number};

pub(crate) struct RecordShape {
    pub(crate) key: Runtype,
    pub(crate) value: Runtype,
    pub(crate) readonly: bool,
    base: OnceCell<KeyBase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyBase {
    String,
    Number,
    Mixed,
}

pub fn record(key: Runtype, value: Runtype) -> Runtype {
    build(key, value, false)
}

pub fn readonly_record(key: Runtype, value: Runtype) -> Runtype {
    build(key, value, true)
}

pub(crate) fn build(key: Runtype, value: Runtype, readonly: bool) -> Runtype {
    Runtype::from_node(Node::Record(RecordShape { key, value, readonly, base: OnceCell::new() }))
}

impl RecordShape {
    fn base(&self) -> KeyBase {
        *self.base.get_or_init(|| key_base(&self.key))
    }
}

fn key_base(key: &Runtype) -> KeyBase {
    match key.node() {
        Node::Primitive(Primitive::String) => KeyBase::String,
        Node::Primitive(Primitive::Number) => KeyBase::Number,
        Node::Literal(LiteralValue::String(_)) => KeyBase::String,
        Node::Literal(LiteralValue::Number(_)) => KeyBase::Number,
        Node::Union(shape) => {
            let mut bases = shape.alternatives.iter().map(key_base);
            let first = bases.next().unwrap_or(KeyBase::Mixed);
            bases.fold(first, |a, b| if a == b { a } else { KeyBase::Mixed })
        }
        Node::Constraint(shape) => key_base(&shape.underlying),
        Node::Brand(shape) => key_base(&shape.entity),
        _ => KeyBase::Mixed,
    }
}

pub(crate) fn parse(node: &Runtype, shape: &RecordShape, value: &Value, sealed: &Seal) -> Step {
    let source = match value {
        Value::Array(_) => return Step::Done(Err(Failure::new("Expected Record, but was Array"))),
        Value::Object(source) => source.clone(),
        other => return Step::Done(Err(expected(node, other))),
    };
    if let Some(class) = source.class() {
        let message = format!("Expected {}, but was an instance of {class}", node.show());
        return Step::Done(Err(Failure::new(message)));
    }
    let (key_type, value_type, base) = (shape.key.clone(), shape.value.clone(), shape.base());
    let child_seal = for_children(sealed);
    Cycle::object(move |cx, placeholder| {
        for (key, item) in source.snapshot() {
            // Only NaN is rejected here; `Infinity` and `-Infinity` are numeric keys.
            let validated_key = match base {
                KeyBase::Number => {
                    let number = to_number(&key);
                    if number.is_nan() {
                        return Some(expected("record key to be a number", &Value::String(key)));
                    }
                    cx.validate(&key_type, &Value::Number(number), &None)
                }
                KeyBase::String => cx.validate(&key_type, &Value::String(key.clone()), &None),
                KeyBase::Mixed => {
                    let as_string = cx.validate(&key_type, &Value::String(key.clone()), &None);
                    let number = to_number(&key);
                    match as_string {
                        Err(_) if !number.is_nan() => cx.validate(&key_type, &Value::Number(number), &None),
                        other => other,
                    }
                }
            };
            let stored_key = match validated_key {
                Ok(Value::Number(number)) => format_number(number),
                Ok(Value::String(text)) => text,
                Ok(_) => key.clone(),
                Err(_) => {
                    let wanted = format!("record key to be {}", key_type.show());
                    return Some(expected(&wanted, &Value::String(key)));
                }
            };
            match cx.validate(&value_type, &item, &child_seal) {
                Ok(validated) => placeholder.insert(stored_key, validated),
                Err(failure) => {
                    let tree = types_are_not_compatible(&key, failure.tree());
                    let path = nested_key(&key, failure.key.as_deref());
                    return Some(Failure::new(failure.message).with_key(path).with_full_error(tree));
                }
            }
        }
        None
    })
}
