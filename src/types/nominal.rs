//! Leaf schemas that match by name or by membership: class instances, key
//! sets, enums, and the two extremes `never` and `unknown`.
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;

use crate::result::{Validation, expected};
use crate::runtype::{Node, Runtype};
use crate::value::{LiteralValue, Value, format_number, preview};

static NEVER: Lazy<Runtype> = Lazy::new(|| Runtype::from_node(Node::Never));
static UNKNOWN: Lazy<Runtype> = Lazy::new(|| Runtype::from_node(Node::Unknown));

pub(crate) struct KeyOfShape {
    pub(crate) keys: IndexSet<String>,
    /// Sorted previews of the keys joined with ` | `.
    pub(crate) label: String,
}

pub(crate) struct EnumShape {
    pub(crate) name: String,
    pub(crate) members: IndexMap<String, LiteralValue>,
    accepted: Vec<LiteralValue>,
}

/// Accepts nothing.
pub fn never() -> Runtype {
    NEVER.clone()
}

/// Accepts anything, unchanged.
pub fn unknown() -> Runtype {
    UNKNOWN.clone()
}

/// Objects constructed by `class`. `Array`, `Function` and `Object` name the
/// built-in kinds.
pub fn instance_of(class: impl Into<String>) -> Runtype {
    Runtype::from_node(Node::InstanceOf(class.into()))
}

/// One of the given property names. Numbers match through their string form.
pub fn key_of<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Runtype {
    let keys: IndexSet<String> = keys.into_iter().map(Into::into).collect();
    let mut sorted: Vec<&String> = keys.iter().collect();
    sorted.sort();
    let label = sorted
        .into_iter()
        .map(|key| preview(&Value::String(key.clone())))
        .collect::<Vec<_>>()
        .join(" | ");
    Runtype::from_node(Node::KeyOf(KeyOfShape { keys, label }))
}

/// A named set of members. When any member is numeric, only the numeric
/// members are accepted, mirroring enums whose numbers are reverse-mapped to
/// names.
pub fn enumeration<K: Into<String>>(
    name: impl Into<String>,
    members: impl IntoIterator<Item = (K, LiteralValue)>,
) -> Runtype {
    let members: IndexMap<String, LiteralValue> =
        members.into_iter().map(|(key, value)| (key.into(), value)).collect();
    let numeric = members.values().any(|value| matches!(value, LiteralValue::Number(_)));
    let accepted = members
        .values()
        .filter(|value| !numeric || matches!(value, LiteralValue::Number(_)))
        .cloned()
        .collect();
    Runtype::from_node(Node::Enum(EnumShape { name: name.into(), members, accepted }))
}

fn is_instance(class: &str, value: &Value) -> bool {
    match (class, value) {
        ("Object", Value::Object(_) | Value::Array(_) | Value::Function(_)) => true,
        ("Array", Value::Array(_)) => true,
        ("Function", Value::Function(_)) => true,
        (class, Value::Object(object)) => object.class() == Some(class),
        _ => false,
    }
}

pub(crate) fn parse_instance_of(class: &str, value: &Value) -> Validation {
    if is_instance(class, value) { Ok(value.clone()) } else { Err(expected(class, value)) }
}

pub(crate) fn parse_key_of(shape: &KeyOfShape, value: &Value) -> Validation {
    let found = match value {
        Value::Number(number) => shape.keys.contains(&format_number(*number)),
        Value::String(key) => shape.keys.contains(key),
        _ => false,
    };
    if found { Ok(value.clone()) } else { Err(expected(&shape.label, value)) }
}

pub(crate) fn parse_enum(shape: &EnumShape, value: &Value) -> Validation {
    if shape.accepted.iter().any(|member| member.matches(value)) {
        Ok(value.clone())
    } else {
        Err(expected(&shape.name, value))
    }
}

pub(crate) fn parse_never(value: &Value) -> Validation {
    Err(expected("nothing", value))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_and_unknown() {
        assert!(!never().test(&Value::Undefined));
        assert_eq!(never().safe_parse(&Value::from(1.0)).unwrap_err().message, "Expected nothing, but was 1");
        assert!(unknown().test(&Value::symbol("s")));
        assert!(never().ptr_eq(&never()));
    }

    #[test]
    fn instances_match_by_class() {
        let date = instance_of("Date");
        assert!(date.test(&Value::instance("Date", Vec::<(String, Value)>::new())));
        assert_eq!(date.safe_parse(&Value::from(1.0)).unwrap_err().message, "Expected Date, but was 1");
        assert!(instance_of("Array").test(&Value::array([])));
        assert!(instance_of("Object").test(&Value::array([])));
        assert!(!instance_of("Date").test(&Value::object([("a", Value::Null)])));
    }

    #[test]
    fn key_of_accepts_numbers_as_keys() {
        let schema = key_of(["foo", "bar", "1"]);
        assert_eq!(schema.show(), "\"1\" | \"bar\" | \"foo\"");
        assert!(schema.test(&Value::from("foo")));
        assert!(schema.test(&Value::from(1.0)));
        let failure = schema.safe_parse(&Value::from("baz")).unwrap_err();
        assert_eq!(failure.message, "Expected \"1\" | \"bar\" | \"foo\", but was \"baz\"");
    }

    #[test]
    fn numeric_enums_ignore_their_names() {
        let direction = enumeration(
            "Direction",
            [("Up", LiteralValue::from(0)), ("Down", LiteralValue::from(1)), ("0", LiteralValue::from("Up"))],
        );
        assert!(direction.test(&Value::from(0)));
        assert!(!direction.test(&Value::from("Up")));
        assert_eq!(direction.safe_parse(&Value::from(2)).unwrap_err().message, "Expected Direction, but was 2");

        let color = enumeration("Color", [("Red", LiteralValue::from("red"))]);
        assert!(color.test(&Value::from("red")));
        assert_eq!(color.show(), "Color");
    }
}
