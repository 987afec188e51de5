//! Primitive type checks: one node per host `typeof`.
use crate::result::{Failure, Validation};
use crate::runtype::{Node, Runtype, Tag};
use crate::value::{Value, preview};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Boolean,
    Number,
    String,
    Symbol,
    BigInt,
    Function,
}

impl Primitive {
    pub(crate) fn tag(self) -> Tag {
        match self {
            Primitive::Boolean => Tag::Boolean,
            Primitive::Number => Tag::Number,
            Primitive::String => Tag::String,
            Primitive::Symbol => Tag::Symbol,
            Primitive::BigInt => Tag::BigInt,
            Primitive::Function => Tag::Function,
        }
    }
    /// The `typeof` this node accepts, which is also how it renders.
    pub(crate) fn name(self) -> &'static str {
        self.tag().as_str()
    }
}

pub(crate) fn parse(kind: Primitive, value: &Value) -> Validation {
    if value.type_of() == kind.name() {
        return Ok(value.clone());
    }
    let hint = if matches!(value, Value::String(_)) { " (i.e. a string literal)" } else { "" };
    Err(Failure::new(format!("Expected {}, but was {}{hint}", kind.name(), preview(value))))
}

fn primitive(kind: Primitive) -> Runtype {
    Runtype::from_node(Node::Primitive(kind))
}

pub fn boolean() -> Runtype {
    primitive(Primitive::Boolean)
}
pub fn number() -> Runtype {
    primitive(Primitive::Number)
}
pub fn string() -> Runtype {
    primitive(Primitive::String)
}
pub fn symbol() -> Runtype {
    primitive(Primitive::Symbol)
}
pub fn bigint() -> Runtype {
    primitive(Primitive::BigInt)
}
pub fn function() -> Runtype {
    primitive(Primitive::Function)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_typeof() {
        assert!(boolean().test(&Value::Bool(true)));
        assert!(bigint().test(&Value::BigInt(3)));
        assert!(symbol().test(&Value::symbol("s")));
        assert!(function().test(&Value::function("f")));
        assert!(!number().test(&Value::Null));
        assert!(!boolean().test(&Value::Number(0.0)));
    }

    #[test]
    fn string_inputs_get_a_hint() {
        let failure = number().safe_parse(&Value::from("12")).unwrap_err();
        assert_eq!(failure.message, "Expected number, but was \"12\" (i.e. a string literal)");
        let failure = string().safe_parse(&Value::Undefined).unwrap_err();
        assert_eq!(failure.message, "Expected string, but was undefined");
    }
}
