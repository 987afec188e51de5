//! Literal (exact constant) schemas.
use crate::result::{Failure, Validation};
use crate::runtype::{Node, Runtype};
use crate::value::{LiteralValue, Value, preview};

pub fn literal(value: impl Into<LiteralValue>) -> Runtype {
    Runtype::from_node(Node::Literal(value.into()))
}

pub fn undefined() -> Runtype {
    literal(LiteralValue::Undefined)
}

pub fn null() -> Runtype {
    literal(LiteralValue::Null)
}

pub(crate) fn parse(expected: &LiteralValue, value: &Value) -> Validation {
    if expected.matches(value) {
        return Ok(value.clone());
    }
    let hint = if value.type_of() != expected.type_of() && !matches!(value, Value::Null | Value::Undefined) {
        match value {
            Value::Array(_) => " (i.e. an array)".to_string(),
            Value::Object(_) => " (i.e. an object)".to_string(),
            other => format!(" (i.e. a {})", other.type_of()),
        }
    } else {
        String::new()
    };
    Err(Failure::new(format!(
        "Expected literal {}, but was {}{hint}",
        expected.preview(),
        preview(value)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(schema: &Runtype, value: serde_json::Value) -> String {
        schema.safe_parse(&Value::from(value)).unwrap_err().message
    }

    #[test]
    fn exact_match_only() {
        assert!(literal("a").test(&Value::from("a")));
        assert!(literal(2.0).test(&Value::from(json!(2))));
        assert!(undefined().test(&Value::Undefined));
        assert!(!null().test(&Value::Undefined));
    }

    #[test]
    fn mismatch_messages_hint_at_the_type() {
        assert_eq!(message(&literal("a"), json!("b")), "Expected literal \"a\", but was \"b\"");
        assert_eq!(message(&literal("a"), json!(1)), "Expected literal \"a\", but was 1 (i.e. a number)");
        assert_eq!(message(&literal(1.0), json!([1])), "Expected literal 1, but was [1] (i.e. an array)");
        assert_eq!(message(&literal(true), json!({})), "Expected literal true, but was {} (i.e. an object)");
        assert_eq!(message(&literal("a"), json!(null)), "Expected literal \"a\", but was null");
        assert_eq!(message(&null(), json!({})), "Expected literal null, but was {}");
    }
}
