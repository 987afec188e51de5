//! Predicate refinements over an underlying schema.
use std::sync::Arc;

use crate::eval::Visit;
use crate::result::{Failure, FullError, Validation, unable_to_assign};
use crate::runtype::{Mode, Node, Runtype};
use crate::seal::Seal;
use crate::types::nominal::unknown;
use crate::value::{Value, preview};

/// What a constraint predicate says about a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Fails with `{value} failed {name} check`.
    Reject,
    /// Fails with this exact message.
    RejectWith(String),
}

pub(crate) type Predicate = Arc<dyn Fn(&Value) -> Verdict + Send + Sync>;

pub(crate) struct ConstraintShape {
    pub(crate) underlying: Runtype,
    pub(crate) predicate: Predicate,
    pub(crate) name: Option<String>,
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Verdict::Pass } else { Verdict::Reject }
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Verdict::RejectWith(message)
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Verdict::RejectWith(message.to_string())
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(message) => Verdict::RejectWith(message),
        }
    }
}

pub fn constraint<V: Into<Verdict>>(
    underlying: Runtype,
    predicate: impl Fn(&Value) -> V + Send + Sync + 'static,
) -> Runtype {
    build(underlying, predicate, None)
}

/// A named constraint shows as its name and uses it in failure messages.
pub fn constraint_named<V: Into<Verdict>>(
    underlying: Runtype,
    name: impl Into<String>,
    predicate: impl Fn(&Value) -> V + Send + Sync + 'static,
) -> Runtype {
    build(underlying, predicate, Some(name.into()))
}

/// A bare type predicate over any value.
pub fn guard<V: Into<Verdict>>(
    name: impl Into<String>,
    predicate: impl Fn(&Value) -> V + Send + Sync + 'static,
) -> Runtype {
    constraint_named(unknown(), name, predicate)
}

fn build<V: Into<Verdict>>(
    underlying: Runtype,
    predicate: impl Fn(&Value) -> V + Send + Sync + 'static,
    name: Option<String>,
) -> Runtype {
    let predicate: Predicate = Arc::new(move |value| predicate(value).into());
    Runtype::from_node(Node::Constraint(ConstraintShape { underlying, predicate, name }))
}

/// The predicate sees the parsed value in parse mode and the raw value otherwise.
pub(crate) fn parse(
    node: &Runtype,
    shape: &ConstraintShape,
    value: &Value,
    cx: &dyn Visit,
    sealed: &Seal,
) -> Validation {
    let validated = cx.validate(&shape.underlying, value, sealed)?;
    let subject = if cx.mode() == Mode::Parse { &validated } else { value };
    let message = match (shape.predicate)(subject) {
        Verdict::Pass => return Ok(validated),
        Verdict::RejectWith(message) => message,
        Verdict::Reject => {
            format!("{} failed {} check", preview(value), shape.name.as_deref().unwrap_or("constraint"))
        }
    };
    let tree = unable_to_assign(value, node, Some(FullError::leaf(&message)));
    Err(Failure::new(message).with_full_error(tree))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn even() -> Runtype {
        number().with_constraint(|v| matches!(v, Value::Number(n) if n % 2.0 == 0.0))
    }

    #[test]
    fn underlying_failures_come_first() {
        let failure = even().safe_parse(&Value::from("x")).unwrap_err();
        assert_eq!(failure.message, "Expected number, but was \"x\" (i.e. a string literal)");
    }

    #[test]
    fn default_message_and_tree() {
        let failure = even().safe_parse(&Value::from(3.0)).unwrap_err();
        assert_eq!(failure.message, "3 failed constraint check");
        assert_eq!(
            failure.render(),
            "Unable to assign 3 to WithConstraint<number>\n  3 failed constraint check"
        );
    }

    #[test]
    fn custom_messages_and_names() {
        let short = constraint_named(string(), "ShortString", |v: &Value| match v {
            Value::String(s) if s.len() > 3 => Verdict::RejectWith(format!("{s} is too long")),
            _ => Verdict::Pass,
        });
        assert_eq!(short.show(), "ShortString");
        assert_eq!(short.safe_parse(&Value::from("abcdef")).unwrap_err().message, "abcdef is too long");

        let buffer = guard("Buffer", |v: &Value| matches!(v, Value::Object(o) if o.class() == Some("Buffer")));
        let failure = buffer.safe_parse(&Value::from(1.0)).unwrap_err();
        assert_eq!(failure.message, "1 failed Buffer check");
    }

    #[test]
    fn parse_mode_sees_the_parsed_value() {
        let doubled = number().with_parser(Parser::new(|v| match v {
            Value::Number(n) => Ok(Value::Number(n * 2.0)),
            _ => Ok(v.clone()),
        }));
        let schema = doubled.with_constraint(|v| matches!(v, Value::Number(n) if *n >= 10.0));
        assert!(schema.parse(&Value::from(6.0)).is_ok());
        assert!(schema.safe_parse(&Value::from(4.0)).is_err());
    }
}
