//! Transforming schemas.
//!
//! A [`Parser`] turns a validated value into a new one on parse and,
//! optionally, back again on serialize. The guard pass never runs the
//! transform; it checks the parsed form against the parser's `test` schema.
use std::sync::Arc;

use crate::eval::guard::{GuardEvaluator, guard};
use crate::eval::{Step, Visit, map_placeholder};
use crate::result::{Failure, Validation};
use crate::runtype::{Mode, Node, Runtype};
use crate::runtype::show::show_type;
use crate::seal::Seal;
use crate::types::nominal::never;
use crate::value::Value;

pub(crate) type Transform = Arc<dyn Fn(&Value) -> Validation + Send + Sync>;

/// Configuration for [`parsed`].
#[derive(Clone)]
pub struct Parser {
    name: Option<String>,
    parse: Transform,
    serialize: Option<Transform>,
    test: Option<Runtype>,
}

pub(crate) struct ParsedShape {
    pub(crate) underlying: Runtype,
    pub(crate) parser: Parser,
}

impl Parser {
    pub fn new(parse: impl Fn(&Value) -> Validation + Send + Sync + 'static) -> Self {
        Parser { name: None, parse: Arc::new(parse), serialize: None, test: None }
    }
    /// Replaces `ParsedValue<...>` in displays and messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    /// The inverse transform, required by serialize.
    pub fn with_serialize(mut self, serialize: impl Fn(&Value) -> Validation + Send + Sync + 'static) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }
    /// Schema of the parsed form, used by the guard pass and checked after parsing.
    pub fn with_test(mut self, test: Runtype) -> Self {
        self.test = Some(test);
        self
    }
}

pub fn parsed(underlying: Runtype, parser: Parser) -> Runtype {
    Runtype::from_node(Node::Parsed(ParsedShape { underlying, parser }))
}

impl ParsedShape {
    /// What the node stands for in each mode: the raw schema when parsing,
    /// the parsed-form schema otherwise. Without a serializer nothing
    /// serializes.
    pub(crate) fn underlying_type(&self, mode: Mode) -> Option<Runtype> {
        match mode {
            Mode::Parse => Some(self.underlying.clone()),
            Mode::Test => self.parser.test.clone(),
            Mode::Serialize if self.parser.serialize.is_some() => self.parser.test.clone(),
            Mode::Serialize => Some(never()),
        }
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.parser.name.as_deref()
    }

    pub(crate) fn test_schema(&self) -> Option<&Runtype> {
        self.parser.test.as_ref()
    }

    pub(crate) fn label(&self) -> String {
        match &self.parser.name {
            Some(name) => name.clone(),
            None => format!("ParsedValue<{}>", show_type(&self.underlying, false)),
        }
    }
}

pub(crate) fn parse(shape: &ParsedShape, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Step {
    let underlying = cx.validate_to_placeholder(&shape.underlying, value, sealed);
    map_placeholder(underlying, shape.parser.parse.clone(), shape.parser.test.clone())
}

pub(crate) fn test(
    shape: &ParsedShape,
    value: &Value,
    cx: &GuardEvaluator,
    sealed: &Seal,
    optional: bool,
) -> Result<(), Failure> {
    match &shape.parser.test {
        Some(test) => cx.check(test, value, sealed, optional),
        None if optional => Ok(()),
        None => Err(Failure::new(format!("{} does not support Runtype.test", shape.label()))),
    }
}

pub(crate) fn serialize(shape: &ParsedShape, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Step {
    let Some(inverse) = &shape.parser.serialize else {
        let message = format!("{} does not support Runtype.serialize", shape.label());
        return Step::Done(Err(Failure::new(message)));
    };
    if let Some(test) = &shape.parser.test {
        if let Err(failure) = guard(test, value, sealed, true) {
            return Step::Done(Err(failure));
        }
    }
    match inverse(value) {
        Ok(serialized) => cx.validate_to_placeholder(&shape.underlying, &serialized, &None),
        Err(failure) => Step::Done(Err(failure)),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn upper() -> Parser {
        Parser::new(|v| match v {
            Value::String(s) => Ok(Value::from(s.to_uppercase())),
            _ => Err(Failure::new("not text")),
        })
    }

    #[test]
    fn parse_applies_the_transform() {
        let schema = string().with_parser(upper());
        assert_eq!(schema.parse(&Value::from("abc")).unwrap(), Value::from("ABC"));
        assert_eq!(schema.show(), "ParsedValue<string>");
    }

    #[test]
    fn guard_without_test_schema_is_unsupported() {
        let schema = string().with_parser(upper().named("Upper"));
        let failure = schema.check(&Value::from("abc")).unwrap_err();
        assert_eq!(failure.message, "Upper does not support Runtype.test");
    }

    #[test]
    fn guard_uses_the_test_schema() {
        let shouting = string().with_constraint(|v| matches!(v, Value::String(s) if s.to_uppercase() == *s));
        let schema = string().with_parser(upper().with_test(shouting));
        assert!(schema.test(&Value::from("ABC")));
        assert!(!schema.test(&Value::from("abc")));
    }

    #[test]
    fn parsed_output_must_pass_the_test_schema() {
        let schema = string().with_parser(Parser::new(|_| Ok(Value::from(1.0))).with_test(string()));
        let failure = schema.safe_parse(&Value::from("x")).unwrap_err();
        assert_eq!(failure.message, "Expected string, but was 1");
    }

    #[test]
    fn serialize_runs_the_inverse() {
        let lower = |v: &Value| match v {
            Value::String(s) => Ok(Value::from(s.to_lowercase())),
            _ => Err(Failure::new("not text")),
        };
        let schema = string().with_parser(upper().with_serialize(lower).with_test(string()));
        assert_eq!(schema.serialize(&Value::from("ABC")).unwrap(), Value::from("abc"));
        let failure = schema.safe_serialize(&Value::from(1.0)).unwrap_err();
        assert_eq!(failure.message, "Expected string, but was 1");

        let failure = string().with_parser(upper()).safe_serialize(&Value::from("A")).unwrap_err();
        assert_eq!(failure.message, "ParsedValue<string> does not support Runtype.serialize");
    }

    #[test]
    fn underlying_type_depends_on_mode() {
        let schema = number().with_parser(upper());
        let Node::Parsed(shape) = schema.node() else { panic!("expected a parsed node") };
        assert!(shape.underlying_type(Mode::Parse).is_some());
        assert!(shape.underlying_type(Mode::Test).is_none());
        assert_eq!(shape.underlying_type(Mode::Serialize).map(|t| t.tag()), Some(crate::runtype::Tag::Never));
    }
}
