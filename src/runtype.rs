//! Schema nodes and the public validation surface.
//!
//! A schema is a tree of shared, immutable [`Runtype`] handles over a closed
//! set of node kinds ([`Node`]). Every pass (parse, test, serialize, fields,
//! show, seal analysis, union planning) is an exhaustive match over that set.
//!
//! Design goals:
//! - Nodes never change after construction and are safe to share across threads.
//! - `lazy` is the only back-edge; its target is memoized once per node.
//! - Per-call state (visited maps, placeholders) lives in the evaluators.
pub mod inspect;
pub mod show;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::error::{SchemaError, ValidationError};
use crate::eval::Evaluator;
use crate::eval::guard;
use crate::result::{Failure, Validation};
use crate::types::array::ArrayShape;
use crate::types::constraint::{ConstraintShape, Verdict};
use crate::types::intersect::IntersectShape;
use crate::types::lazy::LazyShape;
use crate::types::nominal::{EnumShape, KeyOfShape};
use crate::types::object::ObjectShape;
use crate::types::parsed::{ParsedShape, Parser};
use crate::types::primitive::Primitive;
use crate::types::record::RecordShape;
use crate::types::sealed::SealedShape;
use crate::types::tuple::TupleShape;
use crate::types::union::{Matcher, UnionShape};
use crate::types::wrapper::{BrandShape, NamedShape};
use crate::value::{LiteralValue, Value};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A schema: a cheap, clonable handle to an immutable node.
#[derive(Clone)]
pub struct Runtype(Arc<Node>);

/// Which direction a pass runs in. Wrappers that transform values expose a
/// different underlying shape per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Parse,
    Test,
    Serialize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Boolean,
    Number,
    String,
    Symbol,
    BigInt,
    Function,
    Literal,
    Array,
    Tuple,
    Object,
    Record,
    Union,
    Intersect,
    Constraint,
    Brand,
    Named,
    Parsed,
    Lazy,
    Sealed,
    InstanceOf,
    KeyOf,
    Enum,
    Never,
    Unknown,
}

pub(crate) enum Node {
    Primitive(Primitive),
    Literal(LiteralValue),
    Array(ArrayShape),
    Tuple(TupleShape),
    Object(ObjectShape),
    Record(RecordShape),
    Union(UnionShape),
    Intersect(IntersectShape),
    Constraint(ConstraintShape),
    Brand(BrandShape),
    Named(NamedShape),
    Parsed(ParsedShape),
    Lazy(LazyShape),
    Sealed(SealedShape),
    InstanceOf(String),
    KeyOf(KeyOfShape),
    Enum(EnumShape),
    Never,
    Unknown,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Mode {
    pub(crate) fn index(self) -> usize {
        match self {
            Mode::Parse => 0,
            Mode::Test => 1,
            Mode::Serialize => 2,
        }
    }
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Boolean => "boolean",
            Tag::Number => "number",
            Tag::String => "string",
            Tag::Symbol => "symbol",
            Tag::BigInt => "bigint",
            Tag::Function => "function",
            Tag::Literal => "literal",
            Tag::Array => "array",
            Tag::Tuple => "tuple",
            Tag::Object => "object",
            Tag::Record => "record",
            Tag::Union => "union",
            Tag::Intersect => "intersect",
            Tag::Constraint => "constraint",
            Tag::Brand => "brand",
            Tag::Named => "named",
            Tag::Parsed => "parsed",
            Tag::Lazy => "lazy",
            Tag::Sealed => "sealed",
            Tag::InstanceOf => "instanceof",
            Tag::KeyOf => "keyOf",
            Tag::Enum => "enum",
            Tag::Never => "never",
            Tag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Runtype {
    pub(crate) fn from_node(node: Node) -> Self {
        Runtype(Arc::new(node))
    }
    pub(crate) fn node(&self) -> &Node {
        &self.0
    }
    /// Node identity, used as the schema half of visited-state keys.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
    pub fn ptr_eq(&self, other: &Runtype) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn tag(&self) -> Tag {
        match self.node() {
            Node::Primitive(kind) => kind.tag(),
            Node::Literal(_) => Tag::Literal,
            Node::Array(_) => Tag::Array,
            Node::Tuple(_) => Tag::Tuple,
            Node::Object(_) => Tag::Object,
            Node::Record(_) => Tag::Record,
            Node::Union(_) => Tag::Union,
            Node::Intersect(_) => Tag::Intersect,
            Node::Constraint(_) => Tag::Constraint,
            Node::Brand(_) => Tag::Brand,
            Node::Named(_) => Tag::Named,
            Node::Parsed(_) => Tag::Parsed,
            Node::Lazy(_) => Tag::Lazy,
            Node::Sealed(_) => Tag::Sealed,
            Node::InstanceOf(_) => Tag::InstanceOf,
            Node::KeyOf(_) => Tag::KeyOf,
            Node::Enum(_) => Tag::Enum,
            Node::Never => Tag::Never,
            Node::Unknown => Tag::Unknown,
        }
    }

    /// The single child a see-through wrapper stands for in `mode`, if any.
    pub fn underlying_type(&self, mode: Mode) -> Option<Runtype> {
        match self.node() {
            Node::Constraint(shape) => Some(shape.underlying.clone()),
            Node::Brand(shape) => Some(shape.entity.clone()),
            Node::Named(shape) => Some(shape.underlying.clone()),
            Node::Lazy(shape) => Some(shape.resolve().clone()),
            Node::Sealed(shape) => Some(shape.underlying.clone()),
            Node::Parsed(shape) => shape.underlying_type(mode),
            Node::Primitive(_)
            | Node::Literal(_)
            | Node::Array(_)
            | Node::Tuple(_)
            | Node::Object(_)
            | Node::Record(_)
            | Node::Union(_)
            | Node::Intersect(_)
            | Node::InstanceOf(_)
            | Node::KeyOf(_)
            | Node::Enum(_)
            | Node::Never
            | Node::Unknown => None,
        }
    }

    /// Follows `underlying_type` until reaching a structural node.
    pub fn unwrap(&self, mode: Mode) -> Runtype {
        let mut current = self.clone();
        while let Some(next) = current.underlying_type(mode) {
            if next.ptr_eq(&current) {
                break;
            }
            current = next;
        }
        current
    }

    /// The definite set of keys values of this schema may carry;
    /// `None` when the set is open-ended.
    pub fn fields(&self, mode: Mode) -> Option<IndexSet<String>> {
        crate::seal::fields(self, mode)
    }

    pub fn show(&self) -> String {
        show::show_type(self, false)
    }

    // ------------------------------ Validation ---------------------------- //

    /// Validates `value` and applies every parse transform; never panics on data.
    pub fn safe_parse(&self, value: &Value) -> Validation {
        Evaluator::new(Mode::Parse).run(self, value)
    }
    pub fn parse(&self, value: &Value) -> Result<Value, ValidationError> {
        Ok(self.safe_parse(value)?)
    }
    /// Validates `value` and applies every inverse transform.
    pub fn safe_serialize(&self, value: &Value) -> Validation {
        Evaluator::new(Mode::Serialize).run(self, value)
    }
    pub fn serialize(&self, value: &Value) -> Result<Value, ValidationError> {
        Ok(self.safe_serialize(value)?)
    }
    /// The guard pass: the first violation, without building any output.
    pub fn check(&self, value: &Value) -> Result<(), Failure> {
        guard::guard(self, value, &None, false)
    }
    pub fn test(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }
    pub fn assert(&self, value: &Value) -> Result<(), ValidationError> {
        Ok(self.check(value)?)
    }

    // ------------------------------- Builders ----------------------------- //

    pub fn with_constraint<V: Into<Verdict>>(
        self,
        predicate: impl Fn(&Value) -> V + Send + Sync + 'static,
    ) -> Runtype {
        crate::types::constraint::constraint(self, predicate)
    }
    pub fn with_parser(self, parser: Parser) -> Runtype {
        crate::types::parsed::parsed(self, parser)
    }

    /// Pairs every alternative of a union with a case, in order. Fails for
    /// anything but a union, or when the counts differ.
    pub fn matcher<R>(&self, cases: Vec<Box<dyn Fn(&Value) -> R>>) -> Result<Matcher<R>, SchemaError> {
        crate::types::union::matcher(self, cases)
    }
}

impl fmt::Display for Runtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtype<{}>", self.show())
    }
}

impl fmt::Debug for Runtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Runtype").field(&self.show()).finish()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn unwrap_sees_through_wrappers() {
        let inner = object([("a", string())]);
        let wrapped = named("Thing", brand("Id", inner.clone().with_constraint(|_| true)));
        assert_eq!(wrapped.tag(), Tag::Named);
        assert!(wrapped.unwrap(Mode::Parse).ptr_eq(&inner));
        assert!(inner.underlying_type(Mode::Parse).is_none());
    }

    #[test]
    fn display_wraps_the_rendering() {
        assert_eq!(array(number()).to_string(), "Runtype<number[]>");
        assert_eq!(format!("{:?}", string()), "Runtype(\"string\")");
    }

    #[test]
    fn runtypes_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Runtype>();
    }
}
