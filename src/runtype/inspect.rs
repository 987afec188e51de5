//! Read-only views of schema nodes.
//!
//! [`Runtype::inspect`] hands back the pieces a node was built from, borrowed
//! from the node, so callers can walk a schema (to generate docs, forms or
//! other schemas) without access to the node representation.
use indexmap::{IndexMap, IndexSet};

use crate::runtype::{Node, Runtype};
use crate::types::lazy::LazyShape;
use crate::types::primitive::Primitive;
use crate::value::LiteralValue;

/// One node, by kind.
pub enum Shape<'a> {
    Boolean,
    Number,
    String,
    Symbol,
    BigInt,
    Function,
    Literal(&'a LiteralValue),
    Array { element: &'a Runtype, readonly: bool },
    Tuple { components: &'a [Runtype], readonly: bool },
    Object { fields: &'a IndexMap<String, Runtype>, partial: bool, readonly: bool },
    Record { key: &'a Runtype, value: &'a Runtype, readonly: bool },
    Union { alternatives: &'a [Runtype] },
    Intersect { parts: &'a [Runtype] },
    Constraint { underlying: &'a Runtype, name: Option<&'a str> },
    Brand { brand: &'a str, entity: &'a Runtype },
    Named { name: &'a str, underlying: &'a Runtype },
    Parsed { underlying: &'a Runtype, name: Option<&'a str>, test: Option<&'a Runtype> },
    Lazy(LazyTarget<'a>),
    Sealed { underlying: &'a Runtype, deep: bool },
    InstanceOf { class: &'a str },
    KeyOf { keys: &'a IndexSet<String> },
    Enum { name: &'a str, members: &'a IndexMap<String, LiteralValue> },
    Never,
    Unknown,
}

/// The target of a lazy node, resolved (and memoized) only on request.
pub struct LazyTarget<'a>(&'a LazyShape);

impl LazyTarget<'_> {
    pub fn resolve(&self) -> &Runtype {
        self.0.resolve()
    }
}

impl Runtype {
    pub fn inspect(&self) -> Shape<'_> {
        match self.node() {
            Node::Primitive(Primitive::Boolean) => Shape::Boolean,
            Node::Primitive(Primitive::Number) => Shape::Number,
            Node::Primitive(Primitive::String) => Shape::String,
            Node::Primitive(Primitive::Symbol) => Shape::Symbol,
            Node::Primitive(Primitive::BigInt) => Shape::BigInt,
            Node::Primitive(Primitive::Function) => Shape::Function,
            Node::Literal(value) => Shape::Literal(value),
            Node::Array(shape) => Shape::Array { element: &shape.element, readonly: shape.readonly },
            Node::Tuple(shape) => Shape::Tuple { components: &*shape.components, readonly: shape.readonly },
            Node::Object(shape) => {
                Shape::Object { fields: &*shape.fields, partial: shape.partial, readonly: shape.readonly }
            }
            Node::Record(shape) => Shape::Record { key: &shape.key, value: &shape.value, readonly: shape.readonly },
            Node::Union(shape) => Shape::Union { alternatives: &*shape.alternatives },
            Node::Intersect(shape) => Shape::Intersect { parts: &*shape.parts },
            Node::Constraint(shape) => {
                Shape::Constraint { underlying: &shape.underlying, name: shape.name.as_deref() }
            }
            Node::Brand(shape) => Shape::Brand { brand: &shape.brand, entity: &shape.entity },
            Node::Named(shape) => Shape::Named { name: &shape.name, underlying: &shape.underlying },
            Node::Parsed(shape) => {
                Shape::Parsed { underlying: &shape.underlying, name: shape.name(), test: shape.test_schema() }
            }
            Node::Lazy(shape) => Shape::Lazy(LazyTarget(shape)),
            Node::Sealed(shape) => Shape::Sealed { underlying: &shape.underlying, deep: shape.deep },
            Node::InstanceOf(class) => Shape::InstanceOf { class: class.as_str() },
            Node::KeyOf(shape) => Shape::KeyOf { keys: &shape.keys },
            Node::Enum(shape) => Shape::Enum { name: &shape.name, members: &shape.members },
            Node::Never => Shape::Never,
            Node::Unknown => Shape::Unknown,
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
