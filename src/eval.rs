//! Evaluators.
//!
//! One [`Evaluator`] runs one top-level parse or serialize call; the guard
//! pass has its own evaluator in [`guard`]. Both drive the same per-node
//! [`step`] function through the [`Visit`] seam.
//!
//! Design goals:
//! - Visited state is per call, keyed on (node identity, raw value identity).
//! - Containers answer with a [`Cycle`] placeholder that is registered before
//!   it is filled, so a value that reaches itself again aliases the
//!   in-progress output instead of recursing forever.
//! - No `RefCell` borrow is held across a child validation.
pub(crate) mod cycle;
pub(crate) mod guard;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) use cycle::{Cycle, Step, map_placeholder};

use crate::result::Validation;
use crate::runtype::{Mode, Node, Runtype};
use crate::seal::Seal;
use crate::types::{
    array, constraint, intersect, literal, nominal, object, parsed, primitive, record, sealed,
    tuple, union,
};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// What a node's step may call back into.
pub(crate) trait Visit {
    fn mode(&self) -> Mode;
    /// Validates a child to completion, unwrapping any placeholder.
    fn validate(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Validation;
    /// Validates a child but hands back an unfinished placeholder as-is.
    fn validate_to_placeholder(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Step;
}

struct Visited {
    // Held so the addresses used as keys cannot be reused during the call.
    _node: Runtype,
    _value: Value,
    cycle: Rc<Cycle>,
}

pub(crate) struct Evaluator {
    mode: Mode,
    visited: RefCell<HashMap<(usize, usize), Visited>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Evaluator {
    pub(crate) fn new(mode: Mode) -> Self {
        Evaluator { mode, visited: RefCell::new(HashMap::new()) }
    }
    pub(crate) fn run(&self, node: &Runtype, value: &Value) -> Validation {
        self.validate(node, value, &None)
    }
}

impl Visit for Evaluator {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn validate(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Validation {
        self.validate_to_placeholder(node, value, sealed).resolve(self)
    }

    fn validate_to_placeholder(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Step {
        let key = value.identity().map(|id| (node.id(), id));
        if let Some(key) = key {
            let cached = self.visited.borrow().get(&key).map(|entry| entry.cycle.clone());
            if let Some(cycle) = cached {
                return Step::Cycle(cycle);
            }
        }
        let outcome = step(node, value, self, sealed);
        if let (Some(key), Step::Cycle(cycle)) = (key, &outcome) {
            let entry = Visited { _node: node.clone(), _value: value.clone(), cycle: cycle.clone() };
            self.visited.borrow_mut().insert(key, entry);
        }
        outcome
    }
}

/// One node's contribution to a pass. Exhaustive over node kinds.
pub(crate) fn step(node: &Runtype, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Step {
    match node.node() {
        Node::Primitive(kind) => Step::Done(primitive::parse(*kind, value)),
        Node::Literal(expected) => Step::Done(literal::parse(expected, value)),
        Node::Array(shape) => array::parse(node, shape, value, sealed),
        Node::Tuple(shape) => tuple::parse(node, shape, value, sealed),
        Node::Object(shape) => object::parse(node, shape, value, sealed),
        Node::Record(shape) => record::parse(node, shape, value, sealed),
        Node::Union(shape) => Step::Done(union::parse(node, shape, value, cx, sealed)),
        Node::Intersect(shape) => intersect::parse(shape, value, cx, sealed),
        Node::Constraint(shape) => Step::Done(constraint::parse(node, shape, value, cx, sealed)),
        Node::Brand(shape) => cx.validate_to_placeholder(&shape.entity, value, sealed),
        Node::Named(shape) => cx.validate_to_placeholder(&shape.underlying, value, sealed),
        Node::Lazy(shape) => cx.validate_to_placeholder(shape.resolve(), value, sealed),
        Node::Parsed(shape) => match cx.mode() {
            Mode::Serialize => parsed::serialize(shape, value, cx, sealed),
            Mode::Parse | Mode::Test => parsed::parse(shape, value, cx, sealed),
        },
        Node::Sealed(shape) => sealed::parse(shape, value, cx),
        Node::InstanceOf(class) => Step::Done(nominal::parse_instance_of(class, value)),
        Node::KeyOf(shape) => Step::Done(nominal::parse_key_of(shape, value)),
        Node::Enum(shape) => Step::Done(nominal::parse_enum(shape, value)),
        Node::Never => Step::Done(nominal::parse_never(value)),
        Node::Unknown => Step::Done(Ok(value.clone())),
    }
}
