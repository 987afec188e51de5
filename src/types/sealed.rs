//! Exact-shape wrappers.
//!
//! Sealing starts a [`SealedState`] for the wrapped schema. Objects below it
//! reject keys that no path through the schema accounts for; a deep seal
//! carries the check into nested containers.
use crate::eval::{Step, Visit};
use crate::runtype::{Node, Runtype};
use crate::seal::SealedState;
use crate::value::Value;

pub(crate) struct SealedShape {
    pub(crate) underlying: Runtype,
    pub(crate) deep: bool,
}

/// Rejects unexpected keys at the top level only.
pub fn sealed(underlying: Runtype) -> Runtype {
    Runtype::from_node(Node::Sealed(SealedShape { underlying, deep: false }))
}

/// Rejects unexpected keys at every level.
pub fn sealed_deep(underlying: Runtype) -> Runtype {
    Runtype::from_node(Node::Sealed(SealedShape { underlying, deep: true }))
}

pub(crate) fn parse(shape: &SealedShape, value: &Value, cx: &dyn Visit) -> Step {
    cx.validate_to_placeholder(&shape.underlying, value, &Some(SealedState::new(shape.deep)))
}

// ------------------------------- Tests ------------------------------------ //
