//! Exact-shape ("sealed") analysis.
//!
//! Two pieces:
//! - [`SealedState`] is the token threaded through a validation call below a
//!   sealed node. Object validation consults it to reject unexpected keys.
//! - [`SealScope`] computes the definite key set a schema contributes, seeing
//!   through wrappers, unions and intersections. Lazy nodes are queued once
//!   per scope and only resolved by an explicit [`SealScope::resolve_pending`],
//!   so recursive schemas cannot send the analysis into a loop.
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexSet;

use crate::runtype::{Mode, Node, Runtype};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SealedState {
    pub(crate) deep: bool,
    /// Keys contributed by sibling intersectees; never unexpected here.
    pub(crate) keys_from_intersect: Option<Rc<IndexSet<String>>>,
}

/// `None` when no exact-shape check applies.
pub(crate) type Seal = Option<SealedState>;

/// Accumulates the keys a set of schemas may contribute.
pub struct SealScope {
    mode: Mode,
    fields: IndexSet<String>,
    unbounded: bool,
    pending: VecDeque<Runtype>,
    seen_lazy: HashSet<usize>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SealedState {
    pub(crate) fn new(deep: bool) -> Self {
        SealedState { deep, keys_from_intersect: None }
    }
    pub(crate) fn permits(&self, key: &str) -> bool {
        self.keys_from_intersect.as_ref().is_some_and(|keys| keys.contains(key))
    }
}

/// What the children of a sealed container inherit: a fresh deep seal, or nothing.
pub(crate) fn for_children(sealed: &Seal) -> Seal {
    match sealed {
        Some(state) if state.deep => Some(SealedState::new(true)),
        _ => None,
    }
}

/// The seal for one intersectee: its siblings' keys become permitted. An
/// open-ended sibling turns the check off for this branch.
pub(crate) fn for_intersectee(sealed: &Seal, parts: &[Runtype], target: &Runtype, mode: Mode) -> Seal {
    let state = sealed.as_ref()?;
    let mut scope = SealScope::new(mode);
    for part in parts.iter().filter(|part| !part.ptr_eq(target)) {
        scope.add(part);
    }
    let keys = scope.finish()?;
    Some(SealedState { deep: state.deep, keys_from_intersect: Some(Rc::new(keys)) })
}

/// Key set of a single schema; `None` when open-ended.
pub(crate) fn fields(node: &Runtype, mode: Mode) -> Option<IndexSet<String>> {
    let mut scope = SealScope::new(mode);
    scope.add(node);
    scope.finish()
}

impl SealScope {
    pub fn new(mode: Mode) -> Self {
        SealScope {
            mode,
            fields: IndexSet::new(),
            unbounded: false,
            pending: VecDeque::new(),
            seen_lazy: HashSet::new(),
        }
    }

    pub fn add(&mut self, node: &Runtype) {
        match node.node() {
            Node::Object(shape) => self.fields.extend(shape.fields.keys().cloned()),
            Node::Never => {}
            Node::Union(shape) => {
                for alternative in shape.alternatives.iter() {
                    self.add(alternative);
                }
            }
            Node::Intersect(shape) => {
                for part in shape.parts.iter() {
                    self.add(part);
                }
            }
            Node::Lazy(_) => {
                if self.seen_lazy.insert(node.id()) {
                    self.pending.push_back(node.clone());
                }
            }
            Node::Constraint(shape) => self.add(&shape.underlying),
            Node::Brand(shape) => self.add(&shape.entity),
            Node::Named(shape) => self.add(&shape.underlying),
            Node::Sealed(shape) => self.add(&shape.underlying),
            Node::Parsed(shape) => match shape.underlying_type(self.mode) {
                Some(underlying) => self.add(&underlying),
                None => self.unbounded = true,
            },
            Node::Primitive(_)
            | Node::Literal(_)
            | Node::Array(_)
            | Node::Tuple(_)
            | Node::Record(_)
            | Node::InstanceOf(_)
            | Node::KeyOf(_)
            | Node::Enum(_)
            | Node::Unknown => self.unbounded = true,
        }
    }

    /// Lazy nodes queued and not yet resolved.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Resolves queued lazy nodes until none are left. Each lazy node is
    /// visited at most once per scope, so this terminates on recursive schemas.
    pub fn resolve_pending(&mut self) {
        while let Some(lazy) = self.pending.pop_front() {
            if let Node::Lazy(shape) = lazy.node() {
                let target = shape.resolve().clone();
                self.add(&target);
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// The key set, after resolving everything still pending.
    pub fn finish(mut self) -> Option<IndexSet<String>> {
        self.resolve_pending();
        if self.unbounded { None } else { Some(self.fields) }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn keys(set: Option<IndexSet<String>>) -> Option<Vec<String>> {
        set.map(|s| s.into_iter().collect())
    }

    #[test]
    fn unions_and_intersections_merge_keys() {
        let a = object([("a", string())]);
        let b = partial_object([("b", number())]);
        let both = intersect([a.clone(), union([b, never()])]);
        assert_eq!(keys(both.fields(Mode::Parse)), Some(vec!["a".into(), "b".into()]));
        assert_eq!(keys(union([a, string()]).fields(Mode::Parse)), None);
    }

    #[test]
    fn lazy_nodes_wait_for_explicit_resolution() {
        let node = recursive(|this| object([("child", union([null(), this]))]));
        let mut scope = SealScope::new(Mode::Parse);
        scope.add(&node);
        assert_eq!(scope.pending(), 1);
        scope.resolve_pending();
        assert_eq!(scope.pending(), 0);
        assert_eq!(keys(scope.finish()), Some(vec!["child".into()]));
    }

    #[test]
    fn self_referential_unions_terminate() {
        let node = recursive(|this| union([object([("x", number())]), intersect([this.clone(), object([("y", number())])])]));
        assert_eq!(keys(node.fields(Mode::Parse)), Some(vec!["x".into(), "y".into()]));
    }

    #[test]
    fn parsed_values_expose_a_shape_per_mode() {
        let parsed = string().with_parser(Parser::new(|value| Ok(value.clone())));
        assert_eq!(keys(parsed.fields(Mode::Serialize)), Some(vec![]));
        assert_eq!(keys(parsed.fields(Mode::Test)), None);
        assert_eq!(keys(parsed.fields(Mode::Parse)), None);
    }

    #[test]
    fn deep_seals_propagate_to_children() {
        assert_eq!(for_children(&Some(SealedState::new(true))), Some(SealedState::new(true)));
        assert_eq!(for_children(&Some(SealedState::new(false))), None);
        assert_eq!(for_children(&None), None);
    }
}
