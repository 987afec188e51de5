//! The guard ("test") pass.
//!
//! Reports the first violation and builds no output. Reference values are
//! remembered per node, so a shared or cyclic subgraph is checked once.
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::eval::{Step, Visit, step};
use crate::result::{Failure, Validation};
use crate::runtype::{Mode, Node, Runtype};
use crate::seal::Seal;
use crate::types::parsed;
use crate::value::Value;

pub(crate) struct GuardEvaluator {
    visited: RefCell<HashMap<usize, HashSet<usize>>>,
    // Keeps visited values alive so their addresses stay unique for the call.
    retained: RefCell<Vec<Value>>,
}

/// Adapts the guard to the parse-shaped [`Visit`] seam: a passing child
/// validates to itself.
struct GuardVisit<'a> {
    guard: &'a GuardEvaluator,
    optional: bool,
}

/// Runs a fresh guard pass. `optional` lets transforms without a declared
/// post-condition pass instead of failing.
pub(crate) fn guard(node: &Runtype, value: &Value, sealed: &Seal, optional: bool) -> Result<(), Failure> {
    GuardEvaluator::new().check(node, value, sealed, optional)
}

impl GuardEvaluator {
    pub(crate) fn new() -> Self {
        GuardEvaluator { visited: RefCell::new(HashMap::new()), retained: RefCell::new(Vec::new()) }
    }

    pub(crate) fn check(
        &self,
        node: &Runtype,
        value: &Value,
        sealed: &Seal,
        optional: bool,
    ) -> Result<(), Failure> {
        if let Some(id) = value.identity() {
            let fresh = self.visited.borrow_mut().entry(node.id()).or_default().insert(id);
            if !fresh {
                return Ok(());
            }
            self.retained.borrow_mut().push(value.clone());
        }
        if let Node::Parsed(shape) = node.node() {
            return parsed::test(shape, value, self, sealed, optional);
        }
        let cx = GuardVisit { guard: self, optional };
        match step(node, value, &cx, sealed) {
            Step::Done(result) => result.map(drop),
            Step::Cycle(cycle) => cycle.unwrap(&cx).map(drop),
        }
    }
}

impl Visit for GuardVisit<'_> {
    fn mode(&self) -> Mode {
        Mode::Test
    }
    fn validate(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Validation {
        self.guard.check(node, value, sealed, self.optional).map(|()| value.clone())
    }
    fn validate_to_placeholder(&self, node: &Runtype, value: &Value, sealed: &Seal) -> Step {
        Step::Done(self.validate(node, value, sealed))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::*;
    use crate::value::{Object, Value};

    #[test]
    fn shared_subgraphs_are_checked_once() {
        let node = recursive(|this| object([("next", union([null(), this]))]));
        let a = Object::new();
        a.insert("next", Value::Object(a.clone()));
        assert!(node.test(&Value::Object(a)));
    }

    #[test]
    fn first_violation_is_reported() {
        let schema = object([("a", string()), ("b", number())]);
        let value = Value::from(serde_json::json!({"a": 1, "b": "x"}));
        let failure = schema.check(&value).unwrap_err();
        assert_eq!(failure.key.as_deref(), Some("a"));
        assert_eq!(failure.message, "Expected string, but was 1");
    }
}
