//! Deferred schemas, the building block for recursion.
//!
//! The target is resolved on first use and memoized. A recursive schema
//! holds a strong reference to itself through its target, so it is never
//! freed; schemas are expected to live for the whole program.
use once_cell::sync::OnceCell;

use crate::runtype::{Node, Runtype};
use crate::types::nominal::never;

type Thunk = Box<dyn Fn() -> Runtype + Send + Sync>;

enum LazySource {
    Thunk(Thunk),
    /// Bound later through [`bind`]; resolves to `never` if it never is.
    Deferred,
}

pub(crate) struct LazyShape {
    source: LazySource,
    target: OnceCell<Runtype>,
}

impl LazyShape {
    pub(crate) fn resolve(&self) -> &Runtype {
        self.target.get_or_init(|| match &self.source {
            LazySource::Thunk(thunk) => {
                tracing::trace!("resolving lazy schema");
                thunk()
            }
            LazySource::Deferred => {
                tracing::warn!("lazy schema used before it was bound; treating it as never");
                never()
            }
        })
    }
}

pub fn lazy(thunk: impl Fn() -> Runtype + Send + Sync + 'static) -> Runtype {
    Runtype::from_node(Node::Lazy(LazyShape { source: LazySource::Thunk(Box::new(thunk)), target: OnceCell::new() }))
}

/// Builds a self-referential schema: `define` receives a handle to the
/// schema being defined.
pub fn recursive(define: impl FnOnce(Runtype) -> Runtype) -> Runtype {
    let handle = unbound();
    let target = define(handle.clone());
    bind(&handle, target);
    handle
}

pub(crate) fn unbound() -> Runtype {
    Runtype::from_node(Node::Lazy(LazyShape { source: LazySource::Deferred, target: OnceCell::new() }))
}

/// Points an [`unbound`] handle at its target. Returns `false` when the
/// handle is not a lazy node or was already resolved.
pub(crate) fn bind(handle: &Runtype, target: Runtype) -> bool {
    match handle.node() {
        Node::Lazy(shape) => shape.target.set(target).is_ok(),
        _ => false,
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use crate::value::{Object, Value};
    use serde_json::json;

    fn linked_list() -> Runtype {
        recursive(|list| object([("value", number()), ("next", union([null(), list]))]))
    }

    #[test]
    fn recursive_schemas_validate_nested_data() {
        let schema = linked_list();
        assert!(schema.test(&Value::from(json!({"value": 1, "next": {"value": 2, "next": null}}))));
        let failure = schema
            .safe_parse(&Value::from(json!({"value": 1, "next": {"value": "x", "next": null}})))
            .unwrap_err();
        assert_eq!(failure.key.as_deref(), Some("next.value"));
    }

    #[test]
    fn cyclic_values_produce_cyclic_output() {
        let node = Object::new();
        node.insert("value", Value::from(1.0));
        node.insert("next", Value::Object(node.clone()));
        let out = linked_list().parse(&Value::Object(node)).unwrap();
        let Value::Object(out) = out else { panic!("expected an object") };
        let Some(Value::Object(next)) = out.get("next") else { panic!("expected a nested object") };
        assert!(next.ptr_eq(&out));
    }

    #[test]
    fn thunks_resolve_once() {
        let schema = lazy(|| string());
        assert!(schema.test(&Value::from("a")));
        let Node::Lazy(shape) = schema.node() else { panic!("expected a lazy node") };
        assert!(shape.resolve().ptr_eq(shape.resolve()));
    }

    #[test]
    fn unbound_handles_act_as_never() {
        let handle = unbound();
        assert!(!handle.test(&Value::Null));
        assert!(!bind(&handle, string()));
        assert!(!bind(&string(), number()));
    }
}
