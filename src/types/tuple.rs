//! Fixed-length, positionally typed arrays.
use std::sync::Arc;

use crate::eval::{Cycle, Step};
use crate::result::{FailureCollector, expected};
use crate::runtype::{Node, Runtype};
use crate::seal::{Seal, for_children};
use crate::value::Value;

pub(crate) struct TupleShape {
    pub(crate) components: Arc<[Runtype]>,
    pub(crate) readonly: bool,
}

pub fn tuple(components: impl IntoIterator<Item = Runtype>) -> Runtype {
    build(components.into_iter().collect(), false)
}

pub fn readonly_tuple(components: impl IntoIterator<Item = Runtype>) -> Runtype {
    build(components.into_iter().collect(), true)
}

pub(crate) fn build(components: Arc<[Runtype]>, readonly: bool) -> Runtype {
    Runtype::from_node(Node::Tuple(TupleShape { components, readonly }))
}

pub(crate) fn parse(node: &Runtype, shape: &TupleShape, value: &Value, sealed: &Seal) -> Step {
    let Value::Array(source) = value else {
        return Step::Done(Err(expected("tuple to be an array", value)));
    };
    let items = source.snapshot();
    if items.len() != shape.components.len() {
        let wanted = format!("an array of length {}", shape.components.len());
        return Step::Done(Err(expected(&wanted, &Value::Number(items.len() as f64))));
    }
    let (node, components, raw) = (node.clone(), shape.components.clone(), value.clone());
    let child_seal = for_children(sealed);
    Cycle::array(items.clone(), move |cx, placeholder| {
        let mut failures = FailureCollector::new(&raw, &node);
        for (index, (component, item)) in components.iter().zip(items.iter()).enumerate() {
            match cx.validate(component, item, &child_seal) {
                Ok(validated) => placeholder.set(index, validated),
                Err(failure) => {
                    let at = format!("[{index}]");
                    failures.child(&at, &at, failure);
                }
            }
        }
        failures.finish()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use serde_json::json;

    #[test]
    fn length_must_match() {
        let schema = tuple([number(), string()]);
        assert!(schema.test(&Value::from(json!([1, "a"]))));
        let failure = schema.safe_parse(&Value::from(json!([1, "a", true]))).unwrap_err();
        assert_eq!(failure.message, "Expected an array of length 2, but was 3");
        let failure = schema.safe_parse(&Value::from(json!("nope"))).unwrap_err();
        assert_eq!(failure.message, "Expected tuple to be an array, but was \"nope\"");
    }

    #[test]
    fn component_failures_carry_their_index() {
        let schema = readonly_tuple([literal(1.0), object([("size", number())])]);
        let failure = schema.safe_parse(&Value::from(json!([1, {"size": "x"}]))).unwrap_err();
        assert_eq!(failure.key.as_deref(), Some("[1].size"));
        assert_eq!(
            failure.full_error.unwrap().title,
            "Unable to assign [1, {size: \"x\"}] to readonly [1, { size: number }]"
        );
    }
}
