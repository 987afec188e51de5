//! Homogeneous arrays.
use crate::eval::{Cycle, Step};
use crate::result::{FailureCollector, expected};
use crate::runtype::{Node, Runtype};
use crate::seal::{Seal, for_children};
use crate::value::Value;

pub(crate) struct ArrayShape {
    pub(crate) element: Runtype,
    pub(crate) readonly: bool,
}

pub fn array(element: Runtype) -> Runtype {
    Runtype::from_node(Node::Array(ArrayShape { element, readonly: false }))
}

pub fn readonly_array(element: Runtype) -> Runtype {
    Runtype::from_node(Node::Array(ArrayShape { element, readonly: true }))
}

pub(crate) fn parse(node: &Runtype, shape: &ArrayShape, value: &Value, sealed: &Seal) -> Step {
    let Value::Array(source) = value else {
        return Step::Done(Err(expected("an Array", value)));
    };
    let items = source.snapshot();
    let (node, element, raw) = (node.clone(), shape.element.clone(), value.clone());
    let child_seal = for_children(sealed);
    Cycle::array(items.clone(), move |cx, placeholder| {
        let mut failures = FailureCollector::new(&raw, &node);
        for (index, item) in items.iter().enumerate() {
            match cx.validate(&element, item, &child_seal) {
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
    fn validates_every_element() {
        let schema = array(number());
        let out = schema.parse(&Value::from(json!([1, 2, 3]))).unwrap();
        assert_eq!(out, Value::from(json!([1, 2, 3])));

        let failure = schema.safe_parse(&Value::from(json!([1, "a", "b"]))).unwrap_err();
        assert_eq!(failure.key.as_deref(), Some("[1]"));
        assert_eq!(
            failure.render(),
            [
                "Unable to assign [1, \"a\", \"b\"] to number[]",
                "  The types of [1] are not compatible",
                "    Expected number, but was \"a\" (i.e. a string literal)",
                "  The types of [2] are not compatible",
                "    Expected number, but was \"b\" (i.e. a string literal)",
            ]
            .join("\n")
        );
    }

    #[test]
    fn rejects_non_arrays() {
        let failure = readonly_array(string()).safe_parse(&Value::from(json!({"0": "a"}))).unwrap_err();
        assert_eq!(failure.message, "Expected an Array, but was {0: \"a\"}");
    }

    #[test]
    fn output_is_a_fresh_array() {
        let input = Value::from(json!(["a"]));
        let out = array(string()).parse(&input).unwrap();
        assert!(!out.strict_equals(&input));
        assert_eq!(out, input);
    }
}
