//! Intersections: every part must accept the value.
//!
//! Container values are validated part by part into one shared placeholder,
//! so each part may add or normalize its own fields. A part that turns an
//! array or object into something else is an error.
use std::sync::Arc;

use crate::eval::{Cycle, Step, Visit};
use crate::result::Failure;
use crate::runtype::{Node, Runtype};
use crate::seal::{Seal, for_intersectee};
use crate::types::nominal::unknown;
use crate::value::Value;

pub(crate) struct IntersectShape {
    pub(crate) parts: Arc<[Runtype]>,
}

/// An empty intersection accepts anything.
pub fn intersect(parts: impl IntoIterator<Item = Runtype>) -> Runtype {
    let parts: Arc<[Runtype]> = parts.into_iter().collect();
    if parts.is_empty() {
        return unknown();
    }
    Runtype::from_node(Node::Intersect(IntersectShape { parts }))
}

fn conversion_error(part: &Runtype, from: &str) -> Failure {
    Failure::new(format!(
        "The validator {} attempted to convert the type of this value from {from} to something else. \
         That conversion is not valid as the child of an intersect",
        part.show()
    ))
}

pub(crate) fn parse(shape: &IntersectShape, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Step {
    let parts = shape.parts.clone();
    let sealed = sealed.clone();
    match value {
        Value::Array(source) => Cycle::array(source.snapshot(), move |cx, placeholder| {
            let current = Value::Array(placeholder.clone());
            for part in parts.iter() {
                let seal = for_intersectee(&sealed, &parts, part, cx.mode());
                match cx.validate(part, &current, &seal) {
                    Err(failure) => return Some(failure),
                    Ok(Value::Array(items)) => {
                        if !items.ptr_eq(placeholder) {
                            placeholder.replace(items.snapshot());
                        }
                    }
                    Ok(_) => return Some(conversion_error(part, "an array")),
                }
            }
            None
        }),
        Value::Object(_) => {
            let raw = value.clone();
            Cycle::object(move |cx, placeholder| {
                for part in parts.iter() {
                    let seal = for_intersectee(&sealed, &parts, part, cx.mode());
                    match cx.validate(part, &raw, &seal) {
                        Err(failure) => return Some(failure),
                        Ok(Value::Object(fields)) => placeholder.assign(&fields),
                        Ok(Value::Array(items)) => {
                            for (index, item) in items.snapshot().into_iter().enumerate() {
                                placeholder.insert(index.to_string(), item);
                            }
                        }
                        Ok(_) => return Some(conversion_error(part, "an object")),
                    }
                }
                None
            })
        }
        _ => {
            let mut current = value.clone();
            for part in parts.iter() {
                let seal = for_intersectee(&sealed, &parts, part, cx.mode());
                match cx.validate(part, &current, &seal) {
                    Ok(next) => current = next,
                    Err(failure) => return Step::Done(Err(failure)),
                }
            }
            Step::Done(Ok(current))
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use serde_json::json;

    #[test]
    fn object_parts_merge() {
        let schema = intersect([object([("a", string())]), object([("b", number())])]);
        let out = schema.parse(&Value::from(json!({"a": "x", "b": 1, "c": true}))).unwrap();
        assert_eq!(out, Value::from(json!({"a": "x", "b": 1})));
        let failure = schema.safe_parse(&Value::from(json!({"a": "x"}))).unwrap_err();
        assert_eq!(failure.key.as_deref(), Some("b"));
    }

    #[test]
    fn scalars_thread_through_every_part() {
        let positive = number().with_constraint(|v| matches!(v, Value::Number(n) if *n > 0.0));
        let schema = intersect([number(), positive]);
        assert!(schema.test(&Value::from(3.0)));
        assert!(!schema.test(&Value::from(-3.0)));
    }

    #[test]
    fn parts_may_not_change_container_kind() {
        let flatten = Parser::new(|_| Ok(Value::from("flat")));
        let schema = intersect([array(number()), array(number()).with_parser(flatten)]);
        let failure = schema.safe_parse(&Value::from(json!([1]))).unwrap_err();
        assert!(failure.message.starts_with("The validator ParsedValue<number[]> attempted to convert"));
        assert!(failure.message.ends_with("from an array to something else. That conversion is not valid as the child of an intersect"));
    }

    #[test]
    fn empty_intersection_is_unknown() {
        assert_eq!(intersect(Vec::new()).tag(), crate::runtype::Tag::Unknown);
    }

    #[test]
    fn sealed_intersections_share_their_keys() {
        let schema = sealed(intersect([object([("a", string())]), object([("b", number())])]));
        assert!(schema.test(&Value::from(json!({"a": "x", "b": 1}))));
        let failure = schema.safe_parse(&Value::from(json!({"a": "x", "b": 1, "c": 2}))).unwrap_err();
        assert_eq!(failure.message, "Unexpected property: c");
    }
}
