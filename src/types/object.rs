//! Object schemas: a fixed, ordered set of named fields.
//!
//! Fields are validated in declaration order and every failing field lands in
//! the report, but the message and key are those of the first. Under a seal,
//! keys that are neither declared nor contributed by a sibling intersectee
//! are unexpected.
use std::sync::Arc;

use indexmap::IndexMap;

use crate::eval::{Cycle, Step};
use crate::result::{Failure, FailureCollector, expected};
use crate::runtype::{Node, Runtype};
use crate::seal::{Seal, for_children};
use crate::value::Value;

pub(crate) struct ObjectShape {
    pub(crate) fields: Arc<IndexMap<String, Runtype>>,
    pub(crate) partial: bool,
    pub(crate) readonly: bool,
}

pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Runtype)>) -> Runtype {
    build(collect(fields), false, false)
}

pub fn readonly_object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Runtype)>) -> Runtype {
    build(collect(fields), false, true)
}

/// Every field optional: absent or `undefined` fields are skipped.
pub fn partial_object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Runtype)>) -> Runtype {
    build(collect(fields), true, false)
}

pub fn readonly_partial_object<K: Into<String>>(
    fields: impl IntoIterator<Item = (K, Runtype)>,
) -> Runtype {
    build(collect(fields), true, true)
}

fn collect<K: Into<String>>(fields: impl IntoIterator<Item = (K, Runtype)>) -> IndexMap<String, Runtype> {
    fields.into_iter().map(|(key, runtype)| (key.into(), runtype)).collect()
}

pub(crate) fn build(fields: IndexMap<String, Runtype>, partial: bool, readonly: bool) -> Runtype {
    Runtype::from_node(Node::Object(ObjectShape { fields: Arc::new(fields), partial, readonly }))
}

pub(crate) fn parse(node: &Runtype, shape: &ObjectShape, value: &Value, sealed: &Seal) -> Step {
    let source = match value {
        Value::Object(source) => source.clone(),
        Value::Array(_) => {
            return Step::Done(Err(Failure::new(format!("Expected {}, but was an Array", node.show()))));
        }
        other => return Step::Done(Err(expected(node, other))),
    };
    let (node, fields, partial, raw) = (node.clone(), shape.fields.clone(), shape.partial, value.clone());
    let sealed = sealed.clone();
    Cycle::object(move |cx, placeholder| {
        let child_seal = for_children(&sealed);
        let mut failures = FailureCollector::new(&raw, &node);
        for (key, field) in fields.iter() {
            let present = source.get(key);
            if partial && present.as_ref().is_none_or(|v| matches!(v, Value::Undefined)) {
                continue;
            }
            let field_value = present.unwrap_or(Value::Undefined);
            match cx.validate(field, &field_value, &child_seal) {
                Ok(validated) => placeholder.insert(key.clone(), validated),
                Err(failure) => failures.child(&format!("\"{key}\""), key, failure),
            }
        }
        if let Some(state) = sealed.as_ref().filter(|_| failures.is_clean()) {
            for key in source.keys() {
                if !fields.contains_key(&key) && !state.permits(&key) {
                    failures.unexpected(&key);
                }
            }
        }
        failures.finish()
    })
}
