//! Lowering: schema document → engine nodes.
//!
//! Every definition first gets an unbound lazy handle, so `ref` nodes can
//! point at definitions in any order (including themselves). Bodies are then
//! lowered and bound to their handles.
use indexmap::IndexMap;
use regex::Regex;

use crate::error::DocumentError;
use crate::runtype::Runtype;
use crate::schema_doc::{SchemaDocument, SchemaNode};
use crate::types::lazy::{bind, unbound};
use crate::types::*;
use crate::value::{LiteralValue, Value, preview};

/// Builds the root schema of `document`.
pub fn lower_document(document: &SchemaDocument) -> Result<Runtype, DocumentError> {
    let handles: IndexMap<String, Runtype> =
        document.definitions.keys().map(|name| (name.clone(), unbound())).collect();
    let lowering = Lowering { handles };
    for (name, body) in &document.definitions {
        let target = lowering.lower(body)?;
        if let Some(handle) = lowering.handles.get(name) {
            bind(handle, target);
        }
    }
    tracing::debug!(definitions = document.definitions.len(), "lowered schema definitions");
    lowering.lower(&document.root)
}

struct Lowering {
    handles: IndexMap<String, Runtype>,
}

impl Lowering {
    fn lower(&self, node: &SchemaNode) -> Result<Runtype, DocumentError> {
        let runtype = match node {
            SchemaNode::Unknown => unknown(),
            SchemaNode::Never => never(),
            SchemaNode::Boolean => boolean(),
            SchemaNode::Number => number(),
            SchemaNode::String => string(),
            SchemaNode::Bigint => bigint(),
            SchemaNode::Null => null(),
            SchemaNode::Undefined => undefined(),
            SchemaNode::Literal { value } => literal(to_literal(value)?),
            SchemaNode::Array { of, readonly: false } => array(self.lower(of)?),
            SchemaNode::Array { of, readonly: true } => readonly_array(self.lower(of)?),
            SchemaNode::Tuple { of, readonly } => {
                let components = self.lower_all(of)?;
                if *readonly { readonly_tuple(components) } else { tuple(components) }
            }
            SchemaNode::Object { fields, partial, readonly } => {
                let fields = fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), self.lower(field)?)))
                    .collect::<Result<Vec<_>, DocumentError>>()?;
                match (partial, readonly) {
                    (false, false) => object(fields),
                    (false, true) => readonly_object(fields),
                    (true, false) => partial_object(fields),
                    (true, true) => readonly_partial_object(fields),
                }
            }
            SchemaNode::Record { key, value, readonly } => {
                let (key, value) = (self.lower(key)?, self.lower(value)?);
                if *readonly { readonly_record(key, value) } else { record(key, value) }
            }
            SchemaNode::Union { of } => union(self.lower_all(of)?),
            SchemaNode::Intersect { of } => intersect(self.lower_all(of)?),
            SchemaNode::Named { name, of } => named(name.clone(), self.lower(of)?),
            SchemaNode::Brand { brand: tag, of } => brand(tag.clone(), self.lower(of)?),
            SchemaNode::Sealed { of, deep: false } => sealed(self.lower(of)?),
            SchemaNode::Sealed { of, deep: true } => sealed_deep(self.lower(of)?),
            SchemaNode::Enum { name, values } => {
                let members = values
                    .iter()
                    .map(|(member, value)| Ok((member.clone(), to_literal(value)?)))
                    .collect::<Result<Vec<_>, DocumentError>>()?;
                enumeration(name.clone(), members)
            }
            SchemaNode::KeyOf { keys } => key_of(keys.iter().cloned()),
            SchemaNode::Pick { of, keys } => pick(&self.lower(of)?, keys)?,
            SchemaNode::Omit { of, keys } => omit(&self.lower(of)?, keys)?,
            SchemaNode::Partial { of } => partial(&self.lower(of)?)?,
            SchemaNode::Ref { name } => self
                .handles
                .get(name)
                .cloned()
                .ok_or_else(|| DocumentError::UnknownDefinition(name.clone()))?,
            SchemaNode::Integer => constraint_named(number(), "Integer", |value: &Value| {
                matches!(value, Value::Number(n) if n.is_finite() && n.fract() == 0.0)
            }),
            SchemaNode::Pattern { regex } => {
                let compiled = Regex::new(regex)
                    .map_err(|source| DocumentError::Pattern { pattern: regex.clone(), source })?;
                string().with_constraint(move |value: &Value| match value {
                    Value::String(text) if compiled.is_match(text) => Ok(()),
                    other => Err(format!("Expected a string matching /{}/, but was {}", compiled.as_str(), preview(other))),
                })
            }
            SchemaNode::Range { of, min, max } => {
                let (min, max) = (*min, *max);
                self.lower(of)?.with_constraint(move |value: &Value| {
                    let Value::Number(n) = value else { return Ok(()) };
                    match (min, max) {
                        (Some(min), _) if *n < min => Err(format!("Expected at least {min}, but was {}", preview(value))),
                        (_, Some(max)) if *n > max => Err(format!("Expected at most {max}, but was {}", preview(value))),
                        _ => Ok(()),
                    }
                })
            }
        };
        Ok(runtype)
    }

    fn lower_all(&self, nodes: &[SchemaNode]) -> Result<Vec<Runtype>, DocumentError> {
        nodes.iter().map(|node| self.lower(node)).collect()
    }
}

fn to_literal(value: &serde_json::Value) -> Result<LiteralValue, DocumentError> {
    match value {
        serde_json::Value::Null => Ok(LiteralValue::Null),
        serde_json::Value::Bool(flag) => Ok(LiteralValue::from(*flag)),
        serde_json::Value::Number(number) => number
            .as_f64()
            .map(LiteralValue::from)
            .ok_or_else(|| DocumentError::UnsupportedLiteral(value.clone())),
        serde_json::Value::String(text) => Ok(LiteralValue::from(text.as_str())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(DocumentError::UnsupportedLiteral(value.clone()))
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
