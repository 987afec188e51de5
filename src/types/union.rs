//! Unions and discriminator inference.
//!
//! Per mode, a union plans once how to dispatch:
//! - a single live alternative is validated directly;
//! - a common literal-valued field (preferring `type`, `kind`, `tag`,
//!   `version`) that narrows the search is used as a lookup key;
//! - fieldless alternatives are tried one by one after a keyed miss;
//! - otherwise every alternative is tried in declaration order.
//!
//! Plans are memoized on the node; they only depend on the schema.
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;

use crate::error::{SchemaError, ValidationError};
use crate::eval::{Evaluator, Visit};
use crate::result::{Failure, FullError, Validation, expected, types_are_not_compatible, unable_to_assign};
use crate::runtype::{Mode, Node, Runtype, Tag};
use crate::runtype::show::show_type;
use crate::seal::Seal;
use crate::types::nominal::never;
use crate::value::{LiteralValue, Value, preview};

const PREFERRED_DISCRIMINATORS: [&str; 4] = ["type", "kind", "tag", "version"];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub(crate) struct UnionShape {
    pub(crate) alternatives: Arc<[Runtype]>,
    plans: [OnceCell<Dispatch>; 3],
}

enum Dispatch {
    Only(Runtype),
    Exhaustive(Arc<[Runtype]>),
    Keyed(Discriminant),
    KeyedThenFieldless(Discriminant, Vec<Runtype>),
}

struct Discriminant {
    field: String,
    table: IndexMap<LiteralValue, Vec<Runtype>>,
    /// Rendered alternatives reachable through the table.
    types: String,
    /// Rendered accepted discriminator values.
    choices: String,
}

/// Pairs each alternative of a union with a case. Built by
/// [`Runtype::matcher`].
pub struct Matcher<R> {
    union: Runtype,
    alternatives: Arc<[Runtype]>,
    cases: Vec<Box<dyn Fn(&Value) -> R>>,
}

#[derive(Default)]
struct Tally {
    largest: usize,
    groups: IndexMap<LiteralValue, Vec<Runtype>>,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

/// Nested unions are flattened one level; an empty union is `never`.
pub fn union(alternatives: impl IntoIterator<Item = Runtype>) -> Runtype {
    let mut flat = Vec::new();
    for alternative in alternatives {
        match alternative.node() {
            Node::Union(shape) => flat.extend(shape.alternatives.iter().cloned()),
            _ => flat.push(alternative),
        }
    }
    if flat.is_empty() {
        return never();
    }
    Runtype::from_node(Node::Union(UnionShape { alternatives: flat.into(), plans: Default::default() }))
}

// ————————————————————————————————————————————————————————————————————————————
// PLANNING
// ————————————————————————————————————————————————————————————————————————————

fn plan(alternatives: &Arc<[Runtype]>, mode: Mode) -> Dispatch {
    let live: Vec<Runtype> = alternatives
        .iter()
        .filter(|alternative| alternative.unwrap(mode).tag() != Tag::Never)
        .cloned()
        .collect();
    if let [only] = live.as_slice() {
        return Dispatch::Only(only.clone());
    }
    let mut keyed = Vec::new();
    let mut fieldless = Vec::new();
    for alternative in live {
        let fields = find_fields(&alternative, mode);
        if fields.is_empty() {
            fieldless.push(alternative);
        } else {
            keyed.push((alternative, fields));
        }
    }
    match find_discriminator(&keyed) {
        Some(discriminant) if !fieldless.is_empty() => {
            tracing::debug!(?mode, field = %discriminant.field, fieldless = fieldless.len(), "union dispatches on a literal field, then fieldless alternatives");
            Dispatch::KeyedThenFieldless(discriminant, fieldless)
        }
        Some(discriminant) => {
            tracing::debug!(?mode, field = %discriminant.field, "union dispatches on a literal field");
            Dispatch::Keyed(discriminant)
        }
        None => {
            tracing::debug!(?mode, alternatives = alternatives.len(), "union falls back to trying every alternative");
            Dispatch::Exhaustive(alternatives.clone())
        }
    }
}

/// Fields an alternative definitely carries, each with its (unwrapped) schema.
/// Inner unions contribute a field once per branch, but only fields every
/// branch has.
fn find_fields(alternative: &Runtype, mode: Mode) -> Vec<(String, Runtype)> {
    collect_fields(alternative, mode, &mut Vec::new())
}

// `visiting` holds the nodes being expanded; a self-referential schema
// contributes nothing the second time round.
fn collect_fields(alternative: &Runtype, mode: Mode, visiting: &mut Vec<usize>) -> Vec<(String, Runtype)> {
    fn push_field(
        fields: &mut Vec<(String, Runtype)>,
        name: &str,
        field: &Runtype,
        mode: Mode,
        visiting: &mut Vec<usize>,
    ) {
        let unwrapped = field.unwrap(mode);
        match unwrapped.node() {
            Node::Union(shape) => {
                if visiting.contains(&unwrapped.id()) {
                    return;
                }
                visiting.push(unwrapped.id());
                for branch in shape.alternatives.iter() {
                    push_field(fields, name, branch, mode, visiting);
                }
                visiting.pop();
            }
            _ => fields.push((name.to_string(), unwrapped)),
        }
    }

    let underlying = alternative.unwrap(mode);
    if visiting.contains(&underlying.id()) {
        return Vec::new();
    }
    visiting.push(underlying.id());
    let mut fields = Vec::new();
    match underlying.node() {
        Node::Object(shape) if !shape.partial => {
            for (name, field) in shape.fields.iter() {
                push_field(&mut fields, name, field, mode, visiting);
            }
        }
        Node::Tuple(shape) => {
            for (index, component) in shape.components.iter().enumerate() {
                push_field(&mut fields, &index.to_string(), component, mode, visiting);
            }
        }
        Node::Intersect(shape) => {
            for part in shape.parts.iter() {
                fields.extend(collect_fields(part, mode, visiting));
            }
        }
        Node::Union(shape) => {
            let branches: Vec<_> =
                shape.alternatives.iter().map(|branch| collect_fields(branch, mode, visiting)).collect();
            let common = common_names(branches.iter().map(|branch| branch.as_slice()));
            for branch in &branches {
                for (name, field) in branch {
                    if common.contains(name) {
                        push_field(&mut fields, name, field, mode, visiting);
                    }
                }
            }
        }
        _ => {}
    }
    visiting.pop();
    fields
}

fn common_names<'a>(mut sets: impl Iterator<Item = &'a [(String, Runtype)]>) -> IndexSet<String> {
    let Some(first) = sets.next() else { return IndexSet::new() };
    let mut common: IndexSet<String> = first.iter().map(|(name, _)| name.clone()).collect();
    for set in sets {
        let names: HashSet<&str> = set.iter().map(|(name, _)| name.as_str()).collect();
        common.retain(|name| names.contains(name.as_str()));
    }
    common
}

fn find_discriminator(candidates: &[(Runtype, Vec<(String, Runtype)>)]) -> Option<Discriminant> {
    let mut common = common_names(candidates.iter().map(|(_, fields)| fields.as_slice()));
    let mut tallies: IndexMap<String, Tally> =
        PREFERRED_DISCRIMINATORS.iter().map(|name| (name.to_string(), Tally::default())).collect();

    for (alternative, fields) in candidates {
        for (name, field) in fields {
            if !common.contains(name) {
                continue;
            }
            match field.node() {
                Node::Literal(literal) => {
                    let tally = tallies.entry(name.clone()).or_default();
                    let group = tally.groups.entry(literal.clone()).or_default();
                    if !group.iter().any(|member| member.ptr_eq(alternative)) {
                        group.push(alternative.clone());
                    }
                    let size = group.len();
                    tally.largest = tally.largest.max(size);
                }
                _ => {
                    common.shift_remove(name);
                }
            }
        }
    }

    let best = tallies
        .iter()
        .filter(|(name, _)| common.contains(*name))
        .map(|(_, tally)| tally.largest)
        .min()?;
    if best >= candidates.len() {
        return None;
    }
    let (field, tally) = tallies
        .into_iter()
        .find(|(name, tally)| tally.largest == best && common.contains(name))?;
    Some(Discriminant::new(field, tally.groups))
}

impl Discriminant {
    fn new(field: String, table: IndexMap<LiteralValue, Vec<Runtype>>) -> Self {
        let mut shown = IndexSet::new();
        for group in table.values() {
            for alternative in group {
                shown.insert(show_type(alternative, true));
            }
        }
        let types = shown.into_iter().collect::<Vec<_>>().join(" | ");
        let choices = table
            .keys()
            .map(|choice| match choice {
                LiteralValue::String(text) => format!("'{text}'"),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" | ");
        Discriminant { field, table, types, choices }
    }

    fn is_index(&self) -> bool {
        !self.field.is_empty() && self.field.bytes().all(|b| b.is_ascii_digit())
    }

    /// How failure keys name the field: `[0]` for tuple positions.
    fn label(&self) -> String {
        if self.is_index() { format!("[{}]", self.field) } else { self.field.clone() }
    }

    /// How the failure tree names the field: `[0]` or `"kind"`.
    fn property(&self) -> String {
        if self.is_index() { format!("[{}]", self.field) } else { format!("\"{}\"", self.field) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn parse(node: &Runtype, shape: &UnionShape, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Validation {
    let mode = cx.mode();
    let dispatch = shape.plans[mode.index()].get_or_init(|| plan(&shape.alternatives, mode));
    match dispatch {
        Dispatch::Only(alternative) => cx.validate(alternative, value, sealed),
        Dispatch::Exhaustive(alternatives) => exhaustive(node, alternatives, value, cx, sealed, true),
        Dispatch::Keyed(discriminant) => keyed(node, discriminant, value, cx, sealed),
        Dispatch::KeyedThenFieldless(discriminant, fieldless) => {
            let keyed_failure = match keyed(node, discriminant, value, cx, sealed) {
                Ok(validated) => return Ok(validated),
                Err(failure) => failure,
            };
            exhaustive(node, fieldless, value, cx, sealed, false).map_err(|mut failure| {
                let also = keyed_failure
                    .full_error
                    .unwrap_or_else(|| unable_to_assign(value, "Object", None));
                if let Some(tree) = failure.full_error.as_mut() {
                    tree.push(also.and());
                }
                failure
            })
        }
    }
}

fn keyed(node: &Runtype, discriminant: &Discriminant, value: &Value, cx: &dyn Visit, sealed: &Seal) -> Validation {
    if !value.is_object_like() {
        return Err(expected(&discriminant.types, value));
    }
    let found = value.property(&discriminant.field);
    let group = LiteralValue::from_value(&found).and_then(|literal| discriminant.table.get(&literal));
    match group.map(Vec::as_slice) {
        Some([alternative]) => cx.validate(alternative, value, sealed).map_err(|failure| {
            let key = match &failure.key {
                Some(inner) => format!("<{}: {}>.{inner}", discriminant.label(), preview(&found)),
                None => format!("<{}: {}>", discriminant.label(), preview(&found)),
            };
            let tree = unable_to_assign(value, &discriminant.types, Some(failure.tree()));
            Failure::new(failure.message).with_key(key).with_full_error(tree)
        }),
        Some(group) => exhaustive(node, group, value, cx, sealed, false),
        None => {
            let failure = expected(&discriminant.choices, &found);
            let tree = unable_to_assign(
                value,
                &discriminant.types,
                Some(types_are_not_compatible(&discriminant.property(), FullError::leaf(&failure.message))),
            );
            Err(failure.with_key(discriminant.label()).with_full_error(tree))
        }
    }
}

/// Tries each alternative in order. With `pinpoint`, a lone alternative whose
/// failure carries a key (every other one failing at the top) becomes the
/// reported message and key; the tree still lists every alternative.
fn exhaustive(
    node: &Runtype,
    alternatives: &[Runtype],
    value: &Value,
    cx: &dyn Visit,
    sealed: &Seal,
    pinpoint: bool,
) -> Validation {
    let mut tree: Option<FullError> = None;
    let mut failures = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let failure = match cx.validate(alternative, value, sealed) {
            Ok(validated) => return Ok(validated),
            Err(failure) => failure,
        };
        let explained = failure
            .full_error
            .clone()
            .unwrap_or_else(|| unable_to_assign(value, alternative, Some(failure.tree())));
        match tree.as_mut() {
            None => tree = Some(unable_to_assign(value, node, Some(explained))),
            Some(tree) => tree.push(explained.and()),
        }
        failures.push(failure);
    }

    let mut keyed = failures.iter().filter(|failure| failure.key.is_some());
    let lead = match (keyed.next(), keyed.next()) {
        (Some(only), None) if pinpoint => Some(only),
        _ => None,
    };
    let failure = match lead {
        Some(lead) => Failure { message: lead.message.clone(), key: lead.key.clone(), full_error: None },
        None => expected(node, value),
    };
    Err(Failure { full_error: tree, ..failure })
}

// ————————————————————————————————————————————————————————————————————————————
// MATCHING
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn matcher<R>(node: &Runtype, cases: Vec<Box<dyn Fn(&Value) -> R>>) -> Result<Matcher<R>, SchemaError> {
    let Node::Union(shape) = node.node() else {
        return Err(SchemaError::Unsupported { operation: "Match", tag: node.tag() });
    };
    if shape.alternatives.len() != cases.len() {
        return Err(SchemaError::CaseCount { alternatives: shape.alternatives.len(), cases: cases.len() });
    }
    Ok(Matcher { union: node.clone(), alternatives: shape.alternatives.clone(), cases })
}

impl<R> Matcher<R> {
    /// Parses `value` against each alternative in declaration order and runs
    /// the case of the first that accepts it, on the parsed value. When none
    /// does, fails the way [`Runtype::assert`] on the whole union does.
    pub fn apply(&self, value: &Value) -> Result<R, ValidationError> {
        let evaluator = Evaluator::new(Mode::Parse);
        let mut last = None;
        for (alternative, case) in self.alternatives.iter().zip(&self.cases) {
            match evaluator.run(alternative, value) {
                Ok(parsed) => return Ok(case(&parsed)),
                Err(failure) => last = Some(failure),
            }
        }
        match self.union.assert(value) {
            Err(error) => Err(error),
            // The guard pass accepted what no alternative parses.
            Ok(()) => Err(last.unwrap_or_else(|| expected(&self.union, value)).into()),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
