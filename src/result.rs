//! Validation outcomes.
//!
//! A failed check carries three things:
//! - `message`: the short reason of the first failing leaf;
//! - `key`: the path to that leaf (`user.addresses[2].zip`, `<kind: "a">.x`);
//! - `full_error`: the nested explanation tree, built only once something failed.
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

use crate::runtype::Runtype;
use crate::value::{Value, preview};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// `[title, ...children]`; serializes to exactly that nested array shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullError {
    pub title: String,
    pub children: Vec<FullError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_error: Option<FullError>,
}

pub type Validation<T = Value> = Result<T, Failure>;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl FullError {
    pub fn leaf(title: impl Into<String>) -> Self {
        FullError { title: title.into(), children: Vec::new() }
    }
    pub fn new(title: impl Into<String>, children: Vec<FullError>) -> Self {
        FullError { title: title.into(), children }
    }
    pub fn push(&mut self, child: FullError) {
        self.children.push(child);
    }
    /// Title on its own line, each child two spaces deeper.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_into("", &mut lines);
        lines.join("\n")
    }
    fn render_into(&self, indent: &str, lines: &mut Vec<String>) {
        lines.push(format!("{indent}{}", self.title));
        let deeper = format!("{indent}  ");
        for child in &self.children {
            child.render_into(&deeper, lines);
        }
    }
    /// Restates the tree as a further alternative: `And unable to assign ...`.
    pub(crate) fn and(self) -> Self {
        let mut chars = self.title.chars();
        let title = match chars.next() {
            Some(first) => format!("And {}{}", first.to_lowercase(), chars.as_str()),
            None => "And ".to_string(),
        };
        FullError { title, children: self.children }
    }
}

impl Serialize for FullError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.children.len() + 1))?;
        seq.serialize_element(&self.title)?;
        for child in &self.children {
            seq.serialize_element(child)?;
        }
        seq.end()
    }
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Failure { message: message.into(), key: None, full_error: None }
    }
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
    pub fn with_full_error(mut self, full_error: FullError) -> Self {
        self.full_error = Some(full_error);
        self
    }
    /// The explanation tree, or a single leaf holding the message.
    pub fn tree(&self) -> FullError {
        self.full_error.clone().unwrap_or_else(|| FullError::leaf(&self.message))
    }
    pub fn render(&self) -> String {
        match (&self.full_error, &self.key) {
            (Some(tree), _) => tree.render(),
            (None, Some(key)) => format!("{} in {key}", self.message),
            (None, None) => self.message.clone(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MESSAGE BUILDERS
// ————————————————————————————————————————————————————————————————————————————

/// What a failure message says it wanted: a rendered schema or free text.
pub(crate) enum Expectation<'a> {
    Type(&'a Runtype),
    Text(&'a str),
}

impl fmt::Display for Expectation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Type(runtype) => f.write_str(&runtype.show()),
            Expectation::Text(text) => f.write_str(text),
        }
    }
}

impl<'a> From<&'a Runtype> for Expectation<'a> {
    fn from(runtype: &'a Runtype) -> Self {
        Expectation::Type(runtype)
    }
}

impl<'a> From<&'a str> for Expectation<'a> {
    fn from(text: &'a str) -> Self {
        Expectation::Text(text)
    }
}

impl<'a> From<&'a String> for Expectation<'a> {
    fn from(text: &'a String) -> Self {
        Expectation::Text(text)
    }
}

/// `Expected {what}, but was {preview}`.
pub(crate) fn expected<'a>(what: impl Into<Expectation<'a>>, value: &Value) -> Failure {
    Failure::new(format!("Expected {}, but was {}", what.into(), preview(value)))
}

pub(crate) fn unable_to_assign<'a>(
    value: &Value,
    target: impl Into<Expectation<'a>>,
    child: Option<FullError>,
) -> FullError {
    FullError::new(
        format!("Unable to assign {} to {}", preview(value), target.into()),
        child.into_iter().collect(),
    )
}

pub(crate) fn types_are_not_compatible(property: &str, child: FullError) -> FullError {
    FullError::new(format!("The types of {property} are not compatible"), vec![child])
}

/// `prefix.inner`, or just `prefix` for a leaf failure.
pub(crate) fn nested_key(prefix: &str, inner: Option<&str>) -> String {
    match inner {
        Some(inner) => format!("{prefix}.{inner}"),
        None => prefix.to_string(),
    }
}

/// Gathers child failures of one container: every child is reported in the
/// tree, but the returned message and key are those of the first.
pub(crate) struct FailureCollector<'a> {
    value: &'a Value,
    target: &'a Runtype,
    tree: Option<FullError>,
    first: Option<Failure>,
}

impl<'a> FailureCollector<'a> {
    pub(crate) fn new(value: &'a Value, target: &'a Runtype) -> Self {
        FailureCollector { value, target, tree: None, first: None }
    }
    fn tree(&mut self) -> &mut FullError {
        let (value, target) = (self.value, self.target);
        self.tree.get_or_insert_with(|| unable_to_assign(value, target, None))
    }
    /// `property` is how the tree names the child, `path` how the key does.
    pub(crate) fn child(&mut self, property: &str, path: &str, failure: Failure) {
        let subtree = types_are_not_compatible(property, failure.tree());
        self.tree().push(subtree);
        if self.first.is_none() {
            let key = nested_key(path, failure.key.as_deref());
            self.first = Some(Failure::new(failure.message).with_key(key));
        }
    }
    pub(crate) fn unexpected(&mut self, key: &str) {
        let message = format!("Unexpected property: {key}");
        self.tree().push(FullError::leaf(&message));
        if self.first.is_none() {
            self.first = Some(Failure::new(message).with_key(key));
        }
    }
    pub(crate) fn is_clean(&self) -> bool {
        self.first.is_none()
    }
    pub(crate) fn finish(self) -> Option<Failure> {
        let tree = self.tree;
        self.first.map(|failure| Failure { full_error: tree, ..failure })
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_prefers_the_tree() {
        let tree = FullError::new(
            "Unable to assign {a: 1} to { a: string }",
            vec![types_are_not_compatible(
                "\"a\"",
                FullError::leaf("Expected string, but was 1"),
            )],
        );
        let failure = Failure::new("Expected string, but was 1").with_key("a");
        assert_eq!(failure.render(), "Expected string, but was 1 in a");
        assert_eq!(
            failure.with_full_error(tree).render(),
            "Unable to assign {a: 1} to { a: string }\n  The types of \"a\" are not compatible\n    Expected string, but was 1"
        );
    }

    #[test]
    fn and_lowercases_the_title() {
        let tree = FullError::leaf("Unable to assign 1 to string").and();
        assert_eq!(tree.title, "And unable to assign 1 to string");
    }

    #[test]
    fn full_error_serializes_as_nested_arrays() {
        let tree = FullError::new("a", vec![FullError::leaf("b")]);
        assert_eq!(serde_json::to_value(&tree).unwrap(), serde_json::json!(["a", ["b"]]));
        let failure = Failure::new("m").with_key("k");
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            serde_json::json!({"message": "m", "key": "k"})
        );
    }

    #[test]
    fn nested_keys() {
        assert_eq!(nested_key("[1]", Some("width")), "[1].width");
        assert_eq!(nested_key("x", None), "x");
    }
}
