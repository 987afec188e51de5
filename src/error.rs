//! Error types.
//!
//! Data problems are `Failure` values (see `result.rs`); the types here are
//! what the throwing entry points, schema misuse and document loading return.
use thiserror::Error;

use crate::result::{Failure, FullError};
use crate::runtype::Tag;

/// A failed `assert` / `parse` / `serialize`; displays the full nested report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{failure}")]
pub struct ValidationError {
    failure: Failure,
}

impl ValidationError {
    pub fn key(&self) -> Option<&str> {
        self.failure.key.as_deref()
    }
    pub fn short_message(&self) -> &str {
        &self.failure.message
    }
    pub fn full_error(&self) -> Option<&FullError> {
        self.failure.full_error.as_ref()
    }
    pub fn failure(&self) -> &Failure {
        &self.failure
    }
    pub fn into_failure(self) -> Failure {
        self.failure
    }
}

impl From<Failure> for ValidationError {
    fn from(failure: Failure) -> Self {
        ValidationError { failure }
    }
}

/// Schema-construction misuse; never a property of the data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{operation}: input runtype \"{tag}\" does not support '{}' operation", .operation.to_lowercase())]
    Unsupported { operation: &'static str, tag: Tag },
    #[error("Match: union has {alternatives} alternatives but {cases} cases were given")]
    CaseCount { alternatives: usize, cases: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("cannot convert a cyclic value to JSON")]
    Cyclic,
}

/// Loading or lowering a schema document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{}at JSON path {path}{} → {message}", in_definition(.definition), at_position(.position))]
    Malformed {
        path: String,
        /// The `definitions` entry the problem sits in, if any.
        definition: Option<String>,
        /// 1-based line and column, when the parser knows them.
        position: Option<(usize, usize)>,
        message: String,
    },
    #[error("unknown definition `{0}`")]
    UnknownDefinition(String),
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported literal {0}; literals are null, booleans, numbers or strings")]
    UnsupportedLiteral(serde_json::Value),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn in_definition(definition: &Option<String>) -> String {
    match definition {
        Some(name) => format!("in definition `{name}` "),
        None => String::new(),
    }
}

fn at_position(position: &Option<(usize, usize)>) -> String {
    match position {
        Some((line, column)) => format!(" (line {line}, column {column})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_operation_message() {
        let error = SchemaError::Unsupported { operation: "Pick", tag: Tag::Number };
        assert_eq!(
            error.to_string(),
            "Pick: input runtype \"number\" does not support 'pick' operation"
        );
    }

    #[test]
    fn validation_error_exposes_parts() {
        let error = ValidationError::from(Failure::new("Expected string, but was 1").with_key("a"));
        assert_eq!(error.to_string(), "Expected string, but was 1 in a");
        assert_eq!(error.key(), Some("a"));
        assert_eq!(error.short_message(), "Expected string, but was 1");
        assert!(error.full_error().is_none());
    }
}
