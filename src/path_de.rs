//! Path-aware loading of schema documents.
//!
//! Failures name the JSON path at fault and, when it lies under
//! `definitions`, the definition it belongs to.
use serde::de::DeserializeOwned;
use serde_path_to_error::{Path, Segment};

use crate::error::DocumentError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DocumentError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        let definition = definition_of(err.path());
        let inner = err.into_inner();
        // serde_json reports line 0 when the position is unknown.
        let position = (inner.line() > 0).then(|| (inner.line(), inner.column()));
        let message = strip_position(inner.to_string(), position);
        DocumentError::Malformed { path, definition, position, message }
    })
}

fn definition_of(path: &Path) -> Option<String> {
    let mut segments = path.iter();
    match (segments.next(), segments.next()) {
        (Some(Segment::Map { key }), Some(Segment::Map { key: name })) if key == "definitions" => {
            Some(name.clone())
        }
        _ => None,
    }
}

/// Drops serde_json's ` at line L column C` suffix; the position is kept apart.
fn strip_position(message: String, position: Option<(usize, usize)>) -> String {
    let Some((line, column)) = position else { return message };
    match message.strip_suffix(&format!(" at line {line} column {column}")) {
        Some(stripped) => stripped.to_string(),
        None => message,
    }
}
