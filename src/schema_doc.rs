//! Declarative schema documents.
//!
//! A document is plain JSON so schemas can be written without Rust. It has a
//! `root` node and optional named `definitions`; `ref` nodes point at
//! definitions by name and are resolved lazily, which is what makes recursive
//! documents possible. See [`crate::lower`] for the mapping onto engine nodes.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::path_de::from_str_with_path;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaNode>,
    pub root: SchemaNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchemaNode {
    Unknown,
    Never,
    Boolean,
    Number,
    String,
    Bigint,
    Null,
    Undefined,
    Literal {
        value: serde_json::Value,
    },
    Array {
        of: Box<SchemaNode>,
        #[serde(default)]
        readonly: bool,
    },
    Tuple {
        of: Vec<SchemaNode>,
        #[serde(default)]
        readonly: bool,
    },
    Object {
        fields: IndexMap<String, SchemaNode>,
        #[serde(default)]
        partial: bool,
        #[serde(default)]
        readonly: bool,
    },
    Record {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
        #[serde(default)]
        readonly: bool,
    },
    Union {
        of: Vec<SchemaNode>,
    },
    Intersect {
        of: Vec<SchemaNode>,
    },
    Named {
        name: String,
        of: Box<SchemaNode>,
    },
    Brand {
        brand: String,
        of: Box<SchemaNode>,
    },
    Sealed {
        of: Box<SchemaNode>,
        #[serde(default)]
        deep: bool,
    },
    /// Member name to member value (a number or a string).
    Enum {
        name: String,
        values: IndexMap<String, serde_json::Value>,
    },
    KeyOf {
        keys: Vec<String>,
    },
    Pick {
        of: Box<SchemaNode>,
        keys: Vec<String>,
    },
    Omit {
        of: Box<SchemaNode>,
        keys: Vec<String>,
    },
    Partial {
        of: Box<SchemaNode>,
    },
    Ref {
        name: String,
    },
    /// A number with no fractional part.
    Integer,
    /// A string matching `regex` (unanchored, `regex` crate syntax).
    Pattern {
        regex: String,
    },
    /// Bounds on a number, inclusive.
    Range {
        #[serde(default = "SchemaNode::number")]
        of: Box<SchemaNode>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaDocument {
    /// Parses a document; malformed input reports the JSON path at fault.
    pub fn from_json_str(source: &str) -> Result<Self, DocumentError> {
        from_str_with_path(source)
    }
}

impl SchemaNode {
    fn number() -> Box<SchemaNode> {
        Box::new(SchemaNode::Number)
    }
}

// ------------------------------- Tests ------------------------------------ //
