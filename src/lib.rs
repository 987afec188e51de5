//! Structural validation of dynamically-typed values.
//!
//! Schemas are immutable [`Runtype`] trees built from the combinators in
//! [`types`]. Every schema supports three passes over a [`Value`]:
//! - parse: validate and apply transforms, producing a new value;
//! - test: validate only, reporting the first violation;
//! - serialize: validate and apply inverse transforms.
//!
//! Self-referential schemas ([`types::recursive`]) and cyclic input data are
//! both supported; cyclic input produces cyclic output.
//!
//! ```
//! use shape_guard::types::*;
//! use shape_guard::Value;
//!
//! let point = object([("x", number()), ("y", number())]);
//! assert!(point.test(&Value::from(serde_json::json!({"x": 1, "y": 2}))));
//! ```
pub mod error;
pub(crate) mod eval;
pub mod lower;
pub mod path_de;
pub mod result;
pub mod runtype;
pub mod schema_doc;
pub mod seal;
pub mod types;
pub mod value;

pub use error::{DocumentError, SchemaError, ValidationError, ValueError};
pub use result::{Failure, FullError, Validation};
pub use runtype::inspect::{LazyTarget, Shape};
pub use runtype::show::show_type;
pub use runtype::{Mode, Runtype, Tag};
pub use seal::SealScope;
pub use types::{Parser, Verdict};
pub use value::{LiteralValue, Value};
