//! Schema combinators.
//!
//! One module per node kind. Each module owns the node's payload, its
//! public constructors and the step it contributes to every pass.
pub mod array;
pub mod constraint;
pub mod intersect;
pub mod lazy;
pub mod literal;
pub mod nominal;
pub mod object;
pub mod parsed;
pub mod primitive;
pub mod record;
pub mod sealed;
pub mod transform;
pub mod tuple;
pub mod union;
pub mod wrapper;

pub use array::{array, readonly_array};
pub use constraint::{Verdict, constraint, constraint_named, guard};
pub use intersect::intersect;
pub use lazy::{lazy, recursive};
pub use literal::{literal, null, undefined};
pub use nominal::{enumeration, instance_of, key_of, never, unknown};
pub use object::{object, partial_object, readonly_object, readonly_partial_object};
pub use parsed::{Parser, parsed};
pub use primitive::{bigint, boolean, function, number, string, symbol};
pub use record::{readonly_record, record};
pub use sealed::{sealed, sealed_deep};
pub use transform::{mutable, omit, partial, pick, readonly};
pub use tuple::{readonly_tuple, tuple};
pub use union::{Matcher, union};
pub use wrapper::{brand, named};
