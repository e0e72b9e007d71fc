//! Schema validation engine for conform
//!
//! A schema is an ordered chain of rules over a mutable [`Context`]. Array
//! and object schemas descend into their elements and keys; `when`
//! conditions swap in an alternate schema based on a sibling value.
//! Validation stops at the first error, which carries the [`Path`] of the
//! failing node.
//!
//! # Examples
//!
//! ## Nested Structures
//!
//! ```
//! use conform_schema::{array, number, object, string, Context, ErrorKind, Schema};
//! use serde_json::json;
//!
//! let schema = object()
//!     .key("name", string().trim().min(1).required())
//!     .key("scores", array().max(3).items(conform_schema::schemas([
//!         number().integer().into(),
//!     ])));
//!
//! let mut ctx = Context::new(json!({"name": " ada ", "scores": [1, 2.5]}));
//! schema.validate(&mut ctx);
//!
//! let err = ctx.error().unwrap();
//! assert_eq!(err.kind, ErrorKind::NoMatchingAlternative);
//! assert_eq!(err.path.to_string(), "$.scores[1]");
//! ```
//!
//! ## Conditional Schemas
//!
//! ```
//! use conform_schema::{array, object, string, Matcher, Schema};
//! use serde_json::json;
//!
//! let schema = object()
//!     .key("length", string().required())
//!     .key(
//!         "list",
//!         array()
//!             .when("length", "2", array().length(2))
//!             .when("length", "3", array().length(3))
//!             .when("length", Matcher::schema(string()), array().min(1)),
//!     );
//!
//! assert!(schema.check_value(json!({"length": "2", "list": [1, 2]})).is_ok());
//! assert!(schema.check_value(json!({"length": "3", "list": [1, 2]})).is_err());
//! ```
//!
//! ## Defaults and Custom Rules
//!
//! ```
//! use conform_schema::{number, object, Context, Schema};
//! use serde_json::json;
//!
//! let schema = object()
//!     .key("page", number().integer().default(1))
//!     .key("size", number().check(|v: &serde_json::Value| {
//!         if v.as_u64().is_some_and(|n| n % 10 == 0) { Ok(()) } else { Err("multiple of 10") }
//!     }));
//!
//! let value = schema.check_value(json!({"size": 20})).unwrap();
//! assert_eq!(value, json!({"page": 1, "size": 20}));
//! ```

mod array;
mod context;
mod errors;
mod object;
mod path;
mod pipe;
mod schema;
pub mod value;
mod validators;
mod when;

pub use array::*;
pub use context::*;
pub use errors::*;
pub use object::*;
pub use path::*;
pub use pipe::*;
pub use schema::*;
pub use validators::*;
pub use when::*;

/// Schema accepting any present value
pub fn any() -> AnySchema {
    AnySchema::new()
}

/// Schema for strings
pub fn string() -> StringSchema {
    StringSchema::new()
}

/// Schema for numbers
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

/// Schema for booleans
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

/// Schema for sequences
pub fn array() -> ArraySchema {
    ArraySchema::new()
}

/// Schema for keyed mappings
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}
