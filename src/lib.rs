// Conform - composable schema validation for JSON-like values
//
// This library re-exports the schema engine and its logging layer under a
// single crate.

// Re-export the schema engine
pub use conform_schema::*;

// Re-export logging
pub use conform_log;

pub use serde_json::{Value, json};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ArraySchema,
        Context,
        ErrorKind,
        JsonPipe,
        Matcher,
        ObjectSchema,
        Path,
        PipeError,
        Schema,
        SchemaRef,
        ValidationError,
        Value,
        any,
        array,
        boolean,
        json,
        keys,
        number,
        object,
        schemas,
        string,
        validate_json,
    };
}
