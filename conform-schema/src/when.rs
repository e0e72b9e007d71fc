// Conditional schema selection

use crate::{Context, Schema, SchemaRef};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How a `when` condition tests the sibling value.
#[derive(Clone)]
pub enum Matcher {
    /// Sibling must equal this value (absent siblings read as `null`)
    Equals(Value),
    /// Sibling must validate against this schema
    Validates(SchemaRef),
}

impl Matcher {
    pub fn equals(value: impl Into<Value>) -> Self {
        Matcher::Equals(value.into())
    }

    pub fn schema<S: Schema + 'static>(schema: S) -> Self {
        Matcher::Validates(Arc::new(schema))
    }

    /// Test a sibling value. Schema matchers validate a private copy, so
    /// neither the sibling nor the caller's context is touched.
    pub fn is_match(&self, sibling: &Value) -> bool {
        match self {
            Matcher::Equals(expected) => expected == sibling,
            Matcher::Validates(schema) => schema.matches(sibling),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Matcher::Validates(_) => f.write_str("Validates(..)"),
        }
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::Equals(value)
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Equals(Value::from(value))
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Equals(Value::from(value))
    }
}

impl From<i64> for Matcher {
    fn from(value: i64) -> Self {
        Matcher::Equals(Value::from(value))
    }
}

impl From<bool> for Matcher {
    fn from(value: bool) -> Self {
        Matcher::Equals(Value::from(value))
    }
}

impl From<SchemaRef> for Matcher {
    fn from(schema: SchemaRef) -> Self {
        Matcher::Validates(schema)
    }
}

/// `when(field, matcher, then)` as registered on a schema.
#[derive(Clone, Debug)]
pub struct Condition {
    field: String,
    matcher: Matcher,
    then: SchemaRef,
}

impl Condition {
    pub fn new(field: String, matcher: Matcher, then: SchemaRef) -> Self {
        Self {
            field,
            matcher,
            then,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn then(&self) -> &SchemaRef {
        &self.then
    }

    pub fn is_met(&self, ctx: &Context<'_>) -> bool {
        self.matcher.is_match(ctx.sibling_or_absent(&self.field))
    }
}
