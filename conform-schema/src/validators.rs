// Leaf schemas: any, string, number, boolean

use crate::value::{ValueKind, is_integral, measure};
use crate::{Base, Context, ErrorKind, Schema, SchemaBuildError, SchemaRef, impl_base_builders};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::Arc;

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

fn type_check(expected: ValueKind) -> impl Fn(&mut Context<'_>) + Send + Sync + 'static {
    move |ctx: &mut Context<'_>| {
        let found = ValueKind::of(ctx.value());
        if found != expected {
            ctx.fail(
                ErrorKind::TypeMismatch,
                format!("expected {}, found {}", expected, found),
            );
        }
    }
}

macro_rules! into_schema_ref {
    ($($schema:ty),*) => {
        $(
            impl From<$schema> for SchemaRef {
                fn from(schema: $schema) -> Self {
                    Arc::new(schema)
                }
            }

            impl Schema for $schema {
                fn priority(&self) -> i32 {
                    self.base.priority()
                }

                fn validate(&self, ctx: &mut Context<'_>) {
                    self.base.evaluate(ctx, |_| {});
                }
            }
        )*
    };
}

into_schema_ref!(AnySchema, StringSchema, NumberSchema, BooleanSchema);

// Any

/// Accepts every present value; useful as a carrier for rules and `when`.
#[derive(Clone)]
pub struct AnySchema {
    base: Base,
}

impl_base_builders!(AnySchema);

impl AnySchema {
    pub fn new() -> Self {
        Self { base: Base::new() }
    }

    /// Value must equal one of `values`
    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.transform(one_of_rule(values))
    }
}

// String

/// Schema for strings. Lengths count characters, not bytes.
#[derive(Clone)]
pub struct StringSchema {
    base: Base,
}

impl_base_builders!(StringSchema);

impl StringSchema {
    pub fn new() -> Self {
        Self {
            base: Base::with_rule(type_check(ValueKind::String)),
        }
    }

    pub fn min(self, min: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            let len = measure(ctx.value()).unwrap_or(0);
            if len < min {
                ctx.fail(
                    ErrorKind::BoundViolation,
                    format!("must be at least {} characters", min),
                );
            }
        })
    }

    pub fn max(self, max: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            let len = measure(ctx.value()).unwrap_or(0);
            if len > max {
                ctx.fail(
                    ErrorKind::BoundViolation,
                    format!("must be at most {} characters", max),
                );
            }
        })
    }

    pub fn length(self, length: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if measure(ctx.value()) != Some(length) {
                ctx.fail(
                    ErrorKind::BoundViolation,
                    format!("must be exactly {} characters", length),
                );
            }
        })
    }

    /// Must match a compiled regular expression
    pub fn regex(self, regex: Regex) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            let matched = ctx.value().as_str().is_some_and(|s| regex.is_match(s));
            if !matched {
                ctx.fail(
                    ErrorKind::BoundViolation,
                    format!("must match pattern {}", regex.as_str()),
                );
            }
        })
    }

    /// Must match `pattern`; fails at build time if the pattern is invalid
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaBuildError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaBuildError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.regex(regex))
    }

    /// Letters and digits only
    pub fn alphanum(self) -> Self {
        self.regex(ALPHANUMERIC_REGEX.clone())
    }

    /// Letters, digits and underscores only
    pub fn token(self) -> Self {
        self.regex(TOKEN_REGEX.clone())
    }

    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.transform(one_of_rule(values))
    }

    pub fn trim(self) -> Self {
        self.map_str(|s| s.trim().to_string())
    }

    pub fn lowercase(self) -> Self {
        self.map_str(str::to_lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.map_str(str::to_uppercase)
    }

    fn map_str<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform(move |ctx: &mut Context<'_>| {
            if let Value::String(s) = ctx.value_mut() {
                let mapped = f(s.as_str());
                *s = mapped;
            }
        })
    }
}

// Number

/// Schema for numbers.
#[derive(Clone)]
pub struct NumberSchema {
    base: Base,
}

impl_base_builders!(NumberSchema);

impl NumberSchema {
    pub fn new() -> Self {
        Self {
            base: Base::with_rule(type_check(ValueKind::Number)),
        }
    }

    /// No fractional part
    pub fn integer(self) -> Self {
        self.transform(|ctx: &mut Context<'_>| {
            if !is_integral(ctx.value()) {
                ctx.fail(ErrorKind::TypeMismatch, "expected integer");
            }
        })
    }

    pub fn min(self, min: f64) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if ctx.value().as_f64().is_some_and(|n| n < min) {
                ctx.fail(ErrorKind::BoundViolation, format!("must be at least {}", min));
            }
        })
    }

    pub fn max(self, max: f64) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if ctx.value().as_f64().is_some_and(|n| n > max) {
                ctx.fail(ErrorKind::BoundViolation, format!("must be at most {}", max));
            }
        })
    }

    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.transform(one_of_rule(values))
    }

    /// Parse numeric strings before the type check runs
    pub fn coerce(self) -> Self {
        self.prepend_transform(|ctx: &mut Context<'_>| {
            let parsed = ctx.value().as_str().and_then(parse_number);
            if let Some(number) = parsed {
                ctx.set_value(number);
            }
        })
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

// Boolean

/// Schema for booleans.
#[derive(Clone)]
pub struct BooleanSchema {
    base: Base,
}

impl_base_builders!(BooleanSchema);

impl BooleanSchema {
    pub fn new() -> Self {
        Self {
            base: Base::with_rule(type_check(ValueKind::Boolean)),
        }
    }

    /// Accept `"true"`/`"false"`/`"1"`/`"0"` strings as booleans
    pub fn coerce(self) -> Self {
        self.prepend_transform(|ctx: &mut Context<'_>| {
            let parsed = match ctx.value().as_str().map(str::trim) {
                Some(s) if s.eq_ignore_ascii_case("true") || s == "1" => Some(true),
                Some(s) if s.eq_ignore_ascii_case("false") || s == "0" => Some(false),
                _ => None,
            };
            if let Some(flag) = parsed {
                ctx.set_value(flag);
            }
        })
    }
}

fn one_of_rule<I, V>(values: I) -> impl Fn(&mut Context<'_>) + Send + Sync + 'static
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = values.into_iter().map(Into::into).collect();
    move |ctx: &mut Context<'_>| {
        if !allowed.contains(ctx.value()) {
            let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
            ctx.fail(
                ErrorKind::BoundViolation,
                format!("must be one of [{}]", listed.join(", ")),
            );
        }
    }
}
