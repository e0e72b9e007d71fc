// Array schema

use crate::value::{ValueKind, measure};
use crate::{Base, Context, ErrorKind, Schema, SchemaRef, ValidationError, impl_base_builders};
use serde_json::Value;
use std::sync::Arc;

/// How declared item schemas are applied to elements.
#[derive(Clone, Default)]
enum Items {
    /// No per-element checks
    #[default]
    Unchecked,
    /// Each element must pass one of the candidates, tried in order
    Alternatives(Vec<SchemaRef>),
    /// Element `i` is validated by schema `i`
    Positional(Vec<SchemaRef>),
}

/// Schema for sequences.
///
/// The chain starts with a sequence type check, so `prepend_transform` can
/// coerce other shapes into an array before it runs.
#[derive(Clone)]
pub struct ArraySchema {
    base: Base,
    items: Items,
}

impl_base_builders!(ArraySchema);

impl ArraySchema {
    pub fn new() -> Self {
        Self {
            base: Base::with_rule(|ctx: &mut Context<'_>| {
                if !ctx.value().is_array() {
                    let found = ValueKind::of(ctx.value());
                    ctx.fail(ErrorKind::TypeMismatch, format!("expected array, found {}", found));
                }
            }),
            items: Items::Unchecked,
        }
    }

    /// At least `min` elements
    pub fn min(self, min: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if let Some(len) = sequence_len(ctx) {
                if len < min {
                    ctx.fail(
                        ErrorKind::BoundViolation,
                        format!("must contain at least {} items, got {}", min, len),
                    );
                }
            }
        })
    }

    /// At most `max` elements
    pub fn max(self, max: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if let Some(len) = sequence_len(ctx) {
                if len > max {
                    ctx.fail(
                        ErrorKind::BoundViolation,
                        format!("must contain at most {} items, got {}", max, len),
                    );
                }
            }
        })
    }

    /// Exactly `length` elements
    pub fn length(self, length: usize) -> Self {
        self.transform(move |ctx: &mut Context<'_>| {
            if let Some(len) = sequence_len(ctx) {
                if len != length {
                    ctx.fail(
                        ErrorKind::BoundViolation,
                        format!("must contain exactly {} items, got {}", length, len),
                    );
                }
            }
        })
    }

    /// Every element must validate against one of `schemas`, tried in
    /// declaration order. A candidate whose type check rejects the element
    /// is skipped; the first one that gets past it decides the element,
    /// either supplying its transformed value or failing with its own error.
    /// `NoMatchingAlternative` is reported only when every candidate rejects
    /// the element's type.
    pub fn items<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaRef>,
    {
        self.items = Items::Alternatives(schemas.into_iter().collect());
        self
    }

    /// Element `i` must validate against `schemas[i]`; elements past the
    /// declared positions are rejected.
    pub fn ordered<I>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaRef>,
    {
        self.items = Items::Positional(schemas.into_iter().collect());
        self
    }

    fn descend(&self, ctx: &mut Context<'_>) {
        let (candidates, positional) = match &self.items {
            Items::Unchecked => return,
            Items::Alternatives(candidates) => (candidates, false),
            Items::Positional(slots) => (slots, true),
        };

        let mut elements = match ctx.take_value() {
            Value::Array(elements) => elements,
            other => {
                let found = ValueKind::of(&other);
                ctx.set_value(other);
                ctx.fail(ErrorKind::TypeMismatch, format!("expected array, found {}", found));
                return;
            }
        };

        let outcome = if positional {
            validate_positional(ctx, &mut elements, candidates)
        } else {
            validate_alternatives(ctx, &mut elements, candidates)
        };

        ctx.set_value(Value::Array(elements));
        if let Err(err) = outcome {
            ctx.abort(err);
        }
    }
}

impl Schema for ArraySchema {
    fn priority(&self) -> i32 {
        self.base.priority()
    }

    fn validate(&self, ctx: &mut Context<'_>) {
        self.base.evaluate(ctx, |ctx| self.descend(ctx));
    }
}

fn sequence_len(ctx: &mut Context<'_>) -> Option<usize> {
    match ctx.value() {
        Value::Array(_) => measure(ctx.value()),
        other => {
            let found = ValueKind::of(other);
            ctx.fail(ErrorKind::TypeMismatch, format!("expected array, found {}", found));
            None
        }
    }
}

fn validate_alternatives(
    ctx: &Context<'_>,
    elements: &mut [Value],
    candidates: &[SchemaRef],
) -> Result<(), ValidationError> {
    for (index, element) in elements.iter_mut().enumerate() {
        let element_path = ctx.path().child(index);
        let mut last_mismatch = None;
        let mut accepted = None;

        for candidate in candidates {
            let mut child = ctx.child(index, element.clone(), None);
            candidate.validate(&mut child);
            match child.into_result() {
                Ok(value) => {
                    accepted = Some(value);
                    break;
                }
                // a type mismatch on the element itself moves on to the next candidate
                Err(err) if err.is(ErrorKind::TypeMismatch) && err.path == element_path => {
                    last_mismatch = Some(err);
                }
                // any other failure means the candidate took the element
                Err(err) => return Err(err),
            }
        }

        match accepted {
            Some(value) => *element = value,
            None => {
                let mut err = ValidationError::new(
                    ErrorKind::NoMatchingAlternative,
                    element_path,
                    format!("matches none of the {} item schemas", candidates.len()),
                );
                if let Some(cause) = last_mismatch {
                    err = err.with_cause(cause);
                }
                return Err(err);
            }
        }
    }
    Ok(())
}

fn validate_positional(
    ctx: &Context<'_>,
    elements: &mut Vec<Value>,
    slots: &[SchemaRef],
) -> Result<(), ValidationError> {
    if elements.len() > slots.len() {
        return Err(ValidationError::new(
            ErrorKind::NoMatchingAlternative,
            ctx.path().child(slots.len()),
            format!("only {} positions are declared", slots.len()),
        ));
    }

    for (index, slot) in slots.iter().enumerate() {
        let present = index < elements.len();
        let value = elements.get(index).cloned().unwrap_or(Value::Null);

        let mut child = ctx.child(index, value, None);
        slot.validate(&mut child);
        let value = child.into_result()?;

        if present {
            elements[index] = value;
        } else if !value.is_null() && elements.len() == index {
            // defaults fill trailing positions while they stay contiguous
            elements.push(value);
        }
    }
    Ok(())
}

/// Collect schemas of different types into `items`/`ordered` arguments.
pub fn schemas<const N: usize>(schemas: [SchemaRef; N]) -> Vec<SchemaRef> {
    schemas.into()
}

impl From<ArraySchema> for SchemaRef {
    fn from(schema: ArraySchema) -> Self {
        Arc::new(schema)
    }
}
