// Validation context

use crate::value::ABSENT;
use crate::{ErrorKind, Path, Segment, ValidationError};
use serde_json::{Map, Value};

/// Mutable state of one node during a validation run.
///
/// Rules read and overwrite the value, and stop the chain either with an
/// error ([`Context::abort`]) or successfully ([`Context::skip`]). Children
/// created by array/object descent get their own context; object children
/// also borrow the enclosing mapping so `when` conditions can read siblings.
#[derive(Debug)]
pub struct Context<'p> {
    value: Value,
    path: Path,
    err: Option<ValidationError>,
    skipped: bool,
    parent: Option<&'p Map<String, Value>>,
}

impl Context<'static> {
    /// Root context: empty path, no error, no enclosing mapping.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            path: Path::root(),
            err: None,
            skipped: false,
            parent: None,
        }
    }
}

impl<'p> Context<'p> {
    /// Context for a child node one segment below this one.
    pub(crate) fn child<'c>(
        &self,
        segment: impl Into<Segment>,
        value: Value,
        parent: Option<&'c Map<String, Value>>,
    ) -> Context<'c> {
        Context {
            value,
            path: self.path.child(segment),
            err: None,
            skipped: false,
            parent,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Move the value out, leaving it absent.
    pub fn take_value(&mut self) -> Value {
        self.value.take()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.err.as_ref()
    }

    /// Stop the chain with an error. Only the first error is kept.
    pub fn abort(&mut self, err: ValidationError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Abort with an error tagged with this node's path.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let err = ValidationError::new(kind, self.path.clone(), message);
        self.abort(err);
    }

    /// Stop the chain without an error.
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// True once an error is recorded or the node was skipped.
    pub fn is_aborted(&self) -> bool {
        self.err.is_some() || self.skipped
    }

    /// Value of a sibling key in the enclosing mapping.
    ///
    /// `None` at the root, inside sequences, or when the key is missing.
    pub fn sibling(&self, name: &str) -> Option<&Value> {
        self.parent.and_then(|map| map.get(name))
    }

    /// Like [`Context::sibling`], but missing siblings read as absent.
    pub(crate) fn sibling_or_absent(&self, name: &str) -> &Value {
        self.sibling(name).unwrap_or(&ABSENT)
    }

    /// Finish the run: the (possibly transformed) value, or the first error.
    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_context_is_clean() {
        let ctx = Context::new(json!({"a": 1}));
        assert!(ctx.path().is_root());
        assert!(ctx.error().is_none());
        assert!(!ctx.is_aborted());
        assert!(ctx.sibling("a").is_none());
    }

    #[test]
    fn test_first_error_wins() {
        let mut ctx = Context::new(json!(1));
        ctx.fail(ErrorKind::TypeMismatch, "first");
        ctx.fail(ErrorKind::BoundViolation, "second");

        let err = ctx.error().unwrap();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.message, "first");
        assert!(ctx.is_aborted());
    }

    #[test]
    fn test_skip_is_not_an_error() {
        let mut ctx = Context::new(Value::Null);
        ctx.skip();
        assert!(ctx.is_aborted());
        assert!(ctx.is_skipped());
        assert_eq!(ctx.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_child_path_and_sibling() {
        let root = Context::new(json!(null));
        let mut map = Map::new();
        map.insert("kind".to_string(), json!("pair"));

        let mut child = root.child("items", json!([1, 2]), Some(&map));
        assert_eq!(child.path().to_string(), "$.items");
        assert_eq!(child.sibling("kind"), Some(&json!("pair")));
        assert_eq!(child.sibling_or_absent("missing"), &Value::Null);

        child.fail(ErrorKind::BoundViolation, "too short");
        assert_eq!(child.error().unwrap().path.to_string(), "$.items");
        assert!(root.error().is_none());
    }

    #[test]
    fn test_take_value_leaves_absent() {
        let mut ctx = Context::new(json!("x"));
        assert_eq!(ctx.take_value(), json!("x"));
        assert!(ctx.value().is_null());
    }
}
