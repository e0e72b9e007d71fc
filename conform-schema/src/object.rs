// Object schema

use crate::value::ValueKind;
use crate::{Base, Context, ErrorKind, Schema, SchemaRef, impl_base_builders};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key name to child schema, iterated in lexicographic key order.
#[derive(Clone, Default)]
pub struct Keys(BTreeMap<String, SchemaRef>);

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) the schema for `name`
    pub fn key<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: Schema + 'static,
    {
        self.0.insert(name.into(), Arc::new(schema));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaRef)> for Keys {
    fn from_iter<T: IntoIterator<Item = (K, SchemaRef)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }
}

/// Build [`Keys`] from `name => schema` pairs.
///
/// ```
/// use conform_schema::{array, keys, object, string};
///
/// let schema = object().keys(keys! {
///     "length" => string().required(),
///     "list" => array().min(1),
/// });
/// ```
#[macro_export]
macro_rules! keys {
    ($($name:expr => $schema:expr),* $(,)?) => {
        $crate::Keys::new()$(.key($name, $schema))*
    };
}

/// Schema for keyed mappings.
///
/// Declared keys are validated in lexicographic order so the reported
/// error is reproducible. Each child sees the whole mapping, including
/// values written back by earlier keys, for `when` lookups.
#[derive(Clone)]
pub struct ObjectSchema {
    base: Base,
    keys: Keys,
}

impl_base_builders!(ObjectSchema);

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            base: Base::with_rule(|ctx: &mut Context<'_>| {
                if !ctx.value().is_object() {
                    let found = ValueKind::of(ctx.value());
                    ctx.fail(ErrorKind::TypeMismatch, format!("expected object, found {}", found));
                }
            }),
            keys: Keys::new(),
        }
    }

    /// Declare one key
    pub fn key<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: Schema + 'static,
    {
        self.keys = self.keys.key(name, schema);
        self
    }

    /// Declare several keys; later declarations replace earlier ones
    pub fn keys(mut self, keys: Keys) -> Self {
        self.keys.0.extend(keys.0);
        self
    }

    pub fn declared(&self) -> &Keys {
        &self.keys
    }

    fn descend(&self, ctx: &mut Context<'_>) {
        if self.keys.is_empty() {
            return;
        }

        let mut map = match ctx.take_value() {
            Value::Object(map) => map,
            other => {
                let found = ValueKind::of(&other);
                ctx.set_value(other);
                ctx.fail(ErrorKind::TypeMismatch, format!("expected object, found {}", found));
                return;
            }
        };

        for (name, schema) in &self.keys.0 {
            match validate_key(ctx, &map, name, schema) {
                Ok(Some(value)) => {
                    map.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(err) => {
                    ctx.set_value(Value::Object(map));
                    ctx.abort(err);
                    return;
                }
            }
        }

        ctx.set_value(Value::Object(map));
    }
}

/// Validate one key. Returns the value to write back, if any: keys that
/// were missing and stayed absent are not inserted.
fn validate_key(
    ctx: &Context<'_>,
    map: &Map<String, Value>,
    name: &str,
    schema: &SchemaRef,
) -> Result<Option<Value>, crate::ValidationError> {
    let current = map.get(name);
    let present = current.is_some();

    let mut child = ctx.child(name, current.cloned().unwrap_or(Value::Null), Some(map));
    schema.validate(&mut child);
    let value = child.into_result()?;

    Ok((present || !value.is_null()).then_some(value))
}

impl Schema for ObjectSchema {
    fn priority(&self) -> i32 {
        self.base.priority()
    }

    fn validate(&self, ctx: &mut Context<'_>) {
        self.base.evaluate(ctx, |ctx| self.descend(ctx));
    }
}

impl From<ObjectSchema> for SchemaRef {
    fn from(schema: ObjectSchema) -> Self {
        Arc::new(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ValidationError, array, number, string};
    use serde_json::json;
    use std::sync::Mutex;

    fn run(schema: &ObjectSchema, value: Value) -> Result<Value, ValidationError> {
        schema.check_value(value)
    }

    #[test]
    fn test_not_an_object() {
        let err = run(&ObjectSchema::new(), json!([1])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.path.is_root());
    }

    #[test]
    fn test_missing_required_key_path() {
        let schema = ObjectSchema::new().key("name", string().required());
        let err = run(&schema, json!({})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequired);
        assert_eq!(err.path.to_string(), "$.name");
    }

    #[test]
    fn test_keys_visited_in_lexicographic_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let probe = |name: &'static str| {
            let order = Arc::clone(&order);
            number().transform(move |_ctx: &mut Context<'_>| order.lock().unwrap().push(name))
        };

        let schema = ObjectSchema::new()
            .key("zeta", probe("zeta"))
            .key("alpha", probe("alpha"))
            .key("mid", probe("mid"));

        run(&schema, json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_first_failing_key_stops_descent() {
        let later = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&later);
        let schema = ObjectSchema::new()
            .key("a", number().required())
            .key("b", number().check(move |_| {
                *counter.lock().unwrap() += 1;
                Ok::<(), String>(())
            }));

        let err = run(&schema, json!({"b": 1})).unwrap_err();
        assert_eq!(err.path.to_string(), "$.a");
        assert_eq!(*later.lock().unwrap(), 0);
    }

    #[test]
    fn test_defaults_written_back() {
        let schema = ObjectSchema::new()
            .key("page", number().default(1))
            .key("tags", array().default(json!([])))
            .key("note", string());

        let value = run(&schema, json!({"extra": true})).unwrap();
        assert_eq!(value, json!({"extra": true, "page": 1, "tags": []}));
    }

    #[test]
    fn test_nested_error_bubbles_unchanged() {
        let schema = ObjectSchema::new().key(
            "orders",
            array().items(crate::schemas([ObjectSchema::new()
                .key("qty", number().integer().min(1.0))
                .into()])),
        );

        let err = run(&schema, json!({"orders": [{"qty": 2}, {"qty": 0}]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BoundViolation);
        assert_eq!(err.path.to_string(), "$.orders[1].qty");
        assert!(err.cause.is_none());

        // an element of the wrong shape matches no item schema
        let err = run(&schema, json!({"orders": [{"qty": 2}, 7]})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatchingAlternative);
        assert_eq!(err.path.to_string(), "$.orders[1]");
    }

    #[test]
    fn test_default_visible_to_later_sibling_condition() {
        let schema = ObjectSchema::new()
            .key("a_mode", string().default("pair"))
            .key("b_list", array().when("a_mode", "pair", array().length(2)));

        assert!(run(&schema, json!({"b_list": [1, 2]})).is_ok());
        assert!(run(&schema, json!({"b_list": [1]})).is_err());
    }

    #[test]
    fn test_keys_macro_and_from_iter() {
        let schema = ObjectSchema::new().keys(crate::keys! {
            "id" => number().integer().required(),
            "name" => string(),
        });
        assert_eq!(schema.declared().names().collect::<Vec<_>>(), vec!["id", "name"]);

        let pairs: Vec<(&str, SchemaRef)> = vec![("x", string().into()), ("y", number().into())];
        let keys: Keys = pairs.into_iter().collect();
        assert_eq!(keys.len(), 2);
    }
}
