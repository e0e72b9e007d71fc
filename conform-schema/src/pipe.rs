// Validation pipe for raw JSON payloads

use crate::{Schema, ValidationError};
use conform_log::{TARGET_PIPE, debug};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failure of [`JsonPipe`]: the payload did not parse, did not validate, or
/// did not fit the target type.
#[derive(Debug, Error)]
pub enum PipeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("validation failed at {0}")]
    Validation(#[from] ValidationError),

    #[error("validated value does not fit the target type: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl PipeError {
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            PipeError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> Value {
        match self {
            PipeError::Validation(err) => serde_json::json!({ "error": err.to_json() }),
            other => serde_json::json!({
                "error": {
                    "kind": "invalid_payload",
                    "message": other.to_string(),
                }
            }),
        }
    }
}

/// Parse and validate JSON bodies against a schema.
pub struct JsonPipe;

impl JsonPipe {
    /// Parse `body`, validate it and return the value with defaults and
    /// transforms applied.
    pub fn validate<S>(body: &[u8], schema: &S) -> Result<Value, PipeError>
    where
        S: Schema + ?Sized,
    {
        let value: Value = serde_json::from_slice(body).map_err(PipeError::InvalidJson)?;
        schema.check_value(value).map_err(|err| {
            debug!(target: TARGET_PIPE, "payload rejected: {}", err);
            PipeError::from(err)
        })
    }

    /// Like [`JsonPipe::validate`], then deserialize into `T`.
    pub fn parse<T, S>(body: &[u8], schema: &S) -> Result<T, PipeError>
    where
        T: DeserializeOwned,
        S: Schema + ?Sized,
    {
        let value = Self::validate(body, schema)?;
        serde_json::from_value(value).map_err(PipeError::Deserialize)
    }
}

/// Validate a JSON document, returning the normalized value.
pub fn validate_json<S>(body: &[u8], schema: &S) -> Result<Value, PipeError>
where
    S: Schema + ?Sized,
{
    JsonPipe::validate(body, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, number, object, string};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Signup {
        name: String,
        age: u32,
        plan: String,
    }

    fn signup_schema() -> crate::ObjectSchema {
        object()
            .key("name", string().trim().min(1).required())
            .key("age", number().coerce().integer().min(0.0).required())
            .key("plan", string().default("free"))
    }

    #[test]
    fn test_parse_applies_defaults_and_coercion() {
        let body = br#"{"name": " Ann ", "age": "31"}"#;
        let signup: Signup = JsonPipe::parse(body, &signup_schema()).unwrap();
        assert_eq!(
            signup,
            Signup {
                name: "Ann".to_string(),
                age: 31,
                plan: "free".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = validate_json(b"{not json", &signup_schema()).unwrap_err();
        assert!(matches!(err, PipeError::InvalidJson(_)));
        assert_eq!(err.to_json()["error"]["kind"], "invalid_payload");
    }

    #[test]
    fn test_validation_failure_keeps_path() {
        let err = validate_json(br#"{"age": 3}"#, &signup_schema()).unwrap_err();
        let inner = err.validation_error().unwrap();
        assert_eq!(inner.kind, ErrorKind::MissingRequired);
        assert_eq!(inner.path.to_string(), "$.name");
        assert_eq!(err.to_string(), "validation failed at $.name: is required");
        assert_eq!(err.to_json()["error"]["path"], "$.name");
    }

    #[test]
    fn test_deserialize_failure() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            count: bool,
        }

        let err = JsonPipe::parse::<Strict, _>(br#"{"count": 1}"#, &object()).unwrap_err();
        assert!(matches!(err, PipeError::Deserialize(_)));
    }
}
