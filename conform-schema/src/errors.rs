// Validation errors

use crate::Path;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// What went wrong at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Value absent on a `required()` schema
    MissingRequired,
    /// Value present but of the wrong shape
    TypeMismatch,
    /// Length, range, allowed-set or pattern constraint failed
    BoundViolation,
    /// No `items` candidate or positional slot accepted the value
    NoMatchingAlternative,
    /// A `check()` predicate returned an error
    CustomCheckFailed,
}

impl ErrorKind {
    /// Constraint name used in JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequired => "missing_required",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::BoundViolation => "bound_violation",
            ErrorKind::NoMatchingAlternative => "no_matching_alternative",
            ErrorKind::CustomCheckFailed => "custom_check_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first failure of a validation run.
///
/// Validation is first-error-wins: a run produces at most one of these,
/// tagged with the path of the node that failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// Failure category
    pub kind: ErrorKind,

    /// Location of the failing node relative to the root value
    pub path: Path,

    /// Error message
    pub message: String,

    /// Underlying failure, e.g. the last rejected `items` candidate
    #[source]
    pub cause: Option<Box<ValidationError>>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ErrorKind, path: Path, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the error that led to this one
    pub fn with_cause(mut self, cause: ValidationError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "kind": self.kind,
            "path": self.path.to_string(),
            "segments": self.path,
            "message": self.message,
        });
        if let Some(cause) = &self.cause {
            body["cause"] = cause.to_json();
        }
        body
    }
}

/// Errors raised while building a schema, before any value is validated.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
