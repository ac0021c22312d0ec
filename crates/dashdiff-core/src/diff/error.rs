//! Diff rendering and decoding errors

use thiserror::Error;

/// Errors raised while rendering a diff against its original value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The delta describes a container the original value does not have
    #[error("Type mismatch at '{position}': delta expects {expected}, found {found}")]
    TypeMismatch {
        position: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl RenderError {
    pub(crate) fn type_mismatch(path: &str, expected: &'static str, found: &'static str) -> Self {
        RenderError::TypeMismatch {
            position: display_path(path),
            expected,
            found,
        }
    }
}

/// Errors raised while decoding a machine delta
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeltaError {
    #[error("Malformed delta at '{path}': {details}")]
    Malformed { path: String, details: String },

    #[error("Delta is not valid JSON: {0}")]
    Syntax(String),
}

impl DeltaError {
    pub(crate) fn malformed(path: &str, details: impl Into<String>) -> Self {
        DeltaError::Malformed {
            path: display_path(path),
            details: details.into(),
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Name of a JSON value's kind, for error messages
pub(crate) fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
