//! Engine-level errors
//!
//! Wraps the storage and rendering failures together with the errors that
//! only the facade can raise, so callers can match on one type.

use thiserror::Error;

use crate::diff::RenderError;
use crate::storage::StorageError;

/// Errors returned by the `Store` facade
#[derive(Error, Debug)]
pub enum EngineError {
    /// Version store failure (not found, conflict, database)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Renderer failure
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Diff format selector outside `delta`, `json`, `basic`
    #[error("Unsupported diff format '{0}' (expected one of: delta, json, basic)")]
    UnsupportedFormat(String),

    /// Input that is not a valid JSON document
    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl EngineError {
    /// Check if this error means a requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Storage(e) if e.is_not_found())
    }

    /// Check if this error is a rejected concurrent write
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Storage(e) if e.is_conflict())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_keep_their_category() {
        let err: EngineError = StorageError::DocumentNotFound { document_id: 4 }.into();
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "Document 4 not found");

        let err: EngineError = StorageError::Conflict {
            document_id: 4,
            details: "version 3 already exists".to_string(),
        }
        .into();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = EngineError::UnsupportedFormat("html".to_string());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("'html'"));
    }
}
