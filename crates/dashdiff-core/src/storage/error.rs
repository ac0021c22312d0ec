//! Storage error handling
//!
//! Provides typed errors for version store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during version store operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No version row matches (document, version)
    #[error("Version {version} of document {document_id} not found")]
    VersionNotFound { document_id: i64, version: i64 },

    /// The document has no version rows at all
    #[error("No versions found for document {document_id}")]
    NoVersions { document_id: i64 },

    /// No live document row with this id
    #[error("Document {document_id} not found")]
    DocumentNotFound { document_id: i64 },

    /// A concurrent write was detected at the store boundary
    #[error("Write conflict on document {document_id}: {details}")]
    Conflict { document_id: i64, details: String },

    /// A stored payload could not be parsed as JSON
    #[error("Stored payload for document {document_id} is not valid JSON: {source}")]
    InvalidPayload {
        document_id: i64,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StorageError {
    /// Check if this error means the requested row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::VersionNotFound { .. }
                | StorageError::NoVersions { .. }
                | StorageError::DocumentNotFound { .. }
        )
    }

    /// Check if this error is a rejected concurrent write
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::Conflict { .. } => {
                Some("Another writer changed the document. Reload it and try again.")
            }
            StorageError::NoVersions { .. } => {
                Some("Save the document at least once before listing or restoring versions.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if a SQLite error is a uniqueness or primary key violation
pub(crate) fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StorageError::VersionNotFound {
            document_id: 1,
            version: 4
        }
        .is_not_found());
        assert!(StorageError::NoVersions { document_id: 1 }.is_not_found());
        assert!(StorageError::DocumentNotFound { document_id: 1 }.is_not_found());

        let conflict = StorageError::Conflict {
            document_id: 1,
            details: "version 3 already exists".to_string(),
        };
        assert!(!conflict.is_not_found());
        assert!(conflict.is_conflict());
        assert!(conflict.recovery_suggestion().is_some());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::VersionNotFound {
            document_id: 12,
            version: 5,
        };

        let msg = err.to_string();
        assert!(msg.contains("Version 5"));
        assert!(msg.contains("document 12"));
    }

    #[test]
    fn test_constraint_violation_detection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();

        let err = conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap_err();
        assert!(is_constraint_violation(&err));

        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert!(!is_constraint_violation(&err));
    }
}
