//! Storage layer
//!
//! Append-only access to documents and their version log.
//!
//! ## Architecture
//!
//! - `VersionStore`: the narrow contract the diff and restore paths consume
//! - `SqliteVersionStore`: SQLite-backed implementation
//!
//! Versions are never updated or deleted through this layer. The only
//! write that touches an existing row is the live document overwrite, and
//! it always happens in the same transaction as a version insert.

pub mod error;
pub mod schema;
pub mod sqlite;

use serde_json::Value;
use tracing::info;

use crate::models::{Document, Version, VersionQuery};

pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteVersionStore;

/// Record access for documents and their versions
pub trait VersionStore {
    /// Fetch one version by (document, version number)
    fn get_version(&self, document_id: i64, version: i64) -> StorageResult<Version>;

    /// Fetch a page of versions; an empty result is `NoVersions`
    fn list_versions(&self, document_id: i64, query: &VersionQuery)
        -> StorageResult<Vec<Version>>;

    /// Fetch the live document
    fn get_document(&self, document_id: i64) -> StorageResult<Document>;

    /// Check whether a live document row exists
    fn document_exists(&self, document_id: i64) -> StorageResult<bool>;

    /// One greater than the highest stored version number
    ///
    /// Fails with `DocumentNotFound` when the document has no versions yet.
    fn next_version_number(&self, document_id: i64) -> StorageResult<i64>;

    /// Insert a brand new document together with its first version
    fn insert_document(&mut self, document: &Document, first: &Version) -> StorageResult<()>;

    /// Overwrite the live document and append a version, atomically
    ///
    /// Fails with `Conflict` if the document row is gone or the version
    /// number is already taken; nothing is written in that case.
    fn update_and_append(&mut self, document: &Document, version: &Version) -> StorageResult<()>;

    /// Save a new payload for a document, appending a version
    ///
    /// A document that does not exist yet starts its sequence at version 1.
    /// The payload is stored as given.
    fn save_document(
        &mut self,
        document_id: i64,
        data: Value,
        actor_id: i64,
        message: &str,
    ) -> StorageResult<Document> {
        if !self.document_exists(document_id)? {
            let document = Document::new(document_id, data, actor_id);
            let first = Version::snapshot(&document, None, message);
            self.insert_document(&document, &first)?;
            info!(document_id, "Created document at version 1");
            return Ok(document);
        }

        let current = self.get_document(document_id)?;
        let next = self.next_version_number(document_id)?;

        let mut document = Document::new(document_id, data, actor_id);
        document.version = next;
        let version = Version::snapshot(&document, Some(current.version), message);
        self.update_and_append(&document, &version)?;

        info!(document_id, version = next, "Saved document");
        Ok(document)
    }
}
