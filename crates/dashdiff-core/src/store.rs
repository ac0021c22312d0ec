//! Unified engine interface
//!
//! The `Store` ties the version store, the diff engine, the renderers and
//! the restore coordinator together behind one handle.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! store.save(1, json!({"title": "CPU"}), actor, "first draft")?;
//! store.save(1, json!({"title": "Memory"}), actor, "")?;
//!
//! let listing = store.compute_diff(1, VersionSelector::Number(1), VersionSelector::Current, "basic")?;
//! store.restore(1, 1, actor)?;
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::diff::{compare, render, AsciiConfig, Diff, DiffFormat};
use crate::error::EngineResult;
use crate::models::{Document, Version, VersionQuery, VersionSelector};
use crate::restore::RestoreCoordinator;
use crate::storage::{SqliteVersionStore, VersionStore};

/// Unified interface over documents, versions and diffs
pub struct Store {
    /// Version log and live documents
    versions: SqliteVersionStore,
    /// Configuration
    config: Config,
}

impl Store {
    /// Open the store at the configured location
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        let versions =
            SqliteVersionStore::open(&config).context("Failed to open SQLite database")?;
        Ok(Self { versions, config })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory(config: Config) -> Result<Self> {
        let versions = SqliteVersionStore::open_in_memory()
            .context("Failed to open in-memory database")?;
        Ok(Self { versions, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the underlying version store
    pub fn versions(&self) -> &SqliteVersionStore {
        &self.versions
    }

    // ==================== Documents ====================

    /// Save a new payload for a document, appending a version
    pub fn save(
        &mut self,
        document_id: i64,
        data: Value,
        actor_id: i64,
        message: &str,
    ) -> EngineResult<Document> {
        Ok(self
            .versions
            .save_document(document_id, data, actor_id, message)?)
    }

    /// Parse a JSON document and save it
    pub fn save_from_str(
        &mut self,
        document_id: i64,
        json: &str,
        actor_id: i64,
        message: &str,
    ) -> EngineResult<Document> {
        let data: Value = serde_json::from_str(json)?;
        self.save(document_id, data, actor_id, message)
    }

    /// Get the live document
    pub fn get_document(&self, document_id: i64) -> EngineResult<Document> {
        Ok(self.versions.get_document(document_id)?)
    }

    /// Check whether a document exists
    pub fn document_exists(&self, document_id: i64) -> EngineResult<bool> {
        Ok(self.versions.document_exists(document_id)?)
    }

    // ==================== Versions ====================

    /// Get one version
    pub fn get_version(&self, document_id: i64, version: i64) -> EngineResult<Version> {
        Ok(self.versions.get_version(document_id, version)?)
    }

    /// List versions; an empty page is `NoVersions`
    pub fn list_versions(
        &self,
        document_id: i64,
        query: &VersionQuery,
    ) -> EngineResult<Vec<Version>> {
        Ok(self.versions.list_versions(document_id, query)?)
    }

    /// Default listing query, paged by the configured page size
    pub fn default_query(&self) -> VersionQuery {
        VersionQuery::default().page(self.config.page_size, 0)
    }

    /// Count stored versions of a document
    pub fn version_count(&self, document_id: i64) -> EngineResult<i64> {
        Ok(self.versions.version_count(document_id)?)
    }

    /// Restore a document to an earlier version
    pub fn restore(
        &mut self,
        document_id: i64,
        target_version: i64,
        actor_id: i64,
    ) -> EngineResult<Document> {
        Ok(RestoreCoordinator::new(&mut self.versions).restore(
            document_id,
            target_version,
            actor_id,
        )?)
    }

    // ==================== Diffs ====================

    /// Payload selected by a version selector
    pub fn payload(&self, document_id: i64, selector: VersionSelector) -> EngineResult<Value> {
        let data = match selector {
            VersionSelector::Number(version) => {
                self.versions.get_version(document_id, version)?.data
            }
            VersionSelector::Current => self.versions.get_document(document_id)?.data,
        };
        Ok(data)
    }

    /// Compare two versions of a document
    ///
    /// Returns the original payload together with the diff.
    pub fn diff(
        &self,
        document_id: i64,
        original: VersionSelector,
        new: VersionSelector,
    ) -> EngineResult<(Value, Diff)> {
        let left = self.payload(document_id, original)?;
        let right = self.payload(document_id, new)?;
        let diff = compare(&left, &right);

        debug!(
            document_id,
            %original,
            %new,
            changes = diff.leaf_count(),
            "Computed diff"
        );
        Ok((left, diff))
    }

    /// Compare two versions and render the result
    ///
    /// `format` must be `delta`, `json` or `basic`; it is checked before the
    /// store is read. The basic renderer uses the configured options.
    pub fn compute_diff(
        &self,
        document_id: i64,
        original: VersionSelector,
        new: VersionSelector,
        format: &str,
    ) -> EngineResult<Vec<u8>> {
        let format: DiffFormat = format.parse()?;
        self.compute_diff_with(document_id, original, new, format, self.config.ascii_config())
    }

    /// Compare two versions and render with explicit renderer options
    pub fn compute_diff_with(
        &self,
        document_id: i64,
        original: VersionSelector,
        new: VersionSelector,
        format: DiffFormat,
        ascii: AsciiConfig,
    ) -> EngineResult<Vec<u8>> {
        let (left, diff) = self.diff(document_id, original, new)?;
        let bytes = render(format, &left, &diff, ascii)?;
        debug!(document_id, %format, bytes = bytes.len(), "Rendered diff");
        Ok(bytes)
    }
}
