//! SQLite version store
//!
//! Serves `VersionStore` from two tables: `document` (one live row per
//! document) and `document_version` (the append-only log).
//!
//! Payloads are stored as JSON text and timestamps as Unix milliseconds.
//! Writes that touch both tables run in one immediate transaction, so a
//! reader never sees a live document whose version has no log row.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Document, Version, VersionQuery};
use crate::storage::error::{is_constraint_violation, StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::VersionStore;

/// How long a writer waits for another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const VERSION_COLUMNS: &str = "document_id, version, parent_version, restored_from, \
                               created_at, created_by, message, data";

/// SQLite-backed version store
pub struct SqliteVersionStore {
    conn: Connection,
}

impl SqliteVersionStore {
    /// Open or create the SQLite database at the configured path
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        debug!("Opened version store at {:?}", path);
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Count the version rows stored for a document
    pub fn version_count(&self, document_id: i64) -> StorageResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM document_version WHERE document_id = ?",
                params![document_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    fn begin(&mut self) -> StorageResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl VersionStore for SqliteVersionStore {
    fn get_version(&self, document_id: i64, version: i64) -> StorageResult<Version> {
        let sql = format!(
            "SELECT {} FROM document_version WHERE document_id = ? AND version = ?",
            VERSION_COLUMNS
        );
        let row = self
            .conn
            .query_row(&sql, params![document_id, version], read_version_row)
            .optional()?;

        match row {
            Some(row) => hydrate_version(row),
            None => Err(StorageError::VersionNotFound {
                document_id,
                version,
            }),
        }
    }

    fn list_versions(
        &self,
        document_id: i64,
        query: &VersionQuery,
    ) -> StorageResult<Vec<Version>> {
        let sql = format!(
            "SELECT {} FROM document_version WHERE document_id = ? \
             ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            VERSION_COLUMNS,
            query.order_by.column(),
            query.direction.keyword(),
            query.direction.keyword(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![document_id, query.limit as i64, query.offset as i64],
                read_version_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Err(StorageError::NoVersions { document_id });
        }

        debug!(document_id, count = rows.len(), "Listed versions");
        rows.into_iter().map(hydrate_version).collect()
    }

    fn get_document(&self, document_id: i64) -> StorageResult<Document> {
        let row = self
            .conn
            .query_row(
                "SELECT id, version, data, updated_at, updated_by FROM document WHERE id = ?",
                params![document_id],
                |row| {
                    Ok(DocumentRow {
                        id: row.get(0)?,
                        version: row.get(1)?,
                        data: row.get(2)?,
                        updated_at: row.get(3)?,
                        updated_by: row.get(4)?,
                    })
                },
            )
            .optional()?;

        let row = row.ok_or(StorageError::DocumentNotFound { document_id })?;
        Ok(Document {
            id: row.id,
            version: row.version,
            data: parse_payload(row.id, &row.data)?,
            updated_at: from_millis(row.updated_at),
            updated_by: row.updated_by,
        })
    }

    fn document_exists(&self, document_id: i64) -> StorageResult<bool> {
        Ok(self
            .conn
            .prepare("SELECT 1 FROM document WHERE id = ?")?
            .exists(params![document_id])?)
    }

    fn next_version_number(&self, document_id: i64) -> StorageResult<i64> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(version) FROM document_version WHERE document_id = ?",
            params![document_id],
            |row| row.get(0),
        )?;

        max.map(|v| v + 1)
            .ok_or(StorageError::DocumentNotFound { document_id })
    }

    fn insert_document(&mut self, document: &Document, first: &Version) -> StorageResult<()> {
        let tx = self.begin()?;

        let inserted = tx.execute(
            "INSERT INTO document (id, version, data, updated_at, updated_by) VALUES (?, ?, ?, ?, ?)",
            params![
                document.id,
                document.version,
                document.data.to_string(),
                document.updated_at.timestamp_millis(),
                document.updated_by,
            ],
        );
        if let Err(e) = inserted {
            return Err(conflict_or(e, document.id, "document already exists"));
        }

        insert_version(&tx, first)?;
        tx.commit()?;
        Ok(())
    }

    fn update_and_append(&mut self, document: &Document, version: &Version) -> StorageResult<()> {
        if document.id != version.document_id {
            return Err(StorageError::Conflict {
                document_id: document.id,
                details: format!(
                    "version row belongs to document {}",
                    version.document_id
                ),
            });
        }

        let tx = self.begin()?;

        let updated = tx.execute(
            "UPDATE document SET version = ?, data = ?, updated_at = ?, updated_by = ? WHERE id = ?",
            params![
                document.version,
                document.data.to_string(),
                document.updated_at.timestamp_millis(),
                document.updated_by,
                document.id,
            ],
        )?;
        if updated == 0 {
            warn!(document_id = document.id, "Live document vanished during write");
            return Err(StorageError::Conflict {
                document_id: document.id,
                details: "live document row no longer exists".to_string(),
            });
        }

        insert_version(&tx, version)?;
        tx.commit()?;

        debug!(
            document_id = document.id,
            version = version.version,
            "Updated document and appended version"
        );
        Ok(())
    }
}

// ==================== Internal structs ====================

struct DocumentRow {
    id: i64,
    version: i64,
    data: String,
    updated_at: i64,
    updated_by: i64,
}

struct VersionRow {
    document_id: i64,
    version: i64,
    parent_version: Option<i64>,
    restored_from: Option<i64>,
    created_at: i64,
    created_by: i64,
    message: String,
    data: String,
}

// ==================== Row helpers ====================

fn read_version_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VersionRow> {
    Ok(VersionRow {
        document_id: row.get(0)?,
        version: row.get(1)?,
        parent_version: row.get(2)?,
        restored_from: row.get(3)?,
        created_at: row.get(4)?,
        created_by: row.get(5)?,
        message: row.get(6)?,
        data: row.get(7)?,
    })
}

fn hydrate_version(row: VersionRow) -> StorageResult<Version> {
    Ok(Version {
        document_id: row.document_id,
        version: row.version,
        parent_version: row.parent_version,
        restored_from: row.restored_from,
        created_at: from_millis(row.created_at),
        created_by: row.created_by,
        message: row.message,
        data: parse_payload(row.document_id, &row.data)?,
    })
}

fn parse_payload(document_id: i64, text: &str) -> StorageResult<Value> {
    serde_json::from_str(text).map_err(|source| StorageError::InvalidPayload {
        document_id,
        source,
    })
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Insert a version row; a taken version number is a conflict
fn insert_version(tx: &Transaction, version: &Version) -> StorageResult<()> {
    let sql = format!(
        "INSERT INTO document_version ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        VERSION_COLUMNS
    );
    tx.execute(
        &sql,
        params![
            version.document_id,
            version.version,
            version.parent_version,
            version.restored_from,
            version.created_at.timestamp_millis(),
            version.created_by,
            version.message,
            version.data.to_string(),
        ],
    )
    .map_err(|e| {
        conflict_or(
            e,
            version.document_id,
            &format!("version {} already exists", version.version),
        )
    })?;
    Ok(())
}

fn conflict_or(error: rusqlite::Error, document_id: i64, details: &str) -> StorageError {
    if is_constraint_violation(&error) {
        warn!(document_id, "Write rejected: {}", details);
        StorageError::Conflict {
            document_id,
            details: details.to_string(),
        }
    } else {
        StorageError::Database(error)
    }
}
